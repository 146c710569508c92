//! Data Models
//!
//! Application-level data structures. Wire types live in `atlus_core`.

pub mod settings;

pub use settings::*;
