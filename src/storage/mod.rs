//! Storage Layer
//!
//! Handles JSON config persistence. Session tokens are persisted by
//! `atlus_core::FileSessionStore`.

pub mod config;

pub use config::*;
