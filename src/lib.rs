//! Atlus Client - Rust Client Library
//!
//! Client-side core for the Atlus notes + graph backend.
//! It includes:
//! - `BrainStore`, the shared cache of brains, node lists, graphs and nodes
//! - Query keys for prefix invalidation
//! - Configuration file and logging setup
//! - `AppState`, which wires the API client and the store together
//!
//! HTTP access and the session policy live in `atlus_api`; wire types in
//! `atlus_core`.

pub mod models;
pub mod queries;
pub mod state;
pub mod storage;
pub mod store;
pub mod utils;

// ── Store ──────────────────────────────────────────────────────────────
pub use queries::QueryKey;
pub use store::{BrainStore, InvalidationPolicy, StoreEvent, NODE_UPDATE_POLICY};

// ── Application ────────────────────────────────────────────────────────
pub use models::settings::{AppConfig, SettingsUpdate};
pub use state::AppState;
pub use storage::ConfigService;
pub use utils::error::{AppError, AppResult};
pub use utils::logging::init_logging;
