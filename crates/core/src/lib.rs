//! Atlus Core
//!
//! Domain models, error types and the storage/navigation seams shared by the
//! Atlus client crates. Nothing here performs network I/O.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `models` - Brains, nodes, graphs and request bodies
//! - `config` - HTTP client settings (`ClientConfig`, `ProxyConfig`)
//! - `session` - Session token storage (`SessionStore` and implementations)
//! - `navigation` - Route access used by the login redirect (`Navigator`)

pub mod config;
pub mod error;
pub mod models;
pub mod navigation;
pub mod session;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Models ─────────────────────────────────────────────────────────────
pub use models::{
    Backlinks, Brain, BrainId, BrainList, Edge, Graph, NewNode, Node, NodeId, NodeLink,
    NodePage, NodePatch, NodeQuery, Related, SortOrder,
};

// ── Configuration ──────────────────────────────────────────────────────
pub use config::{ClientConfig, ProxyConfig, DEFAULT_USER_AGENT};

// ── Session & Navigation ───────────────────────────────────────────────
pub use navigation::{MemoryNavigator, Navigator, LOGIN_ROUTE};
pub use session::{
    FileSessionStore, MemorySessionStore, SessionStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY,
};
