//! Logging initialization.
//!
//! Installs a `tracing-subscriber` formatter filtered by `EnvFilter`.
//! `RUST_LOG`, when set and valid, takes precedence over the configured
//! filter.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when the configured directive does not parse.
pub const FALLBACK_FILTER: &str = "info";

/// Resolve the effective filter from `RUST_LOG` and the configured directive.
pub fn build_filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER))
}

/// Initialize the global subscriber. Returns `false` if one was already
/// installed; only the first call takes effect.
pub fn init_logging(filter: &str) -> bool {
    tracing_subscriber::registry()
        .with(build_filter(filter))
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}
