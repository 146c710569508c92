//! HTTP Client Factory
//!
//! Builds the `reqwest::Client` used by `ReqwestTransport` from the
//! connection settings in `ClientConfig`.

use std::time::Duration;

use atlus_core::{ClientConfig, CoreError, CoreResult};

/// Build a `reqwest::Client` for the given configuration.
///
/// - `proxy: Some(..)` -> route all traffic through it
/// - `proxy: None` -> honour the environment's proxy variables
/// - `timeout_secs: None` -> keep reqwest's default (no overall timeout)
pub fn build_http_client(config: &ClientConfig) -> CoreResult<reqwest::Client> {
    config.validate()?;

    let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());

    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    if let Some(cfg) = &config.proxy {
        let mut proxy = reqwest::Proxy::all(&cfg.url)
            .map_err(|e| CoreError::config(format!("Invalid proxy URL '{}': {}", cfg.url, e)))?;
        if let (Some(user), Some(password)) = (&cfg.username, &cfg.password) {
            proxy = proxy.basic_auth(user, password);
        }
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| CoreError::config(format!("Failed to build HTTP client: {}", e)))
}
