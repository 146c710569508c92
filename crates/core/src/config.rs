//! Client Configuration Types
//!
//! Settings consumed by the HTTP client factory in `atlus-api`. The
//! application crate embeds `ClientConfig` in its persisted `AppConfig`.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Default user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Atlus/0.1 (Rust client)";

/// Outbound proxy for API traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Full proxy URL, e.g. `http://127.0.0.1:8080` or `socks5://host:1080`.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Never written back to disk.
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
}

/// Connection settings for the API client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Prefix joined verbatim with request paths. Empty means same-origin
    /// relative paths, which only a custom transport can resolve.
    #[serde(default)]
    pub base_url: String,
    /// Request timeout. `None` keeps the transport default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: None,
            user_agent: default_user_agent(),
            proxy: None,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Resolve a request path against the base URL.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.timeout_secs == Some(0) {
            return Err(CoreError::validation("timeout_secs must be greater than 0"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(CoreError::validation("user_agent must not be empty"));
        }
        if let Some(proxy) = &self.proxy {
            if !proxy.url.contains("://") {
                return Err(CoreError::validation(format!(
                    "proxy url '{}' has no scheme",
                    proxy.url
                )));
            }
        }
        Ok(())
    }
}
