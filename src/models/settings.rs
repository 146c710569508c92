//! Settings Models
//!
//! Application configuration persisted in `config.json`.

use std::path::PathBuf;

use atlus_core::{ClientConfig, ProxyConfig, DEFAULT_USER_AGENT};
use serde::{Deserialize, Serialize};

use crate::store::InvalidationPolicy;

/// Backend address used when neither the config file nor the environment
/// provide one.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Application configuration stored in config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the Atlus backend, without the `/api` suffix
    pub api_url: String,
    /// Per-request timeout in seconds; `None` disables it
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: Option<u64>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,
    /// `tracing` filter directive, e.g. "info" or "atlus_api=debug"
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Where tokens are persisted. Defaults to ~/.atlus/session.json
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_file: Option<PathBuf>,
    /// What a node update invalidates in the brain store
    #[serde(default)]
    pub invalidation: InvalidationPolicy,
}

fn default_timeout() -> Option<u64> {
    Some(30)
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            proxy: None,
            log_filter: default_log_filter(),
            session_file: None,
            invalidation: InvalidationPolicy::default(),
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub api_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub log_filter: Option<String>,
    pub invalidation: Option<InvalidationPolicy>,
}

impl AppConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(api_url) = update.api_url {
            self.api_url = api_url;
        }
        if let Some(timeout) = update.request_timeout_secs {
            self.request_timeout_secs = Some(timeout);
        }
        if let Some(user_agent) = update.user_agent {
            self.user_agent = user_agent;
        }
        if let Some(log_filter) = update.log_filter {
            self.log_filter = log_filter;
        }
        if let Some(policy) = update.invalidation {
            self.invalidation = policy;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let parsed = url::Url::parse(&self.api_url)
            .map_err(|e| format!("Invalid api_url '{}': {}", self.api_url, e))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(format!(
                "Invalid api_url scheme: {}. Must be 'http' or 'https'",
                parsed.scheme()
            ));
        }

        if self.request_timeout_secs == Some(0) {
            return Err("request_timeout_secs must be at least 1 second".to_string());
        }

        if self.user_agent.trim().is_empty() {
            return Err("user_agent cannot be empty".to_string());
        }

        if let Some(proxy) = &self.proxy {
            url::Url::parse(&proxy.url)
                .map_err(|e| format!("Invalid proxy url '{}': {}", proxy.url, e))?;
        }

        Ok(())
    }

    /// Connection settings for the API client
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_url.clone(),
            timeout_secs: self.request_timeout_secs,
            user_agent: self.user_agent.clone(),
            proxy: self.proxy.clone(),
        }
    }
}
