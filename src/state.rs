//! Application State
//!
//! Owns the configuration, the API client and the brain store. Created once
//! at startup and passed to whatever needs it; there are no globals.

use std::sync::Arc;

use atlus_api::ApiClient;
use atlus_core::{FileSessionStore, MemoryNavigator, Navigator, SessionStore};

use crate::models::settings::AppConfig;
use crate::storage::ConfigService;
use crate::store::BrainStore;
use crate::utils::error::AppResult;
use crate::utils::paths::session_path;

pub struct AppState {
    config: AppConfig,
    api: Arc<ApiClient>,
    store: Arc<BrainStore>,
    navigator: Arc<dyn Navigator>,
}

impl AppState {
    /// Load ~/.atlus/config.json, open the session file and build the client.
    pub fn initialize() -> AppResult<Self> {
        let config = ConfigService::new()?.effective_config()?;
        let session_file = match &config.session_file {
            Some(path) => path.clone(),
            None => session_path()?,
        };
        let session = Arc::new(FileSessionStore::open(session_file)?);
        Self::with_session(config, session, Arc::new(MemoryNavigator::default()))
    }

    /// Build state from an already-loaded config and explicit seams.
    pub fn with_session(
        config: AppConfig,
        session: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> AppResult<Self> {
        let api = Arc::new(ApiClient::new(
            config.client_config(),
            session,
            navigator.clone(),
        )?);
        Ok(Self::from_parts(config, api, navigator))
    }

    /// Build state around an existing client.
    pub fn from_parts(config: AppConfig, api: Arc<ApiClient>, navigator: Arc<dyn Navigator>) -> Self {
        let store = Arc::new(BrainStore::with_policy(api.clone(), config.invalidation));
        tracing::debug!(api_url = %config.api_url, policy = ?config.invalidation, "App state ready");
        Self {
            config,
            api,
            store,
            navigator,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    pub fn store(&self) -> &Arc<BrainStore> {
        &self.store
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// End the session: forget the tokens, return to login and drop every
    /// cached object that belonged to the user.
    pub fn logout(&self) -> AppResult<()> {
        self.api.logout()?;
        self.store.clear();
        Ok(())
    }
}
