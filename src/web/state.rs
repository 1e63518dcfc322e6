use crate::config::{AppConfig, Secret};
use crate::error::AppResult;
use crate::keys::KeyService;
use crate::openrouter::OpenRouterClient;
use crate::registration::{ConfigProvider, FileConfigProvider};
use std::sync::Arc;

/// Application state for web handlers
#[derive(Clone)]
pub struct AppState {
    pub registration: Arc<dyn ConfigProvider>,
    pub keys: Arc<dyn KeyService>,
    pub admin_token: Arc<Secret>,
    /// Credit limit for newly created keys
    pub key_limit: f64,
    pub bulk_concurrency: usize,
}

impl AppState {
    /// Wire the production collaborators from configuration
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let keys = OpenRouterClient::new(&config.openrouter)?;
        let registration = FileConfigProvider::new(config.registration.config_path.clone());

        Ok(Self {
            registration: Arc::new(registration),
            keys: Arc::new(keys),
            admin_token: Arc::new(config.admin.token.clone()),
            key_limit: config.registration.default_limit,
            bulk_concurrency: config.admin.bulk_concurrency,
        })
    }
}
