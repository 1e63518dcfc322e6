use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A credential loaded from configuration.
///
/// Redacted in `Debug` output and wiped from memory on drop.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

/// OpenRouter key-management API settings
#[derive(Debug, Deserialize, Clone)]
pub struct OpenRouterConfig {
    /// Provisioning key used to manage keys on our behalf
    pub provisioning_key: Secret,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Admin surface settings
#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    /// Shared secret expected in the `x-admin-token` header
    pub token: Secret,
    /// Upper bound on concurrent upstream calls during bulk operations
    #[serde(default = "default_bulk_concurrency")]
    pub bulk_concurrency: usize,
}

fn default_bulk_concurrency() -> usize {
    8
}

/// Public registration settings
#[derive(Debug, Deserialize, Clone)]
pub struct RegistrationSettings {
    /// JSON file holding the `registrationEnabled` flag
    #[serde(default = "default_config_path")]
    pub config_path: PathBuf,
    /// Credit limit applied to every newly created key
    #[serde(default = "default_limit")]
    pub default_limit: f64,
}

fn default_config_path() -> PathBuf {
    PathBuf::from("config/registration.json")
}

fn default_limit() -> f64 {
    5.0
}

impl Default for RegistrationSettings {
    fn default() -> Self {
        Self {
            config_path: default_config_path(),
            default_limit: default_limit(),
        }
    }
}

/// Web server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served for any path no API route claims
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

/// Root application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub openrouter: OpenRouterConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub registration: RegistrationSettings,
    #[serde(default)]
    pub web: WebConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default config file
            .add_source(File::with_name("config/default").required(false))
            // Override with local config if present
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (prefix: HACKNIGHT_)
            // e.g., HACKNIGHT_OPENROUTER__PROVISIONING_KEY, HACKNIGHT_WEB__PORT
            .add_source(
                Environment::with_prefix("HACKNIGHT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the gateway cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.openrouter.provisioning_key.is_empty() {
            return Err(ConfigError::Message(
                "openrouter.provisioning_key must not be empty".to_string(),
            ));
        }
        if self.admin.token.is_empty() {
            return Err(ConfigError::Message(
                "admin.token must not be empty".to_string(),
            ));
        }
        if self.admin.bulk_concurrency == 0 {
            return Err(ConfigError::Message(
                "admin.bulk_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.web.host, self.web.port)
    }
}
