//! Registration flag storage.
//!
//! The flag lives in a small JSON file that deployment tooling rewrites.
//! The running gateway only ever reads it, and reads it fresh every time.

use crate::error::AppResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

/// Contents of the registration flag file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationConfig {
    pub registration_enabled: bool,
}

/// Source of the registration flag.
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Current flag value. Never fails: anything unreadable counts as closed.
    async fn load(&self) -> RegistrationConfig;
}

/// Reads the flag from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileConfigProvider {
    path: PathBuf,
}

impl FileConfigProvider {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the flag file. Used by operator tooling, not by request handlers.
    pub async fn store(&self, config: RegistrationConfig) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let mut contents = serde_json::to_string_pretty(&config)?;
        contents.push('\n');
        tokio::fs::write(&self.path, contents).await?;
        Ok(())
    }
}

#[async_trait]
impl ConfigProvider for FileConfigProvider {
    async fn load(&self) -> RegistrationConfig {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let config = RegistrationConfig::default();
                info!(
                    "Registration config {} not found, creating default",
                    self.path.display()
                );
                if let Err(e) = self.store(config).await {
                    error!(
                        "Failed to write default registration config {}: {}",
                        self.path.display(),
                        e
                    );
                }
                return config;
            }
            Err(e) => {
                error!(
                    "Failed to read registration config {}: {}",
                    self.path.display(),
                    e
                );
                return RegistrationConfig::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(config) => {
                debug!("Loaded registration config: {:?}", config);
                config
            }
            Err(e) => {
                warn!(
                    "Registration config {} is corrupt, treating registration as closed: {}",
                    self.path.display(),
                    e
                );
                RegistrationConfig::default()
            }
        }
    }
}

/// Holds the flag in memory.
#[derive(Debug, Default)]
pub struct MemoryConfigProvider {
    enabled: AtomicBool,
}

impl MemoryConfigProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConfigProvider for MemoryConfigProvider {
    async fn load(&self) -> RegistrationConfig {
        RegistrationConfig {
            registration_enabled: self.enabled.load(Ordering::SeqCst),
        }
    }
}
