use crate::error::AppResult;
use crate::keys::naming::{key_label, key_name};
use crate::keys::types::{CreateKeyRequest, CreatedKey, ProvisionedKey};
use async_trait::async_trait;
use tracing::debug;

/// Operations against the upstream key-management service.
#[async_trait]
pub trait KeyService: Send + Sync {
    /// Every key, across all pages, in the order the service returns them.
    async fn list_keys(&self, include_disabled: bool) -> AppResult<Vec<ProvisionedKey>>;

    async fn create_key(&self, request: &CreateKeyRequest) -> AppResult<CreatedKey>;

    async fn disable_key(&self, hash: &str) -> AppResult<ProvisionedKey>;

    async fn delete_key(&self, hash: &str) -> AppResult<bool>;

    /// Whether a key was already provisioned for this exact email.
    ///
    /// Disabled keys count, so a revoked attendee cannot re-register.
    async fn find_key_by_email(&self, email: &str) -> AppResult<bool> {
        let expected = key_name(email);
        let keys = self.list_keys(true).await?;
        debug!("Checked {} existing keys for duplicates", keys.len());
        Ok(keys.iter().any(|key| key.name == expected))
    }

    async fn create_key_for_email(&self, email: &str, limit: f64) -> AppResult<CreatedKey> {
        let request = CreateKeyRequest {
            name: key_name(email),
            label: key_label(email),
            limit,
        };
        self.create_key(&request).await
    }
}
