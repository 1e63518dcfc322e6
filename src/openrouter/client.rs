use crate::config::{OpenRouterConfig, Secret};
use crate::error::{AppError, AppResult};
use crate::keys::{CreateKeyRequest, CreatedKey, KeyService, ProvisionedKey};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

/// Keys requested per listing call. A shorter page ends the listing.
pub const PAGE_SIZE: usize = 100;

/// One page of `GET /keys`
#[derive(Debug, Deserialize)]
struct KeyPage {
    data: Vec<ProvisionedKey>,
}

/// Single-key envelope returned by `PATCH /keys/{hash}`
#[derive(Debug, Deserialize)]
struct KeyEnvelope {
    data: ProvisionedKey,
}

/// Response from `POST /keys`
#[derive(Deserialize)]
struct CreateKeyResponse {
    data: ProvisionedKey,
    key: String,
}

#[derive(Debug, Serialize)]
struct DisableKeyRequest {
    disabled: bool,
}

/// Error body the key API uses for non-success responses
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Client for the OpenRouter key-management API
pub struct OpenRouterClient {
    http: Client,
    base_url: String,
    provisioning_key: Secret,
}

impl std::fmt::Debug for OpenRouterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenRouterClient {
    /// Create a new key-service client from config
    pub fn new(config: &OpenRouterConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("hacknight-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            provisioning_key: config.provisioning_key.clone(),
        })
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.bearer_auth(self.provisioning_key.expose())
    }

    /// Fetch a single listing page starting at `offset`
    async fn list_page(
        &self,
        offset: usize,
        include_disabled: bool,
    ) -> AppResult<Vec<ProvisionedKey>> {
        let url = format!("{}/keys", self.base_url);
        let mut query = vec![("offset", offset.to_string())];
        if include_disabled {
            query.push(("include_disabled", "true".to_string()));
        }

        debug!("Listing keys at offset {}", offset);

        let response = self
            .authorized(self.http.get(&url))
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                error!("Key listing request failed: {}", e);
                AppError::from(e)
            })?;

        if !response.status().is_success() {
            return Err(upstream_error("list keys", response).await);
        }

        let page: KeyPage = response.json().await?;
        Ok(page.data)
    }
}

#[async_trait]
impl KeyService for OpenRouterClient {
    async fn list_keys(&self, include_disabled: bool) -> AppResult<Vec<ProvisionedKey>> {
        let mut keys = Vec::new();
        let mut offset = 0;

        loop {
            let page = self.list_page(offset, include_disabled).await?;
            let page_len = page.len();
            keys.extend(page);

            if page_len < PAGE_SIZE {
                break;
            }
            offset += PAGE_SIZE;
        }

        debug!("Listed {} keys", keys.len());
        Ok(keys)
    }

    async fn create_key(&self, request: &CreateKeyRequest) -> AppResult<CreatedKey> {
        let url = format!("{}/keys", self.base_url);

        let response = self
            .authorized(self.http.post(&url))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!("Key creation request failed: {}", e);
                AppError::from(e)
            })?;

        if !response.status().is_success() {
            return Err(upstream_error("create key", response).await);
        }

        let created: CreateKeyResponse = response.json().await?;
        info!("Created key {} ({})", created.data.hash, created.data.name);

        Ok(CreatedKey {
            key: created.key,
            data: created.data,
        })
    }

    async fn disable_key(&self, hash: &str) -> AppResult<ProvisionedKey> {
        let url = format!("{}/keys/{}", self.base_url, hash);

        let response = self
            .authorized(self.http.patch(&url))
            .json(&DisableKeyRequest { disabled: true })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_error("disable key", response).await);
        }

        let updated: KeyEnvelope = response.json().await?;
        debug!("Disabled key {}", hash);
        Ok(updated.data)
    }

    async fn delete_key(&self, hash: &str) -> AppResult<bool> {
        let url = format!("{}/keys/{}", self.base_url, hash);

        let response = self.authorized(self.http.delete(&url)).send().await?;

        if !response.status().is_success() {
            return Err(upstream_error("delete key", response).await);
        }

        debug!("Deleted key {}", hash);
        Ok(true)
    }
}

/// Turn a non-success response into an upstream error, preferring the
/// service's own message over the raw body.
async fn upstream_error(action: &str, response: Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error!("Failed to {}: status {}: {}", action, status, body);

    let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if !body.trim().is_empty() => body,
        Err(_) => format!("Service returned {}", status),
    };

    AppError::upstream(Some(status.as_u16()), message)
}
