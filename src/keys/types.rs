use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A key as the upstream service reports it.
///
/// Fields this gateway does not interpret are kept in `extra` so listings can
/// be relayed without losing information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionedKey {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    pub hash: String,
    /// Credit limit; `None` means unlimited
    #[serde(default)]
    pub limit: Option<f64>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProvisionedKey {
    pub fn new<N: Into<String>, H: Into<String>>(name: N, hash: H) -> Self {
        Self {
            name: name.into(),
            label: None,
            hash: hash.into(),
            limit: None,
            disabled: false,
            extra: Map::new(),
        }
    }
}

/// Request body for key creation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateKeyRequest {
    pub name: String,
    pub label: String,
    pub limit: f64,
}

/// A freshly created key, the only time its secret is visible
#[derive(Clone)]
pub struct CreatedKey {
    pub key: String,
    pub data: ProvisionedKey,
}

impl fmt::Debug for CreatedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreatedKey")
            .field("key", &"[REDACTED]")
            .field("data", &self.data)
            .finish()
    }
}
