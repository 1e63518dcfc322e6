use anyhow::{bail, Context};
use serde_json::Value;

/// Thin client for a running gateway's HTTP API.
pub struct GatewayClient {
    pub base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl GatewayClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            http: reqwest::Client::new(),
        }
    }

    fn admin_token(&self) -> anyhow::Result<&str> {
        match self.token.as_deref() {
            Some(token) if !token.is_empty() => Ok(token),
            _ => bail!("admin token required: pass --token or set HACKNIGHT_ADMIN__TOKEN"),
        }
    }

    /// Public registration flag as the server sees it.
    pub async fn registration_status(&self) -> anyhow::Result<Value> {
        let url = format!("{}/api/registration-status", self.base_url);
        let resp = self.http.get(&url).send().await?;
        read_json(resp).await
    }

    pub async fn list_keys(&self) -> anyhow::Result<Value> {
        self.admin("GET", "/api/admin/keys").await
    }

    pub async fn disable_all(&self) -> anyhow::Result<Value> {
        self.admin("POST", "/api/admin/keys/disable-all").await
    }

    pub async fn delete_all(&self) -> anyhow::Result<Value> {
        self.admin("POST", "/api/admin/keys/delete-all").await
    }

    async fn admin(&self, method: &str, path: &str) -> anyhow::Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let builder = match method {
            "GET" => self.http.get(&url),
            _ => self.http.post(&url),
        };
        let resp = builder
            .header("x-admin-token", self.admin_token()?)
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;
        read_json(resp).await
    }
}

async fn read_json(resp: reqwest::Response) -> anyhow::Result<Value> {
    let status = resp.status();
    let body: Value = resp.json().await.unwrap_or(Value::Null);
    if !status.is_success() {
        let message = body["message"].as_str().unwrap_or("no message");
        match body["error"].as_str() {
            Some(detail) => bail!("gateway returned {}: {} ({})", status, message, detail),
            None => bail!("gateway returned {}: {}", status, message),
        }
    }
    Ok(body)
}
