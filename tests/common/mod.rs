#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]
//! Shared helpers for router-level tests.
//!
//! `FakeKeyService` stands in for the upstream key API and records every call
//! so tests can assert on what did (or did not) reach it.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use hacknight_gateway::config::Secret;
use hacknight_gateway::keys::{CreateKeyRequest, CreatedKey, KeyService, ProvisionedKey};
use hacknight_gateway::registration::MemoryConfigProvider;
use hacknight_gateway::web::{create_router, AppState};
use hacknight_gateway::{AppError, AppResult};
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const ADMIN_TOKEN: &str = "test-admin-token";

#[derive(Default)]
pub struct FakeKeyService {
    keys: Mutex<Vec<ProvisionedKey>>,
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    listings_before_failure: Mutex<Option<usize>>,
    next_id: Mutex<usize>,
}

impl FakeKeyService {
    pub fn with_keys(keys: Vec<ProvisionedKey>) -> Self {
        let fake = Self::default();
        *fake.keys.lock().unwrap() = keys;
        fake
    }

    /// Make disable/delete of this hash fail with an upstream error
    pub fn fail_on(&self, hash: &str) {
        self.failing.lock().unwrap().insert(hash.to_string());
    }

    /// Make every listing fail with an upstream error
    pub fn fail_listing(&self) {
        self.fail_listing_after(0);
    }

    /// Let `n` listings succeed, then fail every later one
    pub fn fail_listing_after(&self, n: usize) {
        *self.listings_before_failure.lock().unwrap() = Some(n);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn keys(&self) -> Vec<ProvisionedKey> {
        self.keys.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_failing(&self, hash: &str) -> AppResult<()> {
        if self.failing.lock().unwrap().contains(hash) {
            return Err(AppError::upstream(Some(500), format!("{} is stuck", hash)));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyService for FakeKeyService {
    async fn list_keys(&self, include_disabled: bool) -> AppResult<Vec<ProvisionedKey>> {
        self.record(format!("list:{}", include_disabled));
        if let Some(remaining) = self.listings_before_failure.lock().unwrap().as_mut() {
            if *remaining == 0 {
                return Err(AppError::upstream(Some(503), "listing unavailable"));
            }
            *remaining -= 1;
        }
        Ok(self
            .keys()
            .into_iter()
            .filter(|key| include_disabled || !key.disabled)
            .collect())
    }

    async fn create_key(&self, request: &CreateKeyRequest) -> AppResult<CreatedKey> {
        self.record(format!("create:{}", request.name));
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };
        let mut data = ProvisionedKey::new(request.name.clone(), format!("hash-{}", id));
        data.label = Some(request.label.clone());
        data.limit = Some(request.limit);
        self.keys.lock().unwrap().push(data.clone());

        Ok(CreatedKey {
            key: format!("sk-or-v1-{}", id),
            data,
        })
    }

    async fn disable_key(&self, hash: &str) -> AppResult<ProvisionedKey> {
        self.record(format!("disable:{}", hash));
        self.check_failing(hash)?;
        let mut keys = self.keys.lock().unwrap();
        let key = keys
            .iter_mut()
            .find(|key| key.hash == hash)
            .ok_or_else(|| AppError::upstream(Some(404), "Key not found"))?;
        key.disabled = true;
        Ok(key.clone())
    }

    async fn delete_key(&self, hash: &str) -> AppResult<bool> {
        self.record(format!("delete:{}", hash));
        self.check_failing(hash)?;
        self.keys.lock().unwrap().retain(|key| key.hash != hash);
        Ok(true)
    }
}

pub struct TestApp {
    pub router: Router,
    pub keys: Arc<FakeKeyService>,
    pub registration: Arc<MemoryConfigProvider>,
}

pub fn test_app(keys: FakeKeyService, registration_enabled: bool) -> TestApp {
    let keys = Arc::new(keys);
    let registration = Arc::new(MemoryConfigProvider::new(registration_enabled));

    let state = AppState {
        registration: registration.clone(),
        keys: keys.clone(),
        admin_token: Arc::new(Secret::new(ADMIN_TOKEN)),
        key_limit: 5.0,
        bulk_concurrency: 4,
    };

    TestApp {
        router: create_router(state, "tests/no-static-assets"),
        keys,
        registration,
    }
}

pub fn hacknight_key(email: &str, hash: &str) -> ProvisionedKey {
    ProvisionedKey::new(format!("Goose Hacknight - {}", email), hash)
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

pub fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn admin_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("x-admin-token", token);
    }
    builder.body(Body::empty()).unwrap()
}
