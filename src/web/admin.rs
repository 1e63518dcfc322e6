//! Token-gated bulk key management.

use crate::error::{AppError, AppResult};
use crate::keys::{for_each_key, BatchReport, ProvisionedKey};
use crate::web::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    Json,
};
use serde::Serialize;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

/// Header carrying the admin shared secret
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Full key listing
#[derive(Debug, Serialize)]
pub struct KeyListing {
    pub data: Vec<ProvisionedKey>,
}

/// Response for delete-all
#[derive(Debug, Serialize)]
pub struct BulkResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub report: BatchReport,
}

/// Response for disable-all, with the listing as it stands afterwards
#[derive(Debug, Serialize)]
pub struct DisableAllResponse {
    pub success: bool,
    pub message: String,
    pub data: Vec<ProvisionedKey>,
    /// Set when the follow-up listing failed and `data` is empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(flatten)]
    pub report: BatchReport,
}

/// Middleware rejecting requests without the admin token.
///
/// Runs before any handler, so a rejected request never reaches the key service.
pub async fn require_admin_token(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> AppResult<Response> {
    let presented = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .map(|value| value.as_bytes())
        .unwrap_or_default();

    let expected = state.admin_token.expose().as_bytes();
    if !bool::from(presented.ct_eq(expected)) {
        warn!("Rejected admin request to {}", req.uri().path());
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(req).await)
}

/// GET /api/admin/keys
pub async fn list_keys(State(state): State<AppState>) -> AppResult<Json<KeyListing>> {
    let data = state.keys.list_keys(true).await?;
    Ok(Json(KeyListing { data }))
}

/// POST /api/admin/keys/delete-all
pub async fn delete_all(State(state): State<AppState>) -> AppResult<Json<BulkResponse>> {
    let keys = state.keys.list_keys(true).await?;
    info!("Deleting {} keys", keys.len());

    let service = state.keys.clone();
    let report = for_each_key("delete", &keys, state.bulk_concurrency, |hash| {
        let service = service.clone();
        async move { service.delete_key(&hash).await }
    })
    .await;

    Ok(Json(BulkResponse {
        success: true,
        message: format!("Deleted {} of {} keys", report.succeeded, report.attempted),
        report,
    }))
}

/// POST /api/admin/keys/disable-all
pub async fn disable_all(State(state): State<AppState>) -> AppResult<Json<DisableAllResponse>> {
    let keys = state.keys.list_keys(false).await?;
    info!("Disabling {} keys", keys.len());

    let service = state.keys.clone();
    let report = for_each_key("disable", &keys, state.bulk_concurrency, |hash| {
        let service = service.clone();
        async move { service.disable_key(&hash).await }
    })
    .await;

    // Keys are already disabled at this point, so keep the report either way
    let (data, warning) = match state.keys.list_keys(true).await {
        Ok(data) => (data, None),
        Err(e) => {
            warn!("Listing after disable-all failed: {}", e);
            (Vec::new(), Some(format!("Could not list keys afterwards: {}", e)))
        }
    };

    Ok(Json(DisableAllResponse {
        success: true,
        message: format!("Disabled {} of {} keys", report.succeeded, report.attempted),
        data,
        warning,
        report,
    }))
}
