//! Public registration endpoints.

use crate::error::{AppError, AppResult};
use crate::registration::RegistrationConfig;
use crate::web::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Body of `POST /api/invite`
#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    #[serde(default)]
    pub email: Option<String>,
}

/// Successful invite: the only time the caller sees the key secret
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteResponse {
    pub success: bool,
    pub api_key: String,
    pub key_hash: String,
    pub limit: Option<f64>,
    pub name: String,
}

/// GET /api/registration-status
pub async fn registration_status(State(state): State<AppState>) -> Json<RegistrationConfig> {
    Json(state.registration.load().await)
}

/// POST /api/invite
///
/// Closed registration short-circuits before the body is even looked at.
/// The duplicate check and the creation are separate upstream calls, so two
/// simultaneous requests for one email can both succeed.
pub async fn invite(
    State(state): State<AppState>,
    payload: Result<Json<InviteRequest>, JsonRejection>,
) -> AppResult<Json<InviteResponse>> {
    if !state.registration.load().await.registration_enabled {
        debug!("Invite rejected: registration closed");
        return Err(AppError::RegistrationClosed);
    }

    let email = payload
        .ok()
        .and_then(|Json(body)| body.email)
        .filter(|email| !email.is_empty())
        .ok_or_else(|| AppError::validation("Email is required"))?;

    if state.keys.find_key_by_email(&email).await? {
        warn!("Duplicate invite request for {}", email);
        return Err(AppError::DuplicateRegistration);
    }

    let created = state
        .keys
        .create_key_for_email(&email, state.key_limit)
        .await?;
    info!("Issued key {} for {}", created.data.hash, email);

    Ok(Json(InviteResponse {
        success: true,
        api_key: created.key,
        key_hash: created.data.hash,
        limit: created.data.limit,
        name: created.data.name,
    }))
}
