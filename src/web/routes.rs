use crate::web::admin;
use crate::web::invite;
use crate::web::state::AppState;
use axum::{
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::path::Path;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Root banner response
#[derive(Serialize)]
pub struct RootResponse {
    pub message: String,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Goose Hacknight registration gateway is running".to_string(),
    })
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create the web router
///
/// Paths no route claims fall through to the static front-end in `static_dir`.
pub fn create_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let admin_routes = Router::new()
        .route("/keys", get(admin::list_keys))
        .route("/keys/delete-all", post(admin::delete_all))
        .route("/keys/disable-all", post(admin::disable_all))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin::require_admin_token,
        ));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/registration-status", get(invite::registration_status))
        .route("/api/invite", post(invite::invite))
        .nest("/api/admin", admin_routes)
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
