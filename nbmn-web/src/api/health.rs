//! Health check endpoint

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::{AppState, SiteStore};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "nbmn-web".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build health check routes
pub fn health_routes<S: SiteStore>() -> Router<AppState<S>> {
    Router::new().route("/health", get(health_check))
}
