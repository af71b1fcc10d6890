// src/health.rs

use axum::{extract::Extension, response::Json, routing::get, Router};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::common::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: String,
    pub environment: String,
    pub version: &'static str,
}

/// GET /api/health - liveness document for uptime checks
async fn health(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Json<HealthResponse> {
    let state = state_lock.read().await.clone();

    Json(HealthResponse {
        status: "healthy",
        service: "Alma101 Security API",
        timestamp: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        environment: state.config.environment,
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn health_routes() -> Router {
    Router::new().route("/api/health", get(health))
}
