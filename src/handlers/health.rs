//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    store: &'static str,
    model_loaded: bool,
    arbiter_configured: bool,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        store: state.store.backend(),
        model_loaded: state.classifier.is_ready(),
        arbiter_configured: state.arbiter.is_configured(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
