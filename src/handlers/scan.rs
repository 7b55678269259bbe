//! Scan handler

use axum::{extract::{rejection::JsonRejection, State}, Json};
use validator::Validate;

use crate::{pipeline, AppError, AppResult, AppState};
use crate::models::{ScanRecord, ScanRequest};

/// Classify a URL. Validation happens before any model or arbiter call.
pub async fn scan(
    State(state): State<AppState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> AppResult<Json<ScanRecord>> {
    let Json(req) = payload.map_err(|e| AppError::ValidationError(e.body_text()))?;

    req.validate()?;
    let url = req.url.trim();
    if url.is_empty() {
        return Err(AppError::ValidationError("URL is required".to_string()));
    }

    let outcome = pipeline::scan(&state, url).await;
    tracing::debug!(
        url = %outcome.record.url,
        local = %outcome.local.label,
        local_confidence = outcome.local.confidence,
        arbiter = outcome.arbiter.kind(),
        source = outcome.source.as_str(),
        persisted = outcome.stored.is_ok(),
        "Scan response"
    );
    Ok(Json(outcome.record))
}
