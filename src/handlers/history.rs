//! History handler

use axum::{extract::{Query, State}, Json};

use crate::{AppError, AppResult, AppState};
use crate::models::{HistoryQuery, ScanRecord, DEFAULT_HISTORY_LIMIT};

/// Recent scans, newest first
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<ScanRecord>>> {
    let limit = validate_limit(query.limit, state.config.history_max_limit)?;
    let records = state.store.recent(limit).await?;
    Ok(Json(records))
}

/// Positive, defaulted, clamped to `max`
pub fn validate_limit(requested: Option<i64>, max: u32) -> AppResult<u32> {
    let limit = requested.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if limit < 1 {
        return Err(AppError::ValidationError("limit must be a positive integer".to_string()));
    }
    Ok(limit.min(i64::from(max)) as u32)
}
