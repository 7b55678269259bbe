//! Stats handler

use axum::{extract::State, Json};

use crate::{stats, AppResult, AppState};
use crate::models::StatsSnapshot;

pub async fn get(State(state): State<AppState>) -> AppResult<Json<StatsSnapshot>> {
    let snapshot = stats::snapshot(state.store.as_ref()).await?;
    Ok(Json(snapshot))
}
