//! Admin dashboard endpoint

use axum::{extract::State, Json};
use chrono::Utc;

use crate::error::Result;
use crate::models::AdminStatsResponse;
use crate::services::analytics::admin_stats;
use crate::AppState;

/// GET /api/admin/stats
pub async fn stats(State(state): State<AppState>) -> Result<Json<AdminStatsResponse>> {
    Ok(Json(admin_stats(&state.db, Utc::now())?))
}
