//! Progress rollup endpoints
//!
//! The rollup is overwritten wholesale by the client and never reconciled
//! with the answer log. The drift endpoint only reports the difference.

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// GET /api/users/:id/progress
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(user_id): Path<i64>,
) -> Result<Json<StoredProgress>> {
    auth.require_self_or_admin(user_id)?;
    Ok(Json(state.db.get_progress(user_id)?))
}

/// PUT /api/users/:id/progress
pub async fn replace(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(user_id): Path<i64>,
    Json(document): Json<ProgressDocument>,
) -> Result<Json<SuccessResponse>> {
    auth.require_self_or_admin(user_id)?;
    document.validate()?;
    state.db.replace_progress(user_id, &document)?;
    Ok(Json(SuccessResponse::ok()))
}

/// GET /api/users/:id/progress/drift
pub async fn drift(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(user_id): Path<i64>,
) -> Result<Json<ProgressDriftResponse>> {
    auth.require_self_or_admin(user_id)?;

    let progress = state.db.get_progress(user_id)?;
    let rollup = AnswerTotals {
        answered: u64::from(progress.document.total_answered),
        correct: u64::from(progress.document.total_correct),
    };
    let event_log = state.db.answer_totals(user_id)?;

    Ok(Json(ProgressDriftResponse {
        rollup,
        event_log,
        in_sync: rollup == event_log,
    }))
}
