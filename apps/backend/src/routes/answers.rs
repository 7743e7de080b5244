//! Answer log and exam endpoints

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// POST /api/users/:id/answers
pub async fn record(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(user_id): Path<i64>,
    Json(event): Json<AnswerEvent>,
) -> Result<Json<RecordedResponse>> {
    auth.require_self_or_admin(user_id)?;
    event.validate()?;

    let stored = state.db.record_answer(user_id, &event)?;

    Ok(Json(RecordedResponse {
        success: true,
        id: stored.id,
    }))
}

/// GET /api/users/:id/answers
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(user_id): Path<i64>,
    Query(query): Query<AnswerListQuery>,
) -> Result<Json<Vec<StoredAnswer>>> {
    auth.require_self_or_admin(user_id)?;
    Ok(Json(state.db.list_answers(user_id, query.mode)?))
}

/// POST /api/users/:id/exams
pub async fn record_exam(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(user_id): Path<i64>,
    Json(exam): Json<ExamRecord>,
) -> Result<Json<StoredExam>> {
    auth.require_self_or_admin(user_id)?;
    exam.validate()?;
    Ok(Json(state.db.record_exam(user_id, &exam)?))
}

/// GET /api/users/:id/exams
pub async fn list_exams(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<StoredExam>>> {
    auth.require_self_or_admin(user_id)?;
    Ok(Json(state.db.list_exams(user_id)?))
}

/// GET /api/exams/:id
pub async fn get_exam(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(exam_id): Path<i64>,
) -> Result<Json<StoredExam>> {
    let exam = state
        .db
        .get_exam(exam_id)?
        .ok_or_else(|| ApiError::NotFound(format!("exam {}", exam_id)))?;
    auth.require_self_or_admin(exam.user_id)?;
    Ok(Json(exam))
}
