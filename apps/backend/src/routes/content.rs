//! Study content, per-user content progress, and terminal transcripts

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;
use quiz_core::ValidationError;

/// GET /api/content
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Content>>> {
    Ok(Json(state.db.list_content()?))
}

/// GET /api/content/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Content>> {
    let content = state
        .db
        .get_content(id)?
        .ok_or_else(|| ApiError::NotFound(format!("content {}", id)))?;
    Ok(Json(content))
}

/// POST /api/admin/content
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<CreateContentRequest>,
) -> Result<Json<Content>> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(ValidationError::Empty { field: "title" }.into());
    }
    let category = request
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let content = state
        .db
        .create_content(title, &request.body, category, auth.user.id)?;
    Ok(Json(content))
}

/// DELETE /api/admin/content/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>> {
    state.db.delete_content(id)?;
    Ok(Json(SuccessResponse::ok()))
}

/// GET /api/users/:id/content-progress
pub async fn list_progress(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<ContentProgress>>> {
    auth.require_self_or_admin(user_id)?;
    Ok(Json(state.db.list_content_progress(user_id)?))
}

/// PUT /api/users/:id/content-progress/:content_id
pub async fn save_progress(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path((user_id, content_id)): Path<(i64, i64)>,
    Json(request): Json<ContentProgressRequest>,
) -> Result<Json<ContentProgress>> {
    auth.require_self_or_admin(user_id)?;
    let progress =
        state
            .db
            .save_content_progress(user_id, content_id, request.completed, request.percent)?;
    Ok(Json(progress))
}

/// GET /api/users/:id/terminal-sessions
pub async fn list_terminal(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<TerminalSession>>> {
    auth.require_self_or_admin(user_id)?;
    Ok(Json(state.db.list_terminal_sessions(user_id)?))
}

/// POST /api/users/:id/terminal-sessions
pub async fn save_terminal(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(user_id): Path<i64>,
    Json(request): Json<TerminalSessionRequest>,
) -> Result<Json<TerminalSession>> {
    auth.require_self_or_admin(user_id)?;
    if request.transcript.is_empty() {
        return Err(ValidationError::Empty { field: "transcript" }.into());
    }
    let session =
        state
            .db
            .save_terminal_session(user_id, request.content_id, &request.transcript)?;
    Ok(Json(session))
}
