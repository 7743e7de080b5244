//! Admin user management endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::services::auth::{check_new_password, hash_password};
use crate::AppState;
use quiz_core::ValidationError;

/// POST /api/admin/users
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<Json<UserProfile>> {
    let username = request.username.trim();
    let email = request.email.trim();
    if username.is_empty() {
        return Err(ValidationError::Empty { field: "username" }.into());
    }
    if !email.contains('@') {
        return Err(ValidationError::InvalidValue {
            field: "email",
            value: email.to_string(),
        }
        .into());
    }
    check_new_password(&request.password)?;

    let display_name = request
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(username)
        .to_string();

    let user = state.db.create_user(&NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password_hash: hash_password(&request.password),
        display_name,
        role: request.role,
    })?;

    tracing::info!(user_id = user.id, role = %user.role, "Registered user");

    Ok(Json(user.to_profile()))
}

/// GET /api/admin/users
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<UserProfile>>> {
    let users = state.db.list_users()?;
    Ok(Json(users.iter().map(User::to_profile).collect()))
}

/// DELETE /api/admin/users/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(user_id): Path<i64>,
) -> Result<Json<SuccessResponse>> {
    if auth.user.id == user_id {
        return Err(ApiError::Validation(
            "Cannot delete your own account".to_string(),
        ));
    }

    state.db.delete_user(user_id)?;
    tracing::info!(user_id, "Deleted user and owned rows");

    Ok(Json(SuccessResponse::ok()))
}
