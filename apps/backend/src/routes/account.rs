//! Login, session, and password endpoints

use axum::{extract::State, Extension, Json};

use crate::config::millis;
use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::services::auth::{check_new_password, hash_password, now_ms, verify_password};
use crate::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let user = state
        .db
        .get_user_by_username(request.username.trim())?
        .filter(|u| verify_password(&request.password, &u.password_hash))
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    let session = state.db.create_session(user.id, millis(state.session_ttl))?;
    state.db.touch_last_login(user.id)?;
    let user = state
        .db
        .get_user(user.id)?
        .ok_or_else(|| ApiError::NotFound(format!("user {}", user.id)))?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(LoginResponse {
        token: session.token,
        user: user.to_profile(),
    }))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<SuccessResponse>> {
    state.db.revoke_session(&auth.token)?;
    Ok(Json(SuccessResponse::ok()))
}

/// GET /api/auth/me
pub async fn me(Extension(auth): Extension<AuthenticatedUser>) -> Json<UserProfile> {
    Json(auth.user.to_profile())
}

/// POST /api/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<SuccessResponse>> {
    if !verify_password(&request.current_password, &auth.user.password_hash) {
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }
    check_new_password(&request.new_password)?;

    state
        .db
        .update_password(auth.user.id, &hash_password(&request.new_password))?;
    let revoked = state.db.revoke_other_sessions(auth.user.id, &auth.token)?;

    tracing::info!(user_id = auth.user.id, revoked, "Password changed");

    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/auth/forgot-password
///
/// Answers success whether or not the email is known.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<SuccessResponse>> {
    if let Some(user) = state.db.get_user_by_email(request.email.trim())? {
        let token = state
            .db
            .issue_reset_token(user.id, millis(state.reset_token_ttl))?;
        state.notifier.send_reset(&user, &token);
    } else {
        tracing::debug!("Password reset requested for unknown email");
    }

    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<SuccessResponse>> {
    check_new_password(&request.new_password)?;

    let user_id = state.db.redeem_reset_token(
        request.token.trim(),
        &hash_password(&request.new_password),
        now_ms(),
    )?;

    tracing::info!(user_id, "Password reset completed");

    Ok(Json(SuccessResponse::ok()))
}
