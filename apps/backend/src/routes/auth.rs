//! Authentication middleware

use axum::{
    body::Body,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::error::{ApiError, Result};
use crate::models::User;
use crate::services::auth::now_ms;
use crate::AppState;

/// Authenticated user info stored in request extensions
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user: User,
    pub token: String,
}

impl AuthenticatedUser {
    pub fn require_admin(&self) -> Result<()> {
        if self.user.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("admin role required".to_string()))
        }
    }

    /// Allow the owner of `user_id` or any admin.
    pub fn require_self_or_admin(&self, user_id: i64) -> Result<()> {
        if self.user.id == user_id || self.user.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "cannot access data of user {}",
                user_id
            )))
        }
    }
}

/// Auth middleware - resolves the bearer session token to a user
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization format".to_string()))?
        .to_string();

    let user = state
        .db
        .get_session_user(&token, now_ms())?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired session".to_string()))?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user, token });

    Ok(next.run(request).await)
}

/// Admin gate layered after [`auth_middleware`]
pub async fn admin_middleware(request: Request<Body>, next: Next) -> Result<Response> {
    let auth = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;
    auth.require_admin()?;
    Ok(next.run(request).await)
}
