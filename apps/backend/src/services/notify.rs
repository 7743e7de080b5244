//! Delivery of password reset tokens.
//!
//! Mail transport lives outside this service. The default notifier only
//! logs; the token itself is written at `debug` level.

use crate::models::{ResetToken, User};

pub trait ResetNotifier: Send + Sync {
    fn send_reset(&self, user: &User, token: &ResetToken);
}

/// Logs reset tokens through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl ResetNotifier for TracingNotifier {
    fn send_reset(&self, user: &User, token: &ResetToken) {
        tracing::info!(
            user_id = user.id,
            expires_at_ms = token.expires_at_ms,
            "Password reset token issued"
        );
        tracing::debug!(user_id = user.id, "Reset token: {}", token.token);
    }
}
