//! Handlers for the `/auth` resource. Sessions are issued elsewhere; this
//! service only revokes them.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Number of sessions removed by a logout.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub revoked: u64,
}

/// POST /api/v1/auth/logout
///
/// Revoke the session whose token authenticated this request.
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<LogoutResponse>>> {
    let revoked = u64::from(state.store.revoke_session(&user.token).await?);
    tracing::info!(user_id = user.user_id, "Session revoked");
    Ok(Json(
        ApiResponse::new(LogoutResponse { revoked }).with_message("Logged out"),
    ))
}

/// POST /api/v1/auth/logout-all
///
/// Revoke every session of the authenticated user.
pub async fn logout_all(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<LogoutResponse>>> {
    let revoked = state.store.revoke_user_sessions(user.user_id).await?;
    tracing::info!(user_id = user.user_id, revoked, "All user sessions revoked");
    Ok(Json(
        ApiResponse::new(LogoutResponse { revoked }).with_message("Logged out from all sessions"),
    ))
}
