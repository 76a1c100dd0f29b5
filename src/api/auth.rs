//! Authentication API endpoints.

use axum::{extract::State, Json};

use super::{success, ApiResult};
use crate::auth::{AdminSession, SessionGuard};
use crate::models::{LoginRequest, LoginResponse, VerifyResponse};
use crate::AppState;

/// POST /api/auth/login - Exchange credentials for a session token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let guard = SessionGuard::new(&state.repo, &state.tokens);

    match guard.authenticate(&request.username, &request.password).await {
        Ok((token, user)) => {
            tracing::info!(username = %user.username, "Login succeeded");
            success(LoginResponse {
                token,
                user: user.session_view(),
            })
        }
        Err(e) => {
            tracing::info!(username = %request.username.trim(), "Login rejected: {}", e);
            Err(e.into())
        }
    }
}

/// GET /api/auth/verify - Check the bearer token and return its user.
pub async fn verify(session: AdminSession) -> ApiResult<VerifyResponse> {
    success(VerifyResponse {
        valid: true,
        user: session.user.session_view(),
    })
}
