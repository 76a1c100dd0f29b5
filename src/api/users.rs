//! Admin user API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{created, success, ApiResult};
use crate::auth::AdminSession;
use crate::models::{AdminUser, CreateUserRequest, Role, UpdateUserRequest};
use crate::AppState;

/// GET /api/users - List all admin users.
pub async fn list_users(
    State(state): State<AppState>,
    _session: AdminSession,
) -> ApiResult<Vec<AdminUser>> {
    let users = state.repo.list_users().await?;
    success(users)
}

/// POST /api/users - Create an admin user. Admin only.
pub async fn create_user(
    State(state): State<AppState>,
    session: AdminSession,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<AdminUser> {
    session.require_role(Role::Admin)?;

    let user = state.repo.create_user(&request).await?;
    tracing::info!(
        by = %session.user.username,
        username = %user.username,
        role = user.role.as_str(),
        "Admin user created"
    );
    created(user)
}

/// PUT /api/users/{id} - Update an admin user. Admin only.
pub async fn update_user(
    State(state): State<AppState>,
    session: AdminSession,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<AdminUser> {
    session.require_role(Role::Admin)?;

    let user = state.repo.update_user(id, &request).await?;
    tracing::info!(by = %session.user.username, user_id = id, "Admin user updated");
    success(user)
}

/// DELETE /api/users/{id} - Delete an admin user. Admin only.
pub async fn delete_user(
    State(state): State<AppState>,
    session: AdminSession,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    session.require_role(Role::Admin)?;

    state.repo.delete_user(id).await?;
    tracing::info!(by = %session.user.username, user_id = id, "Admin user deleted");
    success(())
}
