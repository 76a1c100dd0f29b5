//! Site content API endpoints.

use axum::{extract::State, Json};
use serde_json::Value;

use super::{success, ApiResult};
use crate::auth::AdminSession;
use crate::content::{apply_update, merge};
use crate::models::{RevisionInfo, SiteContent};
use crate::AppState;

/// GET /api/content - Get the persisted content merged over the site defaults.
pub async fn get_content(State(state): State<AppState>) -> ApiResult<SiteContent> {
    let (persisted, revision_id) = state.repo.load_content_snapshot().await?;

    Ok(super::ApiResponse::new(merge(&state.defaults, &persisted)).with_revision(revision_id))
}

/// GET /api/content/revision - Get the current revision info.
pub async fn get_content_revision(State(state): State<AppState>) -> ApiResult<RevisionInfo> {
    let info = state.repo.get_revision_info().await?;
    success(info)
}

/// PUT /api/content - Replace sections, dynamic pages and static overrides.
pub async fn update_content(
    State(state): State<AppState>,
    session: AdminSession,
    Json(patch): Json<Value>,
) -> ApiResult<SiteContent> {
    let current = state.repo.load_content().await?;
    let next = apply_update(&current, &patch)?;
    let revision_id = state.repo.save_content(&next).await?;

    tracing::info!(
        user = %session.user.username,
        revision_id,
        "Site content updated"
    );

    Ok(super::ApiResponse::new(merge(&state.defaults, &next)).with_revision(revision_id))
}
