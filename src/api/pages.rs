//! Dynamic page API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{created, success, ApiResult};
use crate::auth::AdminSession;
use crate::errors::AppError;
use crate::models::{CreatePageRequest, Page, PageQuery, PageStatus, UpdatePageRequest};
use crate::validation::validate_page_fields;
use crate::AppState;

/// Response for `GET /api/pages`: the whole list, or one page for `?path=`.
#[derive(Debug, serde::Serialize)]
#[serde(untagged)]
pub enum PagesView {
    List(Vec<Page>),
    Single(Page),
}

/// GET /api/pages - List pages, or look up a published page with `?path=`.
pub async fn get_pages(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<PagesView> {
    match query.path {
        Some(path) => {
            let path = format!("/{}", path.trim_start_matches('/'));
            match state.repo.find_published_page(&path).await? {
                Some(page) => success(PagesView::Single(page)),
                None => Err(AppError::NotFound("Page not found".to_string())),
            }
        }
        None => success(PagesView::List(state.repo.list_pages().await?)),
    }
}

fn parse_status(raw: Option<&str>, fallback: PageStatus) -> Result<PageStatus, AppError> {
    match raw {
        None => Ok(fallback),
        Some(s) => PageStatus::parse(s)
            .ok_or_else(|| AppError::Validation(format!("Invalid page status '{}'", s))),
    }
}

/// POST /api/pages - Create a page.
pub async fn create_page(
    State(state): State<AppState>,
    session: AdminSession,
    Json(request): Json<CreatePageRequest>,
) -> ApiResult<Page> {
    let name = request.name.trim();
    let path = request.path.trim();
    validate_page_fields(name, path).map_err(AppError::Validation)?;

    let page = Page {
        id: request
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        name: name.to_string(),
        path: path.to_string(),
        content: request.content.clone().unwrap_or_default(),
        status: parse_status(request.status.as_deref(), PageStatus::Draft)?,
    };

    let page = state.repo.create_page(&page).await?;
    tracing::info!(user = %session.user.username, path = %page.path, "Page created");
    created(page)
}

/// PUT /api/pages/{id} - Update a page.
pub async fn update_page(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<String>,
    Json(request): Json<UpdatePageRequest>,
) -> ApiResult<Page> {
    let existing = state
        .repo
        .get_page(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Page {} not found", id)))?;

    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .unwrap_or(&existing.name)
        .to_string();
    let path = request
        .path
        .as_deref()
        .map(str::trim)
        .unwrap_or(&existing.path)
        .to_string();
    validate_page_fields(&name, &path).map_err(AppError::Validation)?;

    let page = Page {
        id: existing.id.clone(),
        name,
        path,
        content: request.content.clone().unwrap_or(existing.content.clone()),
        status: parse_status(request.status.as_deref(), existing.status)?,
    };

    let page = state.repo.update_page(&page).await?;
    success(page)
}

/// DELETE /api/pages/{id} - Delete a page.
pub async fn delete_page(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.repo.delete_page(&id).await?;
    success(())
}
