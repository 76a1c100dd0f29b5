//! Contact submission API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{created, success, ApiResult};
use crate::auth::AdminSession;
use crate::errors::AppError;
use crate::models::{
    ContactStatus, ContactSubmission, CreateContactRequest, CreatedContact, UpdateContactRequest,
};
use crate::validation::validate_contact;
use crate::AppState;

/// GET /api/contacts - List all submissions.
pub async fn list_contacts(
    State(state): State<AppState>,
    _session: AdminSession,
) -> ApiResult<Vec<ContactSubmission>> {
    let contacts = state.repo.list_contacts().await?;
    success(contacts)
}

/// POST /api/contacts - Public contact form submission.
pub async fn create_contact(
    State(state): State<AppState>,
    Json(request): Json<CreateContactRequest>,
) -> ApiResult<CreatedContact> {
    let name = request.name.trim();
    let email = request.email.trim();
    let phone = request.phone.trim();
    let message = request.message.trim();

    validate_contact(name, email, phone, message).map_err(AppError::Validation)?;

    let id = state.repo.create_contact(name, email, phone, message).await?;
    tracing::info!(contact_id = id, "Contact submission received");
    created(CreatedContact { id })
}

/// PUT /api/contacts/{id} - Update a submission's status.
pub async fn update_contact(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
    Json(request): Json<UpdateContactRequest>,
) -> ApiResult<()> {
    let status = request
        .status
        .as_deref()
        .and_then(ContactStatus::parse)
        .ok_or_else(|| AppError::Validation("Invalid status".to_string()))?;

    state.repo.update_contact_status(id, status).await?;
    success(())
}

/// DELETE /api/contacts/{id} - Delete a submission.
pub async fn delete_contact(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    state.repo.delete_contact(id).await?;
    success(())
}
