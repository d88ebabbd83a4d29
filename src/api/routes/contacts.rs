//! Contact Routes
//!
//! - GET /api/v1/contacts - List contacts (search, status, company, dateRange, sort, direction, filter)
//! - POST /api/v1/contacts - Create a contact
//! - GET /api/v1/contacts/companies - Distinct company names
//! - GET /api/v1/contacts/tags - Distinct tags
//! - POST /api/v1/contacts/import - Import contacts from a CSV body
//! - GET /api/v1/contacts/:id - Get a contact
//! - PUT /api/v1/contacts/:id - Replace a contact's editable fields
//! - DELETE /api/v1/contacts/:id - Delete a contact
//! - POST /api/v1/contacts/:id/tags - Add a tag
//! - DELETE /api/v1/contacts/:id/tags/:tag - Remove a tag

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{ContactListResponse, ImportResponse, TagRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::contacts::ContactQuery;
use crate::store::{Contact, ContactDraft};

/// GET /api/v1/contacts
pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ContactQuery>,
) -> ApiResult<Json<ContactListResponse>> {
    let contacts = state.contacts.list(&query).await?;

    Ok(Json(ContactListResponse {
        total: contacts.len(),
        contacts,
    }))
}

/// POST /api/v1/contacts
pub async fn create_contact(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<ContactDraft>,
) -> ApiResult<(StatusCode, Json<Contact>)> {
    let contact = state.contacts.create(draft).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// GET /api/v1/contacts/:id
pub async fn get_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Contact>> {
    Ok(Json(state.contacts.get(&id).await?))
}

/// PUT /api/v1/contacts/:id
pub async fn update_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(draft): Json<ContactDraft>,
) -> ApiResult<Json<Contact>> {
    Ok(Json(state.contacts.update(&id, draft).await?))
}

/// DELETE /api/v1/contacts/:id
pub async fn delete_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.contacts.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/contacts/companies
pub async fn list_companies(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.contacts.companies().await)
}

/// GET /api/v1/contacts/tags
pub async fn list_tags(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.contacts.tags().await)
}

/// POST /api/v1/contacts/:id/tags
pub async fn add_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<TagRequest>,
) -> ApiResult<Json<Contact>> {
    if req.tag.trim().is_empty() {
        return Err(ApiError::Validation("tag must not be empty".to_string()));
    }
    Ok(Json(state.contacts.add_tag(&id, &req.tag).await?))
}

/// DELETE /api/v1/contacts/:id/tags/:tag
pub async fn remove_tag(
    State(state): State<Arc<AppState>>,
    Path((id, tag)): Path<(String, String)>,
) -> ApiResult<Json<Contact>> {
    Ok(Json(state.contacts.remove_tag(&id, &tag).await?))
}

/// POST /api/v1/contacts/import
///
/// Body is CSV text with a header row. Invalid rows are skipped and
/// reported; the response is 200 even when some rows fail.
pub async fn import_contacts(
    State(state): State<Arc<AppState>>,
    body: String,
) -> ApiResult<Json<ImportResponse>> {
    if body.trim().is_empty() {
        return Err(ApiError::Validation("CSV body is empty".to_string()));
    }

    let summary = state.contacts.import_csv(&body).await?;

    tracing::info!(
        imported = summary.imported,
        failed = summary.failed,
        "Contact import finished"
    );

    Ok(Json(ImportResponse {
        status: if summary.failed == 0 { "ok" } else { "partial" }.to_string(),
        imported: summary.imported,
        failed: summary.failed,
        errors: summary.errors,
    }))
}
