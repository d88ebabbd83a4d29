//! Template Routes
//!
//! - GET /api/v1/templates - Built-in report templates
//! - POST /api/v1/templates/:id/instantiate - Unsaved copy of a template

use axum::{extract::Path, Json};
use chrono::Utc;

use crate::api::dto::TemplateListResponse;
use crate::api::error::ApiResult;
use crate::report::{templates, ReportDefinition};

/// GET /api/v1/templates
pub async fn list_templates() -> Json<TemplateListResponse> {
    Json(TemplateListResponse {
        templates: templates::templates(Utc::now()),
    })
}

/// POST /api/v1/templates/:id/instantiate
///
/// Returns the copy without saving it; clients save it through
/// `POST /api/v1/reports` once edited.
pub async fn instantiate_template(Path(id): Path<String>) -> ApiResult<Json<ReportDefinition>> {
    let definition = templates::instantiate(&id, Utc::now())?;
    tracing::debug!(template_id = %id, "Instantiated template");
    Ok(Json(definition))
}
