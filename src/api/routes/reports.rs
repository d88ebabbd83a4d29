//! Report Routes
//!
//! - GET /api/v1/reports - List saved reports (`?search=`)
//! - POST /api/v1/reports - Save a new report
//! - POST /api/v1/reports/preview - Run an unsaved definition
//! - GET /api/v1/reports/:id - Get a saved report
//! - PUT /api/v1/reports/:id - Update a saved report
//! - DELETE /api/v1/reports/:id - Delete a saved report
//! - POST /api/v1/reports/:id/run - Run a saved report
//! - GET /api/v1/reports/:id/export - Run a saved report and download CSV

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{PreviewRequest, ReportListParams, ReportListResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::report::{parse_filter_expression, ReportDefinition, ReportRun};

/// GET /api/v1/reports
pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportListParams>,
) -> Json<ReportListResponse> {
    let reports = state.reports.list(params.search.as_deref()).await;

    Json(ReportListResponse {
        total: reports.len(),
        reports,
    })
}

/// POST /api/v1/reports
pub async fn create_report(
    State(state): State<Arc<AppState>>,
    Json(definition): Json<ReportDefinition>,
) -> ApiResult<(StatusCode, Json<ReportDefinition>)> {
    let saved = state.reports.create(definition).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// GET /api/v1/reports/:id
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ReportDefinition>> {
    Ok(Json(state.reports.get(&id).await?))
}

/// PUT /api/v1/reports/:id
pub async fn update_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(definition): Json<ReportDefinition>,
) -> ApiResult<Json<ReportDefinition>> {
    Ok(Json(state.reports.update(&id, definition).await?))
}

/// DELETE /api/v1/reports/:id
pub async fn delete_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.reports.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/reports/:id/run
pub async fn run_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ReportRun>> {
    let run = state.reports.run(&id).await?;

    tracing::info!(
        report_id = %id,
        rows = run.len(),
        execution_time_ms = run.execution_time_ms,
        "Report run"
    );

    Ok(Json(run))
}

/// POST /api/v1/reports/preview
///
/// Accepts a report definition, optionally with a `filterExpression`
/// (e.g. `stage != 'Closed Lost' AND amount > 10000`) whose clauses are
/// appended to the definition's filters.
pub async fn preview_report(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PreviewRequest>,
) -> ApiResult<Json<ReportRun>> {
    let mut definition = req.definition;
    if let Some(expr) = req.filter_expression.as_deref() {
        definition.filters.extend(parse_filter_expression(expr)?);
    }

    Ok(Json(state.reports.preview(&definition).await?))
}

/// GET /api/v1/reports/:id/export
pub async fn export_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let (definition, csv) = state.reports.export_csv(&id).await?;

    let disposition = format!("attachment; filename=\"{}.csv\"", file_stem(&definition.name));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

/// Report name reduced to a safe download file name
fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if stem.is_empty() {
        "report".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("Sales Pipeline (Copy)"), "sales-pipeline-copy");
        assert_eq!(file_stem("***"), "report");
    }
}
