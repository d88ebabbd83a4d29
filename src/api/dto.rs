//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::contacts::RowError;
use crate::report::ReportDefinition;
use crate::schema::EntityDef;
use crate::store::Contact;

// ============================================
// CONTACT DTOs
// ============================================

/// List contacts response
#[derive(Debug, Serialize)]
pub struct ContactListResponse {
    pub contacts: Vec<Contact>,
    pub total: usize,
}

/// CSV import response
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    /// "ok" or "partial"
    pub status: String,
    pub imported: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<RowError>,
}

/// Tag edit request
#[derive(Debug, Deserialize)]
pub struct TagRequest {
    pub tag: String,
}

// ============================================
// REPORT DTOs
// ============================================

/// Saved report list query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ReportListParams {
    #[serde(default)]
    pub search: Option<String>,
}

/// List reports response
#[derive(Debug, Serialize)]
pub struct ReportListResponse {
    pub reports: Vec<ReportDefinition>,
    pub total: usize,
}

/// Templates response
#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<ReportDefinition>,
}

/// Preview request: a definition plus an optional filter expression
/// that is parsed and appended to the definition's filters
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    #[serde(flatten)]
    pub definition: ReportDefinition,
    #[serde(default)]
    pub filter_expression: Option<String>,
}

// ============================================
// SCHEMA DTOs
// ============================================

/// Entity catalog response
#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub entities: &'static [EntityDef],
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, unhealthy
    pub status: String,
    /// Storage status
    pub storage: String,
    pub contacts: usize,
    pub reports: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
