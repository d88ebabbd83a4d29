//! Report error types
//!
//! Defines all error conditions that can occur while validating, parsing,
//! running and exporting reports.

use crate::store::{FieldErrors, StoreError};
use thiserror::Error;

/// Errors that can occur during report operations
#[derive(Error, Debug)]
pub enum ReportError {
    /// Definition failed form validation; messages keyed by form field
    #[error("Invalid report: {}", summarize(.0))]
    Invalid(FieldErrors),

    /// Entity is not in the catalog
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    /// Field is not defined on the entity
    #[error("Unknown field '{field}' on {entity}")]
    UnknownField { entity: String, field: String },

    /// Operator cannot be applied to the field's type
    #[error("Operator '{operator}' cannot be used with {field_type} field '{field}'")]
    IncompatibleOperator {
        field: String,
        operator: String,
        field_type: String,
    },

    /// Filter value has the wrong shape for its operator
    #[error("Invalid value for '{field}': {reason}")]
    InvalidFilterValue { field: String, reason: String },

    /// Filter expression parsing failed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Saved report does not exist
    #[error("Report not found: {0}")]
    NotFound(String),

    /// Built-in template does not exist
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// CSV export failed
    #[error("Export error: {0}")]
    Export(String),
}

impl From<csv::Error> for ReportError {
    fn from(err: csv::Error) -> Self {
        ReportError::Export(err.to_string())
    }
}

fn summarize(errors: &FieldErrors) -> String {
    errors.values().cloned().collect::<Vec<_>>().join("; ")
}

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let mut errors = FieldErrors::new();
        errors.insert("name".to_string(), "Report name is required".to_string());
        errors.insert("fields".to_string(), "Select at least one field".to_string());
        let err = ReportError::Invalid(errors);
        assert_eq!(
            err.to_string(),
            "Invalid report: Select at least one field; Report name is required"
        );

        let err = ReportError::IncompatibleOperator {
            field: "tags".to_string(),
            operator: "greaterThan".to_string(),
            field_type: "array".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Operator 'greaterThan' cannot be used with array field 'tags'"
        );
    }

    #[test]
    fn test_store_error_conversion() {
        let err: ReportError = StoreError::NotFound("report 7".to_string()).into();
        assert!(matches!(err, ReportError::Store(_)));
    }
}
