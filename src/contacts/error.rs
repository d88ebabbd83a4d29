//! Contact error types

use crate::store::{FieldErrors, StoreError};
use thiserror::Error;

/// Errors that can occur in contact operations
#[derive(Error, Debug)]
pub enum ContactError {
    /// Contact failed validation; messages keyed by field id
    #[error("Invalid contact: {}", summarize(.0))]
    Invalid(FieldErrors),

    /// Contact does not exist
    #[error("Contact not found: {0}")]
    NotFound(String),

    /// List query could not be understood
    #[error("Invalid query: {0}")]
    Query(String),

    /// CSV input could not be read
    #[error("Import error: {0}")]
    Import(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<csv::Error> for ContactError {
    fn from(err: csv::Error) -> Self {
        ContactError::Import(err.to_string())
    }
}

fn summarize(errors: &FieldErrors) -> String {
    errors.values().cloned().collect::<Vec<_>>().join("; ")
}

/// Result type for contact operations
pub type ContactResult<T> = Result<T, ContactError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let mut errors = FieldErrors::new();
        errors.insert("email".to_string(), "Invalid email address".to_string());
        assert_eq!(
            ContactError::Invalid(errors).to_string(),
            "Invalid contact: Invalid email address"
        );
        assert_eq!(
            ContactError::NotFound("42".to_string()).to_string(),
            "Contact not found: 42"
        );
    }
}
