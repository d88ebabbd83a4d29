//! Contact form validation

use crate::store::{ContactDraft, FieldErrors};
use regex::Regex;
use std::sync::OnceLock;

const EMAIL_PATTERN: &str = r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Check the required fields and the email format
///
/// Returns an empty map when the draft is valid.
pub fn validate_contact(draft: &ContactDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();

    let mut require = |key: &str, value: &str, message: &str| {
        if value.trim().is_empty() {
            errors.insert(key.to_string(), message.to_string());
        }
    };

    require("firstName", &draft.first_name, "First name is required");
    require("lastName", &draft.last_name, "Last name is required");
    require("email", &draft.email, "Email is required");
    require("company", &draft.company, "Company is required");

    let email = draft.email.trim();
    if !email.is_empty() && !is_valid_email(email) {
        errors.insert("email".to_string(), "Invalid email address".to_string());
    }

    errors
}
