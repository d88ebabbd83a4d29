//! API Routes
//!
//! Route handlers organized by functionality.

pub mod contacts;
pub mod dashboard;
pub mod health;
pub mod reports;
pub mod schema;
pub mod templates;
