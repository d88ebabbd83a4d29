//! Prospect Contacts
//!
//! Contact management on top of the record store:
//!
//! - **validation**: Required fields and email format
//! - **csv_import**: Header-mapped CSV parsing with per-row errors
//! - **service**: CRUD, list queries, tags and bulk import
//! - **error**: Error types
//!
//! # Examples
//!
//! ```rust,ignore
//! use prospect::contacts::{ContactQuery, ContactService};
//! use prospect::store::{ContactDraft, ContactStatus};
//!
//! let contacts = ContactService::new(store);
//! contacts
//!     .create(ContactDraft::new("John", "Smith", "john@example.com", "Acme Inc."))
//!     .await?;
//!
//! let customers = contacts
//!     .list(&ContactQuery::new().status(ContactStatus::Customer).search("acme"))
//!     .await?;
//! ```

mod csv_import;
mod error;
mod service;
mod validation;

pub use csv_import::{parse_contacts_csv, ParsedImport, RowError};
pub use error::{ContactError, ContactResult};
pub use service::{ContactQuery, ContactService, ImportSummary, SEARCH_FIELDS};
pub use validation::{is_valid_email, validate_contact};
