//! Prospect Record Store
//!
//! Persistence for the two record kinds the application owns:
//!
//! - **types**: Core data structures (Value, Record, Contact)
//! - **collection**: A keyed, JSON-file backed collection guarded by an async RwLock
//! - **engine**: The store that owns the contact and report collections
//! - **error**: Error types
//!
//! # Layout
//!
//! ```text
//! <data_dir>/
//!   contacts.json   - array of contacts
//!   reports.json    - array of saved report definitions
//! ```
//!
//! Every mutation rewrites the collection file through a temp file and a
//! rename, so a crash leaves either the old or the new snapshot on disk.

pub mod collection;
pub mod engine;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use collection::{Collection, Keyed};
pub use engine::{Store, StoreConfig, StoreStats};
pub use error::{StoreError, StoreResult};
pub use types::{Contact, ContactDraft, ContactStatus, FieldErrors, Fields, Record, Value};
