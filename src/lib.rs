//! # Prospect
//!
//! CRM contacts, dashboard widgets and an ad-hoc report builder that renders
//! previews as tables or chart-ready series.
//!
//! ## Modules
//!
//! - [`store`]: JSON-file backed collections for contacts and saved reports
//! - [`schema`]: Entity catalog, field types and operator compatibility
//! - [`report`]: Report definitions, filter evaluation, visualization shaping
//! - [`contacts`]: Contact validation, CRUD, search and CSV import
//! - [`dashboard`]: Summary widgets computed from the stores
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use prospect::report::{ChartType, FilterClause, Operator, ReportDefinition, ReportExecutor, SampleDataSource};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let executor = ReportExecutor::new(Arc::new(SampleDataSource));
//!
//!     let report = ReportDefinition::builder("Open deals by stage")
//!         .entity("deals")
//!         .fields(&["stage"])
//!         .chart(ChartType::Bar)
//!         .filter(FilterClause::new("stage", Operator::NotEquals, "Closed Lost"))
//!         .build();
//!
//!     let run = executor.run(&report).await?;
//!     println!("{} rows matched", run.rows.len());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod contacts;
pub mod dashboard;
pub mod report;
pub mod schema;
pub mod store;

// Re-export top-level types for convenience
pub use store::{
    Collection, Contact, ContactDraft, ContactStatus, FieldErrors, Fields, Record, Store,
    StoreConfig, StoreError, StoreResult, StoreStats, Value,
};

pub use schema::{EntityDef, FieldDef, FieldType};

pub use report::{
    parse_filter_expression, ChartType, DataSource, EvalContext, FilterClause, Operator,
    ReportDefinition, ReportError, ReportExecutor, ReportKind, ReportResult, ReportRun,
    ReportService, SampleDataSource, StoreDataSource, Visualization,
};

pub use contacts::{ContactError, ContactQuery, ContactResult, ContactService};

pub use dashboard::DashboardSummary;

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{Config, ConfigError, LoggingConfig};
