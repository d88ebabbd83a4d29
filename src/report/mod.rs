//! Prospect Report Engine
//!
//! Ad-hoc reports over CRM entities:
//!
//! - **AST**: Report definitions, filter clauses, operators, chart types
//! - **Parser**: Compact filter expressions (`status = 'Customer' AND ...`)
//! - **Evaluator**: Filter predicates, text search, date presets, sorting
//! - **Visualize**: Table and chart shaping
//! - **Executor**: Validate → load → filter → shape
//! - **Service**: Saved report CRUD and runs
//! - **Templates**: Built-in starting points
//!
//! # Examples
//!
//! ```rust,ignore
//! use prospect::report::{parse_filter_expression, ReportDefinition, ChartType};
//!
//! let mut report = ReportDefinition::builder("VIP customers")
//!     .entity("contacts")
//!     .fields(&["company"])
//!     .chart(ChartType::Bar)
//!     .build();
//! report.filters = parse_filter_expression("status = 'Customer' AND tags contains 'VIP'")?;
//!
//! let run = executor.run(&report).await?;
//! ```

mod ast;
mod datasource;
mod error;
pub mod evaluator;
mod executor;
mod parser;
pub mod sample;
mod service;
pub mod templates;
pub mod visualize;

pub use ast::{ChartType, FilterClause, Operator, ReportBuilder, ReportDefinition, ReportKind};
pub use datasource::{DataSource, SampleDataSource, StoreDataSource};
pub use error::{ReportError, ReportResult};
pub use evaluator::{DateRangePreset, EvalContext, SortDirection};
pub use executor::{ReportExecutor, ReportRun};
pub use parser::parse_filter_expression;
pub use service::ReportService;
pub use visualize::{ChartSeries, ChartView, Column, NamedSeries, TableView, Visualization};
