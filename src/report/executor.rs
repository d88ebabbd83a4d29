//! Report Executor
//!
//! Runs a report definition against a [`DataSource`]:
//! 1. Validate the definition against the entity catalog
//! 2. Load every row of the entity
//! 3. Keep rows matching all filter clauses
//! 4. Shape the result into a table or chart
//!
//! # Execution Pipeline
//!
//! ```text
//! Definition → Validate → Load rows → Filter → Shape → ReportRun
//! ```

use crate::report::ast::ReportDefinition;
use crate::report::datasource::DataSource;
use crate::report::error::{ReportError, ReportResult};
use crate::report::evaluator::{apply_filters, EvalContext};
use crate::report::visualize::{self, Visualization};
use crate::store::{Fields, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Result of running a report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRun {
    pub entity: String,
    /// Selected fields, in display order
    pub fields: Vec<String>,
    /// Matching rows
    pub rows: Vec<Record>,
    /// Rows loaded before filtering
    pub rows_scanned: usize,
    pub visualization: Visualization,
    pub execution_time_ms: u64,
    pub ran_at: DateTime<Utc>,
}

impl ReportRun {
    /// Get the number of matching rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Matching rows as CSV: field labels as header, formatted cells
    pub fn to_csv(&self) -> ReportResult<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let table = visualize::table(&self.rows, &self.fields, &self.entity);
        writer.write_record(table.columns.iter().map(|c| c.label.as_str()))?;
        for row in &table.rows {
            writer.write_record(row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ReportError::Export(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| ReportError::Export(e.to_string()))
    }
}

/// Report executor
#[derive(Clone)]
pub struct ReportExecutor {
    source: Arc<dyn DataSource>,
}

impl ReportExecutor {
    /// Create a new executor over a row source
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self { source }
    }

    /// Run a definition with the current time as "now"
    pub async fn run(&self, definition: &ReportDefinition) -> ReportResult<ReportRun> {
        self.run_at(definition, &EvalContext::default()).await
    }

    /// Run a definition with an explicit evaluation context
    pub async fn run_at(
        &self,
        definition: &ReportDefinition,
        ctx: &EvalContext,
    ) -> ReportResult<ReportRun> {
        let start = Instant::now();
        let entity = definition.validate_preview()?;

        let rows = self.source.rows(entity.id).await?;
        let rows_scanned = rows.len();

        let rows = apply_filters(rows, &definition.filters, ctx);
        let visualization =
            visualize::shape(&rows, &definition.fields, entity.id, definition.chart_type);

        tracing::debug!(
            "Report '{}' on {} via {}: {} of {} rows matched",
            definition.name,
            entity.id,
            self.source.name(),
            rows.len(),
            rows_scanned
        );

        Ok(ReportRun {
            entity: entity.id.to_string(),
            fields: definition.fields.clone(),
            rows: project(rows, &definition.fields),
            rows_scanned,
            visualization,
            execution_time_ms: start.elapsed().as_millis() as u64,
            ran_at: ctx.now,
        })
    }
}

/// Keep only the selected fields (plus `id`) of each row
fn project(rows: Vec<Record>, fields: &[String]) -> Vec<Record> {
    rows.into_iter()
        .map(|row| {
            let mut out = Record::new();
            if !row.get("id").is_null() {
                out.set("id", row.field("id"));
            }
            for field in fields {
                out.set(field.clone(), row.field(field));
            }
            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ast::{ChartType, FilterClause, Operator};
    use crate::report::datasource::SampleDataSource;
    use crate::report::visualize::ChartSeries;
    use crate::store::Value;
    use chrono::TimeZone;

    fn create_test_executor() -> ReportExecutor {
        ReportExecutor::new(Arc::new(SampleDataSource))
    }

    fn ctx() -> EvalContext {
        EvalContext::new(Utc.with_ymd_and_hms(2023, 9, 15, 12, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_filtered_table() {
        let executor = create_test_executor();
        let report = ReportDefinition::builder("High Value Deals")
            .entity("deals")
            .fields(&["name", "amount"])
            .filter(FilterClause::new("amount", Operator::GreaterThan, "10000"))
            .build();

        let run = executor.run_at(&report, &ctx()).await.unwrap();
        assert_eq!(run.rows_scanned, 4);
        assert_eq!(run.len(), 2);
        assert_eq!(run.rows[0].get("name"), &Value::from("Enterprise Software License"));
        assert!(run.rows[0].get("stage").is_null());
        assert_eq!(run.ran_at, ctx().now);

        let Visualization::Table(table) = run.visualization else {
            panic!("expected table");
        };
        assert_eq!(table.rows[1], vec!["Hardware Upgrade", "12000"]);
    }

    #[tokio::test]
    async fn test_chart_counts() {
        let executor = create_test_executor();
        let report = ReportDefinition::builder("Contact Status Report")
            .entity("contacts")
            .fields(&["status"])
            .chart(ChartType::Pie)
            .build();

        let run = executor.run_at(&report, &ctx()).await.unwrap();
        let Visualization::Chart(chart) = run.visualization else {
            panic!("expected chart");
        };
        assert_eq!(chart.categories, vec!["Customer", "Lead", "Partner"]);
        assert_eq!(chart.series, ChartSeries::Flat(vec![2.0, 1.0, 1.0]));
    }

    #[tokio::test]
    async fn test_relative_date_filter_uses_context() {
        let executor = create_test_executor();
        let report = ReportDefinition::builder("Recent Contact Activity")
            .entity("contacts")
            .fields(&["firstName", "lastActivity"])
            .filter(FilterClause::new("lastActivity", Operator::InTheLast, "8"))
            .build();

        let run = executor.run_at(&report, &ctx()).await.unwrap();
        // 09-08, 09-10 and 09-12 fall within 8 days of 09-15 12:00; 09-05 does not
        assert_eq!(run.len(), 3);
    }

    #[tokio::test]
    async fn test_no_matches_is_empty_visualization() {
        let executor = create_test_executor();
        let report = ReportDefinition::builder("Nothing")
            .entity("tasks")
            .fields(&["title"])
            .filter(FilterClause::new("priority", Operator::Equals, "Urgent"))
            .build();

        let run = executor.run_at(&report, &ctx()).await.unwrap();
        assert!(run.is_empty());
        assert!(run.visualization.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_definition() {
        let executor = create_test_executor();
        let report = ReportDefinition::builder("x").entity("deals").build();
        assert!(matches!(
            executor.run(&report).await,
            Err(ReportError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_to_csv() {
        let executor = create_test_executor();
        let report = ReportDefinition::builder("Overdue")
            .entity("tasks")
            .fields(&["title", "dueDate", "completedAt"])
            .filter(FilterClause::new("status", Operator::Equals, "Completed"))
            .build();

        let run = executor.run_at(&report, &ctx()).await.unwrap();
        let csv = run.to_csv().unwrap();
        assert_eq!(
            csv,
            "Task Title,Due Date,Completed Date\nSend invoice,2023-09-10 00:00,2023-09-09T15:00:00Z\n"
        );
    }
}
