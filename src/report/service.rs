//! Saved report management
//!
//! CRUD over the report collection, plus running saved reports. A run stamps
//! `lastRun` on the stored definition.

use crate::report::ast::ReportDefinition;
use crate::report::datasource::StoreDataSource;
use crate::report::error::{ReportError, ReportResult};
use crate::report::evaluator::EvalContext;
use crate::report::executor::{ReportExecutor, ReportRun};
use crate::store::{Store, StoreError};
use chrono::Utc;
use std::sync::Arc;

/// Saved report operations
#[derive(Clone)]
pub struct ReportService {
    store: Arc<Store>,
    executor: ReportExecutor,
}

impl ReportService {
    /// Service whose reports read contacts from the same store
    pub fn new(store: Arc<Store>) -> Self {
        let executor = ReportExecutor::new(Arc::new(StoreDataSource::new(Arc::clone(&store))));
        Self { store, executor }
    }

    pub fn with_executor(store: Arc<Store>, executor: ReportExecutor) -> Self {
        Self { store, executor }
    }

    pub fn executor(&self) -> &ReportExecutor {
        &self.executor
    }

    fn not_found(id: &str, err: StoreError) -> ReportError {
        match err {
            StoreError::NotFound(_) => ReportError::NotFound(id.to_string()),
            other => ReportError::Store(other),
        }
    }

    /// Saved reports, optionally narrowed by a case-insensitive search
    /// over name and description
    pub async fn list(&self, search: Option<&str>) -> Vec<ReportDefinition> {
        let reports = self.store.reports().all().await;
        let term = match search.map(|s| s.trim().to_lowercase()) {
            Some(term) if !term.is_empty() => term,
            _ => return reports,
        };

        reports
            .into_iter()
            .filter(|r| {
                r.name.to_lowercase().contains(&term)
                    || r.description.to_lowercase().contains(&term)
            })
            .collect()
    }

    pub async fn get(&self, id: &str) -> ReportResult<ReportDefinition> {
        self.store
            .reports()
            .get(id)
            .await
            .ok_or_else(|| ReportError::NotFound(id.to_string()))
    }

    /// Validate and save a new report
    pub async fn create(&self, definition: ReportDefinition) -> ReportResult<ReportDefinition> {
        let mut definition = definition.normalized();
        definition.validate()?;

        definition.id = uuid::Uuid::new_v4().to_string();
        definition.created_at = Some(Utc::now());
        definition.modified_at = None;
        definition.last_run = None;

        let saved = self.store.reports().insert(definition).await?;
        tracing::info!("Created report {} ({})", saved.id, saved.name);
        Ok(saved)
    }

    /// Replace a saved report's definition, keeping its id and history
    pub async fn update(
        &self,
        id: &str,
        definition: ReportDefinition,
    ) -> ReportResult<ReportDefinition> {
        let definition = definition.normalized();
        definition.validate()?;

        let now = Utc::now();
        let updated = self
            .store
            .reports()
            .update(id, |existing| {
                *existing = ReportDefinition {
                    id: existing.id.clone(),
                    created_at: existing.created_at,
                    last_run: existing.last_run,
                    modified_at: Some(now),
                    ..definition
                };
            })
            .await
            .map_err(|e| Self::not_found(id, e))?;

        tracing::info!("Updated report {}", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> ReportResult<ReportDefinition> {
        let removed = self
            .store
            .reports()
            .remove(id)
            .await
            .map_err(|e| Self::not_found(id, e))?;

        tracing::info!("Deleted report {}", id);
        Ok(removed)
    }

    /// Run a saved report and stamp `lastRun`
    pub async fn run(&self, id: &str) -> ReportResult<ReportRun> {
        self.run_at(id, &EvalContext::default()).await
    }

    pub async fn run_at(&self, id: &str, ctx: &EvalContext) -> ReportResult<ReportRun> {
        let definition = self.get(id).await?;
        let run = self.executor.run_at(&definition, ctx).await?;

        self.store
            .reports()
            .update(id, |r| r.last_run = Some(run.ran_at))
            .await
            .map_err(|e| Self::not_found(id, e))?;

        Ok(run)
    }

    /// Run an unsaved definition
    pub async fn preview(&self, definition: &ReportDefinition) -> ReportResult<ReportRun> {
        let definition = definition.clone().normalized();
        self.executor.run(&definition).await
    }

    /// Run a saved report and render its rows as CSV
    pub async fn export_csv(&self, id: &str) -> ReportResult<(ReportDefinition, String)> {
        let run = self.run(id).await?;
        let definition = self.get(id).await?;
        Ok((definition, run.to_csv()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ast::{ChartType, FilterClause, Operator};
    use crate::store::StoreConfig;
    use chrono::TimeZone;
    use tempfile::tempdir;

    async fn create_test_service() -> (ReportService, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = Arc::new(Store::open(StoreConfig::new(dir.path())).await.unwrap());
        (ReportService::new(store), dir)
    }

    fn pipeline() -> ReportDefinition {
        ReportDefinition::builder("Sales Pipeline")
            .description("Open deals by stage")
            .entity("deals")
            .fields(&["stage", "amount"])
            .chart(ChartType::Bar)
            .filter(FilterClause::new("stage", Operator::NotEquals, "Closed Lost"))
            .build()
    }

    #[tokio::test]
    async fn test_create_assigns_identity() {
        let (service, _dir) = create_test_service().await;
        let saved = service.create(pipeline()).await.unwrap();

        assert!(!saved.id.is_empty());
        assert!(saved.created_at.is_some());
        assert!(saved.last_run.is_none());
        assert_eq!(service.get(&saved.id).await.unwrap(), saved);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid() {
        let (service, _dir) = create_test_service().await;
        let err = service
            .create(ReportDefinition::builder("").entity("deals").build())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Invalid(_)));
        assert!(service.list(None).await.is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_history() {
        let (service, _dir) = create_test_service().await;
        let saved = service.create(pipeline()).await.unwrap();

        let mut edited = pipeline();
        edited.name = "Pipeline (edited)".to_string();
        edited.chart_type = ChartType::Table;

        let updated = service.update(&saved.id, edited).await.unwrap();
        assert_eq!(updated.id, saved.id);
        assert_eq!(updated.created_at, saved.created_at);
        assert_eq!(updated.kind, crate::report::ReportKind::Table);
        assert!(updated.modified_at.is_some());

        assert!(matches!(
            service.update("missing", pipeline()).await,
            Err(ReportError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_search() {
        let (service, _dir) = create_test_service().await;
        service.create(pipeline()).await.unwrap();
        service
            .create(
                ReportDefinition::builder("Contact Status")
                    .entity("contacts")
                    .fields(&["status"])
                    .build(),
            )
            .await
            .unwrap();

        assert_eq!(service.list(None).await.len(), 2);
        assert_eq!(service.list(Some("STAGE")).await.len(), 1);
        assert_eq!(service.list(Some("status")).await.len(), 1);
        assert_eq!(service.list(Some("  ")).await.len(), 2);
        assert!(service.list(Some("forecast")).await.is_empty());
    }

    #[tokio::test]
    async fn test_run_stamps_last_run() {
        let (service, _dir) = create_test_service().await;
        let saved = service.create(pipeline()).await.unwrap();

        let ctx = EvalContext::new(Utc.with_ymd_and_hms(2023, 9, 20, 8, 45, 0).unwrap());
        let run = service.run_at(&saved.id, &ctx).await.unwrap();
        assert_eq!(run.len(), 4);

        let stored = service.get(&saved.id).await.unwrap();
        assert_eq!(stored.last_run, Some(ctx.now));
    }

    #[tokio::test]
    async fn test_delete_and_export() {
        let (service, _dir) = create_test_service().await;
        let saved = service.create(pipeline()).await.unwrap();

        let (_, csv) = service.export_csv(&saved.id).await.unwrap();
        assert!(csv.starts_with("Stage,Amount\n"));

        service.delete(&saved.id).await.unwrap();
        assert!(matches!(
            service.delete(&saved.id).await,
            Err(ReportError::NotFound(_))
        ));
    }
}
