//! Row sources for report execution
//!
//! A report runs against whatever rows its entity resolves to:
//! - `SampleDataSource`: the built-in sample rows for every entity
//! - `StoreDataSource`: contacts from the store, sample rows for the rest

use crate::report::error::{ReportError, ReportResult};
use crate::report::sample;
use crate::schema;
use crate::store::{Record, Store};
use async_trait::async_trait;
use std::sync::Arc;

/// Common trait for all row sources
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Short name for logging
    fn name(&self) -> &str;

    /// Every row of an entity, unfiltered
    async fn rows(&self, entity: &str) -> ReportResult<Vec<Record>>;
}

fn known(entity: &str) -> ReportResult<()> {
    if schema::entity(entity).is_some() {
        Ok(())
    } else {
        Err(ReportError::UnknownEntity(entity.to_string()))
    }
}

/// Serves the built-in sample rows
#[derive(Debug, Default, Clone, Copy)]
pub struct SampleDataSource;

#[async_trait]
impl DataSource for SampleDataSource {
    fn name(&self) -> &str {
        "sample"
    }

    async fn rows(&self, entity: &str) -> ReportResult<Vec<Record>> {
        known(entity)?;
        Ok(sample::sample_rows(entity))
    }
}

/// Serves stored contacts; deals and tasks come from the sample set
#[derive(Debug, Clone)]
pub struct StoreDataSource {
    store: Arc<Store>,
}

impl StoreDataSource {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DataSource for StoreDataSource {
    fn name(&self) -> &str {
        "store"
    }

    async fn rows(&self, entity: &str) -> ReportResult<Vec<Record>> {
        known(entity)?;

        if entity != "contacts" {
            return Ok(sample::sample_rows(entity));
        }

        let contacts = self.store.contacts().all().await;
        if contacts.is_empty() {
            tracing::debug!("Contact store is empty, using sample contacts");
            return Ok(sample::sample_contacts());
        }

        Ok(contacts.iter().map(|c| c.to_record()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Contact, ContactDraft, Fields, StoreConfig, Value};
    use chrono::Utc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_sample_source() {
        let source = SampleDataSource;
        assert_eq!(source.rows("deals").await.unwrap().len(), 4);
        assert!(matches!(
            source.rows("invoices").await,
            Err(ReportError::UnknownEntity(_))
        ));
    }

    #[tokio::test]
    async fn test_store_source_falls_back_to_samples() {
        let dir = tempdir().unwrap();
        let store = Arc::new(Store::open(StoreConfig::new(dir.path())).await.unwrap());
        let source = StoreDataSource::new(Arc::clone(&store));

        let rows = source.rows("contacts").await.unwrap();
        assert_eq!(rows.len(), 4);

        let contact = Contact::from_draft(
            ContactDraft::new("Ada", "Lovelace", "ada@example.com", "Analytical"),
            Utc::now(),
        );
        store.contacts().insert(contact).await.unwrap();

        let rows = source.rows("contacts").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].field("name"), Value::from("Ada Lovelace"));

        assert_eq!(source.rows("tasks").await.unwrap().len(), 4);
    }
}
