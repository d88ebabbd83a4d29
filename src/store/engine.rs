//! Prospect Store
//!
//! Owns the contact and saved-report collections under one data directory.
//! Shared between API handlers through `Arc<Store>`.

use crate::report::ReportDefinition;
use crate::store::collection::{Collection, Keyed};
use crate::store::error::StoreResult;
use crate::store::types::Contact;
use std::path::{Path, PathBuf};

/// Configuration for the store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Root directory for all data
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("prospect_data"),
        }
    }
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Get path to the contacts file
    pub fn contacts_path(&self) -> PathBuf {
        self.data_dir.join("contacts.json")
    }

    /// Get path to the saved reports file
    pub fn reports_path(&self) -> PathBuf {
        self.data_dir.join("reports.json")
    }
}

impl Keyed for Contact {
    fn key(&self) -> &str {
        &self.id
    }
}

/// The record store
#[derive(Debug)]
pub struct Store {
    config: StoreConfig,
    contacts: Collection<Contact>,
    reports: Collection<ReportDefinition>,
}

impl Store {
    /// Open (or create) a store rooted at `config.data_dir`
    pub async fn open(config: StoreConfig) -> StoreResult<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        let contacts = Collection::open("contact", config.contacts_path())?;
        let reports = Collection::open("report", config.reports_path())?;

        tracing::info!(
            "Opened store at {:?} ({} contacts, {} reports)",
            config.data_dir,
            contacts.len().await,
            reports.len().await
        );

        Ok(Self {
            config,
            contacts,
            reports,
        })
    }

    pub fn contacts(&self) -> &Collection<Contact> {
        &self.contacts
    }

    pub fn reports(&self) -> &Collection<ReportDefinition> {
        &self.reports
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get store statistics
    pub async fn stats(&self) -> StoreStats {
        let storage_size_bytes = [self.contacts.path(), self.reports.path()]
            .iter()
            .filter_map(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
            .sum();

        StoreStats {
            contact_count: self.contacts.len().await,
            report_count: self.reports.len().await,
            storage_size_bytes,
        }
    }
}

/// Store statistics
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub contact_count: usize,
    pub report_count: usize,
    pub storage_size_bytes: u64,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Contacts: {}, Reports: {}, Size: {:.2} KB",
            self.contact_count,
            self.report_count,
            self.storage_size_bytes as f64 / 1024.0
        )
    }
}
