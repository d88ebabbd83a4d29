//! Keyed JSON-file collection
//!
//! A `Collection<T>` holds every item of one kind in memory behind an async
//! RwLock and mirrors it to a single pretty-printed JSON array on disk.

use crate::store::error::{StoreError, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Items stored in a collection are addressed by a string key
pub trait Keyed {
    fn key(&self) -> &str;
}

/// An ordered, keyed collection persisted as one JSON file
#[derive(Debug)]
pub struct Collection<T> {
    kind: &'static str,
    path: PathBuf,
    items: RwLock<Vec<T>>,
}

impl<T> Collection<T>
where
    T: Keyed + Clone + Serialize + DeserializeOwned,
{
    /// Open a collection, loading existing items when the file exists
    pub fn open(kind: &'static str, path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let items = Self::load(&path)?;

        tracing::debug!("Loaded {} {} records from {:?}", items.len(), kind, path);

        Ok(Self {
            kind,
            path,
            items: RwLock::new(items),
        })
    }

    fn load(path: &Path) -> StoreResult<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    /// Write the snapshot to a sibling temp file, then rename over the target
    fn persist(&self, items: &[T]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(items)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn not_found(&self, key: &str) -> StoreError {
        StoreError::NotFound(format!("{} {}", self.kind, key))
    }

    /// Snapshot of every item in insertion order
    pub async fn all(&self) -> Vec<T> {
        self.items.read().await.clone()
    }

    pub async fn get(&self, key: &str) -> Option<T> {
        let items = self.items.read().await;
        items.iter().find(|item| item.key() == key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Append a new item
    pub async fn insert(&self, item: T) -> StoreResult<T> {
        if item.key().is_empty() {
            return Err(StoreError::MissingKey);
        }

        let mut items = self.items.write().await;
        if items.iter().any(|existing| existing.key() == item.key()) {
            return Err(StoreError::Duplicate(format!("{} {}", self.kind, item.key())));
        }

        items.push(item.clone());
        if let Err(e) = self.persist(&items) {
            items.pop();
            return Err(e);
        }

        Ok(item)
    }

    /// Append many items with a single write
    pub async fn insert_many(&self, batch: Vec<T>) -> StoreResult<usize> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut items = self.items.write().await;
        for item in &batch {
            if item.key().is_empty() {
                return Err(StoreError::MissingKey);
            }
            if items.iter().any(|existing| existing.key() == item.key()) {
                return Err(StoreError::Duplicate(format!("{} {}", self.kind, item.key())));
            }
        }

        let before = items.len();
        let count = batch.len();
        items.extend(batch);
        if let Err(e) = self.persist(&items) {
            items.truncate(before);
            return Err(e);
        }

        Ok(count)
    }

    /// Replace the item with the same key
    pub async fn replace(&self, item: T) -> StoreResult<T> {
        self.update(&item.key().to_string(), |existing| *existing = item.clone())
            .await
    }

    /// Mutate one item in place and persist the result
    pub async fn update<F>(&self, key: &str, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut T),
    {
        let mut items = self.items.write().await;
        let pos = items
            .iter()
            .position(|item| item.key() == key)
            .ok_or_else(|| self.not_found(key))?;

        let previous = items[pos].clone();
        f(&mut items[pos]);
        let updated = items[pos].clone();

        if let Err(e) = self.persist(&items) {
            items[pos] = previous;
            return Err(e);
        }

        Ok(updated)
    }

    /// Remove an item, returning it
    pub async fn remove(&self, key: &str) -> StoreResult<T> {
        let mut items = self.items.write().await;
        let pos = items
            .iter()
            .position(|item| item.key() == key)
            .ok_or_else(|| self.not_found(key))?;

        let removed = items.remove(pos);
        if let Err(e) = self.persist(&items) {
            items.insert(pos, removed);
            return Err(e);
        }

        Ok(removed)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
