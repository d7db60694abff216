//! Snapshot persistence and import for tillbook
//!
//! The core never touches the filesystem; this crate loads and saves whole
//! snapshots and turns CSV exports into raw import rows.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod sales_csv;
pub mod error;

pub use sales_csv::{normalise_header_name, parse_dmy_to_iso, ImportedSaleRow, ImportedSales, SalesCsvParser};
pub use error::StoreError;

// ==================== Store Trait ====================

/// Store reference type
pub type StoreRef<T> = Arc<dyn SnapshotStore<T>>;

/// Trait for snapshot stores
#[async_trait]
pub trait SnapshotStore<T>: Send + Sync
where
    T: Serialize + DeserializeOwned + Default + Send + Sync,
{
    /// Load the snapshot, or an empty one when nothing has been saved yet
    async fn load(&self) -> Result<T, StoreError>;

    /// Replace the stored snapshot
    async fn save(&self, snapshot: &T) -> Result<(), StoreError>;
}

/// JSON file store
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl<T> SnapshotStore<T> for JsonSnapshotStore
where
    T: Serialize + DeserializeOwned + Default + Send + Sync,
{
    async fn load(&self) -> Result<T, StoreError> {
        if !tokio::fs::try_exists(&self.path).await? {
            log::info!("No snapshot at {}, starting empty", self.path.display());
            return Ok(T::default());
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        let snapshot = serde_json::from_str(&content)?;
        log::debug!("Loaded snapshot from {}", self.path.display());
        Ok(snapshot)
    }

    async fn save(&self, snapshot: &T) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Write beside the target first so a failed write leaves the old snapshot intact
        let content = serde_json::to_string_pretty(snapshot)?;
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, content).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        log::debug!("Saved snapshot to {}", self.path.display());
        Ok(())
    }
}

/// Read and parse a sales CSV file
pub async fn read_sales_csv(path: &Path) -> Result<ImportedSales, StoreError> {
    let content = tokio::fs::read_to_string(path).await?;
    SalesCsvParser::parse(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        value: u32,
        label: String,
    }

    #[tokio::test]
    async fn test_missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotStore::new(dir.path().join("absent.json"));
        let loaded: Counter = store.load().await.unwrap();
        assert_eq!(loaded, Counter::default());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotStore::new(dir.path().join("nested").join("books.json"));
        let snapshot = Counter {
            value: 7,
            label: "till".to_string(),
        };

        store.save(&snapshot).await.unwrap();
        let loaded: Counter = store.load().await.unwrap();
        assert_eq!(loaded, snapshot);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let store = JsonSnapshotStore::new(path);
        let result: Result<Counter, StoreError> = store.load().await;
        assert!(matches!(result, Err(StoreError::JsonError(_))));
    }

    #[tokio::test]
    async fn test_missing_import_file_names_the_cause() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_sales_csv(&dir.path().join("absent.csv")).await.unwrap_err();
        assert!(matches!(err, StoreError::IoError(_)));
        let message = err.to_string();
        assert!(message.starts_with("IO error: "));
        assert!(message.len() > "IO error: ".len());
    }

    #[tokio::test]
    async fn test_read_sales_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        tokio::fs::write(&path, "name;product;total\nAna;Chair;10\n").await.unwrap();

        let imported = read_sales_csv(&path).await.unwrap();
        assert_eq!(imported.rows.len(), 1);
        assert_eq!(imported.rows[0].product, "Chair");
    }
}
