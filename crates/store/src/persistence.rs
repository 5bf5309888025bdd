use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use listwise_core::domain::inventory::InventoryRow;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::StoreError;

/// Durable home of the inventory table. `persist` must not return until the
/// full table is stored, unparsed rows included.
#[async_trait]
pub trait InventoryPersistence: Send + Sync {
    async fn persist(&self, rows: &[InventoryRow]) -> Result<(), StoreError>;
}

/// Rewrites a JSON file by writing a sibling temp file, syncing it and
/// renaming it over the target, so readers never see a partial table.
#[derive(Clone, Debug)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "inventory.json".to_string());
        self.path.with_file_name(format!(".{name}.tmp"))
    }

    async fn write_temp(&self, temp: &Path, body: &[u8]) -> Result<(), StoreError> {
        let io_error = |source| StoreError::Io { path: temp.to_path_buf(), source };

        let mut file = fs::File::create(temp).await.map_err(io_error)?;
        file.write_all(body).await.map_err(io_error)?;
        file.sync_all().await.map_err(io_error)?;
        Ok(())
    }
}

#[async_trait]
impl InventoryPersistence for JsonFilePersistence {
    async fn persist(&self, rows: &[InventoryRow]) -> Result<(), StoreError> {
        let mut body = serde_json::to_vec_pretty(rows)?;
        body.push(b'\n');

        let temp = self.temp_path();
        if let Err(error) = self.write_temp(&temp, &body).await {
            let _ = fs::remove_file(&temp).await;
            return Err(error);
        }

        if let Err(source) = fs::rename(&temp, &self.path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StoreError::Io { path: self.path.clone(), source });
        }

        debug!(
            event_name = "inventory.persisted",
            path = %self.path.display(),
            rows = rows.len(),
            "inventory table replaced"
        );
        Ok(())
    }
}

/// Keeps every persisted table in memory. Can be told to fail, which
/// exercises rollback paths.
#[derive(Debug, Default)]
pub struct InMemoryPersistence {
    snapshots: Mutex<Vec<Vec<InventoryRow>>>,
    failing: AtomicBool,
}

impl InMemoryPersistence {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn snapshots(&self) -> Vec<Vec<InventoryRow>> {
        self.snapshots.lock().map(|snapshots| snapshots.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl InventoryPersistence for InMemoryPersistence {
    async fn persist(&self, rows: &[InventoryRow]) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Io {
                path: PathBuf::from("memory"),
                source: std::io::Error::other("persistence disabled"),
            });
        }

        if let Ok(mut snapshots) = self.snapshots.lock() {
            snapshots.push(rows.to_vec());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use listwise_core::domain::inventory::{InventoryRecord, InventoryRow};
    use serde_json::json;
    use tempfile::TempDir;

    use super::{InventoryPersistence, JsonFilePersistence};

    fn record(product: &str, stock: u32) -> InventoryRow {
        InventoryRow::Record(InventoryRecord::new("S001", product, stock, 2.5))
    }

    #[tokio::test]
    async fn json_file_is_replaced_without_leftover_temp_file() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("inventory.json");
        fs::write(&path, "[]").expect("seed file");
        let persistence = JsonFilePersistence::new(&path);

        persistence.persist(&[record("P1", 4), record("P2", 0)]).await.expect("persist");

        let raw = fs::read_to_string(&path).expect("read back");
        let stored: Vec<InventoryRecord> = serde_json::from_str(&raw).expect("parse back");
        assert_eq!(stored, vec![
            InventoryRecord::new("S001", "P1", 4, 2.5),
            InventoryRecord::new("S001", "P2", 0, 2.5),
        ]);

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .expect("list dir")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn missing_parent_directory_is_an_io_error() {
        let dir = TempDir::new().expect("tempdir");
        let persistence =
            JsonFilePersistence::new(dir.path().join("absent").join("inventory.json"));

        let error = persistence.persist(&[record("P1", 1)]).await.expect_err("should fail");

        assert!(error.to_string().contains("inventory file operation failed"));
    }

    #[tokio::test]
    async fn unparsed_rows_are_written_verbatim() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("inventory.json");
        let persistence = JsonFilePersistence::new(&path);
        let odd = json!({"store_id": "S001", "product_id": "P9", "current_stock": "lots"});

        persistence
            .persist(&[record("P1", 4), InventoryRow::Unparsed(odd.clone()), record("P2", 0)])
            .await
            .expect("persist");

        let raw = fs::read_to_string(&path).expect("read back");
        let stored: Vec<serde_json::Value> = serde_json::from_str(&raw).expect("parse back");
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[1], odd);
        assert_eq!(stored[2]["product_id"], "P2");
    }
}
