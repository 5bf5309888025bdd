//! Serialized access to the one mutable table in the system.
//!
//! Readers share a lock. Every mutation takes the write lock, applies the
//! change, and persists the full table before the lock is released. A failed
//! persist restores the previous table.

use std::path::PathBuf;
use std::sync::Arc;

use listwise_core::domain::inventory::{InventoryRecord, InventoryTable, StoreId};
use listwise_core::domain::list::ListItem;
use listwise_core::domain::product::ProductId;
use serde::Serialize;
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{error, info, warn};

use crate::persistence::{InventoryPersistence, JsonFilePersistence};
use crate::StoreError;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FulfillmentReport {
    pub store_id: StoreId,
    pub updated: Vec<InventoryRecord>,
    pub skipped: Vec<ProductId>,
}

pub struct InventoryStore {
    table: RwLock<InventoryTable>,
    persistence: Arc<dyn InventoryPersistence>,
}

impl InventoryStore {
    pub fn new(table: InventoryTable, persistence: Arc<dyn InventoryPersistence>) -> Self {
        Self { table: RwLock::new(table), persistence }
    }

    pub fn with_json_file(table: InventoryTable, path: impl Into<PathBuf>) -> Self {
        Self::new(table, Arc::new(JsonFilePersistence::new(path)))
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, InventoryTable> {
        self.table.read().await
    }

    pub async fn snapshot(&self) -> InventoryTable {
        self.table.read().await.clone()
    }

    /// Decrements one record. `Ok(None)` when the pair is not stocked.
    pub async fn decrement(
        &self,
        store_id: &StoreId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Option<InventoryRecord>, StoreError> {
        let item = ListItem { product_id: product_id.clone(), quantity };
        let report = self.fulfill(store_id, std::slice::from_ref(&item)).await?;
        Ok(report.updated.into_iter().next())
    }

    /// Decrements every listed item at `store_id`, floors at zero, and
    /// returns only after the table is durably stored.
    pub async fn fulfill(
        &self,
        store_id: &StoreId,
        items: &[ListItem],
    ) -> Result<FulfillmentReport, StoreError> {
        let mut table = self.table.write().await;
        let previous = table.clone();

        let mut updated = Vec::with_capacity(items.len());
        let mut skipped = Vec::new();
        for item in items {
            match table.decrement(store_id, &item.product_id, item.quantity) {
                Some(record) => {
                    info!(
                        event_name = "inventory.stock_decremented",
                        store_id = %store_id,
                        product_id = %item.product_id,
                        quantity = item.quantity,
                        remaining = record.current_stock,
                        "stock decremented"
                    );
                    updated.push(record.clone());
                }
                None => {
                    warn!(
                        event_name = "inventory.record_missing",
                        store_id = %store_id,
                        product_id = %item.product_id,
                        "no inventory record to decrement"
                    );
                    skipped.push(item.product_id.clone());
                }
            }
        }

        if !updated.is_empty() {
            if let Err(persist_error) = self.persistence.persist(table.rows()).await {
                error!(
                    event_name = "inventory.persist_failed",
                    store_id = %store_id,
                    error = %persist_error,
                    "rolling back inventory change"
                );
                *table = previous;
                return Err(persist_error);
            }
        }

        Ok(FulfillmentReport { store_id: store_id.clone(), updated, skipped })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use listwise_core::catalog::{CatalogFiles, CatalogLoader};
    use listwise_core::domain::inventory::{InventoryRecord, InventoryRow, InventoryTable, StoreId};
    use listwise_core::domain::list::ListItem;
    use listwise_core::domain::product::ProductId;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    use super::InventoryStore;
    use crate::persistence::InMemoryPersistence;

    fn record(product: &str, stock: u32) -> InventoryRecord {
        InventoryRecord::new("S001", product, stock, 1.0)
    }

    fn table() -> InventoryTable {
        InventoryTable::new(vec![record("MILK", 10), record("EGGS", 2)])
    }

    #[tokio::test]
    async fn fulfillment_decrements_floors_and_reports_skips() {
        let persistence = Arc::new(InMemoryPersistence::default());
        let store = InventoryStore::new(table(), persistence.clone());

        let report = store
            .fulfill(
                &StoreId::from("S001"),
                &[ListItem::new("MILK", 3), ListItem::new("EGGS", 5), ListItem::new("TEA", 1)],
            )
            .await
            .expect("fulfill");

        assert_eq!(report.updated, vec![record("MILK", 7), record("EGGS", 0)]);
        assert_eq!(report.skipped, vec![ProductId::from("TEA")]);
        assert_eq!(
            persistence.snapshots(),
            vec![vec![
                InventoryRow::Record(record("MILK", 7)),
                InventoryRow::Record(record("EGGS", 0)),
            ]]
        );
    }

    #[tokio::test]
    async fn unknown_store_touches_nothing_and_skips_persist() {
        let persistence = Arc::new(InMemoryPersistence::default());
        let store = InventoryStore::new(table(), persistence.clone());

        let updated = store
            .decrement(&StoreId::from("S999"), &ProductId::from("MILK"), 1)
            .await
            .expect("decrement");

        assert_eq!(updated, None);
        assert!(persistence.snapshots().is_empty());
        assert_eq!(store.snapshot().await, table());
    }

    #[tokio::test]
    async fn failed_persist_rolls_back_the_table() {
        let persistence = Arc::new(InMemoryPersistence::default());
        persistence.set_failing(true);
        let store = InventoryStore::new(table(), persistence.clone());

        let result = store.decrement(&StoreId::from("S001"), &ProductId::from("MILK"), 4).await;

        assert!(result.is_err());
        let current = store.read().await;
        assert_eq!(
            current
                .get(&StoreId::from("S001"), &ProductId::from("MILK"))
                .map(|record| record.current_stock),
            Some(10)
        );
    }

    #[tokio::test]
    async fn concurrent_decrements_are_serialized() {
        let persistence = Arc::new(InMemoryPersistence::default());
        let store = Arc::new(InventoryStore::new(table(), persistence.clone()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.decrement(&StoreId::from("S001"), &ProductId::from("MILK"), 1).await
            }));
        }
        for handle in handles {
            handle.await.expect("join").expect("decrement");
        }

        let snapshot = store.snapshot().await;
        assert_eq!(
            snapshot
                .get(&StoreId::from("S001"), &ProductId::from("MILK"))
                .map(|record| record.current_stock),
            Some(2)
        );
        assert_eq!(persistence.snapshots().len(), 8);
    }

    #[tokio::test]
    async fn json_backed_store_writes_through_before_returning() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("inventory.json");
        let store = InventoryStore::with_json_file(table(), &path);

        store.fulfill(&StoreId::from("S001"), &[ListItem::new("EGGS", 1)]).await.expect("fulfill");

        let stored: Vec<InventoryRecord> =
            serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("parse");
        assert_eq!(stored, vec![record("MILK", 10), record("EGGS", 1)]);
    }

    #[tokio::test]
    async fn rewrite_keeps_unparsed_rows_and_unknown_fields() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("inventory.json");
        fs::write(
            &path,
            r#"[
                {"store_id":"S001","product_id":"MILK","current_stock":10,"daily_sales_rate":2},
                {"store_id":"S001","product_id":"BREAD","current_stock":"a dozen"},
                {"store_id":"S001","product_id":"EGGS","current_stock":12.0,"aisle_note":"end cap"}
            ]"#,
        )
        .expect("seed inventory");
        let loaded = CatalogLoader::new(CatalogFiles::in_dir(dir.path())).load();
        let store = InventoryStore::with_json_file(loaded.inventory, &path);

        store.fulfill(&StoreId::from("S001"), &[ListItem::new("MILK", 3)]).await.expect("fulfill");

        let stored: Vec<Value> =
            serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("parse");
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[0]["current_stock"], json!(7));
        assert_eq!(
            stored[1],
            json!({"store_id":"S001","product_id":"BREAD","current_stock":"a dozen"})
        );
        assert_eq!(stored[2]["current_stock"], json!(12));
        assert_eq!(stored[2]["aisle_note"], json!("end cap"));
    }
}
