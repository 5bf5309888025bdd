//! Reads the JSON reference files into a [`Catalog`] and an [`InventoryTable`].
//!
//! A missing or malformed file never aborts the load: the affected table is
//! left empty and the outcome is reported in [`LoadedData::sources`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::config::{AppConfig, DataConfig};
use crate::domain::inventory::{InventoryRecord, InventoryRow, InventoryTable};
use crate::domain::layout::StoreLayout;
use crate::engine::recommendations::DEFAULT_MIN_SUPPORT;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogFiles {
    pub products: PathBuf,
    pub inventory: PathBuf,
    pub substitutions: PathBuf,
    pub deals: PathBuf,
    pub layout: PathBuf,
    pub purchases: PathBuf,
}

impl CatalogFiles {
    pub fn from_data_config(data: &DataConfig) -> Self {
        Self {
            products: data.products_path(),
            inventory: data.inventory_path(),
            substitutions: data.substitutions_path(),
            deals: data.deals_path(),
            layout: data.layout_path(),
            purchases: data.purchases_path(),
        }
    }

    /// Default file names inside `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let data = DataConfig { dir: dir.into(), ..AppConfig::default().data };
        Self::from_data_config(&data)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SourceOutcome {
    Loaded { records: usize, skipped: usize },
    Missing,
    Malformed { reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourceStatus {
    pub source: &'static str,
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: SourceOutcome,
}

impl SourceStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self.outcome, SourceOutcome::Loaded { .. })
    }
}

#[derive(Debug)]
pub struct LoadedData {
    pub catalog: Catalog,
    pub inventory: InventoryTable,
    pub sources: Vec<SourceStatus>,
}

#[derive(Clone, Debug)]
pub struct CatalogLoader {
    files: CatalogFiles,
    min_support: u32,
}

impl CatalogLoader {
    pub fn new(files: CatalogFiles) -> Self {
        Self { files, min_support: DEFAULT_MIN_SUPPORT }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(CatalogFiles::from_data_config(&config.data))
            .with_min_support(config.recommendations.min_support)
    }

    pub fn with_min_support(mut self, min_support: u32) -> Self {
        self.min_support = min_support;
        self
    }

    pub fn files(&self) -> &CatalogFiles {
        &self.files
    }

    pub fn load(&self) -> LoadedData {
        let mut sources = Vec::with_capacity(6);

        let products = read_records(&self.files.products, "products", &mut sources);
        let inventory = read_rows::<InventoryRecord>(
            &self.files.inventory,
            "inventory",
            &mut sources,
        );
        let substitutions =
            read_records(&self.files.substitutions, "substitutions", &mut sources);
        let deals = read_records(&self.files.deals, "deals", &mut sources);
        let layout = read_document::<StoreLayout>(&self.files.layout, "layout", &mut sources);
        let purchases = read_records(&self.files.purchases, "purchases", &mut sources);

        let catalog = Catalog::builder()
            .products(products)
            .substitutions(substitutions)
            .deals(deals)
            .layout(layout.unwrap_or_default())
            .purchases(&purchases, self.min_support)
            .build();
        let inventory = InventoryTable::from_rows(
            inventory
                .into_iter()
                .map(|row| row.map_or_else(InventoryRow::Unparsed, InventoryRow::Record))
                .collect(),
        );

        let summary = catalog.summary();
        info!(
            event_name = "catalog.loaded",
            products = summary.products,
            inventory_records = inventory.len(),
            inventory_unparsed = inventory.unparsed_count(),
            substitution_rules = summary.substitution_rules,
            deals = summary.deals,
            layout_nodes = summary.layout_nodes,
            fbt_rules = summary.fbt_rules,
            "reference data loaded"
        );

        LoadedData { catalog, inventory, sources }
    }
}

fn read_text(
    path: &Path,
    source: &'static str,
    sources: &mut Vec<SourceStatus>,
) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(raw) => Some(raw),
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            warn!(
                event_name = "catalog.file_missing",
                source,
                path = %path.display(),
                "reference file not found; continuing with an empty table"
            );
            sources.push(SourceStatus {
                source,
                path: path.to_path_buf(),
                outcome: SourceOutcome::Missing,
            });
            None
        }
        Err(error) => {
            malformed(path, source, error.to_string(), sources);
            None
        }
    }
}

fn malformed(path: &Path, source: &'static str, reason: String, sources: &mut Vec<SourceStatus>) {
    warn!(
        event_name = "catalog.file_malformed",
        source,
        path = %path.display(),
        error = %reason,
        "reference file unreadable; continuing with an empty table"
    );
    sources.push(SourceStatus {
        source,
        path: path.to_path_buf(),
        outcome: SourceOutcome::Malformed { reason },
    });
}

/// Reads a JSON array, keeping every element that deserializes as `T`.
pub fn read_records<T: DeserializeOwned>(
    path: &Path,
    source: &'static str,
    sources: &mut Vec<SourceStatus>,
) -> Vec<T> {
    read_rows(path, source, sources).into_iter().filter_map(Result::ok).collect()
}

/// Reads a JSON array in source order. Elements that do not deserialize as
/// `T` come back as their raw JSON and count as skipped.
pub fn read_rows<T: DeserializeOwned>(
    path: &Path,
    source: &'static str,
    sources: &mut Vec<SourceStatus>,
) -> Vec<Result<T, serde_json::Value>> {
    let Some(raw) = read_text(path, source, sources) else {
        return Vec::new();
    };

    let values: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(values) => values,
        Err(error) => {
            malformed(path, source, error.to_string(), sources);
            return Vec::new();
        }
    };

    let mut rows = Vec::with_capacity(values.len());
    let mut skipped = 0;
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<T>(value.clone()) {
            Ok(record) => rows.push(Ok(record)),
            Err(error) => {
                skipped += 1;
                warn!(
                    event_name = "catalog.record_skipped",
                    source,
                    index,
                    error = %error,
                    "skipping malformed reference record"
                );
                rows.push(Err(value));
            }
        }
    }

    sources.push(SourceStatus {
        source,
        path: path.to_path_buf(),
        outcome: SourceOutcome::Loaded { records: rows.len() - skipped, skipped },
    });
    rows
}

/// Reads a single JSON document.
pub fn read_document<T: DeserializeOwned>(
    path: &Path,
    source: &'static str,
    sources: &mut Vec<SourceStatus>,
) -> Option<T> {
    let raw = read_text(path, source, sources)?;
    match serde_json::from_str::<T>(&raw) {
        Ok(document) => {
            sources.push(SourceStatus {
                source,
                path: path.to_path_buf(),
                outcome: SourceOutcome::Loaded { records: 1, skipped: 0 },
            });
            Some(document)
        }
        Err(error) => {
            malformed(path, source, error.to_string(), sources);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{CatalogFiles, CatalogLoader, SourceOutcome};
    use crate::domain::inventory::{InventoryRow, StoreId};
    use crate::domain::product::ProductId;

    fn write(dir: &TempDir, name: &str, body: &str) {
        fs::write(dir.path().join(name), body).expect("write fixture");
    }

    #[test]
    fn loads_every_table_from_directory() {
        let dir = TempDir::new().expect("tempdir");
        write(
            &dir,
            "products.json",
            r#"[{"product_id":"P1","product_name":"Milk","category":"Dairy","price":3.49}]"#,
        );
        write(
            &dir,
            "inventory.json",
            r#"[{"store_id":"S001","product_id":"P1","current_stock":12,"daily_sales_rate":4}]"#,
        );
        write(
            &dir,
            "substitutions.json",
            r#"[{"original_product_id":"P1","substitutes":[{"substitute_product_id":"P2","substitution_score":0.8,"reason":"similar","type":"brand"}]}]"#,
        );
        write(
            &dir,
            "deals.json",
            r#"[{"deal_name":"Dairy 10","type":"PERCENTAGE_CATEGORY","active":true,"priority":1,"category_restriction":"Dairy","discount_percentage":10}]"#,
        );
        write(
            &dir,
            "store_layout.json",
            r#"{"entry_point":"FRONT_DOOR","layout_graph":{"FRONT_DOOR":["DAIRY"]},"product_locations":[{"product_id":"P1","location_node":"DAIRY"}]}"#,
        );
        write(&dir, "customer_purchases.json", r#"[{"invoice_id":"I1","product_id":"P1"}]"#);

        let loaded = CatalogLoader::new(CatalogFiles::in_dir(dir.path())).load();

        assert!(loaded.sources.iter().all(|source| source.is_loaded()));
        assert_eq!(loaded.catalog.products().count(), 1);
        assert_eq!(loaded.catalog.substitutes_for(&ProductId::from("P1")).len(), 1);
        assert_eq!(loaded.catalog.deals().len(), 1);
        assert_eq!(loaded.catalog.graph().location_of(&ProductId::from("P1")), Some("DAIRY"));
        assert_eq!(
            loaded
                .inventory
                .get(&StoreId::from("S001"), &ProductId::from("P1"))
                .map(|record| record.current_stock),
            Some(12)
        );
    }

    #[test]
    fn missing_files_degrade_to_empty_tables() {
        let dir = TempDir::new().expect("tempdir");

        let loaded = CatalogLoader::new(CatalogFiles::in_dir(dir.path())).load();

        assert_eq!(loaded.sources.len(), 6);
        assert!(loaded.sources.iter().all(|source| source.outcome == SourceOutcome::Missing));
        assert_eq!(loaded.catalog.products().count(), 0);
        assert!(loaded.inventory.is_empty());
        assert_eq!(loaded.catalog.graph().entry_point(), "FRONT_DOOR");
    }

    #[test]
    fn malformed_records_are_skipped_individually() {
        let dir = TempDir::new().expect("tempdir");
        write(
            &dir,
            "products.json",
            r#"[
                {"product_id":"P1","product_name":"Milk","category":"Dairy","price":3.49},
                {"product_id":"P2","category":"Dairy"}
            ]"#,
        );
        write(&dir, "deals.json", "{ not json");

        let loaded = CatalogLoader::new(CatalogFiles::in_dir(dir.path())).load();

        let products = loaded
            .sources
            .iter()
            .find(|source| source.source == "products")
            .expect("products status");
        assert_eq!(products.outcome, SourceOutcome::Loaded { records: 1, skipped: 1 });

        let deals =
            loaded.sources.iter().find(|source| source.source == "deals").expect("deals status");
        assert!(matches!(deals.outcome, SourceOutcome::Malformed { .. }));
        assert!(loaded.catalog.deals().is_empty());
    }

    #[test]
    fn unparsed_inventory_rows_are_kept_in_place() {
        let dir = TempDir::new().expect("tempdir");
        write(
            &dir,
            "inventory.json",
            r#"[
                {"store_id":"S001","product_id":"A","current_stock":10},
                {"store_id":"S001","product_id":"B","current_stock":"twelve"},
                {"store_id":"S001","product_id":"C","current_stock":12.0,"aisle_note":"end cap"}
            ]"#,
        );

        let loaded = CatalogLoader::new(CatalogFiles::in_dir(dir.path())).load();

        let inventory = loaded
            .sources
            .iter()
            .find(|source| source.source == "inventory")
            .expect("inventory status");
        assert_eq!(inventory.outcome, SourceOutcome::Loaded { records: 2, skipped: 1 });
        assert_eq!(loaded.inventory.rows().len(), 3);
        assert!(matches!(loaded.inventory.rows()[1], InventoryRow::Unparsed(_)));

        let c = loaded
            .inventory
            .get(&StoreId::from("S001"), &ProductId::from("C"))
            .expect("integral float stock parses");
        assert_eq!(c.current_stock, 12);
        assert_eq!(c.extra.get("aisle_note").and_then(|note| note.as_str()), Some("end cap"));
    }
}
