use std::collections::HashMap;
use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::product::ProductId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreId(pub String);

impl StoreId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StoreId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub store_id: StoreId,
    pub product_id: ProductId,
    #[serde(deserialize_with = "stock_count")]
    pub current_stock: u32,
    #[serde(default = "default_daily_sales_rate")]
    pub daily_sales_rate: f64,
    /// Fields this service does not use, written back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_daily_sales_rate() -> f64 {
    1.0
}

/// Accepts `12` as well as `12.0`; rejects negative, fractional and
/// out-of-range counts.
fn stock_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let integral = match &value {
        Value::Number(number) => number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|count| count.fract() == 0.0 && *count >= 0.0)
                .map(|count| count as u64)
        }),
        _ => None,
    };

    integral
        .and_then(|count| u32::try_from(count).ok())
        .ok_or_else(|| de::Error::custom(format!("invalid stock count `{value}`")))
}

impl InventoryRecord {
    pub fn new(
        store_id: impl Into<String>,
        product_id: impl Into<String>,
        current_stock: u32,
        daily_sales_rate: f64,
    ) -> Self {
        Self {
            store_id: StoreId(store_id.into()),
            product_id: ProductId(product_id.into()),
            current_stock,
            daily_sales_rate,
            extra: Map::new(),
        }
    }

    /// Linear depletion estimate. Unbounded when nothing sells.
    pub fn days_left(&self) -> f64 {
        if self.daily_sales_rate > 0.0 {
            f64::from(self.current_stock) / self.daily_sales_rate
        } else {
            f64::INFINITY
        }
    }
}

/// One element of the inventory file. Elements that do not parse as a record
/// stay in place as raw JSON and are written back verbatim.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InventoryRow {
    Record(InventoryRecord),
    Unparsed(Value),
}

/// Inventory keyed by `(store, product)`, kept in source order so a rewrite
/// reproduces the original file layout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InventoryTable {
    rows: Vec<InventoryRow>,
    index: HashMap<StoreId, HashMap<ProductId, usize>>,
}

impl InventoryTable {
    /// Later duplicates of a key overwrite the earlier record in place.
    pub fn new(records: Vec<InventoryRecord>) -> Self {
        Self::from_rows(records.into_iter().map(InventoryRow::Record).collect())
    }

    pub fn from_rows(rows: Vec<InventoryRow>) -> Self {
        let mut table = Self::default();
        for row in rows {
            match row {
                InventoryRow::Record(record) => table.upsert(record),
                unparsed @ InventoryRow::Unparsed(_) => table.rows.push(unparsed),
            }
        }
        table
    }

    pub fn get(&self, store_id: &StoreId, product_id: &ProductId) -> Option<&InventoryRecord> {
        let position = self.position(store_id, product_id)?;
        match self.rows.get(position)? {
            InventoryRow::Record(record) => Some(record),
            InventoryRow::Unparsed(_) => None,
        }
    }

    /// Every source row, including the ones that did not parse.
    pub fn rows(&self) -> &[InventoryRow] {
        &self.rows
    }

    pub fn unparsed_count(&self) -> usize {
        self.rows.len() - self.len()
    }

    pub fn len(&self) -> usize {
        self.index.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn upsert(&mut self, record: InventoryRecord) {
        match self.position(&record.store_id, &record.product_id) {
            Some(position) => self.rows[position] = InventoryRow::Record(record),
            None => {
                let position = self.rows.len();
                self.index
                    .entry(record.store_id.clone())
                    .or_default()
                    .insert(record.product_id.clone(), position);
                self.rows.push(InventoryRow::Record(record));
            }
        }
    }

    /// Saturating decrement. Returns the updated record, or `None` when the
    /// pair is not stocked.
    pub fn decrement(
        &mut self,
        store_id: &StoreId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Option<&InventoryRecord> {
        let position = self.position(store_id, product_id)?;
        match &mut self.rows[position] {
            InventoryRow::Record(record) => {
                record.current_stock = record.current_stock.saturating_sub(quantity);
                Some(record)
            }
            InventoryRow::Unparsed(_) => None,
        }
    }

    fn position(&self, store_id: &StoreId, product_id: &ProductId) -> Option<usize> {
        self.index.get(store_id)?.get(product_id).copied()
    }
}
