use serde::{Deserialize, Serialize};

use crate::config::StoreConfig;
use crate::domain::inventory::{InventoryTable, StoreId};
use crate::domain::product::ProductId;

pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 3;
pub const DEFAULT_DAYS_SUPPLY_THRESHOLD: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Low Stock")]
    LowStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl StockStatus {
    /// Statuses a shopper can still pick up today.
    pub fn is_available(self) -> bool {
        matches!(self, Self::InStock | Self::LowStock)
    }

    pub fn needs_substitute(self) -> bool {
        matches!(self, Self::LowStock | Self::OutOfStock)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StockThresholds {
    pub low_stock: u32,
    pub days_supply: f64,
}

impl Default for StockThresholds {
    fn default() -> Self {
        Self { low_stock: DEFAULT_LOW_STOCK_THRESHOLD, days_supply: DEFAULT_DAYS_SUPPLY_THRESHOLD }
    }
}

impl From<&StoreConfig> for StockThresholds {
    fn from(config: &StoreConfig) -> Self {
        Self { low_stock: config.low_stock_threshold, days_supply: config.days_supply_threshold }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockReport {
    pub status: StockStatus,
    pub message: String,
    pub current_stock: Option<u32>,
    /// `None` when nothing sells, so supply never runs out.
    pub days_left: Option<f64>,
}

/// Read-only view over an inventory table.
#[derive(Clone, Copy, Debug)]
pub struct StockResolver<'a> {
    inventory: &'a InventoryTable,
    thresholds: StockThresholds,
}

impl<'a> StockResolver<'a> {
    pub fn new(inventory: &'a InventoryTable, thresholds: StockThresholds) -> Self {
        Self { inventory, thresholds }
    }

    pub fn thresholds(&self) -> StockThresholds {
        self.thresholds
    }

    pub fn stock_status(&self, product_id: &ProductId, store_id: &StoreId) -> StockReport {
        let Some(record) = self.inventory.get(store_id, product_id) else {
            return StockReport {
                status: StockStatus::Unknown,
                message: "Product not found or not stocked at this store.".to_string(),
                current_stock: None,
                days_left: None,
            };
        };

        let stock = record.current_stock;
        if stock == 0 {
            return StockReport {
                status: StockStatus::OutOfStock,
                message: "This item is currently out of stock.".to_string(),
                current_stock: Some(0),
                days_left: Some(0.0),
            };
        }

        let days_left = record.days_left();
        let bounded = days_left.is_finite().then_some(days_left);

        if stock <= self.thresholds.low_stock || days_left < self.thresholds.days_supply {
            let message = match bounded {
                Some(days) => format!("Only {stock} left! Expected to last ~{days:.1} day(s)."),
                None => format!("Only {stock} left!"),
            };
            return StockReport {
                status: StockStatus::LowStock,
                message,
                current_stock: Some(stock),
                days_left: bounded,
            };
        }

        StockReport {
            status: StockStatus::InStock,
            message: format!("In stock ({stock} available)."),
            current_stock: Some(stock),
            days_left: bounded,
        }
    }
}
