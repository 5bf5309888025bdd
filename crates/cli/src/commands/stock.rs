use listwise_core::domain::product::ProductId;
use listwise_core::engine::stock::{StockReport, StockThresholds};
use listwise_core::engine::StoreContext;
use serde::Serialize;

use crate::commands::{load_data, store_id, CommandResult};

#[derive(Debug, Serialize)]
struct StockLookup<'a> {
    product_id: &'a str,
    store_id: &'a str,
    #[serde(flatten)]
    report: StockReport,
}

pub fn run(product_id: &str, store: Option<&str>) -> CommandResult {
    let (config, loaded) = match load_data("stock") {
        Ok(data) => data,
        Err(result) => return result,
    };

    let store_id = store_id(&config, store);
    let context = StoreContext::new(
        &loaded.catalog,
        &loaded.inventory,
        StockThresholds::from(&config.store),
        &store_id,
    );
    let report = context.stock_status(&ProductId::from(product_id));
    let message = format!("{product_id} at {store_id}: {}", report.message);

    CommandResult::success_with_data(
        "stock",
        message,
        &StockLookup { product_id, store_id: store_id.as_str(), report },
    )
}
