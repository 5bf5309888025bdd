use std::path::Path;

use listwise_core::engine::stock::StockThresholds;
use listwise_core::engine::{DeterministicListRuntime, ListRuntime, StoreContext};

use crate::commands::{load_data, read_list, store_id, CommandResult};

pub fn run(list: &Path, store: Option<&str>) -> CommandResult {
    let items = match read_list("price", list) {
        Ok(items) => items,
        Err(result) => return result,
    };
    let (config, loaded) = match load_data("price") {
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
    let evaluation = DeterministicListRuntime::default().evaluate_list(&context, &items);
    let pricing = &evaluation.pricing;
    let message = format!(
        "{} lines at {store_id}: ${} before deals, ${} discount, ${} total",
        evaluation.lines.len(),
        pricing.total_before_discount,
        pricing.total_discount,
        pricing.total_after_discount,
    );

    CommandResult::success_with_data("price", message, &evaluation)
}
