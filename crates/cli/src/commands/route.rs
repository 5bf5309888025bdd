use std::path::Path;

use listwise_core::engine::{DeterministicListRuntime, ListRuntime};

use crate::commands::{load_data, read_list, CommandResult};

pub fn run(list: &Path, start: Option<&str>) -> CommandResult {
    let items = match read_list("route", list) {
        Ok(items) => items,
        Err(result) => return result,
    };
    let (config, loaded) = match load_data("route") {
        Ok(data) => data,
        Err(result) => return result,
    };

    let catalog = &loaded.catalog;
    let start_node = match start.map(str::trim) {
        Some(node) if !node.is_empty() => node,
        _ => catalog.graph().entry_point(),
    };
    let plan = DeterministicListRuntime::default().plan_route(
        catalog,
        &items,
        start_node,
        &config.store.checkout_node,
    );

    let mut message = format!(
        "{} stops from {}, {} hops",
        plan.stops.len(),
        plan.start_node,
        plan.total_hops
    );
    if !plan.unrouted.is_empty() {
        message.push_str(&format!(", {} unrouted", plan.unrouted.len()));
    }

    CommandResult::success_with_data("route", message, &plan)
}
