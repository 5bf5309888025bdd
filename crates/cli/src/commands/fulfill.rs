use std::path::Path;

use listwise_store::InventoryStore;

use crate::commands::{
    load_data, read_list, store_id, CommandResult, EXIT_PERSISTENCE, EXIT_RUNTIME,
};

pub fn run(list: &Path, store: Option<&str>) -> CommandResult {
    let items = match read_list("fulfill", list) {
        Ok(items) => items,
        Err(result) => return result,
    };
    let (config, loaded) = match load_data("fulfill") {
        Ok(data) => data,
        Err(result) => return result,
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "fulfill",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                EXIT_RUNTIME,
            );
        }
    };

    let store_id = store_id(&config, store);
    let inventory = InventoryStore::with_json_file(loaded.inventory, config.data.inventory_path());
    match runtime.block_on(inventory.fulfill(&store_id, &items)) {
        Ok(report) => {
            let message = format!(
                "decremented {} records at {store_id}, skipped {}",
                report.updated.len(),
                report.skipped.len()
            );
            CommandResult::success_with_data("fulfill", message, &report)
        }
        Err(error) => {
            CommandResult::failure("fulfill", "persistence", error.to_string(), EXIT_PERSISTENCE)
        }
    }
}
