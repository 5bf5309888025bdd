use std::sync::Arc;

use listwise_core::catalog::{CatalogLoader, SourceStatus};
use listwise_core::config::{AppConfig, ConfigError, LoadOptions};
use listwise_core::domain::inventory::StoreId;
use listwise_core::engine::stock::StockThresholds;
use listwise_core::engine::DeterministicListRuntime;
use listwise_store::InventoryStore;
use thiserror::Error;
use tracing::{info, warn};

use crate::routes::{AppState, StoreSettings};

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
    pub sources: Arc<Vec<SourceStatus>>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub fn load_config(options: LoadOptions) -> Result<AppConfig, BootstrapError> {
    Ok(AppConfig::load(options)?)
}

pub fn bootstrap_with_config(config: AppConfig) -> Application {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        data_dir = %config.data.dir.display(),
        "starting application bootstrap"
    );

    let loaded = CatalogLoader::from_config(&config).load();
    let degraded: Vec<&str> = loaded
        .sources
        .iter()
        .filter(|source| !source.is_loaded())
        .map(|source| source.source)
        .collect();
    if !degraded.is_empty() {
        warn!(
            event_name = "system.bootstrap.degraded",
            correlation_id = "bootstrap",
            sources = ?degraded,
            "some reference data is unavailable; affected lookups will be empty"
        );
    }

    let inventory =
        InventoryStore::with_json_file(loaded.inventory, config.data.inventory_path());
    let settings = StoreSettings {
        default_store_id: StoreId(config.store.default_store_id.clone()),
        thresholds: StockThresholds::from(&config.store),
        checkout_node: config.store.checkout_node.clone(),
        recommendation_limit: config.recommendations.limit,
    };
    let state = AppState {
        catalog: Arc::new(loaded.catalog),
        inventory: Arc::new(inventory),
        runtime: Arc::new(DeterministicListRuntime::default()),
        settings: Arc::new(settings),
    };

    info!(
        event_name = "system.bootstrap.catalog_ready",
        correlation_id = "bootstrap",
        products = state.catalog.summary().products,
        "catalog context constructed"
    );

    Application { config, state, sources: Arc::new(loaded.sources) }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use listwise_core::config::{ConfigOverrides, LoadOptions};
    use listwise_core::domain::product::ProductId;
    use tempfile::TempDir;

    use crate::bootstrap::{bootstrap_with_config, load_config};

    #[test]
    fn config_load_fails_fast_on_invalid_configuration() {
        let result = load_config(LoadOptions {
            overrides: ConfigOverrides {
                store_id: Some("   ".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });

        let message = result.err().map(|error| error.to_string()).unwrap_or_default();
        assert!(message.contains("store.default_store_id"));
    }

    #[test]
    fn bootstrap_loads_catalog_from_configured_data_dir() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(
            dir.path().join("products.json"),
            r#"[{"product_id":"WMK_P001","product_name":"Potato Chips","category":"Snacks","price":3.99}]"#,
        )
        .expect("write products");

        let config = load_config(LoadOptions {
            overrides: ConfigOverrides {
                data_dir: Some(dir.path().to_path_buf()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .expect("config should load");
        let app = bootstrap_with_config(config);

        assert!(app.state.catalog.product(&ProductId::from("WMK_P001")).is_some());
        assert_eq!(app.sources.iter().filter(|source| source.is_loaded()).count(), 1);
        assert_eq!(app.state.settings.default_store_id.as_str(), "S001");
    }
}
