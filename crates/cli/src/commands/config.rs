use std::env;
use std::fs;
use std::path::Path;

use listwise_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let fields: [(&str, String, &[&str]); 17] = [
        ("data.dir", config.data.dir.display().to_string(), &["LISTWISE_DATA_DIR"]),
        (
            "data.products_file",
            config.data.products_file.clone(),
            &["LISTWISE_DATA_PRODUCTS_FILE"],
        ),
        (
            "data.inventory_file",
            config.data.inventory_file.clone(),
            &["LISTWISE_DATA_INVENTORY_FILE"],
        ),
        (
            "data.substitutions_file",
            config.data.substitutions_file.clone(),
            &["LISTWISE_DATA_SUBSTITUTIONS_FILE"],
        ),
        ("data.deals_file", config.data.deals_file.clone(), &["LISTWISE_DATA_DEALS_FILE"]),
        ("data.layout_file", config.data.layout_file.clone(), &["LISTWISE_DATA_LAYOUT_FILE"]),
        (
            "data.purchases_file",
            config.data.purchases_file.clone(),
            &["LISTWISE_DATA_PURCHASES_FILE"],
        ),
        ("store.default_store_id", config.store.default_store_id.clone(), &["LISTWISE_STORE_ID"]),
        (
            "store.low_stock_threshold",
            config.store.low_stock_threshold.to_string(),
            &["LISTWISE_STORE_LOW_STOCK_THRESHOLD"],
        ),
        (
            "store.days_supply_threshold",
            config.store.days_supply_threshold.to_string(),
            &["LISTWISE_STORE_DAYS_SUPPLY_THRESHOLD"],
        ),
        (
            "store.checkout_node",
            config.store.checkout_node.clone(),
            &["LISTWISE_STORE_CHECKOUT_NODE"],
        ),
        (
            "recommendations.min_support",
            config.recommendations.min_support.to_string(),
            &["LISTWISE_RECOMMENDATIONS_MIN_SUPPORT"],
        ),
        (
            "recommendations.limit",
            config.recommendations.limit.to_string(),
            &["LISTWISE_RECOMMENDATIONS_LIMIT"],
        ),
        (
            "server.bind_address",
            config.server.bind_address.clone(),
            &["LISTWISE_SERVER_BIND_ADDRESS"],
        ),
        ("server.port", config.server.port.to_string(), &["LISTWISE_SERVER_PORT"]),
        (
            "logging.level",
            config.logging.level.clone(),
            &["LISTWISE_LOGGING_LEVEL", "LISTWISE_LOG_LEVEL"],
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format),
            &["LISTWISE_LOGGING_FORMAT", "LISTWISE_LOG_FORMAT"],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_keys) in &fields {
        let source =
            field_source(key, env_keys, config_file_doc.as_ref(), config_file_path.as_deref());
        lines.push(format!("- {key} = {value} (source: {source})"));
    }

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if config_file_doc.is_some_and(|doc| contains_path(doc, key_path)) {
        let file_path = config_file_path
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "config file".to_string());
        return format!("file ({file_path})");
    }

    "default".to_string()
}

fn contains_path(doc: &Value, key_path: &str) -> bool {
    let mut current = doc;
    for segment in key_path.split('.') {
        let Some(next) = current.get(segment) else {
            return false;
        };
        current = next;
    }
    true
}
