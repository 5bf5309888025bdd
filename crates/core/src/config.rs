use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "listwise.toml";
pub const FALLBACK_CONFIG_FILE: &str = "config/listwise.toml";

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub data: DataConfig,
    pub store: StoreConfig,
    pub recommendations: RecommendationsConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataConfig {
    pub dir: PathBuf,
    pub products_file: String,
    pub inventory_file: String,
    pub substitutions_file: String,
    pub deals_file: String,
    pub layout_file: String,
    pub purchases_file: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StoreConfig {
    pub default_store_id: String,
    pub low_stock_threshold: u32,
    pub days_supply_threshold: f64,
    pub checkout_node: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecommendationsConfig {
    pub min_support: u32,
    pub limit: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub store_id: Option<String>,
    pub log_level: Option<String>,
    pub server_port: Option<u16>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig {
                dir: PathBuf::from("data"),
                products_file: "products.json".to_string(),
                inventory_file: "inventory.json".to_string(),
                substitutions_file: "substitutions.json".to_string(),
                deals_file: "deals.json".to_string(),
                layout_file: "store_layout.json".to_string(),
                purchases_file: "customer_purchases.json".to_string(),
            },
            store: StoreConfig {
                default_store_id: "S001".to_string(),
                low_stock_threshold: 3,
                days_supply_threshold: 1.0,
                checkout_node: "CHECKOUT_AREA".to_string(),
            },
            recommendations: RecommendationsConfig { min_support: 2, limit: 3 },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 5000,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl DataConfig {
    pub fn products_path(&self) -> PathBuf {
        self.dir.join(&self.products_file)
    }

    pub fn inventory_path(&self) -> PathBuf {
        self.dir.join(&self.inventory_file)
    }

    pub fn substitutions_path(&self) -> PathBuf {
        self.dir.join(&self.substitutions_file)
    }

    pub fn deals_path(&self) -> PathBuf {
        self.dir.join(&self.deals_file)
    }

    pub fn layout_path(&self) -> PathBuf {
        self.dir.join(&self.layout_file)
    }

    pub fn purchases_path(&self) -> PathBuf {
        self.dir.join(&self.purchases_file)
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(data) = patch.data {
            if let Some(dir) = data.dir {
                self.data.dir = dir;
            }
            if let Some(products_file) = data.products_file {
                self.data.products_file = products_file;
            }
            if let Some(inventory_file) = data.inventory_file {
                self.data.inventory_file = inventory_file;
            }
            if let Some(substitutions_file) = data.substitutions_file {
                self.data.substitutions_file = substitutions_file;
            }
            if let Some(deals_file) = data.deals_file {
                self.data.deals_file = deals_file;
            }
            if let Some(layout_file) = data.layout_file {
                self.data.layout_file = layout_file;
            }
            if let Some(purchases_file) = data.purchases_file {
                self.data.purchases_file = purchases_file;
            }
        }

        if let Some(store) = patch.store {
            if let Some(default_store_id) = store.default_store_id {
                self.store.default_store_id = default_store_id;
            }
            if let Some(low_stock_threshold) = store.low_stock_threshold {
                self.store.low_stock_threshold = low_stock_threshold;
            }
            if let Some(days_supply_threshold) = store.days_supply_threshold {
                self.store.days_supply_threshold = days_supply_threshold;
            }
            if let Some(checkout_node) = store.checkout_node {
                self.store.checkout_node = checkout_node;
            }
        }

        if let Some(recommendations) = patch.recommendations {
            if let Some(min_support) = recommendations.min_support {
                self.recommendations.min_support = min_support;
            }
            if let Some(limit) = recommendations.limit {
                self.recommendations.limit = limit;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("LISTWISE_DATA_DIR") {
            self.data.dir = PathBuf::from(value);
        }
        if let Some(value) = read_env("LISTWISE_DATA_PRODUCTS_FILE") {
            self.data.products_file = value;
        }
        if let Some(value) = read_env("LISTWISE_DATA_INVENTORY_FILE") {
            self.data.inventory_file = value;
        }
        if let Some(value) = read_env("LISTWISE_DATA_SUBSTITUTIONS_FILE") {
            self.data.substitutions_file = value;
        }
        if let Some(value) = read_env("LISTWISE_DATA_DEALS_FILE") {
            self.data.deals_file = value;
        }
        if let Some(value) = read_env("LISTWISE_DATA_LAYOUT_FILE") {
            self.data.layout_file = value;
        }
        if let Some(value) = read_env("LISTWISE_DATA_PURCHASES_FILE") {
            self.data.purchases_file = value;
        }

        if let Some(value) = read_env("LISTWISE_STORE_ID") {
            self.store.default_store_id = value;
        }
        if let Some(value) = read_env("LISTWISE_STORE_LOW_STOCK_THRESHOLD") {
            self.store.low_stock_threshold =
                parse_u32("LISTWISE_STORE_LOW_STOCK_THRESHOLD", &value)?;
        }
        if let Some(value) = read_env("LISTWISE_STORE_DAYS_SUPPLY_THRESHOLD") {
            self.store.days_supply_threshold =
                parse_f64("LISTWISE_STORE_DAYS_SUPPLY_THRESHOLD", &value)?;
        }
        if let Some(value) = read_env("LISTWISE_STORE_CHECKOUT_NODE") {
            self.store.checkout_node = value;
        }

        if let Some(value) = read_env("LISTWISE_RECOMMENDATIONS_MIN_SUPPORT") {
            self.recommendations.min_support =
                parse_u32("LISTWISE_RECOMMENDATIONS_MIN_SUPPORT", &value)?;
        }
        if let Some(value) = read_env("LISTWISE_RECOMMENDATIONS_LIMIT") {
            self.recommendations.limit = parse_usize("LISTWISE_RECOMMENDATIONS_LIMIT", &value)?;
        }

        if let Some(value) = read_env("LISTWISE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("LISTWISE_SERVER_PORT") {
            self.server.port = parse_u16("LISTWISE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("LISTWISE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("LISTWISE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level =
            read_env("LISTWISE_LOGGING_LEVEL").or_else(|| read_env("LISTWISE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("LISTWISE_LOGGING_FORMAT").or_else(|| read_env("LISTWISE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(data_dir) = overrides.data_dir {
            self.data.dir = data_dir;
        }
        if let Some(store_id) = overrides.store_id {
            self.store.default_store_id = store_id;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_data(&self.data)?;
        validate_store(&self.store)?;
        validate_recommendations(&self.recommendations)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// Returns the config file `AppConfig::load` would read, if any.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from(FALLBACK_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_data(data: &DataConfig) -> Result<(), ConfigError> {
    if data.dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation("data.dir must not be empty".to_string()));
    }

    let files = [
        ("data.products_file", &data.products_file),
        ("data.inventory_file", &data.inventory_file),
        ("data.substitutions_file", &data.substitutions_file),
        ("data.deals_file", &data.deals_file),
        ("data.layout_file", &data.layout_file),
        ("data.purchases_file", &data.purchases_file),
    ];
    if let Some((key, _)) = files.iter().find(|(_, name)| name.trim().is_empty()) {
        return Err(ConfigError::Validation(format!("{key} must not be empty")));
    }

    Ok(())
}

fn validate_store(store: &StoreConfig) -> Result<(), ConfigError> {
    if store.default_store_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "store.default_store_id must not be empty (set LISTWISE_STORE_ID)".to_string(),
        ));
    }

    if !store.days_supply_threshold.is_finite() || store.days_supply_threshold < 0.0 {
        return Err(ConfigError::Validation(
            "store.days_supply_threshold must be a finite, non-negative number".to_string(),
        ));
    }

    if store.checkout_node.trim().is_empty() {
        return Err(ConfigError::Validation("store.checkout_node must not be empty".to_string()));
    }

    Ok(())
}

fn validate_recommendations(recommendations: &RecommendationsConfig) -> Result<(), ConfigError> {
    if recommendations.min_support == 0 {
        return Err(ConfigError::Validation(
            "recommendations.min_support must be at least 1".to_string(),
        ));
    }

    if recommendations.limit == 0 {
        return Err(ConfigError::Validation(
            "recommendations.limit must be at least 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn invalid_override(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse::<u16>().map_err(|_| invalid_override(key, value))
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| invalid_override(key, value))
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| invalid_override(key, value))
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| invalid_override(key, value))
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.trim().parse::<f64>().map_err(|_| invalid_override(key, value))
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    data: Option<DataPatch>,
    store: Option<StorePatch>,
    recommendations: Option<RecommendationsPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DataPatch {
    dir: Option<PathBuf>,
    products_file: Option<String>,
    inventory_file: Option<String>,
    substitutions_file: Option<String>,
    deals_file: Option<String>,
    layout_file: Option<String>,
    purchases_file: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StorePatch {
    default_store_id: Option<String>,
    low_stock_threshold: Option<u32>,
    days_supply_threshold: Option<f64>,
    checkout_node: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RecommendationsPatch {
    min_support: Option<u32>,
    limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
