pub mod config;
pub mod doctor;
pub mod fulfill;
pub mod price;
pub mod route;
pub mod stock;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use listwise_core::catalog::{CatalogLoader, LoadedData};
use listwise_core::config::{AppConfig, LoadOptions};
use listwise_core::domain::inventory::StoreId;
use listwise_core::domain::list::ListItem;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_RUNTIME: u8 = 3;
pub const EXIT_INPUT: u8 = 4;
pub const EXIT_PERSISTENCE: u8 = 5;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn plain(output: String) -> Self {
        Self { exit_code: 0, output }
    }

    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::emit(command, "ok", None, message.into(), None, 0)
    }

    /// Success envelope carrying the command's structured result under `data`.
    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: &impl Serialize,
    ) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Self::emit(command, "ok", None, message.into(), Some(data), 0),
            Err(error) => Self::failure(
                command,
                "serialization",
                format!("failed to serialize result: {error}"),
                EXIT_RUNTIME,
            ),
        }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self::emit(command, "error", Some(error_class), message.into(), None, exit_code)
    }

    fn emit(
        command: &str,
        status: &str,
        error_class: Option<&str>,
        message: String,
        data: Option<Value>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: status.to_string(),
            error_class: error_class.map(str::to_string),
            message,
            data,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Loads config and every reference table, or the failure envelope to print.
pub(crate) fn load_data(command: &str) -> Result<(AppConfig, LoadedData), CommandResult> {
    let config = AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            EXIT_CONFIG,
        )
    })?;
    let loaded = CatalogLoader::from_config(&config).load();
    Ok((config, loaded))
}

pub(crate) fn store_id(config: &AppConfig, requested: Option<&str>) -> StoreId {
    match requested.map(str::trim) {
        Some(store_id) if !store_id.is_empty() => StoreId::from(store_id),
        _ => StoreId(config.store.default_store_id.clone()),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListFile {
    Items(Vec<ListItem>),
    ShoppingList { shopping_list: Vec<ListItem> },
    List { items: Vec<ListItem> },
}

/// Reads a list file: a bare array of items, `{"shopping_list": [...]}`, or
/// `{"items": [...]}`. Empty lists are rejected.
pub(crate) fn read_list(command: &str, path: &Path) -> Result<Vec<ListItem>, CommandResult> {
    parse_list_file(path).map_err(|error| {
        CommandResult::failure(command, "invalid_list", format!("{error:#}"), EXIT_INPUT)
    })
}

fn parse_list_file(path: &Path) -> Result<Vec<ListItem>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read list file `{}`", path.display()))?;
    let parsed: ListFile = serde_json::from_str(&raw)
        .with_context(|| format!("list file `{}` is not a valid shopping list", path.display()))?;

    let items = match parsed {
        ListFile::Items(items)
        | ListFile::ShoppingList { shopping_list: items }
        | ListFile::List { items } => items,
    };
    anyhow::ensure!(!items.is_empty(), "list file `{}` contains no items", path.display());
    Ok(items)
}
