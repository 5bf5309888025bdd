pub mod inventory;
pub mod persistence;

use std::path::PathBuf;

use listwise_core::errors::ApplicationError;
use thiserror::Error;

pub use inventory::{FulfillmentReport, InventoryStore};
pub use persistence::{InMemoryPersistence, InventoryPersistence, JsonFilePersistence};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("inventory file operation failed for `{path}`: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("inventory serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<StoreError> for ApplicationError {
    fn from(error: StoreError) -> Self {
        ApplicationError::Persistence(error.to_string())
    }
}
