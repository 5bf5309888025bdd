use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl ListItem {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self { product_id: ProductId(product_id.into()), quantity }
    }
}

/// Structured list modification emitted by the conversation layer or sent
/// directly by a client. The core never parses free text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ListCommand {
    NewList {
        items: Vec<ListItem>,
    },
    AddItem {
        items: Vec<ListItem>,
    },
    RemoveItem {
        items: Vec<ListItem>,
    },
    /// Swap `original_product_id` for `items`. A replacement item without an
    /// explicit quantity inherits the quantity of the line it replaces.
    ReplaceItem {
        original_product_id: ProductId,
        items: Vec<ReplacementItem>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub quantity: Option<u32>,
}

impl ListCommand {
    pub fn action(&self) -> &'static str {
        match self {
            Self::NewList { .. } => "new_list",
            Self::AddItem { .. } => "add_item",
            Self::RemoveItem { .. } => "remove_item",
            Self::ReplaceItem { .. } => "replace_item",
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::NewList { items } | Self::AddItem { items } | Self::RemoveItem { items } => {
                items.is_empty()
            }
            Self::ReplaceItem { items, .. } => items.is_empty(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListChange {
    pub action: String,
    pub added: Vec<ProductId>,
    pub updated: Vec<ProductId>,
    pub removed: Vec<ProductId>,
    pub ignored: Vec<ProductId>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingList {
    pub items: Vec<ListItem>,
}

impl ShoppingList {
    pub fn new(items: Vec<ListItem>) -> Self {
        Self { items }
    }

    pub fn quantity_of(&self, product_id: &ProductId) -> Option<u32> {
        self.items.iter().find(|item| &item.product_id == product_id).map(|item| item.quantity)
    }

    pub fn apply(&mut self, command: &ListCommand) -> Result<ListChange, DomainError> {
        if command.is_empty() {
            return Err(DomainError::EmptyListCommand { action: command.action().to_string() });
        }

        let mut change =
            ListChange { action: command.action().to_string(), ..ListChange::default() };
        match command {
            ListCommand::NewList { items } => {
                change.removed = self.items.drain(..).map(|item| item.product_id).collect();
                for item in items {
                    self.merge(item, &mut change);
                }
            }
            ListCommand::AddItem { items } => {
                for item in items {
                    self.merge(item, &mut change);
                }
            }
            ListCommand::RemoveItem { items } => {
                for item in items {
                    if self.remove(&item.product_id).is_some() {
                        change.removed.push(item.product_id.clone());
                    } else {
                        change.ignored.push(item.product_id.clone());
                    }
                }
            }
            ListCommand::ReplaceItem { original_product_id, items } => {
                let Some(original_quantity) = self.remove(original_product_id) else {
                    change.ignored.push(original_product_id.clone());
                    return Ok(change);
                };
                change.removed.push(original_product_id.clone());
                for replacement in items {
                    let item = ListItem {
                        product_id: replacement.product_id.clone(),
                        quantity: replacement.quantity.unwrap_or(original_quantity),
                    };
                    self.merge(&item, &mut change);
                }
            }
        }

        Ok(change)
    }

    fn merge(&mut self, item: &ListItem, change: &mut ListChange) {
        if item.quantity == 0 {
            change.ignored.push(item.product_id.clone());
            return;
        }

        match self.items.iter_mut().find(|existing| existing.product_id == item.product_id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
                change.updated.push(item.product_id.clone());
            }
            None => {
                self.items.push(item.clone());
                change.added.push(item.product_id.clone());
            }
        }
    }

    fn remove(&mut self, product_id: &ProductId) -> Option<u32> {
        let position = self.items.iter().position(|item| &item.product_id == product_id)?;
        Some(self.items.remove(position).quantity)
    }
}
