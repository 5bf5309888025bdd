//! Per-line stock and substitute annotation for shopping lists.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::list::ListItem;
use crate::domain::product::{Product, ProductId};
use crate::engine::stock::{StockReport, StockStatus};
use crate::engine::substitutes::{Substitute, SubstituteResolver};
use crate::engine::StoreContext;

/// A known product on the list with its stock picture. A substitute is
/// offered only for low or out-of-stock lines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    #[serde(flatten)]
    pub stock: StockReport,
    pub product_details: Product,
    pub substitute: Option<Substitute>,
}

/// A line after automatic substitution. `substituted_for` names the product
/// that was swapped out.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub price: Decimal,
    pub reason: String,
    pub substituted_for: Option<ProductId>,
    pub stock: StockReport,
}

impl AnnotatedLine {
    pub fn as_list_item(&self) -> ListItem {
        ListItem { product_id: self.product_id.clone(), quantity: self.quantity }
    }
}

impl ResolvedLine {
    pub fn as_list_item(&self) -> ListItem {
        ListItem { product_id: self.product_id.clone(), quantity: self.quantity }
    }
}

pub fn annotate_list<S>(
    context: &StoreContext<'_>,
    substitutes: &S,
    items: &[ListItem],
) -> Vec<AnnotatedLine>
where
    S: SubstituteResolver + ?Sized,
{
    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        let Some(product) = context.catalog.product(&item.product_id) else {
            warn!(
                event_name = "enrichment.unknown_product",
                product_id = %item.product_id,
                "skipping unknown product on list"
            );
            continue;
        };

        let stock = context.stock.stock_status(&item.product_id, context.store_id);
        let substitute = if stock.status.needs_substitute() {
            substitutes.find_substitute(
                context.catalog,
                &context.stock,
                &item.product_id,
                context.store_id,
            )
        } else {
            None
        };

        lines.push(AnnotatedLine {
            product_id: item.product_id.clone(),
            name: product.name.clone(),
            quantity: item.quantity,
            stock,
            product_details: product.clone(),
            substitute,
        });
    }
    lines
}

/// Swaps low and out-of-stock lines for their best substitute. Out-of-stock
/// lines with nothing to swap in are dropped.
pub fn resolve_list<S>(
    context: &StoreContext<'_>,
    substitutes: &S,
    items: &[ListItem],
) -> Vec<ResolvedLine>
where
    S: SubstituteResolver + ?Sized,
{
    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        let Some(original) = context.catalog.product(&item.product_id) else {
            warn!(
                event_name = "enrichment.unknown_product",
                product_id = %item.product_id,
                "skipping unknown product on generated list"
            );
            continue;
        };

        let status = context.stock.stock_status(&item.product_id, context.store_id).status;
        let substitute = if status.needs_substitute() {
            substitutes.find_substitute(
                context.catalog,
                &context.stock,
                &item.product_id,
                context.store_id,
            )
        } else {
            None
        };

        let (product, substituted_for) = match substitute {
            Some(substitute) => {
                info!(
                    event_name = "enrichment.substituted",
                    original_product_id = %item.product_id,
                    substitute_product_id = %substitute.product.product_id,
                    "substituted list item"
                );
                (substitute.product, Some(item.product_id.clone()))
            }
            None if status == StockStatus::OutOfStock => {
                info!(
                    event_name = "enrichment.dropped_out_of_stock",
                    product_id = %item.product_id,
                    "dropping out-of-stock item without a substitute"
                );
                continue;
            }
            None => (original.clone(), None),
        };

        let reason = match substituted_for {
            Some(_) => format!("Substituted for {}", original.name),
            None => String::new(),
        };
        let stock = context.stock.stock_status(&product.product_id, context.store_id);

        lines.push(ResolvedLine {
            product_id: product.product_id,
            name: product.name,
            quantity: item.quantity,
            price: product.price,
            reason,
            substituted_for,
            stock,
        });
    }
    lines
}
