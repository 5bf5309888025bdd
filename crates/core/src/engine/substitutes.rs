use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Catalog;
use crate::domain::inventory::StoreId;
use crate::domain::product::{Product, ProductId};
use crate::engine::stock::StockResolver;

/// A catalog product offered in place of another. Owns its copy of the
/// product so annotations never reach the shared catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Substitute {
    #[serde(flatten)]
    pub product: Product,
    pub substitution_reason: String,
    pub substitution_score: f64,
    pub substitution_type: String,
    pub original_product_id: ProductId,
}

pub trait SubstituteResolver: Send + Sync {
    fn find_substitute(
        &self,
        catalog: &Catalog,
        stock: &StockResolver<'_>,
        original: &ProductId,
        store_id: &StoreId,
    ) -> Option<Substitute>;
}

/// Highest score first; ties keep source order.
#[derive(Clone, Copy, Debug, Default)]
pub struct RankedSubstituteResolver;

impl SubstituteResolver for RankedSubstituteResolver {
    fn find_substitute(
        &self,
        catalog: &Catalog,
        stock: &StockResolver<'_>,
        original: &ProductId,
        store_id: &StoreId,
    ) -> Option<Substitute> {
        find_substitute(catalog, stock, original, store_id)
    }
}

pub fn find_substitute(
    catalog: &Catalog,
    stock: &StockResolver<'_>,
    original: &ProductId,
    store_id: &StoreId,
) -> Option<Substitute> {
    let mut candidates: Vec<_> = catalog.substitutes_for(original).iter().collect();
    candidates.sort_by(|a, b| b.substitution_score.total_cmp(&a.substitution_score));

    for candidate in candidates {
        let Some(product) = catalog.product(&candidate.substitute_product_id) else {
            debug!(
                event_name = "substitutes.candidate_missing",
                original_product_id = %original,
                substitute_product_id = %candidate.substitute_product_id,
                "substitute candidate has no product record"
            );
            continue;
        };

        let report = stock.stock_status(&candidate.substitute_product_id, store_id);
        if report.status.is_available() {
            return Some(Substitute {
                product: product.clone(),
                substitution_reason: candidate.reason.clone(),
                substitution_score: candidate.substitution_score,
                substitution_type: candidate.kind.clone(),
                original_product_id: original.clone(),
            });
        }
    }

    None
}
