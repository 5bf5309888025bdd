//! Frequently-bought-together recommendations mined from purchase history.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Catalog;
use crate::domain::product::ProductId;
use crate::domain::purchase::PurchaseRecord;

pub const DEFAULT_MIN_SUPPORT: u32 = 2;
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 3;
const RECOMMENDATION_REASON: &str = "Frequently bought with items on your list.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoPurchase {
    pub product_id: ProductId,
    pub count: u32,
}

/// Co-purchase counts per product, strongest association first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FbtRules {
    rules: HashMap<ProductId, Vec<CoPurchase>>,
}

impl FbtRules {
    pub fn build(purchases: &[PurchaseRecord], min_support: u32) -> Self {
        let mut invoices: BTreeMap<&str, BTreeSet<&ProductId>> = BTreeMap::new();
        for purchase in purchases {
            invoices.entry(purchase.invoice_id.as_str()).or_default().insert(&purchase.product_id);
        }

        let mut co_occurrences: HashMap<&ProductId, BTreeMap<&ProductId, u32>> = HashMap::new();
        for items in invoices.values() {
            for &left in items {
                for &right in items {
                    if left != right {
                        *co_occurrences.entry(left).or_default().entry(right).or_default() += 1;
                    }
                }
            }
        }

        let rules: HashMap<ProductId, Vec<CoPurchase>> = co_occurrences
            .into_iter()
            .map(|(product_id, related)| {
                let mut related: Vec<CoPurchase> = related
                    .into_iter()
                    .filter(|(_, count)| *count >= min_support)
                    .map(|(product_id, count)| CoPurchase { product_id: product_id.clone(), count })
                    .collect();
                related.sort_by(|left, right| right.count.cmp(&left.count));
                (product_id.clone(), related)
            })
            .collect();

        debug!(
            event_name = "recommendations.rules_built",
            rule_count = rules.len(),
            invoice_count = invoices.len(),
            "built frequently-bought-together rules"
        );

        Self { rules }
    }

    pub fn related(&self, product_id: &ProductId) -> &[CoPurchase] {
        self.rules.get(product_id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub product_id: ProductId,
    pub product_name: String,
    pub reason: String,
    pub score: u32,
}

/// Products most often bought alongside `list_ids`, excluding anything
/// already on the list or missing from the catalog.
pub fn recommend(catalog: &Catalog, list_ids: &[ProductId], limit: usize) -> Vec<Recommendation> {
    let on_list: BTreeSet<&ProductId> = list_ids.iter().collect();
    let mut scores: BTreeMap<&ProductId, u32> = BTreeMap::new();
    for product_id in list_ids {
        for related in catalog.fbt().related(product_id) {
            *scores.entry(&related.product_id).or_default() += related.count;
        }
    }

    let mut ranked: Vec<(&ProductId, u32)> = scores
        .into_iter()
        .filter(|(product_id, _)| !on_list.contains(product_id))
        .filter(|(product_id, _)| catalog.product(product_id).is_some())
        .collect();
    ranked.sort_by(|left, right| right.1.cmp(&left.1));

    ranked
        .into_iter()
        .take(limit)
        .filter_map(|(product_id, score)| {
            let product = catalog.product(product_id)?;
            Some(Recommendation {
                product_id: product_id.clone(),
                product_name: product.name.clone(),
                reason: RECOMMENDATION_REASON.to_string(),
                score,
            })
        })
        .collect()
}
