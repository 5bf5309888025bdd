//! Read-mostly reference data shared by every engine call.

pub mod loader;

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::deal::Deal;
use crate::domain::layout::{StoreGraph, StoreLayout};
use crate::domain::product::{Product, ProductId};
use crate::domain::purchase::PurchaseRecord;
use crate::domain::substitution::{SubstituteCandidate, SubstitutionRule};
use crate::engine::recommendations::{FbtRules, DEFAULT_MIN_SUPPORT};

pub use loader::{CatalogFiles, CatalogLoader, LoadedData, SourceOutcome, SourceStatus};

/// Immutable catalog context. Inventory is kept separately because it is the
/// only table that changes at runtime.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    products: HashMap<ProductId, Product>,
    product_order: Vec<ProductId>,
    substitutions: HashMap<ProductId, Vec<SubstituteCandidate>>,
    deals: Vec<Deal>,
    graph: StoreGraph,
    fbt: FbtRules,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub products: usize,
    pub substitution_rules: usize,
    pub deals: usize,
    pub active_deals: usize,
    pub layout_nodes: usize,
    pub product_locations: usize,
    pub fbt_rules: usize,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    pub fn product(&self, product_id: &ProductId) -> Option<&Product> {
        self.products.get(product_id)
    }

    /// Products in load order.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.product_order.iter().filter_map(|product_id| self.products.get(product_id))
    }

    pub fn substitutes_for(&self, product_id: &ProductId) -> &[SubstituteCandidate] {
        self.substitutions.get(product_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Deals in source order, inactive ones included.
    pub fn deals(&self) -> &[Deal] {
        &self.deals
    }

    pub fn graph(&self) -> &StoreGraph {
        &self.graph
    }

    pub fn fbt(&self) -> &FbtRules {
        &self.fbt
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            products: self.products.len(),
            substitution_rules: self.substitutions.len(),
            deals: self.deals.len(),
            active_deals: self.deals.iter().filter(|deal| deal.active).count(),
            layout_nodes: self.graph.node_count(),
            product_locations: self.graph.location_count(),
            fbt_rules: self.fbt.len(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CatalogBuilder {
    products: Vec<Product>,
    substitutions: Vec<SubstitutionRule>,
    deals: Vec<Deal>,
    layout: Option<StoreLayout>,
    fbt: Option<FbtRules>,
}

impl CatalogBuilder {
    pub fn products(mut self, products: Vec<Product>) -> Self {
        self.products = products;
        self
    }

    pub fn substitutions(mut self, substitutions: Vec<SubstitutionRule>) -> Self {
        self.substitutions = substitutions;
        self
    }

    pub fn deals(mut self, deals: Vec<Deal>) -> Self {
        self.deals = deals;
        self
    }

    pub fn layout(mut self, layout: StoreLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn purchases(mut self, purchases: &[PurchaseRecord], min_support: u32) -> Self {
        self.fbt = Some(FbtRules::build(purchases, min_support));
        self
    }

    pub fn build(self) -> Catalog {
        let mut products = HashMap::with_capacity(self.products.len());
        let mut product_order = Vec::with_capacity(self.products.len());
        for product in self.products {
            if !products.contains_key(&product.product_id) {
                product_order.push(product.product_id.clone());
            }
            products.insert(product.product_id.clone(), product);
        }

        let substitutions = self
            .substitutions
            .into_iter()
            .map(|rule| (rule.original_product_id, rule.substitutes))
            .collect();

        Catalog {
            products,
            product_order,
            substitutions,
            deals: self.deals,
            graph: self.layout.map(StoreGraph::from_layout).unwrap_or_default(),
            fbt: self.fbt.unwrap_or_else(|| FbtRules::build(&[], DEFAULT_MIN_SUPPORT)),
        }
    }
}
