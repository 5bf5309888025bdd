pub mod deals;
pub mod enrichment;
pub mod navigation;
pub mod recommendations;
pub mod stock;
pub mod substitutes;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::domain::inventory::{InventoryTable, StoreId};
use crate::domain::list::ListItem;
use crate::domain::product::ProductId;

use self::{
    deals::{DealEngine, DealOutcome, PriorityDealEngine},
    enrichment::{AnnotatedLine, ResolvedLine},
    navigation::{GreedyPathOptimizer, PathOptimizer, RoutePlan},
    stock::{StockReport, StockResolver, StockThresholds},
    substitutes::{RankedSubstituteResolver, Substitute, SubstituteResolver},
};

/// Everything an engine call needs to know about one store.
#[derive(Clone, Copy, Debug)]
pub struct StoreContext<'a> {
    pub catalog: &'a Catalog,
    pub stock: StockResolver<'a>,
    pub store_id: &'a StoreId,
}

impl<'a> StoreContext<'a> {
    pub fn new(
        catalog: &'a Catalog,
        inventory: &'a InventoryTable,
        thresholds: StockThresholds,
        store_id: &'a StoreId,
    ) -> Self {
        Self { catalog, stock: StockResolver::new(inventory, thresholds), store_id }
    }

    pub fn stock_status(&self, product_id: &ProductId) -> StockReport {
        self.stock.stock_status(product_id, self.store_id)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListEvaluation {
    pub lines: Vec<AnnotatedLine>,
    pub pricing: DealOutcome,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedEvaluation {
    pub lines: Vec<ResolvedLine>,
    pub pricing: DealOutcome,
}

pub trait ListRuntime: Send + Sync {
    /// Stock and substitute annotation followed by deal pricing of the
    /// known lines.
    fn evaluate_list(&self, context: &StoreContext<'_>, items: &[ListItem]) -> ListEvaluation;

    /// Automatic substitution followed by deal pricing of the kept lines.
    fn resolve_list(&self, context: &StoreContext<'_>, items: &[ListItem]) -> ResolvedEvaluation;

    fn find_substitute(
        &self,
        context: &StoreContext<'_>,
        product_id: &ProductId,
    ) -> Option<Substitute>;

    fn price(&self, catalog: &Catalog, items: &[ListItem]) -> DealOutcome;

    fn plan_route(
        &self,
        catalog: &Catalog,
        items: &[ListItem],
        start_node: &str,
        checkout_node: &str,
    ) -> RoutePlan;
}

pub struct DeterministicListRuntime<S, D, P> {
    substitute_resolver: S,
    deal_engine: D,
    path_optimizer: P,
}

impl<S, D, P> DeterministicListRuntime<S, D, P> {
    pub fn new(substitute_resolver: S, deal_engine: D, path_optimizer: P) -> Self {
        Self { substitute_resolver, deal_engine, path_optimizer }
    }
}

impl Default
    for DeterministicListRuntime<RankedSubstituteResolver, PriorityDealEngine, GreedyPathOptimizer>
{
    fn default() -> Self {
        Self::new(RankedSubstituteResolver, PriorityDealEngine, GreedyPathOptimizer)
    }
}

impl<S, D, P> ListRuntime for DeterministicListRuntime<S, D, P>
where
    S: SubstituteResolver,
    D: DealEngine,
    P: PathOptimizer,
{
    fn evaluate_list(&self, context: &StoreContext<'_>, items: &[ListItem]) -> ListEvaluation {
        let lines = enrichment::annotate_list(context, &self.substitute_resolver, items);
        let priced: Vec<ListItem> = lines.iter().map(AnnotatedLine::as_list_item).collect();
        let pricing = self.deal_engine.price(context.catalog, &priced);

        ListEvaluation { lines, pricing }
    }

    fn resolve_list(&self, context: &StoreContext<'_>, items: &[ListItem]) -> ResolvedEvaluation {
        let lines = enrichment::resolve_list(context, &self.substitute_resolver, items);
        let priced: Vec<ListItem> = lines.iter().map(ResolvedLine::as_list_item).collect();
        let pricing = self.deal_engine.price(context.catalog, &priced);

        ResolvedEvaluation { lines, pricing }
    }

    fn find_substitute(
        &self,
        context: &StoreContext<'_>,
        product_id: &ProductId,
    ) -> Option<Substitute> {
        self.substitute_resolver.find_substitute(
            context.catalog,
            &context.stock,
            product_id,
            context.store_id,
        )
    }

    fn price(&self, catalog: &Catalog, items: &[ListItem]) -> DealOutcome {
        self.deal_engine.price(catalog, items)
    }

    fn plan_route(
        &self,
        catalog: &Catalog,
        items: &[ListItem],
        start_node: &str,
        checkout_node: &str,
    ) -> RoutePlan {
        navigation::plan_route_with(&self.path_optimizer, catalog, items, start_node, checkout_node)
    }
}
