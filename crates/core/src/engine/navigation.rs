//! Greedy nearest-neighbour pickup ordering over the store graph.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::Catalog;
use crate::domain::layout::StoreGraph;
use crate::domain::list::ListItem;
use crate::domain::product::ProductId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteStop {
    pub product_id: ProductId,
    pub quantity: u32,
    pub location_node: String,
    pub product_name: String,
    pub category: String,
    pub price: Decimal,
    /// Hops from the previous stop, or from the start node for the first.
    pub hops: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePlan {
    pub start_node: String,
    pub stops: Vec<RouteStop>,
    pub total_hops: u32,
    pub unrouted: Vec<ProductId>,
    pub checkout_node: String,
    pub checkout_hops: Option<u32>,
}

pub trait PathOptimizer: Send + Sync {
    fn optimize(&self, catalog: &Catalog, items: &[ListItem], start_node: &str) -> Vec<RouteStop>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GreedyPathOptimizer;

impl PathOptimizer for GreedyPathOptimizer {
    fn optimize(&self, catalog: &Catalog, items: &[ListItem], start_node: &str) -> Vec<RouteStop> {
        optimize_path(catalog, items, start_node)
    }
}

pub fn optimize_path(catalog: &Catalog, items: &[ListItem], start_node: &str) -> Vec<RouteStop> {
    let graph = catalog.graph();
    let mut remaining: Vec<RouteStop> = Vec::with_capacity(items.len());

    for item in items {
        let located = graph
            .location_of(&item.product_id)
            .and_then(|node| catalog.product(&item.product_id).map(|product| (node, product)));
        let Some((node, product)) = located else {
            warn!(
                event_name = "navigation.item_unlocated",
                product_id = %item.product_id,
                "product has no known location; skipping for routing"
            );
            continue;
        };

        remaining.push(RouteStop {
            product_id: item.product_id.clone(),
            quantity: item.quantity,
            location_node: node.to_string(),
            product_name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            hops: 0,
        });
    }

    let mut stops = Vec::with_capacity(remaining.len());
    let mut current = start_node.to_string();

    while !remaining.is_empty() {
        let Some((index, cost)) = closest_stop(graph, &current, &remaining) else {
            warn!(
                event_name = "navigation.unreachable_items",
                from = %current,
                remaining = remaining.len(),
                "no path to any remaining item; returning partial route"
            );
            break;
        };

        let mut stop = remaining.remove(index);
        stop.hops = cost;
        current = stop.location_node.clone();
        stops.push(stop);
    }

    stops
}

/// Routes the list with the greedy optimizer and adds the walk to checkout.
pub fn plan_route(
    catalog: &Catalog,
    items: &[ListItem],
    start_node: &str,
    checkout_node: &str,
) -> RoutePlan {
    plan_route_with(&GreedyPathOptimizer, catalog, items, start_node, checkout_node)
}

pub fn plan_route_with<P>(
    optimizer: &P,
    catalog: &Catalog,
    items: &[ListItem],
    start_node: &str,
    checkout_node: &str,
) -> RoutePlan
where
    P: PathOptimizer + ?Sized,
{
    let stops = optimizer.optimize(catalog, items, start_node);
    let unrouted = unrouted_items(items, &stops);

    let last_node = stops.last().map_or(start_node, |stop| stop.location_node.as_str());
    let checkout_hops = catalog.graph().hop_count(last_node, checkout_node);
    if checkout_hops.is_none() {
        warn!(
            event_name = "navigation.checkout_unreachable",
            from = last_node,
            checkout_node,
            "no path to checkout from the last stop"
        );
    }

    RoutePlan {
        start_node: start_node.to_string(),
        total_hops: stops.iter().map(|stop| stop.hops).sum(),
        stops,
        unrouted,
        checkout_node: checkout_node.to_string(),
        checkout_hops,
    }
}

/// List entries with no matching stop, in list order. Each stop accounts
/// for one entry.
fn unrouted_items(items: &[ListItem], stops: &[RouteStop]) -> Vec<ProductId> {
    let mut matched = vec![false; stops.len()];
    let mut unrouted = Vec::new();
    for item in items {
        let slot = (0..stops.len())
            .find(|&index| !matched[index] && stops[index].product_id == item.product_id);
        match slot {
            Some(index) => matched[index] = true,
            None => unrouted.push(item.product_id.clone()),
        }
    }
    unrouted
}

/// First remaining stop with the strictly lowest hop count from `current`.
fn closest_stop(
    graph: &StoreGraph,
    current: &str,
    remaining: &[RouteStop],
) -> Option<(usize, u32)> {
    let distances = graph.hop_counts_from(current);

    let mut closest: Option<(usize, u32)> = None;
    for (index, candidate) in remaining.iter().enumerate() {
        let Some(&cost) = distances.get(candidate.location_node.as_str()) else {
            continue;
        };
        if closest.map_or(true, |(_, best)| cost < best) {
            closest = Some((index, cost));
        }
    }
    closest
}
