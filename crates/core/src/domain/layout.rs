use std::collections::{BTreeMap, HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

pub const DEFAULT_ENTRY_POINT: &str = "FRONT_DOOR";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLocation {
    pub product_id: ProductId,
    pub location_node: String,
}

/// Store layout document as stored on disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreLayout {
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
    #[serde(default)]
    pub layout_graph: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub product_locations: Vec<ProductLocation>,
}

fn default_entry_point() -> String {
    DEFAULT_ENTRY_POINT.to_string()
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self {
            entry_point: default_entry_point(),
            layout_graph: BTreeMap::new(),
            product_locations: Vec::new(),
        }
    }
}

/// Unweighted, undirected walking graph of a store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreGraph {
    adjacency: BTreeMap<String, Vec<String>>,
    locations: HashMap<ProductId, String>,
    entry_point: String,
}

impl Default for StoreGraph {
    fn default() -> Self {
        Self::from_layout(StoreLayout::default())
    }
}

impl StoreGraph {
    pub fn from_layout(layout: StoreLayout) -> Self {
        let mut adjacency: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (node, neighbors) in &layout.layout_graph {
            adjacency.entry(node.clone()).or_default();
            for neighbor in neighbors {
                link(&mut adjacency, node, neighbor);
                link(&mut adjacency, neighbor, node);
            }
        }

        let locations = layout
            .product_locations
            .into_iter()
            .map(|location| (location.product_id, location.location_node))
            .collect();

        Self { adjacency, locations, entry_point: layout.entry_point }
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn location_of(&self, product_id: &ProductId) -> Option<&str> {
        self.locations.get(product_id).map(String::as_str)
    }

    pub fn contains_node(&self, node: &str) -> bool {
        self.adjacency.contains_key(node)
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    /// Breadth-first hop counts from `start` to every node it can reach.
    /// `start` itself is always at distance zero, even when it is not part of
    /// the graph.
    pub fn hop_counts_from<'a>(&'a self, start: &'a str) -> HashMap<&'a str, u32> {
        let mut distances = HashMap::from([(start, 0)]);
        if !self.contains_node(start) {
            return distances;
        }

        let mut queue = VecDeque::from([(start, 0_u32)]);
        while let Some((node, distance)) = queue.pop_front() {
            for neighbor in self.adjacency.get(node).into_iter().flatten() {
                if !distances.contains_key(neighbor.as_str()) {
                    distances.insert(neighbor.as_str(), distance + 1);
                    queue.push_back((neighbor.as_str(), distance + 1));
                }
            }
        }

        distances
    }

    /// Shortest hop count between two nodes, `None` when disconnected.
    pub fn hop_count(&self, from: &str, to: &str) -> Option<u32> {
        if from == to {
            return Some(0);
        }
        self.hop_counts_from(from).get(to).copied()
    }
}

fn link(adjacency: &mut BTreeMap<String, Vec<String>>, from: &str, to: &str) {
    let neighbors = adjacency.entry(from.to_string()).or_default();
    if !neighbors.iter().any(|existing| existing == to) {
        neighbors.push(to.to_string());
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{StoreGraph, StoreLayout};

    fn graph(edges: &[(&str, &str)]) -> StoreGraph {
        let mut layout_graph: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (from, to) in edges {
            layout_graph.entry(from.to_string()).or_default().push(to.to_string());
        }
        StoreGraph::from_layout(StoreLayout { layout_graph, ..StoreLayout::default() })
    }

    #[test]
    fn one_directional_edges_are_walkable_both_ways() {
        let graph = graph(&[("FRONT_DOOR", "AISLE_1"), ("AISLE_1", "AISLE_2")]);

        assert_eq!(graph.hop_count("AISLE_2", "FRONT_DOOR"), Some(2));
        assert_eq!(graph.hop_count("FRONT_DOOR", "AISLE_2"), Some(2));
    }

    #[test]
    fn disconnected_and_unknown_nodes_are_unreachable() {
        let graph = graph(&[("FRONT_DOOR", "AISLE_1"), ("ISLAND", "LAGOON")]);

        assert_eq!(graph.hop_count("FRONT_DOOR", "ISLAND"), None);
        assert_eq!(graph.hop_count("FRONT_DOOR", "NOWHERE"), None);
        assert_eq!(graph.hop_count("NOWHERE", "FRONT_DOOR"), None);
        assert_eq!(graph.hop_count("NOWHERE", "NOWHERE"), Some(0));
    }

    #[test]
    fn layout_without_entry_point_uses_front_door() {
        let layout: StoreLayout =
            serde_json::from_str(r#"{"layout_graph":{"A":["B"]}}"#).expect("layout should parse");
        assert_eq!(StoreGraph::from_layout(layout).entry_point(), "FRONT_DOOR");
    }
}
