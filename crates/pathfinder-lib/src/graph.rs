//! Range-bounded, cost-weighted station graph.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::geo::Coordinate;
use crate::price::Price;
use crate::vehicle::Vehicle;

/// Identity of a graph node: one of the two virtual route endpoints or a
/// station from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeId {
    Start,
    End,
    Station(i64),
}

impl NodeId {
    pub fn is_virtual(&self) -> bool {
        matches!(self, NodeId::Start | NodeId::End)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Start => write!(f, "start"),
            NodeId::End => write!(f, "end"),
            NodeId::Station(id) => write!(f, "station {id}"),
        }
    }
}

/// A candidate refuelling point (or a virtual endpoint) for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct StationNode {
    pub id: NodeId,
    pub name: String,
    pub coordinate: Coordinate,
    pub price: Price,
}

impl StationNode {
    /// Virtual node at `coordinate` priced at `price`.
    pub fn virtual_node(id: NodeId, coordinate: Coordinate, price: Price) -> Self {
        let name = match id {
            NodeId::Start => "Start",
            NodeId::End => "End",
            NodeId::Station(_) => "Station",
        };
        Self {
            id,
            name: name.to_string(),
            coordinate,
            price,
        }
    }
}

/// Directed graph: node → (neighbour → leg cost).
///
/// Neighbours are kept in a `BTreeMap` so iteration order, and therefore
/// tie-breaking during search, is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    adjacency: HashMap<NodeId, BTreeMap<NodeId, Decimal>>,
}

impl Graph {
    /// Build a graph from explicit adjacency. Nodes that only appear as
    /// neighbours are added as keys with no outgoing edges.
    pub fn from_adjacency(adjacency: HashMap<NodeId, BTreeMap<NodeId, Decimal>>) -> Self {
        let mut adjacency = adjacency;
        let targets: Vec<NodeId> = adjacency
            .values()
            .flat_map(|edges| edges.keys().copied())
            .collect();
        for target in targets {
            adjacency.entry(target).or_default();
        }
        Self { adjacency }
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.adjacency.contains_key(&node)
    }

    /// Outgoing edges of `node` with their costs.
    pub fn neighbours(&self, node: NodeId) -> impl Iterator<Item = (NodeId, Decimal)> + '_ {
        self.adjacency
            .get(&node)
            .into_iter()
            .flat_map(|edges| edges.iter().map(|(id, cost)| (*id, *cost)))
    }

    pub fn edge_cost(&self, from: NodeId, to: NodeId) -> Option<Decimal> {
        self.adjacency.get(&from)?.get(&to).copied()
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeMap::len).sum()
    }
}

/// Connect every ordered pair of nodes that a single tank can cover.
///
/// Edge cost is `(distance / mpg) * price(from)`: fuel for a leg is bought at
/// the departure node.
pub fn build_graph(nodes: &[StationNode], vehicle: &Vehicle) -> Graph {
    let mut adjacency: HashMap<NodeId, BTreeMap<NodeId, Decimal>> =
        HashMap::with_capacity(nodes.len());

    for from in nodes {
        let edges = adjacency.entry(from.id).or_default();
        for to in nodes {
            if from.id == to.id {
                continue;
            }
            let distance = from.coordinate.distance_to(&to.coordinate);
            if vehicle.can_reach(distance) {
                edges.insert(to.id, vehicle.leg_cost(distance, from.price));
            }
        }
    }

    let graph = Graph { adjacency };
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        max_range_miles = vehicle.max_range_miles,
        "built station graph"
    );
    graph
}
