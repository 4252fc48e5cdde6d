//! Least-cost path search over a [`Graph`].

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use rust_decimal::Decimal;
use tracing::debug;

use crate::graph::{Graph, NodeId};

/// Cheapest path from `start` to `end` by summed edge cost (Dijkstra).
///
/// Returns the node sequence including both endpoints, `[start]` when they
/// coincide, or an empty vector when `end` is unreachable.
pub fn find_cheapest_path(graph: &Graph, start: NodeId, end: NodeId) -> Vec<NodeId> {
    if start == end {
        return vec![start];
    }

    let mut costs: HashMap<NodeId, Decimal> = HashMap::new();
    let mut parents: HashMap<NodeId, NodeId> = HashMap::new();
    let mut queue = BinaryHeap::new();

    costs.insert(start, Decimal::ZERO);
    queue.push(QueueEntry::new(start, Decimal::ZERO));

    while let Some(entry) = queue.pop() {
        match costs.get(&entry.node) {
            Some(best) if *best < entry.cost => continue,
            Some(_) => {}
            None => continue,
        }

        if entry.node == end {
            let path = reconstruct_path(&parents, start, end);
            debug!(hops = path.len().saturating_sub(1), cost = %entry.cost, "found cheapest path");
            return path;
        }

        for (next, edge_cost) in graph.neighbours(entry.node) {
            let next_cost = entry.cost + edge_cost;
            let improves = !matches!(costs.get(&next), Some(known) if *known <= next_cost);
            if improves {
                costs.insert(next, next_cost);
                parents.insert(next, entry.node);
                queue.push(QueueEntry::new(next, next_cost));
            }
        }
    }

    debug!(%start, %end, "destination unreachable");
    Vec::new()
}

fn reconstruct_path(parents: &HashMap<NodeId, NodeId>, start: NodeId, end: NodeId) -> Vec<NodeId> {
    let mut path = vec![end];
    let mut current = end;
    while current != start {
        match parents.get(&current) {
            Some(parent) => {
                current = *parent;
                path.push(current);
            }
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueueEntry {
    node: NodeId,
    cost: Decimal,
}

impl QueueEntry {
    fn new(node: NodeId, cost: Decimal) -> Self {
        Self { node, cost }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
