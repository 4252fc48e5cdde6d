//! Route orchestration: directions, corridor stations, graph, search, totals.

mod plan;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{Config, DEFAULT_CORRIDOR_MILES};
use crate::corridor::{find_corridor_stations, StationStore};
use crate::directions::DirectionsProvider;
use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::geocode::GeocodeResolver;
use crate::graph::{build_graph, NodeId, StationNode};
use crate::path::find_cheapest_path;
use crate::price::Price;
use crate::vehicle::Vehicle;

pub use plan::{FuelStop, RoutePlan, TOTALS_SCALE};

/// Persistence collaborator for computed plans.
pub trait RouteStore: Send + Sync {
    fn save(&self, start: Coordinate, end: Coordinate, plan: &RoutePlan) -> Result<()>;
}

/// Computes fuel-optimised plans from injected collaborators.
///
/// A planner holds no per-request state and can be shared behind an `Arc`.
pub struct RoutePlanner {
    directions: Arc<dyn DirectionsProvider>,
    stations: Arc<dyn StationStore>,
    vehicle: Vehicle,
    corridor_miles: f64,
    route_store: Option<Arc<dyn RouteStore>>,
}

impl RoutePlanner {
    pub fn new(
        directions: Arc<dyn DirectionsProvider>,
        stations: Arc<dyn StationStore>,
        vehicle: Vehicle,
    ) -> Self {
        Self {
            directions,
            stations,
            vehicle,
            corridor_miles: DEFAULT_CORRIDOR_MILES,
            route_store: None,
        }
    }

    /// Planner using the vehicle and corridor from `config`.
    pub fn from_config(
        config: &Config,
        directions: Arc<dyn DirectionsProvider>,
        stations: Arc<dyn StationStore>,
    ) -> Self {
        Self::new(directions, stations, config.vehicle).with_corridor_miles(config.corridor_miles)
    }

    pub fn with_corridor_miles(mut self, corridor_miles: f64) -> Self {
        self.corridor_miles = corridor_miles;
        self
    }

    pub fn with_route_store(mut self, store: Arc<dyn RouteStore>) -> Self {
        self.route_store = Some(store);
        self
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    /// Compute the cheapest refuelling plan from `start` to `end`.
    pub fn compute_route(&self, start: Coordinate, end: Coordinate) -> Result<RoutePlan> {
        // Step 1: Fetch the driving geometry
        let geometry = self.directions.route(start, end)?;
        debug!(
            provider = self.directions.name(),
            points = geometry.len(),
            "received route geometry"
        );

        // Step 2: Collect candidate stations along the corridor
        let candidates =
            find_corridor_stations(self.stations.as_ref(), &geometry, self.corridor_miles)?;

        // Step 3: Price the virtual endpoints from the station nearest the start
        let baseline = baseline_price(&candidates, start);

        // Step 4: Assemble the node set
        let mut nodes = Vec::with_capacity(candidates.len() + 2);
        nodes.push(StationNode::virtual_node(NodeId::Start, start, baseline));
        nodes.push(StationNode::virtual_node(NodeId::End, end, baseline));
        nodes.extend(candidates);

        // Step 5: Build the range-bounded graph
        let graph = build_graph(&nodes, &self.vehicle);

        // Step 6: Decide between a single tank and a refuelling search
        let direct_distance = start.distance_to(&end);
        let route = if self.vehicle.can_reach(direct_distance) {
            debug!(direct_miles = direct_distance, "trip fits in one tank; skipping search");
            vec![NodeId::Start, NodeId::End]
        } else {
            let route = find_cheapest_path(&graph, NodeId::Start, NodeId::End);
            if route.is_empty() {
                return Err(Error::NoFeasibleRoute {
                    direct_miles: direct_distance,
                    max_range_miles: self.vehicle.max_range_miles,
                });
            }
            route
        };

        // Step 7: Compute totals over the chosen legs
        let by_id: HashMap<NodeId, &StationNode> = nodes.iter().map(|n| (n.id, n)).collect();
        let chosen: Vec<&StationNode> = route.iter().filter_map(|id| by_id.get(id).copied()).collect();
        let plan = RoutePlan::from_nodes(geometry, &chosen, &self.vehicle, direct_distance);
        info!(
            stops = plan.fuel_stops.len(),
            total_cost = %plan.total_cost,
            gallons = %plan.gallons,
            direct_miles = direct_distance,
            "computed route plan"
        );

        // Step 8: Persist when a store is attached
        if let Some(store) = &self.route_store {
            if let Err(err) = store.save(start, end, &plan) {
                warn!(error = %err, "failed to persist route plan");
            }
        }

        Ok(plan)
    }

    /// Geocode both addresses, then compute the route between them.
    pub fn compute_route_between_addresses(
        &self,
        resolver: &GeocodeResolver,
        start: &str,
        end: &str,
    ) -> Result<RoutePlan> {
        let resolve = |address: &str| {
            resolver
                .resolve(address)
                .ok_or_else(|| Error::AddressNotFound {
                    address: address.to_string(),
                })
        };
        let start = resolve(start)?;
        let end = resolve(end)?;
        self.compute_route(start, end)
    }
}

/// Price of the candidate nearest to `start`, or the fixed fallback.
fn baseline_price(candidates: &[StationNode], start: Coordinate) -> Price {
    candidates
        .iter()
        .min_by(|a, b| {
            a.coordinate
                .distance_to(&start)
                .total_cmp(&b.coordinate.distance_to(&start))
        })
        .map(|nearest| nearest.price)
        .unwrap_or_else(Price::fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_uses_nearest_candidate() {
        let start = Coordinate::new(0.0, 0.0);
        let far = StationNode {
            id: NodeId::Station(1),
            name: "Far".to_string(),
            coordinate: Coordinate::new(2.0, 0.0),
            price: "2.000".parse().unwrap(),
        };
        let near = StationNode {
            id: NodeId::Station(2),
            name: "Near".to_string(),
            coordinate: Coordinate::new(0.1, 0.0),
            price: "4.250".parse().unwrap(),
        };
        assert_eq!(baseline_price(&[far, near], start).to_string(), "4.250");
        assert_eq!(baseline_price(&[], start), Price::fallback());
    }
}
