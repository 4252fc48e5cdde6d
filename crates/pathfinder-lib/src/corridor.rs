//! Candidate station lookup along a route corridor.

use tracing::debug;

use crate::error::Result;
use crate::geo::{Coordinate, METERS_PER_MILE};
use crate::graph::{NodeId, StationNode};
use crate::price::Price;

/// A fuel station as returned by a [`StationStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    pub id: i64,
    pub name: String,
    pub price: Price,
    /// Missing when the station was ingested without geocoding.
    pub coordinate: Option<Coordinate>,
}

/// Spatial query over the station dataset.
pub trait StationStore: Send + Sync {
    /// Stations whose distance to the polyline `path` is at most
    /// `distance_meters`.
    fn stations_within(&self, path: &[Coordinate], distance_meters: f64)
        -> Result<Vec<StationRecord>>;
}

/// Stations within `corridor_miles` of `path`, as graph nodes.
///
/// Records without a coordinate are dropped. Store errors propagate.
pub fn find_corridor_stations(
    store: &dyn StationStore,
    path: &[Coordinate],
    corridor_miles: f64,
) -> Result<Vec<StationNode>> {
    let records = store.stations_within(path, corridor_miles * METERS_PER_MILE)?;
    let total = records.len();
    let nodes: Vec<StationNode> = records
        .into_iter()
        .filter_map(|record| {
            let coordinate = record.coordinate?;
            Some(StationNode {
                id: NodeId::Station(record.id),
                name: record.name,
                coordinate,
                price: record.price,
            })
        })
        .collect();
    debug!(
        stations = nodes.len(),
        dropped = total - nodes.len(),
        corridor_miles,
        "found corridor stations"
    );
    Ok(nodes)
}
