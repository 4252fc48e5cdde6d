//! Shared fakes and fixture builders for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use pathfinder_lib::geo::distance_to_path_miles;
use pathfinder_lib::geo::METERS_PER_MILE;
use pathfinder_lib::{
    Coordinate, DirectionsProvider, Error, NodeId, Price, Result, RoutePlan, RouteStore,
    StationNode, StationRecord, StationStore,
};

pub fn price(raw: &str) -> Price {
    raw.parse().expect("valid price")
}

/// Station record at `(lon, lat)`.
#[allow(dead_code)]
pub fn station(id: i64, lon: f64, lat: f64, raw_price: &str) -> StationRecord {
    StationRecord {
        id,
        name: format!("Station {id}"),
        price: price(raw_price),
        coordinate: Some(Coordinate::new(lon, lat)),
    }
}

/// Graph node for a station at `(lon, lat)`.
#[allow(dead_code)]
pub fn node(id: i64, lon: f64, lat: f64, raw_price: &str) -> StationNode {
    StationNode {
        id: NodeId::Station(id),
        name: format!("Station {id}"),
        coordinate: Coordinate::new(lon, lat),
        price: price(raw_price),
    }
}

/// Directions provider that drives in a straight line.
#[allow(dead_code)]
#[derive(Default)]
pub struct StraightLineDirections {
    pub calls: AtomicUsize,
}

impl DirectionsProvider for StraightLineDirections {
    fn name(&self) -> &str {
        "straight-line"
    }

    fn route(&self, start: Coordinate, end: Coordinate) -> Result<Vec<Coordinate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![start, end])
    }
}

/// Directions provider that always fails.
#[allow(dead_code)]
pub struct FailingDirections;

impl DirectionsProvider for FailingDirections {
    fn name(&self) -> &str {
        "failing"
    }

    fn route(&self, _start: Coordinate, _end: Coordinate) -> Result<Vec<Coordinate>> {
        Err(Error::Provider {
            provider: "failing".to_string(),
            message: "HTTP 503 Service Unavailable".to_string(),
        })
    }
}

/// In-memory station store applying the same corridor rule as SQLite.
#[allow(dead_code)]
#[derive(Default)]
pub struct VecStationStore {
    pub records: Vec<StationRecord>,
}

impl VecStationStore {
    #[allow(dead_code)]
    pub fn new(records: Vec<StationRecord>) -> Self {
        Self { records }
    }
}

impl StationStore for VecStationStore {
    fn stations_within(
        &self,
        path: &[Coordinate],
        distance_meters: f64,
    ) -> Result<Vec<StationRecord>> {
        let miles = distance_meters / METERS_PER_MILE;
        Ok(self
            .records
            .iter()
            .filter(|record| match record.coordinate {
                Some(c) => distance_to_path_miles(c, path) <= miles,
                None => true,
            })
            .cloned()
            .collect())
    }
}

/// Route store that keeps saved plans in memory.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingRouteStore {
    pub saved: Mutex<Vec<(Coordinate, Coordinate, RoutePlan)>>,
}

impl RouteStore for RecordingRouteStore {
    fn save(&self, start: Coordinate, end: Coordinate, plan: &RoutePlan) -> Result<()> {
        self.saved
            .lock()
            .expect("route store lock")
            .push((start, end, plan.clone()));
        Ok(())
    }
}

/// Route store whose writes always fail.
#[allow(dead_code)]
pub struct BrokenRouteStore;

impl RouteStore for BrokenRouteStore {
    fn save(&self, _start: Coordinate, _end: Coordinate, _plan: &RoutePlan) -> Result<()> {
        Err(Error::Io(std::io::Error::other("disk full")))
    }
}
