//! Pathfinder library entry points.
//!
//! This crate plans fuel-optimised driving routes: it resolves addresses,
//! fetches driving geometry from an external directions provider, collects
//! fuel stations along the route corridor, and searches a range-bounded
//! station graph for the cheapest refuelling sequence. Higher-level consumers
//! (the CLI) should only depend on the items exported here.
//!

#![deny(warnings)]

pub mod cache;
pub mod config;
pub mod corridor;
pub mod db;
pub mod directions;
pub mod error;
pub mod geo;
pub mod geocode;
pub mod graph;
pub mod http;
pub mod path;
pub mod price;
pub mod routing;
pub mod vehicle;

pub use cache::{cache_key, GeocodeCache, JsonFileGeocodeCache, MemoryGeocodeCache, GEOCODE_TTL};
pub use config::Config;
pub use corridor::{find_corridor_stations, StationRecord, StationStore};
pub use db::{NewStation, SqliteRouteStore, SqliteStationStore, StoredRoute};
pub use directions::{directions_from_config, DirectionsProvider};
pub use error::{Error, Result};
pub use geo::{haversine_miles, Coordinate};
pub use geocode::{GeocodeProvider, GeocodeResolver};
pub use graph::{build_graph, Graph, NodeId, StationNode};
pub use http::{build_client, HttpClient};
pub use path::find_cheapest_path;
pub use price::Price;
pub use routing::{FuelStop, RoutePlan, RoutePlanner, RouteStore};
pub use vehicle::Vehicle;
