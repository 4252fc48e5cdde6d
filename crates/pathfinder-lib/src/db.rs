//! SQLite-backed station and route stores.
//!
//! Both stores can share one database file. Each owns its own connection
//! behind a `Mutex` so the stores are `Send + Sync` and can be handed to a
//! [`RoutePlanner`](crate::RoutePlanner) behind `Arc`.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use tracing::{debug, warn};

use crate::corridor::{StationRecord, StationStore};
use crate::error::{Error, Result};
use crate::geo::{distance_to_path_miles, expanded_bounds, Coordinate, METERS_PER_MILE};
use crate::price::Price;
use crate::routing::{RoutePlan, RouteStore};

const STATIONS_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS fuel_stations (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    address TEXT NOT NULL DEFAULT '',
    city TEXT NOT NULL DEFAULT '',
    state TEXT NOT NULL DEFAULT '',
    price TEXT NOT NULL,
    lon REAL,
    lat REAL
);
CREATE INDEX IF NOT EXISTS fuel_stations_lon_lat ON fuel_stations (lon, lat);
";

const ROUTES_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS routes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    start_lon REAL NOT NULL,
    start_lat REAL NOT NULL,
    end_lon REAL NOT NULL,
    end_lat REAL NOT NULL,
    geometry TEXT NOT NULL,
    fuel_stops TEXT NOT NULL,
    total_cost TEXT NOT NULL,
    route_json TEXT NOT NULL,
    created_at TEXT NOT NULL
);
";

/// A station row to insert into the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStation {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub price: Price,
    pub coordinate: Option<Coordinate>,
}

impl NewStation {
    pub fn new(name: impl Into<String>, price: Price, coordinate: Option<Coordinate>) -> Self {
        Self {
            name: name.into(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            price,
            coordinate,
        }
    }
}

/// Station dataset in a `fuel_stations` table.
#[derive(Debug)]
pub struct SqliteStationStore {
    connection: Mutex<Connection>,
}

impl SqliteStationStore {
    /// Open (creating if needed) the station table in the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> Result<Self> {
        connection.execute_batch(STATIONS_SCHEMA)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn connection(&self) -> MutexGuard<'_, Connection> {
        self.connection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert `station`, returning its row id.
    pub fn insert_station(&self, station: &NewStation) -> Result<i64> {
        let connection = self.connection();
        connection.execute(
            "INSERT INTO fuel_stations (name, address, city, state, price, lon, lat)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                station.name,
                station.address,
                station.city,
                station.state,
                station.price.to_string(),
                station.coordinate.map(|c| c.lon),
                station.coordinate.map(|c| c.lat),
            ],
        )?;
        Ok(connection.last_insert_rowid())
    }

    pub fn station_count(&self) -> Result<usize> {
        let count: i64 =
            self.connection()
                .query_row("SELECT COUNT(*) FROM fuel_stations", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

impl StationStore for SqliteStationStore {
    fn stations_within(
        &self,
        path: &[Coordinate],
        distance_meters: f64,
    ) -> Result<Vec<StationRecord>> {
        let corridor_miles = distance_meters / METERS_PER_MILE;
        let Some((min_lon, min_lat, max_lon, max_lat)) = expanded_bounds(path, corridor_miles)
        else {
            return Ok(Vec::new());
        };

        let connection = self.connection();
        let mut stmt = connection.prepare(
            "SELECT id, name, price, lon, lat FROM fuel_stations
             WHERE lon IS NOT NULL AND lat IS NOT NULL
               AND lon BETWEEN ?1 AND ?3 AND lat BETWEEN ?2 AND ?4
             ORDER BY id",
        )?;
        let rows = stmt.query_map(params![min_lon, min_lat, max_lon, max_lat], row_to_candidate)?;

        let mut prefiltered = 0usize;
        let mut stations = Vec::new();
        for row in rows {
            let (id, name, raw_price, coordinate) = row?;
            prefiltered += 1;
            if distance_to_path_miles(coordinate, path) > corridor_miles {
                continue;
            }
            match raw_price.parse::<Price>() {
                Ok(price) => stations.push(StationRecord {
                    id,
                    name,
                    price,
                    coordinate: Some(coordinate),
                }),
                Err(err) => warn!(station = id, error = %err, "skipping station with unusable price"),
            }
        }

        debug!(
            prefiltered,
            stations = stations.len(),
            corridor_miles,
            "queried corridor stations"
        );
        Ok(stations)
    }
}

fn row_to_candidate(row: &Row<'_>) -> rusqlite::Result<(i64, String, String, Coordinate)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        Coordinate::new(row.get(3)?, row.get(4)?),
    ))
}

/// A persisted route plan.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRoute {
    pub id: i64,
    pub start: Coordinate,
    pub end: Coordinate,
    /// Full plan, including geometry, stops and totals.
    pub plan: RoutePlan,
    pub created_at: DateTime<Utc>,
}

/// Route history in a `routes` table.
#[derive(Debug)]
pub struct SqliteRouteStore {
    connection: Mutex<Connection>,
}

impl SqliteRouteStore {
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> Result<Self> {
        connection.execute_batch(ROUTES_SCHEMA)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn connection(&self) -> MutexGuard<'_, Connection> {
        self.connection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Most recent routes first.
    pub fn recent_routes(&self, limit: usize) -> Result<Vec<StoredRoute>> {
        let connection = self.connection();
        let mut stmt = connection.prepare(
            "SELECT id, start_lon, start_lat, end_lon, end_lat, route_json, created_at
             FROM routes ORDER BY id DESC LIMIT ?1",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map([limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                Coordinate::new(row.get(1)?, row.get(2)?),
                Coordinate::new(row.get(3)?, row.get(4)?),
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut routes = Vec::new();
        for row in rows {
            let (id, start, end, route_json, created_at) = row?;
            let plan: RoutePlan =
                serde_json::from_str(&route_json).map_err(|err| Error::CorruptRoute {
                    id,
                    message: err.to_string(),
                })?;
            let created_at = DateTime::parse_from_rfc3339(&created_at)
                .map_err(|err| Error::CorruptRoute {
                    id,
                    message: format!("invalid timestamp: {err}"),
                })?
                .with_timezone(&Utc);
            routes.push(StoredRoute {
                id,
                start,
                end,
                plan,
                created_at,
            });
        }
        Ok(routes)
    }
}

impl RouteStore for SqliteRouteStore {
    fn save(&self, start: Coordinate, end: Coordinate, plan: &RoutePlan) -> Result<()> {
        let geometry: Vec<[f64; 2]> = plan.geometry.iter().map(|c| c.to_pair()).collect();
        let route_json = serde_json::to_string(plan)?;
        let created_at = Utc::now().to_rfc3339();

        let connection = self.connection();
        connection.execute(
            "INSERT INTO routes
                (start_lon, start_lat, end_lon, end_lat, geometry, fuel_stops, total_cost, route_json, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                start.lon,
                start.lat,
                end.lon,
                end.lat,
                serde_json::to_string(&geometry)?,
                serde_json::to_string(&plan.fuel_stops)?,
                plan.total_cost.to_string(),
                route_json,
                created_at,
            ],
        )?;
        debug!(id = connection.last_insert_rowid(), "saved route plan");
        Ok(())
    }
}
