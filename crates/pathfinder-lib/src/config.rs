//! Environment-driven configuration.
//!
//! Every setting has a default so the library works with nothing but a
//! provider key exported. Tests build configurations through
//! [`Config::from_lookup`] instead of mutating the process environment, which
//! keeps them safe to run in parallel.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::vehicle::Vehicle;

pub const MAPBOX_API_KEY_ENV: &str = "MAPBOX_API_KEY";
pub const ORS_API_KEY_ENV: &str = "ORS_API_KEY";
pub const CACHE_DIR_ENV: &str = "PATHFINDER_CACHE_DIR";

const DEFAULT_MAPBOX_DIRECTIONS_URL: &str = "https://api.mapbox.com/directions/v5/mapbox/driving";
const DEFAULT_ORS_DIRECTIONS_URL: &str =
    "https://api.openrouteservice.org/v2/directions/driving-car";
const DEFAULT_MAPBOX_GEOCODING_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";
const DEFAULT_ORS_GEOCODING_URL: &str = "https://api.openrouteservice.org/geocode/search";

/// Width of the station search corridor around a route when not configured.
pub const DEFAULT_CORRIDOR_MILES: f64 = 25.0;

/// Credentials and endpoints for a single external provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoint {
    pub api_key: String,
    pub url: String,
}

/// Runtime configuration consumed by the routing core.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub mapbox_api_key: Option<String>,
    pub ors_api_key: Option<String>,
    pub mapbox_directions_base_url: String,
    pub ors_directions_url: String,
    pub mapbox_geocoding_base_url: String,
    pub ors_geocoding_url: String,
    pub mapbox_geocode_max_attempts: u32,
    pub ors_geocode_max_attempts: u32,
    pub http_timeout: Duration,
    pub vehicle: Vehicle,
    pub corridor_miles: f64,
    /// Whether the station ingest collaborator geocodes rows without coordinates.
    /// Not read by the routing core itself.
    pub ingest_geocode: bool,
    pub cache_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mapbox_api_key: None,
            ors_api_key: None,
            mapbox_directions_base_url: DEFAULT_MAPBOX_DIRECTIONS_URL.to_string(),
            ors_directions_url: DEFAULT_ORS_DIRECTIONS_URL.to_string(),
            mapbox_geocoding_base_url: DEFAULT_MAPBOX_GEOCODING_URL.to_string(),
            ors_geocoding_url: DEFAULT_ORS_GEOCODING_URL.to_string(),
            mapbox_geocode_max_attempts: 2,
            ors_geocode_max_attempts: 2,
            http_timeout: Duration::from_secs(10),
            vehicle: Vehicle::default(),
            corridor_miles: DEFAULT_CORRIDOR_MILES,
            ingest_geocode: true,
            cache_dir: None,
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mpg: Decimal = parse_or(&get, "VEHICLE_MPG", defaults.vehicle.mpg)?;
        let max_range: f64 = parse_or(
            &get,
            "VEHICLE_MAX_RANGE_MILES",
            defaults.vehicle.max_range_miles,
        )?;
        let vehicle = Vehicle::new(mpg, max_range)?;

        let corridor_miles: f64 = parse_or(&get, "CORRIDOR_MILES", defaults.corridor_miles)?;
        if !corridor_miles.is_finite() || corridor_miles <= 0.0 {
            return Err(Error::InvalidConfig {
                key: "CORRIDOR_MILES".to_string(),
                message: format!("must be a positive number, got {corridor_miles}"),
            });
        }

        let timeout_secs: u64 = parse_or(
            &get,
            "HTTP_TIMEOUT_SECONDS",
            defaults.http_timeout.as_secs(),
        )?;

        Ok(Self {
            mapbox_api_key: get(MAPBOX_API_KEY_ENV),
            ors_api_key: get(ORS_API_KEY_ENV),
            mapbox_directions_base_url: get("MAPBOX_DIRECTIONS_BASE_URL")
                .unwrap_or(defaults.mapbox_directions_base_url),
            ors_directions_url: get("ORS_DIRECTIONS_URL").unwrap_or(defaults.ors_directions_url),
            mapbox_geocoding_base_url: get("MAPBOX_GEOCODING_BASE_URL")
                .unwrap_or(defaults.mapbox_geocoding_base_url),
            ors_geocoding_url: get("ORS_GEOCODING_URL").unwrap_or(defaults.ors_geocoding_url),
            mapbox_geocode_max_attempts: parse_or(
                &get,
                "MAPBOX_GEOCODE_MAX_ATTEMPTS",
                defaults.mapbox_geocode_max_attempts,
            )?
            .max(1),
            ors_geocode_max_attempts: parse_or(
                &get,
                "ORS_GEOCODE_MAX_ATTEMPTS",
                defaults.ors_geocode_max_attempts,
            )?
            .max(1),
            http_timeout: Duration::from_secs(timeout_secs.max(1)),
            vehicle,
            corridor_miles,
            ingest_geocode: parse_bool_or(&get, "INGEST_GEOCODE", defaults.ingest_geocode)?,
            cache_dir: get(CACHE_DIR_ENV).map(PathBuf::from),
        })
    }

    /// Mapbox credentials for geocoding, when a key is configured.
    pub fn mapbox_geocoding(&self) -> Option<ProviderEndpoint> {
        self.mapbox_api_key.as_ref().map(|key| ProviderEndpoint {
            api_key: key.clone(),
            url: self.mapbox_geocoding_base_url.clone(),
        })
    }

    /// OpenRouteService credentials for geocoding, when a key is configured.
    pub fn ors_geocoding(&self) -> Option<ProviderEndpoint> {
        self.ors_api_key.as_ref().map(|key| ProviderEndpoint {
            api_key: key.clone(),
            url: self.ors_geocoding_url.clone(),
        })
    }

    /// Mapbox credentials for directions, when a key is configured.
    pub fn mapbox_directions(&self) -> Option<ProviderEndpoint> {
        self.mapbox_api_key.as_ref().map(|key| ProviderEndpoint {
            api_key: key.clone(),
            url: self.mapbox_directions_base_url.clone(),
        })
    }

    /// OpenRouteService credentials for directions, when a key is configured.
    pub fn ors_directions(&self) -> Option<ProviderEndpoint> {
        self.ors_api_key.as_ref().map(|key| ProviderEndpoint {
            api_key: key.clone(),
            url: self.ors_directions_url.clone(),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|err: T::Err| Error::InvalidConfig {
            key: key.to_string(),
            message: format!("'{raw}': {err}"),
        }),
        None => Ok(default),
    }
}

fn parse_bool_or<G>(get: &G, key: &str, default: bool) -> Result<bool>
where
    G: Fn(&str) -> Option<String>,
{
    let Some(raw) = get(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::InvalidConfig {
            key: key.to_string(),
            message: format!("'{raw}' is not a boolean"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.mapbox_directions().is_none());
        assert!(config.ors_geocoding().is_none());
    }

    #[test]
    fn empty_keys_count_as_unconfigured() {
        let config = config_from(&[("MAPBOX_API_KEY", "  "), ("ORS_API_KEY", "ors-key")]).unwrap();
        assert!(config.mapbox_api_key.is_none());
        let ors = config.ors_directions().unwrap();
        assert_eq!(ors.api_key, "ors-key");
        assert_eq!(ors.url, DEFAULT_ORS_DIRECTIONS_URL);
    }

    #[test]
    fn parses_vehicle_and_attempts() {
        let config = config_from(&[
            ("VEHICLE_MPG", "12.5"),
            ("VEHICLE_MAX_RANGE_MILES", "350"),
            ("MAPBOX_GEOCODE_MAX_ATTEMPTS", "0"),
            ("ORS_GEOCODE_MAX_ATTEMPTS", "4"),
            ("HTTP_TIMEOUT_SECONDS", "3"),
            ("INGEST_GEOCODE", "false"),
        ])
        .unwrap();
        assert_eq!(config.vehicle.mpg, Decimal::new(125, 1));
        assert_eq!(config.vehicle.max_range_miles, 350.0);
        assert_eq!(config.mapbox_geocode_max_attempts, 1);
        assert_eq!(config.ors_geocode_max_attempts, 4);
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert!(!config.ingest_geocode);
    }

    #[test]
    fn reports_offending_key() {
        let err = config_from(&[("VEHICLE_MPG", "ten")]).unwrap_err();
        match err {
            Error::InvalidConfig { key, .. } => assert_eq!(key, "VEHICLE_MPG"),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = config_from(&[("CORRIDOR_MILES", "-5")]).unwrap_err();
        assert!(err.to_string().contains("CORRIDOR_MILES"));
    }
}
