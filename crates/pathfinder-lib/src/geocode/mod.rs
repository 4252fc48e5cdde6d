//! Address to coordinate resolution with caching and provider fallback.
//!
//! A [`GeocodeResolver`] consults its cache first, then walks an ordered
//! chain of [`GeocodeProvider`]s until one of them produces a coordinate.
//! Provider failures are logged and never surface to the caller: an address
//! that nobody can resolve simply yields `None`.

mod mapbox;
mod ors;

use std::sync::Arc;

use reqwest::blocking::Client;
use tracing::{debug, info, warn};

use crate::cache::{cache_key, GeocodeCache, GEOCODE_TTL};
use crate::config::Config;
use crate::error::Result;
use crate::geo::Coordinate;
use crate::http::AttemptFailure;

pub use mapbox::MapboxGeocoder;
pub use ors::OrsGeocoder;

/// A single geocoding backend.
///
/// Implementations own their retry budget and swallow their own failures;
/// `None` means "this provider has nothing", whatever the reason.
pub trait GeocodeProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    fn geocode(&self, address: &str) -> Option<Coordinate>;
}

/// Cached, ordered chain of geocoding providers.
pub struct GeocodeResolver {
    providers: Vec<Box<dyn GeocodeProvider>>,
    cache: Arc<dyn GeocodeCache>,
}

impl GeocodeResolver {
    pub fn new(providers: Vec<Box<dyn GeocodeProvider>>, cache: Arc<dyn GeocodeCache>) -> Self {
        Self { providers, cache }
    }

    /// Build the default chain: Mapbox, then OpenRouteService, each only when
    /// its key is configured.
    pub fn from_config(
        config: &Config,
        client: &Client,
        cache: Arc<dyn GeocodeCache>,
    ) -> Result<Self> {
        let mut providers: Vec<Box<dyn GeocodeProvider>> = Vec::new();
        if let Some(endpoint) = config.mapbox_geocoding() {
            providers.push(Box::new(MapboxGeocoder::new(
                client.clone(),
                &endpoint,
                config.mapbox_geocode_max_attempts,
            )?));
        }
        if let Some(endpoint) = config.ors_geocoding() {
            providers.push(Box::new(OrsGeocoder::new(
                client.clone(),
                &endpoint,
                config.ors_geocode_max_attempts,
            )?));
        }
        if providers.is_empty() {
            warn!("no geocoding provider configured; only cached addresses will resolve");
        }
        Ok(Self::new(providers, cache))
    }

    /// Names of the configured providers, in fallback order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|provider| provider.name()).collect()
    }

    /// Resolve `address` to a coordinate.
    pub fn resolve(&self, address: &str) -> Option<Coordinate> {
        if address.trim().is_empty() {
            return None;
        }

        let key = cache_key(address);
        if let Some(raw) = self.cache.get(&key) {
            match decode_cached(&raw) {
                Some(coordinate) => {
                    debug!(key = %key, "geocode cache hit");
                    return Some(coordinate);
                }
                None => debug!(key = %key, value = %raw, "ignoring malformed geocode cache entry"),
            }
        }

        for provider in &self.providers {
            let Some(coordinate) = provider.geocode(address.trim()) else {
                debug!(provider = provider.name(), "provider had no result; trying next");
                continue;
            };
            info!(
                provider = provider.name(),
                lon = coordinate.lon,
                lat = coordinate.lat,
                "geocoded address"
            );
            self.remember(&key, coordinate);
            return Some(coordinate);
        }

        debug!(address, "no geocoding provider resolved the address");
        None
    }

    fn remember(&self, key: &str, coordinate: Coordinate) {
        let encoded = match serde_json::to_string(&coordinate.to_pair()) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(error = %err, "failed to encode geocode cache entry");
                return;
            }
        };
        if let Err(err) = self.cache.set(key, &encoded, GEOCODE_TTL) {
            warn!(key, error = %err, "failed to write geocode cache entry");
        }
    }
}

fn decode_cached(raw: &str) -> Option<Coordinate> {
    let [lon, lat]: [f64; 2] = serde_json::from_str(raw).ok()?;
    Coordinate::checked(lon, lat).ok()
}

/// Validate a `[lon, lat]` pair taken from a provider payload.
fn coordinate_from_pair(pair: [f64; 2]) -> std::result::Result<Coordinate, AttemptFailure> {
    Coordinate::checked(pair[0], pair[1]).map_err(|err| AttemptFailure::Malformed(err.to_string()))
}
