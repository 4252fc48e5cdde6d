//! Driving directions from external providers.
//!
//! Exactly one provider is selected per configuration (Mapbox when its key is
//! set, otherwise OpenRouteService) and there is no fallback between them once
//! chosen. Each call gets a small bounded retry budget for transport failures
//! and non-success statuses; a successful status with an unusable body fails
//! immediately.

mod mapbox;
mod ors;

use std::sync::Arc;

use reqwest::blocking::Client;
use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::http::{with_attempts, AttemptFailure};

pub use mapbox::MapboxDirections;
pub use ors::OrsDirections;

/// Attempts per directions call.
pub const DIRECTIONS_MAX_ATTEMPTS: u32 = 3;

/// Source of driving geometry between two points.
pub trait DirectionsProvider: Send + Sync {
    /// Short identifier used in logs and errors.
    fn name(&self) -> &str;

    /// Ordered path geometry from `start` to `end`.
    fn route(&self, start: Coordinate, end: Coordinate) -> Result<Vec<Coordinate>>;
}

/// Select the directions provider by configuration precedence.
pub fn directions_from_config(
    config: &Config,
    client: &Client,
) -> Result<Arc<dyn DirectionsProvider>> {
    let provider: Arc<dyn DirectionsProvider> = if let Some(endpoint) = config.mapbox_directions()
    {
        Arc::new(MapboxDirections::new(client.clone(), &endpoint)?)
    } else if let Some(endpoint) = config.ors_directions() {
        Arc::new(OrsDirections::new(client.clone(), &endpoint)?)
    } else {
        return Err(Error::NoProviderConfigured);
    };
    info!(provider = provider.name(), "selected directions provider");
    Ok(provider)
}

/// Run `fetch` under the directions retry budget, converting exhaustion into
/// a provider error.
fn fetch_with_retries<F>(provider: &str, fetch: F) -> Result<String>
where
    F: FnMut() -> std::result::Result<String, AttemptFailure>,
{
    with_attempts(provider, DIRECTIONS_MAX_ATTEMPTS, fetch).map_err(|failure| {
        Error::provider(
            provider,
            format!("{failure} (after {DIRECTIONS_MAX_ATTEMPTS} attempts)"),
        )
    })
}

/// Normalise provider `[lon, lat]` pairs into a validated path.
fn path_from_pairs(provider: &str, pairs: &[[f64; 2]]) -> Result<Vec<Coordinate>> {
    if pairs.is_empty() {
        return Err(Error::provider(provider, "response contained an empty route geometry"));
    }
    pairs
        .iter()
        .map(|pair| {
            Coordinate::checked(pair[0], pair[1])
                .map_err(|err| Error::provider(provider, format!("malformed geometry: {err}")))
        })
        .collect()
}
