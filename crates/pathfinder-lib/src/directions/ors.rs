use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;

use super::{fetch_with_retries, path_from_pairs, DirectionsProvider};
use crate::config::ProviderEndpoint;
use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::http::{get_text, parse_url};

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    features: Vec<RouteFeature>,
}

#[derive(Debug, Deserialize)]
struct RouteFeature {
    geometry: LineGeometry,
}

#[derive(Debug, Deserialize)]
struct LineGeometry {
    coordinates: Vec<[f64; 2]>,
}

/// OpenRouteService directions, GeoJSON GET endpoint.
#[derive(Debug, Clone)]
pub struct OrsDirections {
    client: Client,
    url: Url,
    api_key: String,
}

impl OrsDirections {
    pub fn new(client: Client, endpoint: &ProviderEndpoint) -> Result<Self> {
        Ok(Self {
            client,
            url: parse_url("ORS_DIRECTIONS_URL", &endpoint.url)?,
            api_key: endpoint.api_key.clone(),
        })
    }
}

impl DirectionsProvider for OrsDirections {
    fn name(&self) -> &str {
        "ors"
    }

    fn route(&self, start: Coordinate, end: Coordinate) -> Result<Vec<Coordinate>> {
        let query = [
            ("api_key", self.api_key.clone()),
            ("start", start.to_string()),
            ("end", end.to_string()),
        ];
        let body = fetch_with_retries(self.name(), || {
            get_text(&self.client, self.url.clone(), &query)
        })?;

        let response: DirectionsResponse = serde_json::from_str(&body)
            .map_err(|err| Error::provider(self.name(), format!("malformed response: {err}")))?;
        let feature = response
            .features
            .first()
            .ok_or_else(|| Error::provider(self.name(), "response contained no route features"))?;
        path_from_pairs(self.name(), &feature.geometry.coordinates)
    }
}
