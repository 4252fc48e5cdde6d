use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;

use super::{fetch_with_retries, path_from_pairs, DirectionsProvider};
use crate::config::ProviderEndpoint;
use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::http::{get_text, parse_url, with_segment};

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    geometry: LineGeometry,
}

#[derive(Debug, Deserialize)]
struct LineGeometry {
    coordinates: Vec<[f64; 2]>,
}

/// Mapbox Directions API, driving profile.
#[derive(Debug, Clone)]
pub struct MapboxDirections {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl MapboxDirections {
    pub fn new(client: Client, endpoint: &ProviderEndpoint) -> Result<Self> {
        Ok(Self {
            client,
            base_url: parse_url("MAPBOX_DIRECTIONS_BASE_URL", &endpoint.url)?,
            api_key: endpoint.api_key.clone(),
        })
    }
}

impl DirectionsProvider for MapboxDirections {
    fn name(&self) -> &str {
        "mapbox"
    }

    fn route(&self, start: Coordinate, end: Coordinate) -> Result<Vec<Coordinate>> {
        let url = with_segment(&self.base_url, &format!("{start};{end}"));
        let query = [
            ("access_token", self.api_key.clone()),
            ("geometries", "geojson".to_string()),
        ];
        let body = fetch_with_retries(self.name(), || {
            get_text(&self.client, url.clone(), &query)
        })?;

        let response: DirectionsResponse = serde_json::from_str(&body)
            .map_err(|err| Error::provider(self.name(), format!("malformed response: {err}")))?;
        let route = response
            .routes
            .first()
            .ok_or_else(|| Error::provider(self.name(), "response contained no routes"))?;
        path_from_pairs(self.name(), &route.geometry.coordinates)
    }
}
