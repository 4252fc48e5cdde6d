use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;

use super::{coordinate_from_pair, GeocodeProvider};
use crate::config::ProviderEndpoint;
use crate::error::Result;
use crate::geo::Coordinate;
use crate::http::{get_text, parse_url, with_attempts, AttemptFailure};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    features: Vec<SearchFeature>,
}

#[derive(Debug, Deserialize)]
struct SearchFeature {
    geometry: PointGeometry,
}

#[derive(Debug, Deserialize)]
struct PointGeometry {
    coordinates: [f64; 2],
}

/// OpenRouteService geocoding search (Pelias).
#[derive(Debug, Clone)]
pub struct OrsGeocoder {
    client: Client,
    url: Url,
    api_key: String,
    max_attempts: u32,
}

impl OrsGeocoder {
    pub fn new(client: Client, endpoint: &ProviderEndpoint, max_attempts: u32) -> Result<Self> {
        Ok(Self {
            client,
            url: parse_url("ORS_GEOCODING_URL", &endpoint.url)?,
            api_key: endpoint.api_key.clone(),
            max_attempts: max_attempts.max(1),
        })
    }

    fn request(&self, address: &str) -> std::result::Result<Option<Coordinate>, AttemptFailure> {
        let body = get_text(
            &self.client,
            self.url.clone(),
            &[
                ("api_key", self.api_key.clone()),
                ("text", address.to_string()),
                ("size", "1".to_string()),
            ],
        )?;
        let response: SearchResponse =
            serde_json::from_str(&body).map_err(|err| AttemptFailure::Malformed(err.to_string()))?;
        match response.features.first() {
            Some(feature) => coordinate_from_pair(feature.geometry.coordinates).map(Some),
            None => Ok(None),
        }
    }
}

impl GeocodeProvider for OrsGeocoder {
    fn name(&self) -> &str {
        "ors"
    }

    fn geocode(&self, address: &str) -> Option<Coordinate> {
        with_attempts(self.name(), self.max_attempts, || self.request(address))
            .ok()
            .flatten()
    }
}
