use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;

use super::{coordinate_from_pair, GeocodeProvider};
use crate::config::ProviderEndpoint;
use crate::error::Result;
use crate::geo::Coordinate;
use crate::http::{get_text, parse_url, with_attempts, with_segment, AttemptFailure};

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    features: Vec<PlaceFeature>,
}

#[derive(Debug, Deserialize)]
struct PlaceFeature {
    center: [f64; 2],
}

/// Mapbox forward geocoding (`mapbox.places`).
#[derive(Debug, Clone)]
pub struct MapboxGeocoder {
    client: Client,
    base_url: Url,
    api_key: String,
    max_attempts: u32,
}

impl MapboxGeocoder {
    pub fn new(client: Client, endpoint: &ProviderEndpoint, max_attempts: u32) -> Result<Self> {
        Ok(Self {
            client,
            base_url: parse_url("MAPBOX_GEOCODING_BASE_URL", &endpoint.url)?,
            api_key: endpoint.api_key.clone(),
            max_attempts: max_attempts.max(1),
        })
    }

    fn request(&self, address: &str) -> std::result::Result<Option<Coordinate>, AttemptFailure> {
        let url = with_segment(&self.base_url, &format!("{address}.json"));
        let body = get_text(
            &self.client,
            url,
            &[
                ("access_token", self.api_key.clone()),
                ("limit", "1".to_string()),
                ("autocomplete", "false".to_string()),
            ],
        )?;
        let response: PlacesResponse =
            serde_json::from_str(&body).map_err(|err| AttemptFailure::Malformed(err.to_string()))?;
        match response.features.first() {
            Some(feature) => coordinate_from_pair(feature.center).map(Some),
            None => Ok(None),
        }
    }
}

impl GeocodeProvider for MapboxGeocoder {
    fn name(&self) -> &str {
        "mapbox"
    }

    fn geocode(&self, address: &str) -> Option<Coordinate> {
        with_attempts(self.name(), self.max_attempts, || self.request(address))
            .ok()
            .flatten()
    }
}
