//! Google Geocoding API compatible HTTP provider.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::provider::{AddressComponent, GeocodingProvider, ProviderPlace};
use crate::config::GeocodingConfig;
use crate::error::GeocodeError;
use crate::models::{GeoPoint, Precision};

const USER_AGENT: &str = "domicilio/0.1 (address geocoding)";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<WireResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireResult {
    #[serde(default)]
    formatted_address: String,
    #[serde(default)]
    address_components: Vec<AddressComponent>,
    geometry: WireGeometry,
}

#[derive(Debug, Deserialize)]
struct WireGeometry {
    location: WireLatLng,
    #[serde(default)]
    location_type: String,
}

#[derive(Debug, Deserialize)]
struct WireLatLng {
    lat: f64,
    lng: f64,
}

impl GeocodeResponse {
    fn into_places(self) -> Result<Vec<ProviderPlace>, GeocodeError> {
        match self.status.as_str() {
            "OK" => Ok(self
                .results
                .into_iter()
                .map(|r| ProviderPlace {
                    formatted_address: r.formatted_address,
                    components: r.address_components,
                    location: GeoPoint::new(r.geometry.location.lat, r.geometry.location.lng),
                    precision: Precision::from_location_type(&r.geometry.location_type),
                })
                .collect()),
            "ZERO_RESULTS" => Ok(Vec::new()),
            _ => Err(GeocodeError::Status {
                status: self.status,
                message: self.error_message.unwrap_or_default(),
            }),
        }
    }
}

/// Geocoder speaking the Google Geocoding JSON protocol.
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    client: Client,
    endpoint: Url,
    api_key: String,
    language: String,
    region: String,
}

impl GoogleGeocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .with_context(|| format!("Invalid geocoding endpoint: {}", config.endpoint))?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        if config.api_key.is_empty() {
            warn!("Geocoding API key is empty; provider calls will be rejected");
        }

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            region: config.region.clone(),
        })
    }

    fn request_url(&self, params: &[(&str, &str)]) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
            query
                .append_pair("language", &self.language)
                .append_pair("region", &self.region)
                .append_pair("key", &self.api_key);
        }
        url
    }

    async fn fetch(&self, url: Url) -> Result<Vec<ProviderPlace>, GeocodeError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Status {
                status: status.to_string(),
                message,
            });
        }

        let body: GeocodeResponse = response.json().await?;
        let places = body.into_places()?;
        debug!("Geocoding provider returned {} results", places.len());
        Ok(places)
    }
}

#[async_trait]
impl GeocodingProvider for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<Vec<ProviderPlace>, GeocodeError> {
        let url = self.request_url(&[("address", address)]);
        self.fetch(url).await
    }

    async fn reverse_geocode(&self, point: GeoPoint) -> Result<Vec<ProviderPlace>, GeocodeError> {
        let latlng = format!("{},{}", point.lat, point.lon);
        let url = self.request_url(&[("latlng", latlng.as_str())]);
        self.fetch(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_ok() -> serde_json::Value {
        json!({
            "status": "OK",
            "results": [{
                "formatted_address": "Av. Insurgentes Sur 123, Del Valle, 03100 Ciudad de México, CDMX, México",
                "address_components": [
                    { "long_name": "123", "short_name": "123", "types": ["street_number"] },
                    { "long_name": "Avenida Insurgentes Sur", "short_name": "Av. Insurgentes Sur", "types": ["route"] },
                    { "long_name": "Del Valle", "short_name": "Del Valle", "types": ["sublocality_level_1", "sublocality", "political"] },
                    { "long_name": "Benito Juárez", "short_name": "Benito Juárez", "types": ["administrative_area_level_3", "political"] },
                    { "long_name": "Ciudad de México", "short_name": "CDMX", "types": ["administrative_area_level_1", "political"] },
                    { "long_name": "03100", "short_name": "03100", "types": ["postal_code"] }
                ],
                "geometry": {
                    "location": { "lat": 19.3888, "lng": -99.1677 },
                    "location_type": "ROOFTOP"
                }
            }]
        })
    }

    #[test]
    fn test_ok_response_maps_places() {
        let response: GeocodeResponse = serde_json::from_value(sample_ok()).unwrap();
        let places = response.into_places().unwrap();
        assert_eq!(places.len(), 1);
        let place = &places[0];
        assert_eq!(place.precision, Precision::Rooftop);
        assert_eq!(place.location, GeoPoint::new(19.3888, -99.1677));
        assert_eq!(place.component("postal_code").unwrap().long_name, "03100");
        assert_eq!(
            place
                .first_component(&["sublocality_level_1", "neighborhood"])
                .unwrap()
                .long_name,
            "Del Valle"
        );
    }

    #[test]
    fn test_zero_results_is_empty() {
        let response: GeocodeResponse =
            serde_json::from_value(json!({ "status": "ZERO_RESULTS", "results": [] })).unwrap();
        assert!(response.into_places().unwrap().is_empty());
    }

    #[test]
    fn test_error_status_is_provider_error() {
        let response: GeocodeResponse = serde_json::from_value(json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        }))
        .unwrap();
        match response.into_places() {
            Err(GeocodeError::Status { status, message }) => {
                assert_eq!(status, "REQUEST_DENIED");
                assert!(message.contains("API key"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_request_url_carries_parameters() {
        let config = GeocodingConfig {
            api_key: "secret".to_string(),
            ..GeocodingConfig::default()
        };
        let geocoder = GoogleGeocoder::new(&config).unwrap();
        let url = geocoder.request_url(&[("address", "Reforma 222, Juárez")]);
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(pairs.contains(&("address".to_string(), "Reforma 222, Juárez".to_string())));
        assert!(pairs.contains(&("key".to_string(), "secret".to_string())));
        assert!(pairs.contains(&("language".to_string(), "es".to_string())));
        assert!(pairs.contains(&("region".to_string(), "mx".to_string())));
    }
}
