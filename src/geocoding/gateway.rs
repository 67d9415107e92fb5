//! Geocoding with validation policies and a default-coordinate fallback.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::bounds::ServiceBounds;
use super::provider::{GeocodingProvider, ProviderPlace};
use crate::locality::AddressComponentMapper;
use crate::models::{
    GeoPoint, GeocodeResult, ParsedAddress, Precision, ResolutionState, ReverseGeocode,
};
use crate::text::fold_words;
use crate::zones::{is_postal_code_format, PostalCodeZone};

/// Zócalo, Mexico City.
pub const DEFAULT_POINT: GeoPoint = GeoPoint {
    lat: 19.4326,
    lon: -99.1332,
};

/// `administrative_area_level_1` names we accept.
pub const DEFAULT_EXPECTED_REGIONS: &[&str] = &[
    "Ciudad de México",
    "CDMX",
    "Distrito Federal",
    "D.F.",
    "Estado de México",
    "México",
    "Méx.",
    "Edo. Méx.",
];

const NEIGHBORHOOD_TYPES: &[&str] = &["sublocality_level_1", "sublocality", "neighborhood"];
const MUNICIPALITY_TYPES: &[&str] = &[
    "administrative_area_level_3",
    "administrative_area_level_2",
    "locality",
];

/// Strict rejects low-confidence results; lenient substitutes the default point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeocodePolicy {
    pub strict: bool,
}

impl GeocodePolicy {
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn lenient() -> Self {
        Self { strict: false }
    }
}

/// Terminal state of one request plus what the caller gets back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub state: ResolutionState,
    pub result: Option<GeocodeResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Validation knobs for the gateway.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub bounds: ServiceBounds,
    pub default_point: GeoPoint,
    pub expected_regions: Vec<String>,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            bounds: ServiceBounds::default(),
            default_point: DEFAULT_POINT,
            expected_regions: DEFAULT_EXPECTED_REGIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Wraps a [`GeocodingProvider`] with input checks and result validation.
pub struct GeocodingGateway<P> {
    provider: P,
    mapper: Arc<AddressComponentMapper>,
    bounds: ServiceBounds,
    default_point: GeoPoint,
    expected_regions: Vec<String>,
}

impl<P: GeocodingProvider> GeocodingGateway<P> {
    pub fn new(provider: P, mapper: Arc<AddressComponentMapper>, settings: GatewaySettings) -> Self {
        let expected_regions = settings
            .expected_regions
            .iter()
            .map(|r| fold_words(r))
            .filter(|r| !r.is_empty())
            .collect();
        Self {
            provider,
            mapper,
            bounds: settings.bounds,
            default_point: settings.default_point,
            expected_regions,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Forward geocode. `None` means the caller should ask for a manual pin.
    pub async fn resolve(&self, address: &str, policy: GeocodePolicy) -> Option<GeocodeResult> {
        self.resolve_detailed(address, policy).await.result
    }

    /// Forward geocode, reporting the terminal state.
    pub async fn resolve_detailed(&self, address: &str, policy: GeocodePolicy) -> Resolution {
        let address = address.trim();
        debug!("Geocode {:?} (strict={}): pending", address, policy.strict);

        if let Err(reason) = prevalidate(address) {
            return self.reject(policy, reason);
        }

        let places = match self.provider.geocode(address).await {
            Ok(places) => places,
            Err(e) => {
                warn!("Geocoding provider failed for {:?}: {}", address, e);
                return Resolution {
                    state: ResolutionState::ProviderError,
                    result: None,
                    reason: Some(e.to_string()),
                };
            }
        };

        let Some(place) = places.into_iter().next() else {
            return self.reject(policy, "provider returned no results".to_string());
        };

        if let Err(reason) = self.check_place(&place, policy) {
            return self.reject(policy, reason);
        }

        info!(
            "Geocoded {:?} to ({}, {}) {:?}",
            address, place.location.lat, place.location.lon, place.precision
        );
        Resolution {
            state: ResolutionState::Success,
            result: Some(GeocodeResult {
                location: place.location,
                precision: place.precision,
                within_service_bounds: true,
                fallback: false,
            }),
            reason: None,
        }
    }

    /// Reverse geocode a dropped pin.
    ///
    /// Provider failures are swallowed: the coordinates come back with an
    /// empty address. Only invalid coordinates yield `None`.
    pub async fn reverse_resolve(&self, lat: f64, lon: f64) -> Option<ReverseGeocode> {
        let location = GeoPoint::new(lat, lon);
        if !location.is_valid() {
            debug!("Rejecting invalid pin ({}, {})", lat, lon);
            return None;
        }

        let place = match self.provider.reverse_geocode(location).await {
            Ok(places) => places.into_iter().next(),
            Err(e) => {
                warn!("Reverse geocoding failed at ({}, {}): {}", lat, lon, e);
                None
            }
        };

        let Some(place) = place else {
            return Some(ReverseGeocode {
                location,
                formatted_address: None,
                address: ParsedAddress::default(),
            });
        };

        Some(ReverseGeocode {
            location,
            formatted_address: Some(place.formatted_address.clone())
                .filter(|s| !s.is_empty()),
            address: self.place_to_address(&place),
        })
    }

    fn place_to_address(&self, place: &ProviderPlace) -> ParsedAddress {
        let text = |kinds: &[&str]| {
            place
                .first_component(kinds)
                .map(|c| c.long_name.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let postal_code = text(&["postal_code"]).filter(|c| is_postal_code_format(c));
        let locality = MUNICIPALITY_TYPES
            .iter()
            .filter_map(|kind| place.component(kind))
            .find_map(|c| self.mapper.map_locality(&c.long_name));

        let region = postal_code
            .as_deref()
            .and_then(PostalCodeZone::region_for_code)
            .or_else(|| locality.as_ref().map(|m| m.region));

        ParsedAddress {
            street: text(&["route"]),
            exterior_number: text(&["street_number"]),
            interior_number: text(&["subpremise"]),
            neighborhood: text(NEIGHBORHOOD_TYPES),
            postal_code,
            municipality: locality.map(|m| m.canonical_name),
            region,
            references: None,
        }
    }

    fn check_place(&self, place: &ProviderPlace, policy: GeocodePolicy) -> Result<(), String> {
        let region_ok = place
            .component("administrative_area_level_1")
            .is_some_and(|c| {
                self.expected_regions.contains(&fold_words(&c.long_name))
                    || self.expected_regions.contains(&fold_words(&c.short_name))
            });
        if !region_ok {
            return Err("result is outside the expected regions".to_string());
        }

        if policy.strict && !place.precision.is_high_precision() {
            return Err(format!("precision {:?} is too low", place.precision));
        }

        if !self.bounds.contains(place.location) {
            return Err(format!(
                "({}, {}) is outside the service area",
                place.location.lat, place.location.lon
            ));
        }
        Ok(())
    }

    fn reject(&self, policy: GeocodePolicy, reason: String) -> Resolution {
        debug!("Geocode rejected by policy: {}", reason);
        let result = (!policy.strict).then(|| GeocodeResult {
            location: self.default_point,
            precision: Precision::Other,
            within_service_bounds: self.bounds.contains(self.default_point),
            fallback: true,
        });
        Resolution {
            state: ResolutionState::RejectedByPolicy,
            result,
            reason: Some(reason),
        }
    }
}

/// Cheap local checks run before any provider call.
fn prevalidate(address: &str) -> Result<(), String> {
    if address.is_empty() {
        return Err("address is empty".to_string());
    }
    if !address.chars().any(|c| c.is_ascii_digit()) {
        return Err("address has no street number".to_string());
    }
    if address.split_whitespace().count() < 2 {
        return Err("address needs a street name and a number".to_string());
    }
    Ok(())
}
