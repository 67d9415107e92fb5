//! Geocoding result types.

use serde::{Deserialize, Serialize};

use super::ParsedAddress;

/// Geographic point (lat/lon)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Finite and inside the valid WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Provider precision tag (Google `location_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Precision {
    Rooftop,
    RangeInterpolated,
    GeometricCenter,
    Approximate,
    Other,
}

impl Precision {
    pub fn from_location_type(location_type: &str) -> Self {
        match location_type {
            "ROOFTOP" => Precision::Rooftop,
            "RANGE_INTERPOLATED" => Precision::RangeInterpolated,
            "GEOMETRIC_CENTER" => Precision::GeometricCenter,
            "APPROXIMATE" => Precision::Approximate,
            _ => Precision::Other,
        }
    }

    /// Precisions accepted by the strict policy.
    pub fn is_high_precision(&self) -> bool {
        matches!(self, Precision::Rooftop | Precision::RangeInterpolated)
    }
}

/// Outcome of a forward geocode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub location: GeoPoint,
    pub precision: Precision,
    pub within_service_bounds: bool,
    /// Set when the lenient policy substituted the default coordinate.
    pub fallback: bool,
}

/// Terminal state of a single geocoding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionState {
    Pending,
    Success,
    RejectedByPolicy,
    ProviderError,
}

impl ResolutionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ResolutionState::Pending)
    }
}

/// Pin-drop result: the coordinates always survive, the address may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverseGeocode {
    pub location: GeoPoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    pub address: ParsedAddress,
}
