//! Geocoding provider contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GeocodeError;
use crate::models::{GeoPoint, Precision};

/// Typed address component (`street_number`, `route`, `postal_code`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    pub fn new(long_name: &str, short_name: &str, types: &[&str]) -> Self {
        Self {
            long_name: long_name.to_string(),
            short_name: short_name.to_string(),
            types: types.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn has_type(&self, kind: &str) -> bool {
        self.types.iter().any(|t| t == kind)
    }
}

/// One provider result.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderPlace {
    pub formatted_address: String,
    pub components: Vec<AddressComponent>,
    pub location: GeoPoint,
    pub precision: Precision,
}

impl ProviderPlace {
    /// First component tagged with `kind`.
    pub fn component(&self, kind: &str) -> Option<&AddressComponent> {
        self.components.iter().find(|c| c.has_type(kind))
    }

    /// First component matching any of `kinds`, tried in order.
    pub fn first_component(&self, kinds: &[&str]) -> Option<&AddressComponent> {
        kinds.iter().find_map(|kind| self.component(kind))
    }
}

/// External geocoding service.
///
/// Implementations make exactly one request per call and never retry.
/// An empty vector means the provider found nothing.
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Vec<ProviderPlace>, GeocodeError>;

    async fn reverse_geocode(&self, point: GeoPoint) -> Result<Vec<ProviderPlace>, GeocodeError>;
}
