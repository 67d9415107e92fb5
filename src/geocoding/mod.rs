//! Geocoding gateway, provider contract and the HTTP provider.

mod bounds;
mod gateway;
mod google;
mod provider;

pub use bounds::ServiceBounds;
pub use gateway::{
    GatewaySettings, GeocodePolicy, GeocodingGateway, Resolution, DEFAULT_EXPECTED_REGIONS,
    DEFAULT_POINT,
};
pub use google::GoogleGeocoder;
pub use provider::{AddressComponent, GeocodingProvider, ProviderPlace};
