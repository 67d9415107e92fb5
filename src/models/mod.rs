//! Core data models for address capture and geocoding.

pub mod address;
pub mod geocode;
pub mod zone;

pub use address::{AddressField, MergePolicy, ParsedAddress, StructuredAddress};
pub use geocode::{GeoPoint, GeocodeResult, Precision, ResolutionState, ReverseGeocode};
pub use zone::{DeliveryZoneEntry, Region};
