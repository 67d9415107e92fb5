//! Domicilio - delivery address capture for the Mexico City metro area
//!
//! This library provides postal-code zoning, locality normalization, free-text
//! address parsing and policy-driven geocoding for the `serve` and `addrcheck`
//! binaries.

pub mod backend;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod handoff;
pub mod locality;
pub mod models;
pub mod parser;
pub mod text;
pub mod zones;

pub use config::Config;
pub use error::{BackendError, GeocodeError, PayloadError, ValidationError};
pub use geocoding::{GeocodePolicy, GeocodingGateway, GoogleGeocoder};
pub use locality::AddressComponentMapper;
pub use models::{GeoPoint, GeocodeResult, ParsedAddress, Region, StructuredAddress};
pub use parser::AddressStringParser;
pub use zones::PostalCodeZone;
