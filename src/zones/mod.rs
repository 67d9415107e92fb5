//! Delivery zone lookup and postal-code validation.
//!
//! Two historical policies coexist: a strict whitelist of known codes and a
//! permissive numeric range per region. [`ZonePolicy`] selects one.

mod catalog;
mod debounce;
mod validator;

pub use catalog::{is_postal_code_format, region_for_value, ZoneTable, CDMX_RANGE, EDOMEX_RANGE};
pub use debounce::{DebouncedZoneValidator, ZoneCheck};
pub use validator::{PostalCodeZone, ZonePolicy};
