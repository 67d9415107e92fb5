//! Delivery zone reference data types.

use serde::{Deserialize, Serialize};

/// Macro service area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    /// Ciudad de México (the 16 boroughs)
    #[serde(rename = "CDMX", alias = "cdmx")]
    Cdmx,
    /// Estado de México (metropolitan municipalities)
    #[serde(rename = "EDOMEX", alias = "edomex")]
    Edomex,
}

impl Region {
    /// Human-readable region name used in zone labels and suggestions.
    pub fn display_name(&self) -> &'static str {
        match self {
            Region::Cdmx => "Ciudad de México",
            Region::Edomex => "Estado de México",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Region::Cdmx => write!(f, "CDMX"),
            Region::Edomex => write!(f, "EDOMEX"),
        }
    }
}

/// A postal code we deliver to.
///
/// Static reference data. The whole table is swapped when delivery zones
/// change; entries are never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryZoneEntry {
    pub postal_code: String,
    pub region: Region,
    pub label: String,
}

impl DeliveryZoneEntry {
    pub fn new(postal_code: &str, region: Region, label: &str) -> Self {
        Self {
            postal_code: postal_code.to_string(),
            region,
            label: label.to_string(),
        }
    }
}
