//! Postal code → delivery zone validation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::catalog::{is_postal_code_format, region_for_value, ZoneTable};
use crate::error::ValidationError;
use crate::models::{DeliveryZoneEntry, Region};

const OUT_OF_SERVICE_SUGGESTION: &str = "Por ahora solo entregamos en Ciudad de México y Estado de México. \
     Verifica tu código postal o elige otra dirección.";

/// Which of the two postal-code policies is in force.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZonePolicy {
    /// `true`: only whitelisted codes are served.
    /// `false`: any code inside the CDMX or EDOMEX numeric range is served.
    pub strict_zone_whitelist: bool,
}

impl ZonePolicy {
    pub fn strict() -> Self {
        Self {
            strict_zone_whitelist: true,
        }
    }

    pub fn range() -> Self {
        Self {
            strict_zone_whitelist: false,
        }
    }
}

/// Validates postal codes against the delivery zone table.
#[derive(Debug, Clone)]
pub struct PostalCodeZone {
    table: ZoneTable,
    policy: ZonePolicy,
}

impl PostalCodeZone {
    pub fn new(table: ZoneTable, policy: ZonePolicy) -> Self {
        Self { table, policy }
    }

    pub fn with_policy(policy: ZonePolicy) -> Self {
        Self::new(ZoneTable::builtin(), policy)
    }

    pub fn policy(&self) -> ZonePolicy {
        self.policy
    }

    pub fn table(&self) -> &ZoneTable {
        &self.table
    }

    /// Validate a postal code and return the zone it belongs to.
    ///
    /// # Errors
    ///
    /// `InvalidFormat` unless the trimmed input is exactly five ASCII digits;
    /// `DeliveryNotAvailable` when the code is outside every served zone.
    pub fn validate(&self, code: &str) -> Result<DeliveryZoneEntry, ValidationError> {
        let code = code.trim();
        if !is_postal_code_format(code) {
            debug!("Rejecting malformed postal code {:?}", code);
            return Err(ValidationError::InvalidFormat {
                input: code.to_string(),
            });
        }

        let region = code.parse::<u32>().ok().and_then(region_for_value);

        let result = if self.policy.strict_zone_whitelist {
            match self.table.get(code) {
                Some(entry) => Ok(entry.clone()),
                None => Err(not_available(code, region)),
            }
        } else {
            match region {
                Some(region) => Ok(self.table.get(code).cloned().unwrap_or_else(|| {
                    DeliveryZoneEntry::new(
                        code,
                        region,
                        &format!("{} CP {}", region.display_name(), code),
                    )
                })),
                None => Err(not_available(code, None)),
            }
        };

        debug!(
            "Postal code {} (strict={}): {}",
            code,
            self.policy.strict_zone_whitelist,
            if result.is_ok() { "served" } else { "not served" }
        );
        result
    }

    /// Region implied by the numeric ranges alone, for display.
    ///
    /// Never consults the whitelist, so it answers the same under both policies.
    pub fn region_for_code(code: &str) -> Option<Region> {
        let code = code.trim();
        if !is_postal_code_format(code) {
            return None;
        }
        code.parse::<u32>().ok().and_then(region_for_value)
    }
}

impl Default for PostalCodeZone {
    fn default() -> Self {
        Self::with_policy(ZonePolicy::default())
    }
}

fn not_available(code: &str, region: Option<Region>) -> ValidationError {
    let suggestion = match region {
        Some(region) => format!(
            "Aún no entregamos en esta zona de {}. Prueba con otra dirección cercana.",
            region.display_name()
        ),
        None => OUT_OF_SERVICE_SUGGESTION.to_string(),
    };
    ValidationError::DeliveryNotAvailable {
        postal_code: code.to_string(),
        suggestion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(n: u32) -> String {
        format!("{:05}", n)
    }

    #[test]
    fn test_scenario_del_valle() {
        for policy in [ZonePolicy::strict(), ZonePolicy::range()] {
            let zone = PostalCodeZone::with_policy(policy);
            let entry = zone.validate("03100").unwrap();
            assert_eq!(entry.region, Region::Cdmx);
            assert_eq!(entry.label, "Del Valle Centro, Benito Juárez");
        }
    }

    #[test]
    fn test_99999_is_not_available_not_invalid() {
        for policy in [ZonePolicy::strict(), ZonePolicy::range()] {
            let zone = PostalCodeZone::with_policy(policy);
            match zone.validate("99999") {
                Err(ValidationError::DeliveryNotAvailable {
                    postal_code,
                    suggestion,
                }) => {
                    assert_eq!(postal_code, "99999");
                    assert!(!suggestion.is_empty());
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_invalid_format_before_lookup() {
        let zone = PostalCodeZone::with_policy(ZonePolicy::range());
        for input in ["", "0310", "031000", "03l00", "03 100", "-3100", "０３１００", "+3100"] {
            assert!(
                matches!(zone.validate(input), Err(ValidationError::InvalidFormat { .. })),
                "{:?}",
                input
            );
        }
        assert!(zone.validate("  03100 ").is_ok());
    }

    #[test]
    fn test_range_policy_covers_every_code() {
        let zone = PostalCodeZone::with_policy(ZonePolicy::range());
        for n in (0..100_000).step_by(7) {
            let served = (1_000..=16_999).contains(&n) || (50_000..=57_999).contains(&n);
            assert_eq!(zone.validate(&code(n)).is_ok(), served, "{}", code(n));
        }
        for n in [999, 1_000, 16_999, 17_000, 49_999, 50_000, 57_999, 58_000] {
            let served = (1_000..=16_999).contains(&n) || (50_000..=57_999).contains(&n);
            assert_eq!(zone.validate(&code(n)).is_ok(), served, "{}", code(n));
        }
    }

    #[test]
    fn test_strict_policy_is_exactly_the_whitelist() {
        let zone = PostalCodeZone::with_policy(ZonePolicy::strict());
        for n in 0..100_000 {
            let c = code(n);
            assert_eq!(zone.validate(&c).is_ok(), zone.table().contains(&c), "{}", c);
        }
    }

    #[test]
    fn test_strict_suggestion_mentions_region_for_in_range_code() {
        let zone = PostalCodeZone::with_policy(ZonePolicy::strict());
        let Err(ValidationError::DeliveryNotAvailable { suggestion, .. }) = zone.validate("03101")
        else {
            panic!("expected DeliveryNotAvailable");
        };
        assert!(suggestion.contains("Ciudad de México"));
    }

    #[test]
    fn test_range_policy_synthesizes_label() {
        let zone = PostalCodeZone::with_policy(ZonePolicy::range());
        let entry = zone.validate("55555").unwrap();
        assert_eq!(entry.region, Region::Edomex);
        assert_eq!(entry.label, "Estado de México CP 55555");
    }

    #[test]
    fn test_region_for_code() {
        assert_eq!(PostalCodeZone::region_for_code("03100"), Some(Region::Cdmx));
        assert_eq!(PostalCodeZone::region_for_code("57000"), Some(Region::Edomex));
        assert_eq!(PostalCodeZone::region_for_code("44100"), None);
        assert_eq!(PostalCodeZone::region_for_code("abc"), None);
    }
}
