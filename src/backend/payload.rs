//! Address-book request and response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PayloadError;
use crate::models::StructuredAddress;
use crate::zones::is_postal_code_format;

/// Body of a create/update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPayload {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub is_default: bool,
}

impl AddressPayload {
    /// Trims the address and normalizes the phone to its 10 national digits.
    pub fn new(address: &str, phone: Option<&str>, is_default: bool) -> Result<Self, PayloadError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(PayloadError::EmptyAddress);
        }

        let phone = match phone.map(str::trim).filter(|p| !p.is_empty()) {
            Some(raw) => Some(normalize_phone(raw)?),
            None => None,
        };

        Ok(Self {
            address: address.to_string(),
            phone,
            is_default,
        })
    }

    pub fn from_structured(
        address: &StructuredAddress,
        phone: Option<&str>,
        is_default: bool,
    ) -> Result<Self, PayloadError> {
        if address.street.trim().is_empty() {
            return Err(PayloadError::MissingField("street"));
        }
        if address.exterior_number.trim().is_empty() {
            return Err(PayloadError::MissingField("exterior_number"));
        }
        let postal_code = address.postal_code.trim();
        if postal_code.is_empty() {
            return Err(PayloadError::MissingField("postal_code"));
        }
        if !is_postal_code_format(postal_code) {
            return Err(PayloadError::InvalidPostalCode(postal_code.to_string()));
        }
        Self::new(&address.to_address_line(), phone, is_default)
    }
}

/// Accepts separators and an optional `+52` / `52` country prefix.
fn normalize_phone(raw: &str) -> Result<String, PayloadError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let national = match digits.len() {
        10 => digits.as_str(),
        12 if digits.starts_with("52") => &digits[2..],
        _ => return Err(PayloadError::InvalidPhone(raw.to_string())),
    };
    if raw.chars().any(|c| c.is_alphabetic()) {
        return Err(PayloadError::InvalidPhone(raw.to_string()));
    }
    Ok(national.to_string())
}

/// Saved address as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRecord {
    pub id: String,
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_and_normalizes_phone() {
        let payload =
            AddressPayload::new("  Reforma 222, CP 06600  ", Some("+52 (55) 1234-5678"), true)
                .unwrap();
        assert_eq!(payload.address, "Reforma 222, CP 06600");
        assert_eq!(payload.phone.as_deref(), Some("5512345678"));
        assert!(payload.is_default);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(
            AddressPayload::new("   ", None, false),
            Err(PayloadError::EmptyAddress)
        );
        assert!(matches!(
            AddressPayload::new("Reforma 222", Some("12345"), false),
            Err(PayloadError::InvalidPhone(_))
        ));
        assert!(matches!(
            AddressPayload::new("Reforma 222", Some("55-1234-56ab78"), false),
            Err(PayloadError::InvalidPhone(_))
        ));
        assert!(AddressPayload::new("Reforma 222", Some("  "), false)
            .unwrap()
            .phone
            .is_none());
    }

    #[test]
    fn test_serializes_camel_case() {
        let payload = AddressPayload::new("Reforma 222", None, true).unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "address": "Reforma 222", "isDefault": true })
        );
    }

    #[test]
    fn test_from_structured() {
        let mut address = StructuredAddress {
            street: "Insurgentes Sur".to_string(),
            exterior_number: "123".to_string(),
            neighborhood: "Del Valle".to_string(),
            postal_code: "03100".to_string(),
            municipality: "Benito Juárez".to_string(),
            ..StructuredAddress::default()
        };
        let payload = AddressPayload::from_structured(&address, None, false).unwrap();
        assert_eq!(
            payload.address,
            "Insurgentes Sur 123, Col. Del Valle, CP 03100, Benito Juárez"
        );

        address.postal_code = "3100".to_string();
        assert_eq!(
            AddressPayload::from_structured(&address, None, false),
            Err(PayloadError::InvalidPostalCode("3100".to_string()))
        );

        address.exterior_number.clear();
        assert_eq!(
            AddressPayload::from_structured(&address, None, false),
            Err(PayloadError::MissingField("exterior_number"))
        );
    }

    #[test]
    fn test_record_parses_backend_json() {
        let record: AddressRecord = serde_json::from_str(
            r#"{"id":"a1","address":"Reforma 222","isDefault":true,"createdAt":"2024-03-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(record.id, "a1");
        assert!(record.is_default);
        assert!(record.created_at.is_some());
    }
}
