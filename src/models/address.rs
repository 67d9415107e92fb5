//! Structured address form state and its partial (parsed) counterpart.

use serde::{Deserialize, Serialize};

use super::Region;

/// Address fields a parser or provider may leave unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressField {
    Street,
    ExteriorNumber,
    InteriorNumber,
    Neighborhood,
    PostalCode,
    Municipality,
    Region,
    References,
}

/// How parsed values combine with what the form already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Only fill fields that are currently empty.
    #[default]
    FillMissing,
    /// Overwrite with any non-empty parsed value.
    PreferParsed,
}

/// Address form state. Empty strings mean "not entered yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredAddress {
    pub street: String,
    pub exterior_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interior_number: Option<String>,
    pub neighborhood: String,
    pub postal_code: String,
    pub municipality: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
}

/// Partial address extracted from free text or a provider place.
///
/// `None` means the field could not be resolved and needs manual entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exterior_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interior_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub municipality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
}

impl ParsedAddress {
    /// Required fields the parse did not resolve.
    pub fn unresolved_fields(&self) -> Vec<AddressField> {
        let mut missing = Vec::new();
        if self.street.is_none() {
            missing.push(AddressField::Street);
        }
        if self.exterior_number.is_none() {
            missing.push(AddressField::ExteriorNumber);
        }
        if self.neighborhood.is_none() {
            missing.push(AddressField::Neighborhood);
        }
        if self.postal_code.is_none() {
            missing.push(AddressField::PostalCode);
        }
        if self.municipality.is_none() {
            missing.push(AddressField::Municipality);
        }
        if self.region.is_none() {
            missing.push(AddressField::Region);
        }
        missing
    }

    pub fn is_empty(&self) -> bool {
        *self == ParsedAddress::default()
    }
}

fn merge_text(slot: &mut String, value: Option<String>, policy: MergePolicy) {
    let Some(value) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
        return;
    };
    if slot.trim().is_empty() || policy == MergePolicy::PreferParsed {
        *slot = value;
    }
}

fn merge_optional(slot: &mut Option<String>, value: Option<String>, policy: MergePolicy) {
    let Some(value) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
        return;
    };
    let empty = slot.as_deref().map_or(true, |s| s.trim().is_empty());
    if empty || policy == MergePolicy::PreferParsed {
        *slot = Some(value);
    }
}

impl StructuredAddress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a parse result into the form. Never clears a field.
    pub fn merge(&mut self, parsed: ParsedAddress, policy: MergePolicy) {
        merge_text(&mut self.street, parsed.street, policy);
        merge_text(&mut self.exterior_number, parsed.exterior_number, policy);
        merge_optional(&mut self.interior_number, parsed.interior_number, policy);
        merge_text(&mut self.neighborhood, parsed.neighborhood, policy);
        merge_text(&mut self.postal_code, parsed.postal_code, policy);
        merge_text(&mut self.municipality, parsed.municipality, policy);
        merge_optional(&mut self.references, parsed.references, policy);

        if let Some(region) = parsed.region {
            if self.region.is_none() || policy == MergePolicy::PreferParsed {
                self.region = Some(region);
            }
        }
    }

    /// Single-line form understood by the address parser:
    /// `"{street} {ext}[ Int. {int}], Col. {neighborhood}, CP {cp}, {municipality}"`.
    pub fn to_address_line(&self) -> String {
        let mut head: Vec<&str> = Vec::new();
        if !self.street.trim().is_empty() {
            head.push(self.street.trim());
        }
        if !self.exterior_number.trim().is_empty() {
            head.push(self.exterior_number.trim());
        }
        let mut first = head.join(" ");
        if let Some(interior) = self.interior_number.as_deref().map(str::trim) {
            if !interior.is_empty() {
                if !first.is_empty() {
                    first.push(' ');
                }
                first.push_str("Int. ");
                first.push_str(interior);
            }
        }

        let mut segments = Vec::new();
        if !first.is_empty() {
            segments.push(first);
        }
        if !self.neighborhood.trim().is_empty() {
            segments.push(format!("Col. {}", self.neighborhood.trim()));
        }
        if !self.postal_code.trim().is_empty() {
            segments.push(format!("CP {}", self.postal_code.trim()));
        }
        if !self.municipality.trim().is_empty() {
            segments.push(self.municipality.trim().to_string());
        }
        segments.join(", ")
    }
}

impl From<ParsedAddress> for StructuredAddress {
    fn from(parsed: ParsedAddress) -> Self {
        let mut address = StructuredAddress::new();
        address.merge(parsed, MergePolicy::FillMissing);
        address
    }
}
