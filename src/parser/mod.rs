//! Heuristic free-text address parser.
//!
//! Extraction is best effort: every field the heuristics cannot find is left
//! `None` so callers can merge the result into a form without clearing what
//! the user already typed. Parsing never fails.

mod patterns;

use std::ops::Range;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::locality::{AddressComponentMapper, LocalityMatch};
use crate::models::{MergePolicy, ParsedAddress, Region, StructuredAddress};
use crate::text::fold_words;
use crate::zones::PostalCodeZone;
use patterns::Patterns;

/// Postal code and municipality point at different regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegionConflict {
    pub by_postal_code: Region,
    pub by_municipality: Region,
}

/// Extracts structured fields from free-text addresses.
#[derive(Debug, Clone)]
pub struct AddressStringParser {
    patterns: Patterns,
    mapper: Arc<AddressComponentMapper>,
}

impl AddressStringParser {
    pub fn new(mapper: Arc<AddressComponentMapper>) -> Result<Self, regex::Error> {
        Ok(Self {
            patterns: Patterns::new()?,
            mapper,
        })
    }

    pub fn mapper(&self) -> &AddressComponentMapper {
        &self.mapper
    }

    /// Parse a raw address string.
    pub fn parse(&self, raw: &str) -> ParsedAddress {
        let raw = raw.trim();
        let mut parsed = ParsedAddress::default();
        if raw.is_empty() {
            return parsed;
        }

        let (head, references) = self.split_references(raw);
        let head = head.as_str();
        parsed.references = references;

        let postal = self.find_postal_code(head);
        let interior = self.patterns.interior.captures(head).and_then(|caps| {
            let whole = caps.get(0)?;
            let value = caps.get(1)?;
            Some((value.as_str().to_string(), whole.range()))
        });

        parsed.postal_code = postal.as_ref().map(|(code, _)| code.clone());
        parsed.interior_number = interior.as_ref().map(|(value, _)| value.clone());
        parsed.exterior_number = self.find_exterior_number(
            head,
            postal.as_ref().map(|(_, span)| span.clone()),
            interior.as_ref().map(|(_, span)| span.clone()),
        );
        parsed.street = self.find_street(head);
        parsed.neighborhood = self.find_neighborhood(head, postal.as_ref().map(|(_, s)| s.clone()));

        let locality = self.find_municipality(head);
        parsed.municipality = locality.as_ref().map(|m| m.canonical_name.clone());

        parsed.region = parsed
            .postal_code
            .as_deref()
            .and_then(PostalCodeZone::region_for_code)
            .or_else(|| locality.as_ref().map(|m| m.region));

        debug!(
            "Parsed {:?}: unresolved {:?}",
            raw,
            parsed.unresolved_fields()
        );
        parsed
    }

    /// Parse and merge into an existing form without clearing any field.
    pub fn parse_into(&self, raw: &str, address: &mut StructuredAddress, policy: MergePolicy) {
        let parsed = self.parse(raw);
        address.merge(parsed, policy);
    }

    /// Report when the postal code and the municipality imply different regions.
    ///
    /// The two are not reconciled; callers decide what to show.
    pub fn region_conflict(&self, address: &StructuredAddress) -> Option<RegionConflict> {
        let by_postal_code = PostalCodeZone::region_for_code(&address.postal_code)?;
        let by_municipality = self.mapper.map_locality(&address.municipality)?.region;
        (by_postal_code != by_municipality).then_some(RegionConflict {
            by_postal_code,
            by_municipality,
        })
    }

    /// Separate courier notes from the address proper.
    ///
    /// A segment opening with "Ref."/"Referencias" starts the notes, which run
    /// until a segment that looks like address data again. "entre X y Y" is a
    /// note up to the end of its segment, unless it is part of the street
    /// name ("Calle Entre Ríos 45").
    fn split_references(&self, raw: &str) -> (String, Option<String>) {
        let mut kept: Vec<&str> = Vec::new();
        let mut notes: Vec<String> = Vec::new();
        let mut in_notes = false;

        for (index, range) in segment_ranges(raw).into_iter().enumerate() {
            let segment = raw[range].trim();
            if segment.is_empty() {
                continue;
            }

            if in_notes {
                if !self.is_address_data(segment) {
                    notes.push(segment.to_string());
                    continue;
                }
                in_notes = false;
            }

            if let Some(caps) = self.patterns.reference_marker.captures(segment) {
                in_notes = true;
                notes.extend(non_empty(&caps[1]));
                continue;
            }

            if let Some(caps) = self.patterns.between_streets.captures(segment) {
                let start = caps.get(0).map_or(segment.len(), |m| m.start());
                let before = segment[..start].trim();
                let after_number = before.chars().any(|c| c.is_ascii_digit());
                if after_number || (before.is_empty() && index > 0) {
                    notes.push(format!("entre {}", caps[1].trim()));
                    if !before.is_empty() {
                        kept.push(before);
                    }
                    continue;
                }
            }

            kept.push(segment);
        }

        let references = (!notes.is_empty()).then(|| notes.join("; "));
        (kept.join(", "), references)
    }

    fn is_address_data(&self, segment: &str) -> bool {
        segment.chars().any(|c| c.is_ascii_digit())
            || self.patterns.neighborhood_marker.is_match(segment)
            || self.mapper.find_in_text(segment).is_some()
    }

    /// Marked postal code first ("CP 03100"), then a standalone 5-digit run.
    ///
    /// A 5-digit run at the start of the first segment is treated as the
    /// exterior number when another 5-digit run follows it.
    fn find_postal_code(&self, text: &str) -> Option<(String, Range<usize>)> {
        if let Some(caps) = self.patterns.postal_marked.captures(text) {
            let whole = caps.get(0)?;
            return Some((caps[1].to_string(), whole.range()));
        }

        let candidates: Vec<_> = self.patterns.postal_any.find_iter(text).collect();
        let first_segment_end = text.find(',').unwrap_or(text.len());
        let first_digit_run = self.patterns.digit_run.find(text);

        let skip_first = candidates.len() > 1
            && first_digit_run.is_some_and(|run| {
                run.start() < first_segment_end && run.range() == candidates[0].range()
            });

        candidates
            .into_iter()
            .nth(usize::from(skip_first))
            .map(|m| (m.as_str().to_string(), m.range()))
    }

    fn find_exterior_number(
        &self,
        text: &str,
        postal: Option<Range<usize>>,
        interior: Option<Range<usize>>,
    ) -> Option<String> {
        let overlaps = |span: &Option<Range<usize>>, run: &Range<usize>| {
            span.as_ref()
                .is_some_and(|s| run.start < s.end && s.start < run.end)
        };
        self.patterns
            .digit_run
            .find_iter(text)
            .map(|m| m.range())
            .find(|run| !overlaps(&postal, run) && !overlaps(&interior, run))
            .map(|run| text[run].to_string())
    }

    /// Scan segments from last to first; the street segment is only scanned
    /// when it is the only one.
    fn find_municipality(&self, text: &str) -> Option<LocalityMatch> {
        let segments = segment_ranges(text);
        if segments.len() == 1 {
            return self.mapper.find_in_text(text);
        }
        segments
            .iter()
            .skip(1)
            .rev()
            .find_map(|range| self.mapper.find_in_text(&text[range.clone()]))
    }

    /// Text before the first digit or comma, minus a leading road type.
    fn find_street(&self, text: &str) -> Option<String> {
        let end = text
            .find(|c: char| c.is_ascii_digit() || c == ',')
            .unwrap_or(text.len());
        let candidate = text[..end].trim_end_matches(|c: char| c == '#' || c == '-' || c.is_whitespace());
        let candidate = self.patterns.number_marker.replace(candidate, "");
        let candidate = self.patterns.road_type.replace(candidate.trim(), "");
        let candidate = candidate.trim();

        if candidate.is_empty()
            || starts_with_marker(candidate)
            || self.patterns.neighborhood_marker.is_match(candidate)
            || self.patterns.trailing_postal_marker.is_match(candidate)
        {
            return None;
        }
        Some(candidate.to_string())
    }

    /// Explicit "Col." style marker first, then the segment before the postal code.
    fn find_neighborhood(&self, text: &str, postal: Option<Range<usize>>) -> Option<String> {
        if let Some(caps) = self.patterns.neighborhood_marker.captures(text) {
            let value = self.patterns.trailing_postal_marker.replace(caps[1].trim(), "");
            if let Some(value) = non_empty(&value) {
                return Some(value);
            }
        }

        let postal = postal?;
        let segments: Vec<Range<usize>> = segment_ranges(text);
        let index = segments
            .iter()
            .position(|s| s.start <= postal.start && postal.start < s.end)?;
        if index < 2 {
            // Segment 0 is the street.
            return None;
        }
        let candidate = text[segments[index - 1].clone()].trim();
        if candidate.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }
        if self
            .mapper
            .map_locality(candidate)
            .is_some_and(|m| fold_words(&m.canonical_name) == fold_words(candidate))
        {
            // That segment is the municipality, not a neighborhood.
            return None;
        }
        non_empty(candidate)
    }
}

impl Default for AddressStringParser {
    fn default() -> Self {
        Self {
            patterns: Patterns::new().expect("built-in address patterns compile"),
            mapper: Arc::new(AddressComponentMapper::default()),
        }
    }
}

/// Segment opens with a neighborhood or postal-code marker instead of a street.
fn starts_with_marker(candidate: &str) -> bool {
    let folded = fold_words(candidate);
    let first = folded.split(' ').next().unwrap_or_default();
    matches!(
        first,
        "col" | "colonia" | "fracc" | "fraccionamiento" | "barrio" | "cp"
    )
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Byte ranges of comma-separated segments.
fn segment_ranges(text: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if c == ',' {
            ranges.push(start..i);
            start = i + 1;
        }
    }
    ranges.push(start..text.len());
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> AddressStringParser {
        AddressStringParser::default()
    }

    #[test]
    fn test_insurgentes_scenario() {
        let parsed = parser().parse("Av. Insurgentes Sur 123, Col. Del Valle, CP 03100, Benito Juárez");
        assert_eq!(parsed.street.as_deref(), Some("Insurgentes Sur"));
        assert_eq!(parsed.exterior_number.as_deref(), Some("123"));
        assert_eq!(parsed.interior_number, None);
        assert_eq!(parsed.neighborhood.as_deref(), Some("Del Valle"));
        assert_eq!(parsed.postal_code.as_deref(), Some("03100"));
        assert_eq!(parsed.municipality.as_deref(), Some("Benito Juárez"));
        assert_eq!(parsed.region, Some(Region::Cdmx));
    }

    #[test]
    fn test_reparse_of_serialized_address_is_stable() {
        let p = parser();
        let inputs = [
            "Av. Insurgentes Sur 123, Col. Del Valle, CP 03100, Benito Juárez",
            "Calzada de Tlalpan 1500 Int. 4B, Colonia Portales, C.P. 03300, Benito Juárez",
            "Av. Chimalhuacán 45, Fracc. Las Flores, CP 57000, Neza",
            "Reforma 222, Col. Juárez, CP 06600, Cuauhtémoc",
        ];
        for input in inputs {
            let first = p.parse(input);
            let line = StructuredAddress::from(first.clone()).to_address_line();
            let second = p.parse(&line);
            assert_eq!(first.street, second.street, "{}", line);
            assert_eq!(first.exterior_number, second.exterior_number, "{}", line);
            assert_eq!(first.interior_number, second.interior_number, "{}", line);
            assert_eq!(first.neighborhood, second.neighborhood, "{}", line);
            assert_eq!(first.postal_code, second.postal_code, "{}", line);
            assert_eq!(first.municipality, second.municipality, "{}", line);
            assert_eq!(first.region, second.region, "{}", line);
        }
    }

    #[test]
    fn test_interior_and_hash_number() {
        let parsed = parser().parse("Calle Durango #245 Depto 3, Roma Norte, 06700, Cuauhtémoc");
        assert_eq!(parsed.street.as_deref(), Some("Durango"));
        assert_eq!(parsed.exterior_number.as_deref(), Some("245"));
        assert_eq!(parsed.interior_number.as_deref(), Some("3"));
        assert_eq!(parsed.neighborhood.as_deref(), Some("Roma Norte"));
        assert_eq!(parsed.postal_code.as_deref(), Some("06700"));
        assert_eq!(parsed.municipality.as_deref(), Some("Cuauhtémoc"));
    }

    #[test]
    fn test_five_digit_exterior_number_is_not_the_postal_code() {
        let parsed = parser().parse("Calzada Ignacio Zaragoza 12345, Agrícola Oriental, 08500");
        assert_eq!(parsed.exterior_number.as_deref(), Some("12345"));
        assert_eq!(parsed.postal_code.as_deref(), Some("08500"));
        assert_eq!(parsed.street.as_deref(), Some("Ignacio Zaragoza"));
    }

    #[test]
    fn test_postal_code_alone_is_not_exterior_number() {
        let parsed = parser().parse("Insurgentes Sur, 03100 Benito Juárez");
        assert_eq!(parsed.postal_code.as_deref(), Some("03100"));
        assert_eq!(parsed.exterior_number, None);
    }

    #[test]
    fn test_references_are_split_off() {
        let parsed = parser().parse(
            "Río Lerma 71, Col. Cuauhtémoc, CP 06500, Referencias: portón negro junto al 73",
        );
        assert_eq!(parsed.exterior_number.as_deref(), Some("71"));
        assert_eq!(parsed.references.as_deref(), Some("portón negro junto al 73"));
        assert_eq!(parsed.neighborhood.as_deref(), Some("Cuauhtémoc"));
    }

    #[test]
    fn test_between_streets_mid_address() {
        let parsed =
            parser().parse("Reforma 222 entre Havre y Berlín, Col. Juárez, CP 06600, Cuauhtémoc");
        assert_eq!(parsed.street.as_deref(), Some("Reforma"));
        assert_eq!(parsed.exterior_number.as_deref(), Some("222"));
        assert_eq!(parsed.neighborhood.as_deref(), Some("Juárez"));
        assert_eq!(parsed.postal_code.as_deref(), Some("06600"));
        assert_eq!(parsed.municipality.as_deref(), Some("Cuauhtémoc"));
        assert_eq!(parsed.region, Some(Region::Cdmx));
        assert_eq!(parsed.references.as_deref(), Some("entre Havre y Berlín"));
    }

    #[test]
    fn test_between_streets_own_segment() {
        let parsed = parser().parse("Durango 245, entre Orizaba y Córdoba, CP 06700, Cuauhtémoc");
        assert_eq!(parsed.exterior_number.as_deref(), Some("245"));
        assert_eq!(parsed.postal_code.as_deref(), Some("06700"));
        assert_eq!(parsed.municipality.as_deref(), Some("Cuauhtémoc"));
        assert_eq!(parsed.references.as_deref(), Some("entre Orizaba y Córdoba"));
    }

    #[test]
    fn test_street_named_entre_is_not_a_reference() {
        let parsed = parser().parse("Calle Entre Ríos 45, Col. Roma Norte, CP 06700, Cuauhtémoc");
        assert_eq!(parsed.street.as_deref(), Some("Entre Ríos"));
        assert_eq!(parsed.exterior_number.as_deref(), Some("45"));
        assert_eq!(parsed.neighborhood.as_deref(), Some("Roma Norte"));
        assert_eq!(parsed.postal_code.as_deref(), Some("06700"));
        assert_eq!(parsed.municipality.as_deref(), Some("Cuauhtémoc"));
        assert_eq!(parsed.references, None);
    }

    #[test]
    fn test_reference_segment_mid_address_keeps_postal_code() {
        let parsed = parser().parse(
            "Durango 245, Ref. casa azul, Col. Roma Norte, CP 06700, Cuauhtémoc",
        );
        assert_eq!(parsed.references.as_deref(), Some("casa azul"));
        assert_eq!(parsed.neighborhood.as_deref(), Some("Roma Norte"));
        assert_eq!(parsed.postal_code.as_deref(), Some("06700"));
        assert_eq!(parsed.municipality.as_deref(), Some("Cuauhtémoc"));

        let parsed = parser().parse("Reforma 222, Col. Juárez, CP 06600, Referencias: portón gris, frente al parque");
        assert_eq!(parsed.postal_code.as_deref(), Some("06600"));
        assert_eq!(parsed.references.as_deref(), Some("portón gris; frente al parque"));
        assert_eq!(parsed.street.as_deref(), Some("Reforma"));
    }

    #[test]
    fn test_postal_code_without_separator() {
        let parsed = parser().parse("Durango 245, Col. Roma Norte, CP06700");
        assert_eq!(parsed.postal_code.as_deref(), Some("06700"));
        assert_eq!(parsed.exterior_number.as_deref(), Some("245"));
        assert_eq!(parsed.region, Some(Region::Cdmx));
    }

    #[test]
    fn test_region_from_municipality_without_postal_code() {
        let parsed = parser().parse("Av. Central 300, Ecatepec");
        assert_eq!(parsed.postal_code, None);
        assert_eq!(parsed.municipality.as_deref(), Some("Ecatepec de Morelos"));
        assert_eq!(parsed.region, Some(Region::Edomex));
    }

    #[test]
    fn test_garbage_never_panics_and_is_unresolved() {
        let p = parser();
        for input in ["", "   ", ",,,", "12", "#", "Col.", "CP", "ñandú ☃ 🍕"] {
            let parsed = p.parse(input);
            assert!(parsed.street.is_none() || !parsed.street.as_deref().unwrap().is_empty());
        }
        assert!(p.parse("").is_empty());
        assert!(p.parse("Col.").street.is_none());
    }

    #[test]
    fn test_parse_into_never_clears_fields() {
        let p = parser();
        let mut address = StructuredAddress::new();
        p.parse_into(
            "Av. Insurgentes Sur 123, Col. Del Valle, CP 03100, Benito Juárez",
            &mut address,
            MergePolicy::FillMissing,
        );
        let before = address.clone();

        for raw in ["", "Reforma", "CP 06600", "Col. Roma"] {
            for policy in [MergePolicy::FillMissing, MergePolicy::PreferParsed] {
                let mut copy = before.clone();
                p.parse_into(raw, &mut copy, policy);
                assert!(!copy.street.is_empty());
                assert!(!copy.exterior_number.is_empty());
                assert!(!copy.neighborhood.is_empty());
                assert!(!copy.postal_code.is_empty());
                assert!(!copy.municipality.is_empty());
            }
        }
    }

    #[test]
    fn test_region_conflict_is_reported() {
        let p = parser();
        let address = StructuredAddress {
            postal_code: "57000".to_string(),
            municipality: "Coyoacán".to_string(),
            ..Default::default()
        };
        assert_eq!(
            p.region_conflict(&address),
            Some(RegionConflict {
                by_postal_code: Region::Edomex,
                by_municipality: Region::Cdmx,
            })
        );

        let consistent = StructuredAddress {
            postal_code: "04000".to_string(),
            municipality: "Coyoacán".to_string(),
            ..Default::default()
        };
        assert_eq!(p.region_conflict(&consistent), None);
    }
}
