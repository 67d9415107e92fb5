//! Regex heuristics used by the address parser.

use regex::Regex;

/// Compiled patterns, built once per parser.
#[derive(Debug, Clone)]
pub(super) struct Patterns {
    /// "CP 03100", "C.P. 03100", "CP03100", "Código Postal: 03100"
    pub postal_marked: Regex,
    /// Any standalone 5-digit run
    pub postal_any: Regex,
    pub digit_run: Regex,
    /// "Int. 4", "Interior 2B", "Depto 301"
    pub interior: Regex,
    /// "Col. Del Valle", "Colonia Roma", "Fracc. Las Américas", "Barrio San Lucas"
    pub neighborhood_marker: Regex,
    /// Leading road type ("Av.", "Calzada", ...) plus a following "de la"
    pub road_type: Regex,
    /// Trailing "No.", "Núm." before the exterior number
    pub number_marker: Regex,
    /// Trailing "CP" left over when a postal code was cut off
    pub trailing_postal_marker: Regex,
    /// "Ref.", "Referencias:" opening a segment
    pub reference_marker: Regex,
    /// "entre Havre y Berlín" up to the end of the segment
    pub between_streets: Regex,
}

impl Patterns {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            postal_marked: Regex::new(
                r"(?i)\b(?:c\.?\s?p\.?|c[oó]digo\s+postal)\s*:?\s*(\d{5})\b",
            )?,
            postal_any: Regex::new(r"\b\d{5}\b")?,
            digit_run: Regex::new(r"\d+")?,
            interior: Regex::new(
                r"(?i)\b(?:int(?:erior)?|depto|dpto|departamento)\b\.?\s*#?\s*([0-9a-z][0-9a-z-]*)",
            )?,
            neighborhood_marker: Regex::new(
                r"(?i)\b(?:col(?:onia)?|fracc(?:ionamiento)?|barrio)\b\.?\s+([^,\d]+)",
            )?,
            road_type: Regex::new(
                r"(?i)^(?:av(?:enida)?|avda|calz(?:ada)?|calle|blvd|boulevard|bulevar|circuito|cto|prol(?:ongaci[oó]n)?|privada|priv|cerrada|cda|andador|camino|carretera|carr)\b\.?\s*(?:de\s+(?:la\s+|los\s+|las\s+)?)?",
            )?,
            number_marker: Regex::new(r"(?i)\s+(?:no|n[uú]m|n[uú]mero)\.?\s*$")?,
            trailing_postal_marker: Regex::new(r"(?i)\s*\bc\.?\s?p\.?\s*$")?,
            reference_marker: Regex::new(r"(?i)^\s*ref(?:erencia)?s?\b\.?\s*:?\s*(.*)$")?,
            between_streets: Regex::new(r"(?i)\bentre\b\s+(.+)$")?,
        })
    }
}
