//! Delivery zone reference table.

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::path::Path;
use tracing::{info, warn};

use crate::models::{DeliveryZoneEntry, Region};

/// Numeric postal-code range served in Ciudad de México (01000-16999).
pub const CDMX_RANGE: RangeInclusive<u32> = 1_000..=16_999;

/// Numeric postal-code range served in Estado de México (50000-57999).
pub const EDOMEX_RANGE: RangeInclusive<u32> = 50_000..=57_999;

/// Built-in whitelist: (postal code, region, label)
const BUILTIN_ZONES: &[(&str, Region, &str)] = &[
    // Ciudad de México
    ("01000", Region::Cdmx, "San Ángel, Álvaro Obregón"),
    ("01219", Region::Cdmx, "Santa Fe, Álvaro Obregón"),
    ("02000", Region::Cdmx, "Azcapotzalco Centro"),
    ("03100", Region::Cdmx, "Del Valle Centro, Benito Juárez"),
    ("03810", Region::Cdmx, "Nápoles, Benito Juárez"),
    ("03900", Region::Cdmx, "Mixcoac, Benito Juárez"),
    ("04000", Region::Cdmx, "Villa Coyoacán, Coyoacán"),
    ("04510", Region::Cdmx, "Ciudad Universitaria, Coyoacán"),
    ("05000", Region::Cdmx, "Cuajimalpa Centro"),
    ("06000", Region::Cdmx, "Centro, Cuauhtémoc"),
    ("06140", Region::Cdmx, "Condesa, Cuauhtémoc"),
    ("06600", Region::Cdmx, "Juárez, Cuauhtémoc"),
    ("06700", Region::Cdmx, "Roma Norte, Cuauhtémoc"),
    ("06760", Region::Cdmx, "Roma Sur, Cuauhtémoc"),
    ("07300", Region::Cdmx, "Lindavista, Gustavo A. Madero"),
    ("08000", Region::Cdmx, "Iztacalco Centro"),
    ("09000", Region::Cdmx, "Iztapalapa Centro"),
    ("10200", Region::Cdmx, "San Jerónimo Lídice, La Magdalena Contreras"),
    ("11000", Region::Cdmx, "Lomas de Chapultepec, Miguel Hidalgo"),
    ("11560", Region::Cdmx, "Polanco, Miguel Hidalgo"),
    ("12000", Region::Cdmx, "Villa Milpa Alta"),
    ("13000", Region::Cdmx, "Tláhuac Centro"),
    ("14000", Region::Cdmx, "Tlalpan Centro"),
    ("15000", Region::Cdmx, "Venustiano Carranza Centro"),
    ("16000", Region::Cdmx, "Xochimilco Centro"),
    // Estado de México
    ("50000", Region::Edomex, "Toluca Centro"),
    ("52140", Region::Edomex, "Metepec Centro"),
    ("52760", Region::Edomex, "Huixquilucan Centro"),
    ("52900", Region::Edomex, "Atizapán de Zaragoza Centro"),
    ("53000", Region::Edomex, "Naucalpan Centro"),
    ("53100", Region::Edomex, "Ciudad Satélite, Naucalpan"),
    ("54000", Region::Edomex, "Tlalnepantla Centro"),
    ("54700", Region::Edomex, "Cuautitlán Izcalli Centro"),
    ("54800", Region::Edomex, "Cuautitlán Centro"),
    ("55000", Region::Edomex, "Ecatepec Centro"),
    ("55070", Region::Edomex, "Jardines de Morelos, Ecatepec"),
    ("55700", Region::Edomex, "Coacalco Centro"),
    ("56100", Region::Edomex, "Texcoco Centro"),
    ("56330", Region::Edomex, "Chimalhuacán Centro"),
    ("56400", Region::Edomex, "Los Reyes, La Paz"),
    ("56530", Region::Edomex, "Ixtapaluca Centro"),
    ("56600", Region::Edomex, "Chalco Centro"),
    ("57000", Region::Edomex, "Nezahualcóyotl Centro"),
    ("57100", Region::Edomex, "Benito Juárez, Nezahualcóyotl"),
];

/// Region whose numeric range contains `value`.
pub fn region_for_value(value: u32) -> Option<Region> {
    if CDMX_RANGE.contains(&value) {
        Some(Region::Cdmx)
    } else if EDOMEX_RANGE.contains(&value) {
        Some(Region::Edomex)
    } else {
        None
    }
}

/// True for exactly five ASCII digits.
pub fn is_postal_code_format(code: &str) -> bool {
    code.len() == 5 && code.bytes().all(|b| b.is_ascii_digit())
}

fn parse_region(raw: &str) -> Option<Region> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "CDMX" => Some(Region::Cdmx),
        "EDOMEX" => Some(Region::Edomex),
        _ => None,
    }
}

/// Immutable postal code → zone lookup table.
#[derive(Debug, Clone)]
pub struct ZoneTable {
    entries: HashMap<String, DeliveryZoneEntry>,
}

impl ZoneTable {
    /// The compiled-in whitelist.
    pub fn builtin() -> Self {
        Self::from_entries(
            BUILTIN_ZONES
                .iter()
                .map(|(code, region, label)| DeliveryZoneEntry::new(code, *region, label)),
        )
    }

    pub fn from_entries<I: IntoIterator<Item = DeliveryZoneEntry>>(entries: I) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|e| (e.postal_code.clone(), e))
                .collect(),
        }
    }

    /// Load a replacement table from CSV with columns `postal_code`, `region`, `label`.
    ///
    /// Rows with a malformed code or unknown region are skipped with a warning.
    pub fn load_csv(path: &Path) -> Result<Self> {
        info!("Loading delivery zones from {}", path.display());

        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("Failed to open zone table: {}", path.display()))?;

        let headers = csv_reader.headers()?.clone();
        let code_idx = headers
            .iter()
            .position(|h| h == "postal_code")
            .context("Column 'postal_code' not found")?;
        let region_idx = headers
            .iter()
            .position(|h| h == "region")
            .context("Column 'region' not found")?;
        let label_idx = headers
            .iter()
            .position(|h| h == "label")
            .context("Column 'label' not found")?;

        let mut entries = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            let code = &record[code_idx];
            if !is_postal_code_format(code) {
                warn!("Skipping zone row with malformed postal code {:?}", code);
                continue;
            }
            let Some(region) = parse_region(&record[region_idx]) else {
                warn!(
                    "Skipping zone {} with unknown region {:?}",
                    code, &record[region_idx]
                );
                continue;
            };
            entries.push(DeliveryZoneEntry::new(code, region, &record[label_idx]));
        }

        let table = Self::from_entries(entries);
        info!("Loaded {} delivery zones", table.len());
        Ok(table)
    }

    pub fn get(&self, postal_code: &str) -> Option<&DeliveryZoneEntry> {
        self.entries.get(postal_code)
    }

    pub fn contains(&self, postal_code: &str) -> bool {
        self.entries.contains_key(postal_code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &DeliveryZoneEntry> {
        self.entries.values()
    }
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self::builtin()
    }
}
