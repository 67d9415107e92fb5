use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::geocoding::{GatewaySettings, ServiceBounds, DEFAULT_EXPECTED_REGIONS, DEFAULT_POINT};
use crate::locality::{AddressComponentMapper, AliasTable};
use crate::models::GeoPoint;
use crate::zones::{PostalCodeZone, ZonePolicy, ZoneTable};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub zones: ZonesConfig,
    pub locality: LocalityConfig,
    pub geocoding: GeocodingConfig,
    pub validation: ValidationConfig,
    pub handoff: HandoffConfig,
    pub backend: BackendConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ZonesConfig {
    /// Only codes in the zone table are deliverable when set.
    pub strict_whitelist: bool,
    /// CSV with `postal_code,region,label`; the built-in table otherwise.
    pub table: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LocalityConfig {
    /// Extra `*.txt` alias files merged over the built-in aliases.
    pub alias_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeocodingConfig {
    pub endpoint: String,
    pub api_key: String,
    pub language: String,
    pub region: String,
    pub timeout_secs: u64,
    pub expected_regions: Vec<String>,
    pub default_point: GeoPoint,
    pub bounds: ServiceBounds,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
            api_key: String::new(),
            language: "es".to_string(),
            region: "mx".to_string(),
            timeout_secs: 10,
            expected_regions: DEFAULT_EXPECTED_REGIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_point: DEFAULT_POINT,
            bounds: ServiceBounds::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ValidationConfig {
    pub debounce_ms: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { debounce_ms: 350 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HandoffConfig {
    pub ttl_secs: u64,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/api".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    pub fn zone_validator(&self) -> Result<PostalCodeZone> {
        let table = match &self.zones.table {
            Some(path) => ZoneTable::load_csv(path)
                .with_context(|| format!("Failed to load zone table {}", path.display()))?,
            None => ZoneTable::builtin(),
        };
        let policy = if self.zones.strict_whitelist {
            ZonePolicy::strict()
        } else {
            ZonePolicy::range()
        };
        Ok(PostalCodeZone::new(table, policy))
    }

    pub fn locality_mapper(&self) -> Result<AddressComponentMapper> {
        let mut aliases = AliasTable::builtin();
        if let Some(dir) = &self.locality.alias_dir {
            aliases
                .load_from_dir(dir)
                .with_context(|| format!("Failed to load aliases from {}", dir.display()))?;
        }
        Ok(AddressComponentMapper::new(aliases))
    }

    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            bounds: self.geocoding.bounds,
            default_point: self.geocoding.default_point,
            expected_regions: self.geocoding.expected_regions.clone(),
        }
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.validation.debounce_ms)
    }

    pub fn handoff_ttl(&self) -> Duration {
        Duration::from_secs(self.handoff.ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = NamedTempFile::new().unwrap();
        let config = Config::load_from_file(file.path()).unwrap();

        assert!(!config.zones.strict_whitelist);
        assert_eq!(config.validation.debounce_ms, 350);
        assert_eq!(config.handoff.ttl_secs, 300);
        assert_eq!(config.geocoding.language, "es");
        assert_eq!(config.geocoding.default_point, DEFAULT_POINT);
        assert_eq!(config.geocoding.bounds, ServiceBounds::METRO_CDMX);
        assert_eq!(config.server.listen, "0.0.0.0:3000");
    }

    #[test]
    fn test_partial_sections() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[zones]
strict_whitelist = true

[geocoding]
api_key = "abc"
timeout_secs = 3
default_point = {{ lat = 19.5, lon = -99.2 }}

[validation]
debounce_ms = 500
"#
        )
        .unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert!(config.zones.strict_whitelist);
        assert_eq!(config.geocoding.api_key, "abc");
        assert_eq!(config.geocoding.timeout_secs, 3);
        assert_eq!(config.geocoding.region, "mx");
        assert_eq!(config.geocoding.default_point, GeoPoint::new(19.5, -99.2));
        assert_eq!(config.debounce_window(), Duration::from_millis(500));
        assert_eq!(config.handoff_ttl(), Duration::from_secs(300));

        let zone = config.zone_validator().unwrap();
        assert!(zone.policy().strict_zone_whitelist);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[zones\nstrict_whitelist = ").unwrap();
        assert!(Config::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_zone_table_is_error() {
        let config = Config {
            zones: ZonesConfig {
                strict_whitelist: true,
                table: Some(PathBuf::from("/nonexistent/zones.csv")),
            },
            ..Config::default()
        };
        assert!(config.zone_validator().is_err());
    }
}
