use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{info, warn};
use walkdir::WalkDir;

use super::catalog::BUILTIN_ALIASES;
use crate::text::fold_words;

static COMMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#.*").expect("valid comment regex"));
static ARROW_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*=>\s*").expect("valid arrow regex"));

/// Alias → canonical locality name mappings.
///
/// Keys are stored folded (lowercase, no accents, single spaces); values keep
/// the canonical spelling as written.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table preloaded with the built-in aliases.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for (alias, canonical) in BUILTIN_ALIASES {
            table.insert(alias, canonical);
        }
        table
    }

    pub fn insert(&mut self, alias: &str, canonical: &str) {
        let key = fold_words(alias);
        let canonical = canonical.trim();
        if key.is_empty() || canonical.is_empty() || key == fold_words(canonical) {
            return;
        }
        self.aliases.insert(key, canonical.to_string());
    }

    /// Load alias files (`*.txt`) from a directory, recursively.
    ///
    /// Two line formats are accepted:
    /// - `neza, cd neza => Nezahualcóyotl` (explicit mapping)
    /// - `Nezahualcóyotl, neza, cd neza` (first item is canonical)
    pub fn load_from_dir<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.exists() {
            warn!("Alias directory not found: {}", dir.display());
            return Ok(());
        }

        info!("Loading locality aliases from {}", dir.display());

        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry?;
            let path = entry.path();

            if !path.is_file() || path.extension().map_or(true, |e| e != "txt") {
                continue;
            }

            self.load_file(path)?;
        }

        info!("Loaded {} locality aliases", self.aliases.len());
        Ok(())
    }

    fn load_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read alias file: {}", path.display()))?;

        for line in content.lines() {
            let line = COMMENT_REGEX.replace(line, "");
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if line.contains("=>") {
                let parts: Vec<&str> = ARROW_REGEX.split(line).collect();
                if parts.len() != 2 {
                    warn!("Ignoring malformed alias line in {}: {}", path.display(), line);
                    continue;
                }
                if let Some(target) = parts[1].split(',').next() {
                    for alias in parts[0].split(',') {
                        self.insert(alias, target);
                    }
                }
            } else {
                let mut parts = line.split(',');
                if let Some(canonical) = parts.next() {
                    for alias in parts {
                        self.insert(alias, canonical);
                    }
                }
            }
        }
        Ok(())
    }

    /// Canonical name for an already-folded key.
    pub fn resolve(&self, folded_key: &str) -> Option<&str> {
        self.aliases.get(folded_key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
