//! Locality name → canonical municipality/borough mapping.

use serde::Serialize;
use tracing::{debug, warn};

use super::aliases::AliasTable;
use super::catalog::CANONICAL_LOCALITIES;
use crate::models::Region;
use crate::text::{contains_words, fold_words};

/// Administrative prefixes dropped before matching ("Alcaldía Coyoacán").
const ADMIN_PREFIXES: &[&str] = &[
    "alcaldia ",
    "delegacion ",
    "municipio de ",
    "municipio ",
    "mpio de ",
    "mpio ",
];

/// "Del. Coyoacán" abbreviates "Delegación"; a bare "Del" belongs to the name.
const DELEGACION_ABBREVIATION: &str = "del.";

/// Fragments shorter than this never match by containment.
const MIN_FRAGMENT_LEN: usize = 4;

/// Single-word fragments ("Alta", "Valle") need to be at least this long.
const MIN_SINGLE_WORD_FRAGMENT_LEN: usize = 6;

/// Which strategy produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Exact,
    Containment,
    Alias,
}

/// A resolved locality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalityMatch {
    pub canonical_name: String,
    pub region: Region,
    pub strategy: MatchStrategy,
}

#[derive(Debug, Clone)]
struct CanonicalEntry {
    name: String,
    key: String,
    region: Region,
}

/// Maps raw locality strings to canonical names and their region.
#[derive(Debug, Clone)]
pub struct AddressComponentMapper {
    canonical: Vec<CanonicalEntry>,
    aliases: AliasTable,
}

impl AddressComponentMapper {
    pub fn new(aliases: AliasTable) -> Self {
        let canonical: Vec<CanonicalEntry> = CANONICAL_LOCALITIES
            .iter()
            .map(|(name, region)| CanonicalEntry {
                name: name.to_string(),
                key: fold_words(name),
                region: *region,
            })
            .collect();

        let mapper = Self { canonical, aliases };
        for (alias, target) in mapper.aliases.iter() {
            if mapper.lookup_exact(&fold_words(target)).is_none() {
                warn!("Alias {:?} points to unknown locality {:?}", alias, target);
            }
        }
        mapper
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    fn lookup_exact(&self, key: &str) -> Option<&CanonicalEntry> {
        self.canonical.iter().find(|c| c.key == key)
    }

    fn to_match(entry: &CanonicalEntry, strategy: MatchStrategy) -> LocalityMatch {
        LocalityMatch {
            canonical_name: entry.name.clone(),
            region: entry.region,
            strategy,
        }
    }

    /// Resolve a locality name.
    ///
    /// Strategies run in order and the first one that matches wins:
    /// exact, containment (either direction), alias table. `None` means the
    /// municipality stays unresolved.
    pub fn map_locality(&self, name: &str) -> Option<LocalityMatch> {
        let key = strip_admin_prefix(&fold_words(strip_delegacion_abbreviation(name)));
        if key.is_empty() {
            return None;
        }

        let result = self
            .lookup_exact(&key)
            .map(|e| Self::to_match(e, MatchStrategy::Exact))
            .or_else(|| {
                self.match_containment(&key)
                    .map(|e| Self::to_match(e, MatchStrategy::Containment))
            })
            .or_else(|| {
                self.match_alias(&key)
                    .map(|e| Self::to_match(e, MatchStrategy::Alias))
            });

        debug!("map_locality({:?}) -> {:?}", name, result);
        result
    }

    fn match_containment(&self, key: &str) -> Option<&CanonicalEntry> {
        // Input mentions a canonical name: the most specific (longest) wins.
        let mut outer: Vec<&CanonicalEntry> = self
            .canonical
            .iter()
            .filter(|c| contains_words(key, &c.key))
            .collect();
        if !outer.is_empty() {
            outer.sort_by_key(|c| std::cmp::Reverse(c.key.len()));
            if outer.len() > 1 && outer[0].key.len() == outer[1].key.len() {
                debug!("Ambiguous locality {:?}", key);
                return None;
            }
            return outer.first().copied();
        }

        // Input is a whole-word fragment of exactly one canonical name.
        let len = key.chars().count();
        let single_word = !key.contains(' ');
        if len < MIN_FRAGMENT_LEN || (single_word && len < MIN_SINGLE_WORD_FRAGMENT_LEN) {
            return None;
        }
        let inner: Vec<&CanonicalEntry> = self
            .canonical
            .iter()
            .filter(|c| contains_words(&c.key, key))
            .collect();
        match inner.as_slice() {
            [single] => {
                if single_word {
                    debug!("Locality {:?} matched by one word of {:?}", key, single.name);
                }
                Some(*single)
            }
            [] => None,
            _ => {
                debug!("Ambiguous locality fragment {:?}", key);
                None
            }
        }
    }

    fn match_alias(&self, key: &str) -> Option<&CanonicalEntry> {
        if let Some(target) = self.aliases.resolve(key) {
            return self.lookup_exact(&fold_words(target));
        }
        self.aliases
            .iter()
            .filter(|(alias, _)| contains_words(key, alias))
            .max_by_key(|(alias, _)| alias.len())
            .and_then(|(_, target)| self.lookup_exact(&fold_words(target)))
    }

    /// Find a locality mentioned anywhere in free text.
    ///
    /// Canonical names and aliases must appear as whole words. The longest
    /// mention wins; two different localities tied on length resolve to `None`.
    pub fn find_in_text(&self, text: &str) -> Option<LocalityMatch> {
        let folded = fold_words(text);
        if folded.is_empty() {
            return None;
        }

        let canonical = self
            .canonical
            .iter()
            .filter(|c| contains_words(&folded, &c.key))
            .map(|c| (c.key.len(), c, MatchStrategy::Exact));
        let aliased = self
            .aliases
            .iter()
            .filter(|(alias, _)| contains_words(&folded, alias))
            .filter_map(|(alias, target)| {
                self.lookup_exact(&fold_words(target))
                    .map(|c| (alias.len(), c, MatchStrategy::Alias))
            });

        let mut hits: Vec<(usize, &CanonicalEntry, MatchStrategy)> =
            canonical.chain(aliased).collect();
        hits.sort_by_key(|(len, _, _)| std::cmp::Reverse(*len));

        let (best_len, best, strategy) = *hits.first()?;
        let tied = hits
            .iter()
            .skip(1)
            .any(|(len, c, _)| *len == best_len && c.key != best.key);
        if tied {
            debug!("Ambiguous locality mention in {:?}", text);
            return None;
        }
        Some(Self::to_match(best, strategy))
    }
}

impl Default for AddressComponentMapper {
    fn default() -> Self {
        Self::new(AliasTable::builtin())
    }
}

fn strip_delegacion_abbreviation(name: &str) -> &str {
    let name = name.trim_start();
    match name.get(..DELEGACION_ABBREVIATION.len()) {
        Some(head) if head.eq_ignore_ascii_case(DELEGACION_ABBREVIATION) => {
            &name[DELEGACION_ABBREVIATION.len()..]
        }
        _ => name,
    }
}

fn strip_admin_prefix(key: &str) -> String {
    for prefix in ADMIN_PREFIXES {
        if let Some(rest) = key.strip_prefix(prefix) {
            return rest.to_string();
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> AddressComponentMapper {
        AddressComponentMapper::default()
    }

    #[test]
    fn test_exact_is_case_and_accent_insensitive() {
        let m = mapper().map_locality("COYOACAN").unwrap();
        assert_eq!(m.canonical_name, "Coyoacán");
        assert_eq!(m.region, Region::Cdmx);
        assert_eq!(m.strategy, MatchStrategy::Exact);

        let m = mapper().map_locality("Alcaldía Benito Juárez").unwrap();
        assert_eq!(m.canonical_name, "Benito Juárez");
        assert_eq!(m.strategy, MatchStrategy::Exact);
    }

    #[test]
    fn test_neza_resolves_to_nezahualcoyotl() {
        let m = mapper().map_locality("neza").unwrap();
        assert_eq!(m.canonical_name, "Nezahualcóyotl");
        assert_eq!(m.region, Region::Edomex);
    }

    #[test]
    fn test_containment_prefers_most_specific() {
        let m = mapper().map_locality("Cuautitlán Izcalli, Edo. Méx.").unwrap();
        assert_eq!(m.canonical_name, "Cuautitlán Izcalli");
        assert_eq!(m.strategy, MatchStrategy::Containment);

        let m = mapper().map_locality("Toluca de Lerdo").unwrap();
        assert_eq!(m.canonical_name, "Toluca");
    }

    #[test]
    fn test_fragment_match() {
        let m = mapper().map_locality("Tlalnepantla").unwrap();
        assert_eq!(m.canonical_name, "Tlalnepantla de Baz");
        assert_eq!(m.strategy, MatchStrategy::Containment);
    }

    #[test]
    fn test_alias_table() {
        let m = mapper().map_locality("GAM").unwrap();
        assert_eq!(m.canonical_name, "Gustavo A. Madero");
        assert_eq!(m.strategy, MatchStrategy::Alias);

        let m = mapper().map_locality("Ixtapalapa").unwrap();
        assert_eq!(m.canonical_name, "Iztapalapa");
    }

    #[test]
    fn test_ambiguous_or_unknown_is_unresolved() {
        // Both "Benito Juárez" and "Naucalpan de Juárez" contain it.
        assert!(mapper().map_locality("Juárez").is_none());
        assert!(mapper().map_locality("Guadalajara").is_none());
        assert!(mapper().map_locality("   ").is_none());
        assert!(mapper().map_locality("la").is_none());
    }

    #[test]
    fn test_del_is_part_of_the_name() {
        // A CDMX colonia, not "Valle de Chalco Solidaridad".
        assert!(mapper().map_locality("Del Valle").is_none());
        assert!(mapper().map_locality("Colonia del Valle").is_none());

        let m = mapper().map_locality("Del. Coyoacán").unwrap();
        assert_eq!(m.canonical_name, "Coyoacán");
        assert_eq!(m.strategy, MatchStrategy::Exact);
    }

    #[test]
    fn test_short_single_word_fragments_are_unresolved() {
        assert!(mapper().map_locality("Alta").is_none());
        assert!(mapper().map_locality("Valle").is_none());
        assert!(mapper().map_locality("Tlal").is_none());

        let m = mapper().map_locality("Milpa Alta").unwrap();
        assert_eq!(m.strategy, MatchStrategy::Exact);
    }

    #[test]
    fn test_find_in_text() {
        let m = mapper()
            .find_in_text("Av. Insurgentes Sur 123, Col. Del Valle, CP 03100, Benito Juárez")
            .unwrap();
        assert_eq!(m.canonical_name, "Benito Juárez");

        let m = mapper()
            .find_in_text("Calle 7 #45, Cd. Neza, Edo Mex")
            .unwrap();
        assert_eq!(m.canonical_name, "Nezahualcóyotl");

        assert!(mapper().find_in_text("Calle Reforma 10, Col. Centro").is_none());
    }

    #[test]
    fn test_find_in_text_requires_whole_words() {
        assert!(mapper().find_in_text("Calle Tlalpantita 3").is_none());
    }
}
