//! Text folding helpers shared by the mapper and the parser.

/// Lowercase and strip Spanish diacritics so "Juárez" and "JUAREZ" compare equal.
pub fn fold(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// Fold and collapse everything that is not alphanumeric into single spaces.
///
/// "Gustavo A. Madero" becomes "gustavo a madero", which keeps word
/// boundaries stable for whole-word scans.
pub fn fold_words(text: &str) -> String {
    let folded = fold(text);
    let mut out = String::with_capacity(folded.len());
    for token in folded.split(|c: char| !c.is_alphanumeric()) {
        if token.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(token);
    }
    out
}

/// Find `needle` in `haystack` as a whole-word match. Both sides are expected
/// to be `fold_words` output.
pub fn contains_words(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack
        .match_indices(needle)
        .any(|(start, _)| {
            let end = start + needle.len();
            let before_ok = start == 0 || haystack.as_bytes()[start - 1] == b' ';
            let after_ok = end == haystack.len() || haystack.as_bytes()[end] == b' ';
            before_ok && after_ok
        })
}
