//! Identifier and unit normalization.
//!
//! Pure, total functions: they never fail, and degenerate input yields an
//! empty string that callers are expected to handle.

use rustc_hash::FxHashMap;

use crate::config::UnitConfig;

/// Convert a free-text name to a snake_case identifier.
///
/// Lowercases, drops every character that is not an ASCII letter, digit or
/// whitespace, then joins the remaining words with single underscores.
///
/// `"Chicken Thighs (boneless)"` becomes `"chicken_thighs_boneless"`.
pub fn make_id(name: &str) -> String {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Make repeated identifiers unique by appending `_1`, `_2`, ... in order.
///
/// The first occurrence keeps its id unchanged.
pub fn disambiguate_ids<S: AsRef<str>>(ids: &[S]) -> Vec<String> {
    let mut seen: FxHashMap<&str, usize> = FxHashMap::default();
    ids.iter()
        .map(|id| {
            let id = id.as_ref();
            let count = seen.entry(id).or_insert(0);
            let unique = if *count == 0 {
                id.to_string()
            } else {
                format!("{}_{}", id, count)
            };
            *count += 1;
            unique
        })
        .collect()
}

/// `make_id` for each name, then disambiguate repeats.
pub fn make_ids<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let ids: Vec<String> = names.iter().map(|n| make_id(n.as_ref())).collect();
    disambiguate_ids(&ids)
}

/// Normalize a unit phrase to its canonical short form.
///
/// Resolution order:
/// 1. a canonical weight/volume unit as the first word wins outright ("g bulbs" -> "g")
/// 2. quantity adjectives are stripped ("heaped tablespoons" -> "tablespoons")
/// 3. the alias table is tried on the whole phrase, then the first word, then the last
/// 4. otherwise the cleaned phrase is returned as-is
pub fn normalize_unit(raw: &str, units: &UnitConfig) -> String {
    let lowered = raw.trim().to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    let Some(&first) = words.first() else {
        return String::new();
    };

    if units.is_weight_volume_unit(first) {
        return first.to_string();
    }

    let mut core: Vec<&str> = words
        .iter()
        .copied()
        .filter(|w| !units.is_adjective(w))
        .collect();
    if core.is_empty() {
        core = words;
    }

    let candidate = core.join(" ");
    if let Some(canonical) = units.alias(&candidate) {
        return canonical.to_string();
    }
    for word in [core[0], core[core.len() - 1]] {
        if let Some(canonical) = units.alias(word) {
            return canonical.to_string();
        }
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_id_basic() {
        assert_eq!(make_id("Chicken Thighs"), "chicken_thighs");
        assert_eq!(make_id("all-purpose flour"), "allpurpose_flour");
        assert_eq!(make_id("  Olive   oil \t extra "), "olive_oil_extra");
    }

    #[test]
    fn test_make_id_drops_non_ascii_and_punctuation() {
        assert_eq!(make_id("Crème fraîche (30%)"), "crme_frache_30");
        assert_eq!(make_id("salt & pepper"), "salt_pepper");
    }

    #[test]
    fn test_make_id_empty() {
        assert_eq!(make_id(""), "");
        assert_eq!(make_id("!!! ---"), "");
    }

    #[test]
    fn test_disambiguate_ids() {
        let ids = disambiguate_ids(&["salt", "pepper", "salt", "salt"]);
        assert_eq!(ids, vec!["salt", "pepper", "salt_1", "salt_2"]);
    }

    #[test]
    fn test_make_ids() {
        let ids = make_ids(&["Butter", "butter ", "Sugar"]);
        assert_eq!(ids, vec!["butter", "butter_1", "sugar"]);
    }

    #[test]
    fn test_normalize_unit_aliases() {
        let units = UnitConfig::default();
        assert_eq!(normalize_unit("Tablespoons", &units), "tbsp");
        assert_eq!(normalize_unit(" teaspoon ", &units), "tsp");
        assert_eq!(normalize_unit("cloves", &units), "clove");
        assert_eq!(normalize_unit("grams", &units), "g");
    }

    #[test]
    fn test_normalize_unit_strips_adjectives() {
        let units = UnitConfig::default();
        assert_eq!(normalize_unit("small cloves", &units), "clove");
        assert_eq!(normalize_unit("heaped tablespoons", &units), "tbsp");
        assert_eq!(normalize_unit("large handful", &units), "handful");
    }

    #[test]
    fn test_normalize_unit_weight_volume_short_circuit() {
        let units = UnitConfig::default();
        assert_eq!(normalize_unit("g bulbs", &units), "g");
        assert_eq!(normalize_unit("ml water", &units), "ml");
        assert_eq!(normalize_unit("KG boneless", &units), "kg");
    }

    #[test]
    fn test_normalize_unit_first_and_last_word_fallback() {
        let units = UnitConfig::default();
        assert_eq!(normalize_unit("cans chopped", &units), "can");
        assert_eq!(normalize_unit("thumb-sized pieces", &units), "piece");
    }

    #[test]
    fn test_normalize_unit_unmapped_and_empty() {
        let units = UnitConfig::default();
        assert_eq!(normalize_unit("Dash", &units), "dash");
        assert_eq!(normalize_unit("  ", &units), "");
        // Only adjectives: keep the words rather than return nothing
        assert_eq!(normalize_unit("large", &units), "large");
    }
}
