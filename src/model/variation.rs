//! Variation maps: ordered `key -> substitution string` mappings.

use indexmap::IndexMap;

/// An ordered mapping from a placeholder key to its substitution string.
///
/// Insertion order is significant: it is the declared order used by the
/// `[N]` and `[#i-j]` selector forms and by combinatorial enumeration.
pub type VariationMap = IndexMap<String, String>;

/// Builds a `VariationMap` from a flat YAML string-to-string mapping.
#[must_use]
pub fn from_flat_map(entries: IndexMap<String, String>) -> VariationMap {
    entries
}

/// Builds a `VariationMap` from an inline list, keying each entry by its
/// own value (so `[Remove]` sentinels and plain literals both work as keys).
#[must_use]
pub fn from_inline_list(values: &[String]) -> VariationMap {
    values.iter().map(|v| (v.clone(), v.clone())).collect()
}

/// Builds a single-entry `VariationMap` from an inline string.
#[must_use]
pub fn from_inline_string(value: &str) -> VariationMap {
    let mut map = VariationMap::new();
    map.insert(value.to_string(), value.to_string());
    map
}

/// Merges `override_map` onto `base`, with later entries overriding earlier
/// ones but the base's declared order preserved for keys it already has.
#[must_use]
pub fn merge(mut base: VariationMap, override_map: &VariationMap) -> VariationMap {
    for (k, v) in override_map {
        base.insert(k.clone(), v.clone());
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_inline_list_preserves_order() {
        let values = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let map = from_inline_list(&values);
        assert_eq!(
            map.keys().collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn test_from_inline_string() {
        let map = from_inline_string("solo");
        assert_eq!(map.get("solo"), Some(&"solo".to_string()));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_merge_override_wins() {
        let mut base = VariationMap::new();
        base.insert("happy".to_string(), "smiling".to_string());
        base.insert("sad".to_string(), "crying".to_string());

        let mut over = VariationMap::new();
        over.insert("happy".to_string(), "grinning".to_string());

        let merged = merge(base, &over);
        assert_eq!(merged.get("happy"), Some(&"grinning".to_string()));
        assert_eq!(merged.get("sad"), Some(&"crying".to_string()));
        // order preserved: happy still first
        assert_eq!(merged.keys().next().map(String::as_str), Some("happy"));
    }
}
