//! The five-form selector grammar attached to placeholder occurrences.
//!
//! `{Expression}` uses the full variation map in declared order. A selector
//! in brackets restricts that space: `[3]`, `[random:2]`, `[#0,2,4]`,
//! `[#1-3]`, or `[happy,angry]`.

use crate::error::{ResolutionError, StructuralError};
use crate::generate::rng::SplitMix64;
use crate::model::variation::VariationMap;

/// A parsed selector, prior to being applied to a specific variation map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `[N]` — first N entries in declared order.
    First(usize),
    /// `[random:N]` — N entries sampled without replacement.
    Random(usize),
    /// `[#i,j,k]` — entries at the given indices.
    Indices(Vec<usize>),
    /// `[#i-j]` — entries at indices i..=j.
    Range(usize, usize),
    /// `[key1,key2]` — entries whose keys match.
    Keys(Vec<String>),
}

impl Selector {
    /// Parses the selector body (the text between `[` and `]`, exclusive).
    ///
    /// # Errors
    ///
    /// Returns an error if the body matches none of the five forms.
    pub fn parse(body: &str, placeholder: &str) -> Result<Self, StructuralError> {
        let body = body.trim();
        let bad = |reason: &str| StructuralError::BadPlaceholderSyntax {
            document: String::new(),
            token: format!("{{{placeholder}[{body}]}}"),
            reason: reason.to_string(),
        };

        if let Some(rest) = body.strip_prefix("random:") {
            let n: usize = rest.trim().parse().map_err(|_| bad("random:N requires an integer N"))?;
            return Ok(Self::Random(n));
        }

        if let Some(rest) = body.strip_prefix('#') {
            if let Some((lo, hi)) = rest.split_once('-') {
                let lo: usize = lo.trim().parse().map_err(|_| bad("range bounds must be integers"))?;
                let hi: usize = hi.trim().parse().map_err(|_| bad("range bounds must be integers"))?;
                if lo > hi {
                    return Err(bad("range start must not exceed end"));
                }
                return Ok(Self::Range(lo, hi));
            }
            let indices: Result<Vec<usize>, _> = rest
                .split(',')
                .map(|s| s.trim().parse::<usize>())
                .collect();
            let indices = indices.map_err(|_| bad("index list must be integers"))?;
            if indices.is_empty() {
                return Err(bad("index list must not be empty"));
            }
            return Ok(Self::Indices(indices));
        }

        if let Ok(n) = body.parse::<usize>() {
            return Ok(Self::First(n));
        }

        let keys: Vec<String> = body.split(',').map(|s| s.trim().to_string()).collect();
        if keys.is_empty() || keys.iter().any(String::is_empty) {
            return Err(bad("key list must not contain empty entries"));
        }
        Ok(Self::Keys(keys))
    }

    /// Applies this selector to a placeholder's full variation map, yielding
    /// the restricted space used for enumeration.
    ///
    /// # Errors
    ///
    /// Returns `SelectorOutOfRange` or `SelectorUnknownKey` when the
    /// selector references entries the map does not have.
    pub fn apply(
        &self,
        placeholder: &str,
        map: &VariationMap,
        rng: &mut SplitMix64,
    ) -> Result<VariationMap, ResolutionError> {
        let size = map.len();
        match self {
            Self::First(n) => Ok(map.iter().take(*n).map(|(k, v)| (k.clone(), v.clone())).collect()),
            Self::Random(n) => {
                let take = (*n).min(size);
                let mut indices: Vec<usize> = (0..size).collect();
                rng.shuffle(&mut indices);
                indices.truncate(take);
                indices.sort_unstable();
                Ok(indices
                    .into_iter()
                    .filter_map(|i| map.get_index(i).map(|(k, v)| (k.clone(), v.clone())))
                    .collect())
            }
            Self::Indices(idxs) => {
                let mut out = VariationMap::new();
                for &i in idxs {
                    let (k, v) = map.get_index(i).ok_or(ResolutionError::SelectorOutOfRange {
                        placeholder: placeholder.to_string(),
                        index: i,
                        size,
                    })?;
                    out.insert(k.clone(), v.clone());
                }
                Ok(out)
            }
            Self::Range(lo, hi) => {
                let mut out = VariationMap::new();
                for i in *lo..=*hi {
                    let (k, v) = map.get_index(i).ok_or(ResolutionError::SelectorOutOfRange {
                        placeholder: placeholder.to_string(),
                        index: i,
                        size,
                    })?;
                    out.insert(k.clone(), v.clone());
                }
                Ok(out)
            }
            Self::Keys(keys) => {
                let mut out = VariationMap::new();
                for key in keys {
                    let v = map.get(key).ok_or_else(|| ResolutionError::SelectorUnknownKey {
                        placeholder: placeholder.to_string(),
                        key: key.clone(),
                    })?;
                    out.insert(key.clone(), v.clone());
                }
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn sample_map() -> VariationMap {
        [
            ("happy", "smiling"),
            ("sad", "crying"),
            ("angry", "angry look"),
            ("surprised", "wide eyes"),
            ("neutral", "neutral"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test_case("3", Selector::First(3))]
    #[test_case("random:2", Selector::Random(2))]
    #[test_case("#0,2,4", Selector::Indices(vec![0, 2, 4]))]
    #[test_case("#1-3", Selector::Range(1, 3))]
    #[test_case("happy,angry", Selector::Keys(vec!["happy".to_string(), "angry".to_string()]))]
    fn test_parse_forms(body: &str, expected: Selector) {
        assert_eq!(Selector::parse(body, "Expression").unwrap(), expected);
    }

    #[test]
    fn test_parse_rejects_bad_range() {
        assert!(Selector::parse("#3-1", "Expression").is_err());
    }

    #[test]
    fn test_apply_first() {
        let map = sample_map();
        let mut rng = SplitMix64::new(1);
        let out = Selector::First(2).apply("Expression", &map, &mut rng).unwrap();
        assert_eq!(out.keys().collect::<Vec<_>>(), vec!["happy", "sad"]);
    }

    #[test]
    fn test_apply_indices_out_of_range() {
        let map = sample_map();
        let mut rng = SplitMix64::new(1);
        let err = Selector::Indices(vec![0, 99]).apply("Expression", &map, &mut rng);
        assert!(matches!(err, Err(ResolutionError::SelectorOutOfRange { .. })));
    }

    #[test]
    fn test_apply_keys_missing() {
        let map = sample_map();
        let mut rng = SplitMix64::new(1);
        let err = Selector::Keys(vec!["furious".to_string()]).apply("Expression", &map, &mut rng);
        assert!(matches!(err, Err(ResolutionError::SelectorUnknownKey { .. })));
    }

    #[test]
    fn test_apply_range_single() {
        let map = sample_map();
        let mut rng = SplitMix64::new(1);
        let out = Selector::Range(2, 2).apply("Expression", &map, &mut rng).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.keys().next().map(String::as_str), Some("angry"));
    }

    #[test]
    fn test_apply_random_is_subset_and_sorted_by_origin() {
        let map = sample_map();
        let mut rng = SplitMix64::new(42);
        let out = Selector::Random(2).apply("Expression", &map, &mut rng).unwrap();
        assert_eq!(out.len(), 2);
        for k in out.keys() {
            assert!(map.contains_key(k));
        }
    }

    #[test]
    fn test_apply_random_exceeding_size_takes_all() {
        let map = sample_map();
        let mut rng = SplitMix64::new(7);
        let out = Selector::Random(99).apply("Expression", &map, &mut rng).unwrap();
        assert_eq!(out.len(), map.len());
    }
}
