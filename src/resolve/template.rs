//! Template Resolver: structural chunk injection (Phase A) and placeholder
//! token scanning ahead of per-combination substitution (Phase B),
//! `SPEC_FULL.md` §4.6.

use crate::model::ChunkDocument;
use indexmap::IndexMap;

/// One `{Name}` or `{Name[selector]}` occurrence found in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderToken {
    /// The full matched text, e.g. `"{Expression[3]}"`.
    pub full: String,
    /// The placeholder name, e.g. `"Expression"`.
    pub name: String,
    /// The selector body, if a `[...]` suffix was present.
    pub selector_body: Option<String>,
}

/// Phase A: replaces every `@ChunkName` marker with the named chunk's own
/// template body, one level deep (the injected text is not re-scanned for
/// further `@` markers). Unknown chunk names are left untouched. Returns
/// the injected template plus the union of every used chunk's `defaults`,
/// first-chunk-wins on key collision.
#[must_use]
pub fn inject_chunks(template: &str, chunks: &IndexMap<String, ChunkDocument>) -> (String, IndexMap<String, String>) {
    let mut defaults = IndexMap::new();
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(at) = rest.find('@') {
        result.push_str(&rest[..at]);
        let after = &rest[at + 1..];
        let end = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        let name = &after[..end];

        if let Some(chunk) = chunks.get(name) {
            result.push_str(&chunk.template);
            for (k, v) in &chunk.defaults {
                defaults.entry(k.clone()).or_insert_with(|| v.clone());
            }
        } else {
            result.push('@');
            result.push_str(name);
        }
        rest = &after[end..];
    }
    result.push_str(rest);
    (result, defaults)
}

/// Scans `template` for placeholder tokens, in left-to-right order,
/// skipping malformed ones (validation is the validator's job, not this
/// one's — by the time generation runs, the document has already passed
/// validation).
#[must_use]
pub fn scan_tokens(template: &str) -> Vec<PlaceholderToken> {
    let mut tokens = Vec::new();
    let mut rest = template;
    let mut consumed = 0usize;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        let full = &rest[open..open + close + 1];
        let inner = &full[1..full.len() - 1];
        let (name, selector_body) = match inner.find('[') {
            Some(bracket) if inner.ends_with(']') => {
                (inner[..bracket].to_string(), Some(inner[bracket + 1..inner.len() - 1].to_string()))
            }
            _ => (inner.to_string(), None),
        };

        if !name.is_empty() {
            tokens.push(PlaceholderToken {
                full: full.to_string(),
                name,
                selector_body,
            });
        }

        consumed += open + close + 1;
        rest = &template[consumed..];
    }

    tokens
}

/// Phase B: substitutes every scanned token with the value chosen for its
/// name in `chosen`, for one concrete combination.
#[must_use]
pub fn substitute(template: &str, tokens: &[PlaceholderToken], chosen: &IndexMap<String, String>) -> String {
    let mut result = template.to_string();
    for token in tokens {
        if let Some(value) = chosen.get(&token.name) {
            result = result.replacen(&token.full, value, 1);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_chunks_replaces_marker() {
        let mut chunks = IndexMap::new();
        chunks.insert(
            "Char".to_string(),
            ChunkDocument {
                name: "Char".to_string(),
                template: "1girl, {HairColor} hair".to_string(),
                defaults: [("HairColor".to_string(), "brown".to_string())].into_iter().collect(),
                implements: None,
            },
        );
        let (injected, defaults) = inject_chunks("masterpiece, @Char, detailed", &chunks);
        assert_eq!(injected, "masterpiece, 1girl, {HairColor} hair, detailed");
        assert_eq!(defaults.get("HairColor"), Some(&"brown".to_string()));
    }

    #[test]
    fn test_inject_chunks_leaves_unknown_marker() {
        let chunks = IndexMap::new();
        let (injected, _) = inject_chunks("hello @Unknown world", &chunks);
        assert_eq!(injected, "hello @Unknown world");
    }

    #[test]
    fn test_scan_tokens_with_and_without_selector() {
        let tokens = scan_tokens("{Expression[3]}, {Angle}");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].name, "Expression");
        assert_eq!(tokens[0].selector_body.as_deref(), Some("3"));
        assert_eq!(tokens[1].name, "Angle");
        assert!(tokens[1].selector_body.is_none());
    }

    #[test]
    fn test_substitute_replaces_each_token() {
        let tokens = scan_tokens("{Expression[3]}, {Angle}");
        let mut chosen = IndexMap::new();
        chosen.insert("Expression".to_string(), "smiling".to_string());
        chosen.insert("Angle".to_string(), "from below".to_string());
        let out = substitute("{Expression[3]}, {Angle}", &tokens, &chosen);
        assert_eq!(out, "smiling, from below");
    }
}
