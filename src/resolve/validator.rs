//! Structural validation of a single document, before inheritance is
//! resolved (`SPEC_FULL.md` §4.2).

use crate::error::StructuralError;
use crate::model::PromptDocument;

/// Validates a document in isolation. Collects every violation found
/// rather than stopping at the first (the `validate` CLI subcommand relies
/// on this for accumulate-then-report behavior).
#[must_use]
pub fn validate(doc: &PromptDocument, document_name: &str) -> Vec<StructuralError> {
    let mut errors = Vec::new();

    if doc.name.is_empty() {
        errors.push(StructuralError::MissingField {
            document: document_name.to_string(),
            field: "name".to_string(),
        });
    }

    if doc.prompt.is_none() && doc.template.is_none() {
        errors.push(StructuralError::MissingField {
            document: document_name.to_string(),
            field: "prompt or template".to_string(),
        });
    }

    for (name, chunk) in &doc.chunks {
        for reserved in ["{prompt}", "{negprompt}"] {
            if chunk.template.contains(reserved) {
                errors.push(StructuralError::ReservedPlaceholderInChunk {
                    document: format!("{document_name}::{name}"),
                    placeholder: reserved.trim_matches(['{', '}']).to_string(),
                });
            }
        }
    }

    errors.extend(validate_placeholder_syntax(
        doc.template.as_deref().unwrap_or_default(),
        document_name,
    ));

    errors
}

/// Validates that every `{Name}` / `{Name[selector]}` token in `template`
/// is well-formed (balanced braces, valid identifier, parseable selector).
#[must_use]
pub fn validate_placeholder_syntax(template: &str, document_name: &str) -> Vec<StructuralError> {
    use crate::model::Selector;

    let mut errors = Vec::new();
    let bytes = template.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            let Some(close) = template[i..].find('}') else {
                errors.push(StructuralError::BadPlaceholderSyntax {
                    document: document_name.to_string(),
                    token: template[i..].to_string(),
                    reason: "unterminated placeholder".to_string(),
                });
                break;
            };
            let inner = &template[i + 1..i + close];
            let (name, selector_body) = match inner.find('[') {
                Some(bracket) if inner.ends_with(']') => (&inner[..bracket], Some(&inner[bracket + 1..inner.len() - 1])),
                Some(_) => {
                    errors.push(StructuralError::BadPlaceholderSyntax {
                        document: document_name.to_string(),
                        token: format!("{{{inner}}}"),
                        reason: "selector must end with `]`".to_string(),
                    });
                    i += close + 1;
                    continue;
                }
                None => (inner, None),
            };

            if name.is_empty() || !is_valid_identifier(name) {
                errors.push(StructuralError::BadPlaceholderSyntax {
                    document: document_name.to_string(),
                    token: format!("{{{inner}}}"),
                    reason: "placeholder name must be a valid identifier".to_string(),
                });
            } else if let Some(body) = selector_body
                && let Err(e) = Selector::parse(body, name)
            {
                errors.push(e);
            }

            i += close + 1;
        } else {
            i += 1;
        }
    }
    errors
}

fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PromptDocument;

    #[test]
    fn test_validate_missing_prompt_and_template() {
        let doc = PromptDocument {
            name: "x".to_string(),
            ..PromptDocument::default()
        };
        let errors = validate(&doc, "x.yaml");
        assert!(errors.iter().any(|e| matches!(e, StructuralError::MissingField { field, .. } if field == "prompt or template")));
    }

    #[test]
    fn test_validate_missing_name() {
        let doc = PromptDocument {
            prompt: Some("masterpiece".to_string()),
            ..PromptDocument::default()
        };
        let errors = validate(&doc, "x.yaml");
        assert!(errors.iter().any(|e| matches!(e, StructuralError::MissingField { field, .. } if field == "name")));
    }

    #[test]
    fn test_validate_placeholder_syntax_ok() {
        let errors = validate_placeholder_syntax("masterpiece, {Expression[3]}, {Angle}", "d");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_validate_placeholder_syntax_unterminated() {
        let errors = validate_placeholder_syntax("masterpiece, {Expression", "d");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_validate_placeholder_syntax_bad_identifier() {
        let errors = validate_placeholder_syntax("{1bad}", "d");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_validate_placeholder_syntax_bad_selector() {
        let errors = validate_placeholder_syntax("{Expression[#3-1]}", "d");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_validate_reserved_in_chunk() {
        use crate::model::ChunkDocument;
        let mut doc = PromptDocument {
            name: "x".to_string(),
            template: Some("@Char".to_string()),
            ..PromptDocument::default()
        };
        doc.chunks.insert(
            "Char".to_string(),
            ChunkDocument {
                name: "Char".to_string(),
                template: "{prompt}, detailed".to_string(),
                ..ChunkDocument::default()
            },
        );
        let errors = validate(&doc, "x.yaml");
        assert!(errors
            .iter()
            .any(|e| matches!(e, StructuralError::ReservedPlaceholderInChunk { .. })));
    }
}
