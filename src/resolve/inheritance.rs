//! Inheritance Resolver: walks the `implements` chain and merges
//! parent/child documents root-to-leaf (`SPEC_FULL.md` §4.3).

use crate::error::{Result, ResolutionError};
use crate::model::PromptDocument;
use crate::resolve::loader;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Maximum `implements` chain depth before the resolver gives up and
/// reports `MaxInheritanceDepthExceeded` (`SPEC_FULL.md` §9).
pub const MAX_DEPTH: usize = 16;

/// Loads `path` and fully resolves its `implements` chain, returning the
/// single merged document (leaf wins on every field-level conflict).
pub fn resolve(path: &Path) -> Result<PromptDocument> {
    let mut visited = HashSet::new();
    resolve_inner(path, &mut visited, 0)
}

fn resolve_inner(path: &Path, visited: &mut HashSet<PathBuf>, depth: usize) -> Result<PromptDocument> {
    if depth > MAX_DEPTH {
        return Err(ResolutionError::MaxInheritanceDepthExceeded {
            path: path.display().to_string(),
            max: MAX_DEPTH,
        }
        .into());
    }

    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical) {
        return Err(ResolutionError::CycleDetected {
            path: path.display().to_string(),
        }
        .into());
    }

    let child = loader::load_prompt_document(path)?;
    let Some(parent_rel) = child.implements.clone() else {
        return Ok(child);
    };

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let parent_path = base_dir.join(&parent_rel);
    let parent = resolve_inner(&parent_path, visited, depth + 1)?;

    Ok(merge(parent, child))
}

/// Merges a resolved parent document with a child document, per the field
/// rules in `SPEC_FULL.md` §4.3. `parent` wins only where `child` is silent.
#[must_use]
pub fn merge(mut parent: PromptDocument, child: PromptDocument) -> PromptDocument {
    let parent_template = parent.template.clone().unwrap_or_default();

    let merged_template = if let Some(child_prompt) = child.prompt.clone() {
        if parent_template.contains("{prompt}") {
            Some(parent_template.replace("{prompt}", &child_prompt))
        } else if parent_template.is_empty() {
            Some(child_prompt)
        } else {
            tracing::warn!(
                parent = %parent.name,
                "parent template has no {{prompt}} marker; replacing it wholesale with the child's prompt"
            );
            Some(child_prompt)
        }
    } else {
        child.template.clone().or(parent.template.clone())
    };

    let parent_neg = parent.negative_prompt.clone().unwrap_or_default();
    let merged_negative = if let Some(child_neg) = child.negative_prompt.clone() {
        if parent_neg.contains("{negprompt}") {
            Some(parent_neg.replace("{negprompt}", &child_neg))
        } else if parent_neg.is_empty() {
            Some(child_neg)
        } else {
            Some(format!("{parent_neg}, {child_neg}"))
        }
    } else {
        parent.negative_prompt.clone()
    };

    for (k, v) in child.parameters {
        parent.parameters.insert(k, v);
    }
    for (k, v) in child.imports {
        parent.imports.insert(k, v);
    }
    for (k, v) in child.chunks {
        parent.chunks.insert(k, v);
    }

    PromptDocument {
        version: child.version,
        name: if child.name.is_empty() { parent.name } else { child.name },
        implements: None,
        imports: parent.imports,
        chunks: parent.chunks,
        prompt: child.prompt.or(parent.prompt),
        template: merged_template,
        negative_prompt: merged_negative,
        parameters: parent.parameters,
        generation: child.generation.or(parent.generation),
        output: child.output.or(parent.output),
        themes: child.themes.or(parent.themes),
    }
}
