//! Aggregates everything the Prompt Generator needs: chunk-injected
//! template text, the per-placeholder restricted variation space, and the
//! merged generation parameters (`SPEC_FULL.md` §4.6-4.7).

use crate::error::{Error, Result, ResolutionError};
use crate::generate::rng::SplitMix64;
use crate::model::document::Parameters;
use crate::model::{ChunkDocument, PromptDocument, Selector, VariationMap};
use crate::model::variation;
use crate::resolve::imports::ResolvedImport;
use crate::resolve::{imports, template, theme};
use indexmap::IndexMap;

/// The fully-resolved context a single document resolves to, ready for
/// per-combination substitution.
#[derive(Debug, Clone, Default)]
pub struct ResolvedContext {
    /// The chunk-injected positive template, with placeholder tokens intact.
    pub template: String,
    /// The chunk-injected negative template, if any.
    pub negative_template: Option<String>,
    /// Per-placeholder restricted variation space, in template-scan order.
    pub placeholders: IndexMap<String, VariationMap>,
    /// Merged generation parameters (sampler, steps, cfg, width, height, ...).
    pub parameters: Parameters,
}

/// Builds a `ResolvedContext` from a fully inheritance-merged document.
///
/// `explicit_imports` is the leaf document's own (non-inherited) `imports`
/// map, used by the theme resolver to let the leaf's own declarations win
/// over a themed substitution. `base_dir` is the directory imports and
/// themes are resolved relative to. `theme` names the theme to apply by
/// looking it up in the document's declared/autodiscovered themes map —
/// a theme is applied only when `theme` or `theme_file` is `Some`
/// (`SPEC_FULL.md` §4.5). `theme_file`, when given, loads the theme from
/// that path directly, bypassing the name lookup and taking precedence
/// over `theme`. `style` selects which `Name.style` variants of a
/// theme's imports apply, independent of which theme is active.
///
/// # Errors
///
/// Returns `ResolutionError::ThemeNotFound` if `theme` is `Some`,
/// `theme_file` is `None`, and the name isn't in the document's declared
/// or autodiscovered themes.
pub fn build(
    doc: &PromptDocument,
    explicit_imports: &IndexMap<String, crate::model::RawImportEntry>,
    base_dir: &std::path::Path,
    theme: Option<&str>,
    theme_file: Option<&std::path::Path>,
    style: Option<&str>,
    rng: &mut SplitMix64,
) -> Result<ResolvedContext> {
    let mut effective_imports = doc.imports.clone();

    let active_theme = if let Some(path) = theme_file {
        Some(theme::load_theme_from_path(path)?)
    } else if let Some(active_name) = theme {
        let available = doc
            .themes
            .as_ref()
            .map(|block| theme::available_themes(block, base_dir))
            .unwrap_or_default();
        Some(theme::load_theme(active_name, &available)?)
    } else {
        None
    };

    if let Some(theme_doc) = active_theme {
        effective_imports = theme::apply(&effective_imports, explicit_imports, &theme_doc, style);
    }

    let mut resolved: IndexMap<String, ResolvedImport> = IndexMap::new();
    for (name, raw) in &effective_imports {
        resolved.insert(name.clone(), imports::resolve(name, raw, base_dir)?);
    }

    let positive = doc.template.clone().or_else(|| doc.prompt.clone()).unwrap_or_default();
    let (injected_template, defaults) = template::inject_chunks(&positive, &doc.chunks);
    let tokens = template::scan_tokens(&injected_template);

    let negative_template = doc.negative_prompt.clone().map(|n| {
        let (injected, _) = template::inject_chunks(&n, &doc.chunks);
        injected
    });
    let negative_tokens = negative_template
        .as_deref()
        .map(template::scan_tokens)
        .unwrap_or_default();

    let mut placeholders = IndexMap::new();
    for token in tokens.iter().chain(negative_tokens.iter()) {
        if placeholders.contains_key(&token.name) {
            continue;
        }
        let full_map = resolve_placeholder_space(&token.name, &resolved, &defaults)?;
        let restricted = match &token.selector_body {
            Some(body) => {
                let selector = Selector::parse(body, &token.name).map_err(Error::from)?;
                selector.apply(&token.name, &full_map, rng)?
            }
            None => full_map,
        };
        placeholders.insert(token.name.clone(), restricted);
    }

    Ok(ResolvedContext {
        template: injected_template,
        negative_template,
        placeholders,
        parameters: doc.parameters.clone(),
    })
}

fn resolve_placeholder_space(
    name: &str,
    resolved_imports: &IndexMap<String, ResolvedImport>,
    chunk_defaults: &IndexMap<String, String>,
) -> Result<VariationMap> {
    if let Some(resolved) = resolved_imports.get(name) {
        return Ok(resolved.clone().into_variation(name)?);
    }
    if let Some(default) = chunk_defaults.get(name) {
        return Ok(variation::from_inline_string(default));
    }
    Err(ResolutionError::UnresolvedPlaceholder { name: name.to_string() }.into())
}
