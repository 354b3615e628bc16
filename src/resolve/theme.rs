//! Theme Resolver: complete import substitution plus style rebinding
//! (`SPEC_FULL.md` §4.5).

use crate::error::{Result, ResolutionError};
use crate::model::document::ThemesBlock;
use crate::model::imports::RawImportEntry;
use crate::model::ThemeDocument;
use crate::resolve::loader;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The sentinel value that binds a themed placeholder to the empty string.
const REMOVE_SENTINEL: &str = "[Remove]";

/// Builds the map of theme name -> path to `theme.yaml`, combining explicit
/// entries in the `themes` block with autodiscovered subdirectories.
/// Explicit entries win on name collision.
#[must_use]
pub fn available_themes(block: &ThemesBlock, base_dir: &Path) -> IndexMap<String, PathBuf> {
    let mut themes = IndexMap::new();

    if block.enable_autodiscovery {
        for search_path in &block.search_paths {
            let root = base_dir.join(search_path);
            for entry in WalkDir::new(&root).max_depth(2).into_iter().filter_map(std::result::Result::ok) {
                if entry.file_name() == "theme.yaml"
                    && let Some(theme_dir) = entry.path().parent()
                    && let Some(name) = theme_dir.file_name().and_then(|n| n.to_str())
                {
                    themes.insert(name.to_string(), entry.path().to_path_buf());
                }
            }
        }
    }

    for (name, path) in &block.themes {
        themes.insert(name.clone(), base_dir.join(path));
    }

    themes
}

/// Loads the named theme from the available-themes map.
pub fn load_theme(name: &str, available: &IndexMap<String, PathBuf>) -> Result<ThemeDocument> {
    let path = available.get(name).ok_or_else(|| ResolutionError::ThemeNotFound {
        name: name.to_string(),
    })?;
    loader::load_theme_document(path)
}

/// Loads a theme document directly from an explicit path, bypassing the
/// available-themes name lookup (backs `--theme-file`).
pub fn load_theme_from_path(path: &Path) -> Result<ThemeDocument> {
    loader::load_theme_document(path)
}

/// Applies complete-substitution theme resolution: `theme.imports`
/// replaces matching entries of `merged_imports` wholesale, style-suffixed
/// entries (`Name.style`) are rebound or dropped, and `explicit_imports`
/// (the leaf document's own, non-inherited imports) are reapplied last so
/// they always win.
#[must_use]
pub fn apply(
    merged_imports: &IndexMap<String, RawImportEntry>,
    explicit_imports: &IndexMap<String, RawImportEntry>,
    theme: &ThemeDocument,
    style: Option<&str>,
) -> IndexMap<String, RawImportEntry> {
    let mut result = merged_imports.clone();

    for (key, value) in rebind_styles(&theme.imports, style) {
        result.insert(key, value);
    }

    for (key, value) in explicit_imports {
        result.insert(key.clone(), value.clone());
    }

    result
}

fn rebind_styles(imports: &IndexMap<String, RawImportEntry>, style: Option<&str>) -> IndexMap<String, RawImportEntry> {
    let mut result = IndexMap::new();
    for (key, value) in imports {
        let (base_key, is_styled) = match key.split_once('.') {
            Some((base, suffix)) => {
                if Some(suffix) != style {
                    continue;
                }
                (base.to_string(), true)
            }
            None => (key.clone(), false),
        };

        let value = if is_removed(value) {
            RawImportEntry::Single(String::new())
        } else {
            value.clone()
        };

        if is_styled || !result.contains_key(&base_key) {
            result.insert(base_key, value);
        }
    }
    result
}

fn is_removed(value: &RawImportEntry) -> bool {
    matches!(value, RawImportEntry::Single(s) if s == REMOVE_SENTINEL)
}
