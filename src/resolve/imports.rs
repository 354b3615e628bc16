//! Import Resolver: turns one `imports` entry into a concrete variation
//! map, extension config, or chunk document (`SPEC_FULL.md` §4.4).

use crate::error::{Result, ResolutionError};
use crate::model::imports::RawImportEntry;
use crate::model::{variation, AdetailerConfig, ChunkDocument, ControlNetConfig, VariationMap};
use crate::resolve::loader;
use std::path::Path;

/// The materialized result of resolving one `imports` entry.
#[derive(Debug, Clone)]
pub enum ResolvedImport {
    /// A (possibly merged) variation map.
    Variation(VariationMap),
    /// An ADetailer extension config.
    Adetailer(AdetailerConfig),
    /// A ControlNet extension config.
    Controlnet(ControlNetConfig),
    /// A chunk document.
    Chunk(Box<ChunkDocument>),
}

impl ResolvedImport {
    /// Human-readable kind name, for `ImportTypeMismatch` errors.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Variation(_) => "variation",
            Self::Adetailer(_) => "adetailer_config",
            Self::Controlnet(_) => "controlnet_config",
            Self::Chunk(_) => "chunk",
        }
    }

    /// Unwraps a variation map, or reports a type mismatch.
    pub fn into_variation(self, name: &str) -> Result<VariationMap> {
        match self {
            Self::Variation(v) => Ok(v),
            other => Err(ResolutionError::ImportTypeMismatch {
                name: name.to_string(),
                path: String::new(),
                expected: "variation",
                actual: other.kind_name(),
            }
            .into()),
        }
    }
}

/// Resolves one raw import entry (string or list, as declared in YAML),
/// relative to `base_dir` (the directory of the document that declared it).
pub fn resolve(name: &str, raw: &RawImportEntry, base_dir: &Path) -> Result<ResolvedImport> {
    match raw {
        RawImportEntry::Single(value) => resolve_single(name, value, base_dir),
        RawImportEntry::List(items) => resolve_list(name, items, base_dir),
    }
}

fn resolve_single(name: &str, value: &str, base_dir: &Path) -> Result<ResolvedImport> {
    if !looks_like_path(value) {
        return Ok(ResolvedImport::Variation(variation::from_inline_string(value)));
    }

    let path = base_dir.join(value);
    if value.ends_with(".adetailer.yaml") {
        let cfg = load_or_not_found(name, &path, loader::load_adetailer_config)?;
        return Ok(ResolvedImport::Adetailer(cfg));
    }
    if value.ends_with(".controlnet.yaml") {
        let cfg = load_or_not_found(name, &path, loader::load_controlnet_config)?;
        return Ok(ResolvedImport::Controlnet(cfg));
    }
    if value.ends_with(".chunk.yaml") {
        let chunk = load_or_not_found(name, &path, loader::load_chunk_document)?;
        return Ok(ResolvedImport::Chunk(Box::new(chunk)));
    }
    let map = load_or_not_found(name, &path, loader::load_variation_map)?;
    Ok(ResolvedImport::Variation(map))
}

fn resolve_list(name: &str, items: &[String], base_dir: &Path) -> Result<ResolvedImport> {
    if items.iter().all(|i| looks_like_path(i)) && !items.is_empty() {
        let mut merged = VariationMap::new();
        for item in items {
            let path = base_dir.join(item);
            let map = load_or_not_found(name, &path, loader::load_variation_map)?;
            merged = variation::merge(merged, &map);
        }
        Ok(ResolvedImport::Variation(merged))
    } else {
        Ok(ResolvedImport::Variation(variation::from_inline_list(items)))
    }
}

fn load_or_not_found<T>(
    name: &str,
    path: &Path,
    f: impl FnOnce(&Path) -> Result<T>,
) -> Result<T> {
    f(path).map_err(|_| {
        ResolutionError::ImportNotFound {
            name: name.to_string(),
            path: path.display().to_string(),
        }
        .into()
    })
}

fn looks_like_path(value: &str) -> bool {
    value.ends_with(".yaml") || value.ends_with(".yml") || value.contains('/')
}
