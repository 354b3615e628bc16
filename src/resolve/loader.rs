//! Loader & Parser: reads a YAML file and classifies it into one of the
//! document kinds (`SPEC_FULL.md` §4.1).

use crate::error::{Error, Result, SourceError};
use crate::model::document::DocumentKind;
use crate::model::{AdetailerConfig, ChunkDocument, ControlNetConfig, PromptDocument, ThemeDocument, VariationMap};
use std::path::Path;

fn read_raw(path: &Path) -> Result<serde_yaml::Value> {
    let path_str = path.display().to_string();
    if !path.exists() {
        return Err(SourceError::NotFound { path: path_str }.into());
    }
    let content = std::fs::read_to_string(path).map_err(|e| SourceError::ReadFailed {
        path: path_str.clone(),
        reason: e.to_string(),
    })?;
    serde_yaml::from_str(&content).map_err(|e| {
        SourceError::MalformedSource {
            path: path_str,
            reason: e.to_string(),
        }
        .into()
    })
}

/// Classifies a parsed YAML value by inspecting its top-level keys and an
/// optional `type:` tag.
///
/// # Errors
///
/// Returns `SourceError::BadKind` when no known document kind matches.
pub fn classify(value: &serde_yaml::Value, path: &Path) -> Result<DocumentKind> {
    let path_str = path.display().to_string();
    let bad_kind = |reason: &str| -> Error {
        SourceError::BadKind {
            path: path_str.clone(),
            reason: reason.to_string(),
        }
        .into()
    };

    let mapping = value.as_mapping().ok_or_else(|| bad_kind("top-level document must be a mapping"))?;
    let has = |key: &str| mapping.contains_key(serde_yaml::Value::String(key.to_string()));

    if let Some(tag) = mapping
        .get(serde_yaml::Value::String("type".to_string()))
        .and_then(serde_yaml::Value::as_str)
    {
        return match tag {
            "adetailer_config" => Ok(DocumentKind::AdetailerConfig),
            "controlnet_config" => Ok(DocumentKind::ControlnetConfig),
            "chunk" => Ok(DocumentKind::Chunk),
            "template" => Ok(DocumentKind::Template),
            "theme" => Ok(DocumentKind::Theme),
            "prompt" => Ok(DocumentKind::Prompt),
            other => Err(bad_kind(&format!("unknown type tag `{other}`"))),
        };
    }

    if has("detectors") {
        return Ok(DocumentKind::AdetailerConfig);
    }
    if has("units") {
        return Ok(DocumentKind::ControlnetConfig);
    }
    if has("template") && has("defaults") && !has("generation") {
        return Ok(DocumentKind::Chunk);
    }
    if has("prompt") || has("template") || has("generation") || has("implements") {
        return Ok(DocumentKind::Prompt);
    }
    if has("imports") && has("name") {
        return Ok(DocumentKind::Theme);
    }
    if !mapping.is_empty() && mapping.values().all(serde_yaml::Value::is_string) {
        return Ok(DocumentKind::Variation);
    }

    Err(bad_kind("document matches no known kind"))
}

/// Loads and classifies a document, without committing to a typed shape.
pub fn classify_file(path: &Path) -> Result<DocumentKind> {
    let value = read_raw(path)?;
    classify(&value, path)
}

/// Loads a prompt (or template) document from `path`.
pub fn load_prompt_document(path: &Path) -> Result<PromptDocument> {
    load_typed(path)
}

/// Loads a chunk document from `path`.
pub fn load_chunk_document(path: &Path) -> Result<ChunkDocument> {
    load_typed(path)
}

/// Loads a theme document from `path`.
pub fn load_theme_document(path: &Path) -> Result<ThemeDocument> {
    load_typed(path)
}

/// Loads an ADetailer extension config from `path`.
pub fn load_adetailer_config(path: &Path) -> Result<AdetailerConfig> {
    load_typed(path)
}

/// Loads a ControlNet extension config from `path`.
pub fn load_controlnet_config(path: &Path) -> Result<ControlNetConfig> {
    load_typed(path)
}

/// Loads a flat variation map from `path`.
pub fn load_variation_map(path: &Path) -> Result<VariationMap> {
    load_typed(path)
}

fn load_typed<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let path_str = path.display().to_string();
    if !path.exists() {
        return Err(SourceError::NotFound { path: path_str }.into());
    }
    let content = std::fs::read_to_string(path).map_err(|e| SourceError::ReadFailed {
        path: path_str.clone(),
        reason: e.to_string(),
    })?;
    serde_yaml::from_str(&content).map_err(|e| {
        SourceError::MalformedSource {
            path: path_str,
            reason: e.to_string(),
        }
        .into()
    })
}
