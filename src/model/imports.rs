//! The `imports` mapping's value is dynamically typed in the source YAML
//! (a string, a list, or a nested mapping). Rather than carry that
//! dynamism into Rust, it is classified once by the loader into this
//! explicit tagged union (`SPEC_FULL.md` §9).

use crate::model::extensions::{AdetailerConfig, ControlNetConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One entry of a prompt document's `imports` mapping, after classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportEntry {
    /// A single variation file path.
    File(PathBuf),
    /// A list of variation file paths, unioned in order (later wins).
    FileList(Vec<PathBuf>),
    /// An inline literal string, keyed by itself.
    InlineString(String),
    /// An inline list of literal strings, each keyed by itself.
    InlineList(Vec<String>),
    /// An ADetailer extension config, loaded from a `.adetailer.yaml` file.
    Adetailer(AdetailerConfig),
    /// A ControlNet extension config, loaded from a `.controlnet.yaml` file.
    Controlnet(ControlNetConfig),
    /// A chunk document, loaded from a `.chunk.yaml` file.
    Chunk(Box<crate::model::document::ChunkDocument>),
}

impl ImportEntry {
    /// Human-readable kind name, used in `ImportTypeMismatch` errors.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::FileList(_) => "file_list",
            Self::InlineString(_) => "inline_string",
            Self::InlineList(_) => "inline_list",
            Self::Adetailer(_) => "adetailer_config",
            Self::Controlnet(_) => "controlnet_config",
            Self::Chunk(_) => "chunk",
        }
    }
}

/// Raw shape of an `imports` entry as it appears in YAML, before
/// classification by file-extension / inline-value sniffing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawImportEntry {
    /// `Name: path/to/file.yaml` or `Name: literal value`.
    Single(String),
    /// `Name: [path1.yaml, path2.yaml]` or `Name: [a, b, c]`.
    List(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_name() {
        assert_eq!(ImportEntry::File(PathBuf::from("x.yaml")).kind_name(), "file");
        assert_eq!(ImportEntry::InlineString("x".into()).kind_name(), "inline_string");
    }

    #[test]
    fn test_raw_import_entry_roundtrip() {
        let single: RawImportEntry = serde_yaml::from_str("\"expr.yaml\"").unwrap();
        assert!(matches!(single, RawImportEntry::Single(_)));

        let list: RawImportEntry = serde_yaml::from_str("[a, b]").unwrap();
        assert!(matches!(list, RawImportEntry::List(_)));
    }
}
