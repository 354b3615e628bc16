//! Document types: prompt documents, chunk documents, and theme documents.

use crate::model::generation::{GenerationConfig, OutputConfig};
use crate::model::imports::RawImportEntry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Free-form generation parameters (sampler, steps, cfg, width, height, and
/// any extension sub-objects). Kept as a JSON value map rather than a fixed
/// struct because the synthesis API's parameter set evolves independently
/// of this crate; merge rules (`SPEC_FULL.md` §4.3) operate on this map
/// directly (nested objects are replaced wholesale, not deep-merged).
pub type Parameters = IndexMap<String, serde_json::Value>;

/// Which kind of document a YAML file was classified as by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// A prompt document (the default, terminal kind).
    Prompt,
    /// A template document (structurally identical to a prompt document,
    /// used only via `implements`).
    Template,
    /// A chunk document.
    Chunk,
    /// A flat variation map.
    Variation,
    /// An ADetailer extension config.
    AdetailerConfig,
    /// A ControlNet extension config.
    ControlnetConfig,
    /// A theme document.
    Theme,
}

/// A prompt (or template) document, as loaded from YAML.
///
/// Prompt and template documents share this exact shape; `kind` records
/// which the loader classified it as, but the resolver treats both
/// uniformly once loaded (`SPEC_FULL.md` §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptDocument {
    /// Document schema version.
    pub version: String,
    /// Human-readable document name.
    pub name: String,
    /// Path to a parent document this one inherits from, relative to this
    /// document's own directory.
    pub implements: Option<PathBuf>,
    /// Named imports, not yet classified (the loader/import-resolver turns
    /// these into `ImportEntry` values).
    pub imports: IndexMap<String, RawImportEntry>,
    /// Inline chunk definitions (as opposed to chunks loaded via imports).
    pub chunks: IndexMap<String, ChunkDocument>,
    /// The prompt string substituted into a parent's `{prompt}` marker (or
    /// used directly when this document has no parent).
    pub prompt: Option<String>,
    /// The template string, for a document with no parent (or acting as a
    /// parent/template itself).
    pub template: Option<String>,
    /// Negative prompt string or fragment.
    pub negative_prompt: Option<String>,
    /// Generation parameters (sampler, steps, cfg, width, height, ...).
    pub parameters: Parameters,
    /// Enumeration and seed configuration. `None` means "inherit from the
    /// parent document unchanged"; when present, it replaces the parent's
    /// `generation` block in full (`SPEC_FULL.md` §4.3).
    pub generation: Option<GenerationConfig>,
    /// Output-side configuration (session name, filename keys, annotation).
    pub output: Option<OutputConfig>,
    /// Theme configuration.
    pub themes: Option<ThemesBlock>,
}

impl Default for PromptDocument {
    fn default() -> Self {
        Self {
            version: "2.0".to_string(),
            name: String::new(),
            implements: None,
            imports: IndexMap::new(),
            chunks: IndexMap::new(),
            prompt: None,
            template: None,
            negative_prompt: None,
            parameters: Parameters::new(),
            generation: None,
            output: None,
            themes: None,
        }
    }
}

/// A reusable template fragment, injected via `@ChunkName` markers.
///
/// Chunk `implements` is limited to one level (definition -> single
/// implementation); the inheritance resolver enforces this separately from
/// the general document chain depth limit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkDocument {
    /// Chunk name (normally the key it's declared under).
    pub name: String,
    /// The chunk's own template body, injected verbatim in Phase A.
    pub template: String,
    /// Default values for placeholders the chunk body introduces, used
    /// when the outer document's context does not already bind them.
    pub defaults: IndexMap<String, String>,
    /// Optional one-level parent chunk.
    pub implements: Option<PathBuf>,
}

/// The `themes` block of a prompt document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemesBlock {
    /// Whether to scan `search_paths` for `theme.yaml` files.
    pub enable_autodiscovery: bool,
    /// Directories to scan (immediate subdirectories only) when
    /// autodiscovery is enabled.
    pub search_paths: Vec<PathBuf>,
    /// Explicitly declared themes (name -> path to `theme.yaml`); these
    /// take precedence over autodiscovered entries with the same name.
    pub themes: IndexMap<String, PathBuf>,
}

/// A theme document, loaded from a `theme.yaml` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeDocument {
    /// Theme name.
    pub name: String,
    /// Imports this theme substitutes in (complete substitution,
    /// `SPEC_FULL.md` §4.5).
    pub imports: IndexMap<String, RawImportEntry>,
}
