//! Data model: document types, variation maps, selectors, extension
//! configs, generation/output configuration, and the manifest.

pub mod document;
pub mod extensions;
pub mod generation;
pub mod imports;
pub mod selector;
pub mod session;
pub mod variation;

pub use document::{ChunkDocument, DocumentKind, Parameters, PromptDocument, ThemeDocument, ThemesBlock};
pub use extensions::{AdetailerConfig, AdetailerDetector, ControlNetConfig, ControlNetUnit};
pub use generation::{AnnotationConfig, GenerationConfig, Mode, OutputConfig, SeedMode};
pub use imports::{ImportEntry, RawImportEntry};
pub use selector::Selector;
pub use session::{GenerationParamsRecord, ImageEntry, Manifest, ResolvedTemplateRecord, RuntimeInfo, Snapshot, VariationRecord};
pub use variation::VariationMap;
