//! The manifest: the reproducibility record written to every session
//! directory (`SPEC_FULL.md` §3, §6 schema).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Per-placeholder variation bookkeeping recorded in the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariationRecord {
    /// The restricted variation space available for this placeholder
    /// (post-selector, post-theme).
    pub available: Vec<String>,
    /// Keys actually chosen across the session so far.
    pub used: Vec<String>,
    /// `available.len()`.
    pub count: usize,
}

/// Generation-mode parameters recorded in the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParamsRecord {
    /// Enumeration mode as a string ("combinatorial" / "random").
    pub mode: String,
    /// Seed mode as a string ("fixed" / "progressive" / "random").
    pub seed_mode: String,
    /// Base seed.
    pub base_seed: i64,
    /// Requested image count (0 = all, in combinatorial mode).
    pub num_images: usize,
    /// Size of the full combination space before `max_images` truncation.
    pub total_combinations: usize,
}

/// Runtime environment info captured at session start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeInfo {
    /// The checkpoint reported by the synthesis backend at session start.
    pub sd_model_checkpoint: String,
}

/// The resolved template strings, recorded once per session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedTemplateRecord {
    /// The (pre-placeholder-substitution) resolved prompt template.
    pub prompt: String,
    /// The (pre-placeholder-substitution) resolved negative template.
    pub negative: String,
}

/// The manifest's immutable `snapshot` section, written once before the
/// first image is produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Manifest schema version.
    pub version: String,
    /// ISO-8601 timestamp of session start.
    pub timestamp: String,
    /// Runtime environment info.
    pub runtime_info: RuntimeInfo,
    /// Resolved (pre-substitution) template strings.
    pub resolved_template: ResolvedTemplateRecord,
    /// Generation mode/seed parameters.
    pub generation_params: GenerationParamsRecord,
    /// Full API parameter snapshot (sampler, steps, cfg, extensions, ...).
    pub api_params: serde_json::Value,
    /// Per-placeholder variation bookkeeping.
    pub variations: IndexMap<String, VariationRecord>,
    /// Active theme name, if any.
    pub theme_name: Option<String>,
    /// Active style, if any.
    pub style: Option<String>,
}

/// One entry of the manifest's append-only `images` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageEntry {
    /// Image filename, relative to the session directory.
    pub filename: String,
    /// Seed actually used (never `-1`; the API always reports a concrete
    /// value even when the request asked for `-1`).
    pub seed: i64,
    /// Final resolved positive prompt.
    pub prompt: String,
    /// Final resolved negative prompt.
    pub negative_prompt: String,
    /// The variation key chosen per placeholder for this image.
    pub applied_variations: IndexMap<String, String>,
}

/// The full manifest document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// The reproducibility snapshot.
    pub snapshot: Snapshot,
    /// Successfully produced images, in generation order.
    pub images: Vec<ImageEntry>,
}

impl Manifest {
    /// Creates a fresh manifest with an empty `images` array.
    #[must_use]
    pub const fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            images: Vec::new(),
        }
    }

    /// Appends an image entry and updates the snapshot's `used` lists.
    pub fn append(&mut self, entry: ImageEntry) {
        for (key, chosen) in &entry.applied_variations {
            if let Some(record) = self.snapshot.variations.get_mut(key)
                && !record.used.contains(chosen)
            {
                record.used.push(chosen.clone());
            }
        }
        self.images.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> Snapshot {
        let mut variations = IndexMap::new();
        variations.insert(
            "Expression".to_string(),
            VariationRecord {
                available: vec!["happy".to_string(), "sad".to_string()],
                used: Vec::new(),
                count: 2,
            },
        );
        Snapshot {
            version: "2.0".to_string(),
            timestamp: "2026-07-28T00:00:00Z".to_string(),
            runtime_info: RuntimeInfo {
                sd_model_checkpoint: "unknown".to_string(),
            },
            resolved_template: ResolvedTemplateRecord {
                prompt: "masterpiece, {Expression}".to_string(),
                negative: String::new(),
            },
            generation_params: GenerationParamsRecord {
                mode: "combinatorial".to_string(),
                seed_mode: "fixed".to_string(),
                base_seed: 42,
                num_images: 0,
                total_combinations: 2,
            },
            api_params: serde_json::json!({}),
            variations,
            theme_name: None,
            style: None,
        }
    }

    #[test]
    fn test_manifest_monotonic_append() {
        let mut manifest = Manifest::new(sample_snapshot());
        assert_eq!(manifest.images.len(), 0);

        let mut applied = IndexMap::new();
        applied.insert("Expression".to_string(), "happy".to_string());
        manifest.append(ImageEntry {
            filename: "0000.png".to_string(),
            seed: 42,
            prompt: "masterpiece, smiling".to_string(),
            negative_prompt: String::new(),
            applied_variations: applied,
        });

        assert_eq!(manifest.images.len(), 1);
        assert_eq!(
            manifest.snapshot.variations["Expression"].used,
            vec!["happy".to_string()]
        );
    }

    #[test]
    fn test_manifest_serializes_to_documented_schema() {
        let manifest = Manifest::new(sample_snapshot());
        let json = serde_json::to_value(&manifest).unwrap();
        assert!(json.get("snapshot").is_some());
        assert!(json.get("images").is_some());
        assert_eq!(json["snapshot"]["variations"]["Expression"]["count"], 2);
    }
}
