//! Generation and output configuration: enumeration mode, seed mode, and
//! the output-side options that shape the session directory.

use serde::{Deserialize, Serialize};

/// How the combination space is enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Full (or `max_images`-truncated) Cartesian product, in declared order.
    Combinatorial,
    /// Random sampling of the combination space (`SPEC_FULL.md` §4.7).
    Random,
}

/// How seeds are assigned to successive resolved prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedMode {
    /// Every prompt gets the same seed.
    Fixed,
    /// Seed increments by one per prompt (`base + i`).
    Progressive,
    /// Seed is `-1`; the synthesis API chooses.
    Random,
}

/// The `generation` block of a prompt document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Enumeration mode.
    pub mode: Mode,
    /// Seed assignment mode.
    pub seed_mode: SeedMode,
    /// Base seed. Combined with `seed_mode` to derive per-prompt seeds.
    pub base_seed: i64,
    /// Maximum images to emit. `0` means "all" in combinatorial mode.
    pub max_images: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Combinatorial,
            seed_mode: SeedMode::Fixed,
            base_seed: 0,
            max_images: 0,
        }
    }
}

/// Annotation rendering options (the renderer itself is a pluggable
/// external collaborator; this struct is only the configuration contract).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// Whether annotation is enabled for this document.
    pub enabled: bool,
    /// Placeholder keys to render onto the image (empty = all applied
    /// variations).
    pub keys: Vec<String>,
    /// Background opacity, 0.0-1.0.
    pub opacity: f32,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            keys: Vec::new(),
            opacity: 0.6,
        }
    }
}

/// The `output` block of a prompt document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Overrides the session directory's human-readable label.
    pub session_name: Option<String>,
    /// When set, filenames encode these variation keys instead of a plain
    /// numeric index (`SPEC_FULL.md` §6).
    pub filename_keys: Vec<String>,
    /// Annotation settings.
    pub annotation: AnnotationConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_config_default() {
        let cfg = GenerationConfig::default();
        assert_eq!(cfg.mode, Mode::Combinatorial);
        assert_eq!(cfg.seed_mode, SeedMode::Fixed);
        assert_eq!(cfg.max_images, 0);
    }

    #[test]
    fn test_generation_config_deserialize() {
        let yaml = "mode: random\nseed_mode: progressive\nbase_seed: 42\nmax_images: 10\n";
        let cfg: GenerationConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.mode, Mode::Random);
        assert_eq!(cfg.seed_mode, SeedMode::Progressive);
        assert_eq!(cfg.base_seed, 42);
        assert_eq!(cfg.max_images, 10);
    }

    #[test]
    fn test_annotation_config_default() {
        let cfg = AnnotationConfig::default();
        assert!(!cfg.enabled);
        assert!((cfg.opacity - 0.6).abs() < f32::EPSILON);
    }
}
