//! ADetailer and ControlNet extension configuration.
//!
//! Both extensions are optional `alwayson_scripts` entries in the synthesis
//! API payload (`SPEC_FULL.md` §4.9/§6). The in-memory shape here is a
//! normal struct; `api::payload` owns the wire-format encoding (ADetailer's
//! flat positional argument list, ControlNet's structured units).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One detector entry in an `AdetailerConfig`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdetailerDetector {
    /// Detection model, e.g. `"face_yolov8n.pt"`.
    pub model: String,
    /// Confidence threshold for a detection to be acted on.
    pub confidence: f32,
    /// Mask dilation in pixels.
    pub mask_dilate: i32,
    /// Mask blur radius in pixels.
    pub mask_blur: i32,
    /// Inpaint denoising strength.
    pub denoising_strength: f32,
    /// Inpaint-only-masked toggle.
    pub inpaint_only_masked: bool,
    /// Inpaint padding in pixels, when `inpaint_only_masked` is set.
    pub inpaint_padding: i32,
    /// Optional detector-specific positive prompt override.
    pub prompt: Option<String>,
    /// Optional detector-specific negative prompt override.
    pub negative_prompt: Option<String>,
}

impl Default for AdetailerDetector {
    fn default() -> Self {
        Self {
            model: "face_yolov8n.pt".to_string(),
            confidence: 0.3,
            mask_dilate: 4,
            mask_blur: 4,
            denoising_strength: 0.4,
            inpaint_only_masked: true,
            inpaint_padding: 32,
            prompt: None,
            negative_prompt: None,
        }
    }
}

/// An ADetailer extension configuration: an ordered list of detectors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdetailerConfig {
    /// Detectors applied in order, each as its own ADetailer pass.
    pub detectors: Vec<AdetailerDetector>,
}

/// One ControlNet unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlNetUnit {
    /// ControlNet model checkpoint name.
    pub model: String,
    /// Preprocessor ("module") name.
    pub module: String,
    /// Control strength / weight.
    pub weight: f32,
    /// Guidance start, as a fraction of total steps.
    pub guidance_start: f32,
    /// Guidance end, as a fraction of total steps.
    pub guidance_end: f32,
    /// Path to the control input image, relative to the document that
    /// declared this unit.
    pub image: PathBuf,
}

impl Default for ControlNetUnit {
    fn default() -> Self {
        Self {
            model: String::new(),
            module: "none".to_string(),
            weight: 1.0,
            guidance_start: 0.0,
            guidance_end: 1.0,
            image: PathBuf::new(),
        }
    }
}

/// A ControlNet extension configuration: an ordered list of units.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControlNetConfig {
    /// Units applied in order.
    pub units: Vec<ControlNetUnit>,
}
