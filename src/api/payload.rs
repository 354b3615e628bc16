//! Synthesis API request payload construction: merges the per-prompt
//! parameters with the positive/negative prompt and seed, and encodes the
//! ADetailer/ControlNet extension configs into their `alwayson_scripts`
//! shapes (`SPEC_FULL.md` §4.9, §9).

use crate::generate::ResolvedPrompt;
use crate::model::{AdetailerConfig, AdetailerDetector, ControlNetConfig, ControlNetUnit};
use serde_json::{json, Value};
use std::path::Path;

/// Fixed width of one detector's positional argument list in the
/// `alwayson_scripts.ADetailer.args` encoding. The upstream extension's
/// scripting contract exposes far more knobs than this crate's
/// `AdetailerDetector` fields cover; unexposed slots are padded with
/// `null`, which the extension treats as "use its own default".
const DETECTOR_FIELD_COUNT: usize = 72;

/// Builds the full `txt2img` request body for one resolved prompt.
///
/// `parameters` on the resolved prompt already carries sampler/steps/cfg/
/// width/height and any extension sub-objects (`adetailer`, `controlnet`)
/// under those keys; this function lifts the prompt/negative/seed fields
/// in and re-encodes the extension sub-objects into `alwayson_scripts`.
#[must_use]
pub fn build_request(prompt: &ResolvedPrompt, base_dir: &Path) -> Value {
    let mut body = serde_json::Map::new();
    for (k, v) in &prompt.parameters {
        if k == "adetailer" || k == "controlnet" {
            continue;
        }
        body.insert(k.clone(), v.clone());
    }

    body.insert("prompt".to_string(), json!(prompt.positive));
    body.insert("negative_prompt".to_string(), json!(prompt.negative.clone().unwrap_or_default()));
    body.insert("seed".to_string(), json!(prompt.seed));

    let mut scripts = serde_json::Map::new();
    if let Some(adetailer) = prompt
        .parameters
        .get("adetailer")
        .and_then(|v| serde_json::from_value::<AdetailerConfig>(v.clone()).ok())
    {
        scripts.insert("ADetailer".to_string(), encode_adetailer(&adetailer));
    }
    if let Some(controlnet) = prompt
        .parameters
        .get("controlnet")
        .and_then(|v| serde_json::from_value::<ControlNetConfig>(v.clone()).ok())
    {
        scripts.insert("controlnet".to_string(), encode_controlnet(&controlnet, base_dir));
    }
    if !scripts.is_empty() {
        body.insert("alwayson_scripts".to_string(), Value::Object(scripts));
    }

    Value::Object(body)
}

/// Encodes an ADetailer config into `{"args": [enabled, skip_img2img, <detector fields>...]}`.
fn encode_adetailer(config: &AdetailerConfig) -> Value {
    let mut args = vec![json!(true), json!(false)];
    for detector in &config.detectors {
        args.extend(encode_detector(detector));
    }
    json!({ "args": args })
}

fn encode_detector(d: &AdetailerDetector) -> Vec<Value> {
    let mut fields = vec![
        json!(d.model),
        json!("Use same sampler"),
        json!(d.confidence),
        json!(d.mask_dilate),
        json!(0), // ad_mask_merge_invert
        json!(d.mask_blur),
        json!(d.denoising_strength),
        json!(d.inpaint_only_masked),
        json!(d.inpaint_padding),
        json!(d.prompt.clone().unwrap_or_default()),
        json!(d.negative_prompt.clone().unwrap_or_default()),
    ];
    fields.resize(DETECTOR_FIELD_COUNT, Value::Null);
    fields
}

/// Encodes a ControlNet config into `{"args": [<unit object>, ...]}`,
/// base64-reading each unit's control image from disk.
fn encode_controlnet(config: &ControlNetConfig, base_dir: &Path) -> Value {
    let args: Vec<Value> = config.units.iter().map(|u| encode_unit(u, base_dir)).collect();
    json!({ "args": args })
}

fn encode_unit(unit: &ControlNetUnit, base_dir: &Path) -> Value {
    let image_path = base_dir.join(&unit.image);
    let encoded_image = std::fs::read(&image_path)
        .map(|bytes| base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes))
        .unwrap_or_default();

    json!({
        "enabled": true,
        "model": unit.model,
        "module": unit.module,
        "weight": unit.weight,
        "guidance_start": unit.guidance_start,
        "guidance_end": unit.guidance_end,
        "image": encoded_image,
    })
}
