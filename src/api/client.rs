//! API Client: a thin, stateless wrapper around the synthesis backend's
//! HTTP surface, built on a blocking `reqwest` client (`SPEC_FULL.md` §4.9).

use crate::api::payload;
use crate::error::{Result, RuntimeError};
use crate::generate::ResolvedPrompt;
use std::path::Path;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// One generated image plus the backend's `info` record (decoded JSON,
/// carrying the canonical seed actually used).
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// Raw decoded PNG bytes.
    pub image_bytes: Vec<u8>,
    /// The seed the backend reports it used (differs from the request
    /// when the request asked for `-1`).
    pub seed: i64,
}

/// A client bound to one synthesis backend base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl ApiClient {
    /// Builds a client for `base_url` with the default 5-minute timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying `reqwest` client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| RuntimeError::Transport(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Submits one resolved prompt to the `txt2img` endpoint and decodes
    /// the resulting image and canonical seed.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Transport` on a connection failure,
    /// `RuntimeError::BackendError` on a non-2xx response, or
    /// `RuntimeError::BadResponse` if the response body doesn't match the
    /// expected shape.
    pub fn generate(&self, prompt: &ResolvedPrompt, base_dir: &Path) -> Result<GenerationResult> {
        let body = payload::build_request(prompt, base_dir);
        let url = format!("{}/sdapi/v1/txt2img", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| RuntimeError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let code = response.status().as_u16();
            let text = response.text().unwrap_or_default();
            return Err(RuntimeError::BackendError { code, body: text }.into());
        }

        let parsed: serde_json::Value = response.json().map_err(|e| RuntimeError::BadResponse(e.to_string()))?;
        decode_response(&parsed)
    }

    /// Reads the currently loaded checkpoint name. Returns `"unknown"` on
    /// any failure (per `SPEC_FULL.md` §4.9, this call never fails the
    /// caller's flow).
    #[must_use]
    pub fn fetch_checkpoint(&self) -> String {
        let url = format!("{}/sdapi/v1/options", self.base_url.trim_end_matches('/'));
        self.client
            .get(&url)
            .send()
            .ok()
            .and_then(|r| r.json::<serde_json::Value>().ok())
            .and_then(|v| v.get("sd_model_checkpoint").and_then(|c| c.as_str()).map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Lists available samplers.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Transport`/`BadResponse` on failure.
    pub fn list_samplers(&self) -> Result<Vec<String>> {
        self.list_names("/sdapi/v1/samplers", "name")
    }

    /// Lists available checkpoints (models).
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Transport`/`BadResponse` on failure.
    pub fn list_models(&self) -> Result<Vec<String>> {
        self.list_names("/sdapi/v1/sd-models", "model_name")
    }

    /// Lists available upscalers.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Transport`/`BadResponse` on failure.
    pub fn list_upscalers(&self) -> Result<Vec<String>> {
        self.list_names("/sdapi/v1/upscalers", "name")
    }

    /// Lists available ADetailer detection models.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Transport`/`BadResponse` on failure.
    pub fn list_adetailer_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/adetailer/v1/ad_model", self.base_url.trim_end_matches('/'));
        let response = self.client.get(&url).send().map_err(|e| RuntimeError::Transport(e.to_string()))?;
        let parsed: Vec<String> = response.json().map_err(|e| RuntimeError::BadResponse(e.to_string()))?;
        Ok(parsed)
    }

    fn list_names(&self, path: &str, key: &str) -> Result<Vec<String>> {
        let url = format!("{}{path}", self.base_url.trim_end_matches('/'));
        let response = self.client.get(&url).send().map_err(|e| RuntimeError::Transport(e.to_string()))?;
        let parsed: Vec<serde_json::Value> = response.json().map_err(|e| RuntimeError::BadResponse(e.to_string()))?;
        Ok(parsed
            .iter()
            .filter_map(|v| v.get(key).and_then(|n| n.as_str()).map(str::to_string))
            .collect())
    }
}

fn decode_response(parsed: &serde_json::Value) -> Result<GenerationResult> {
    use base64::Engine;

    let image_b64 = parsed
        .get("images")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|v| v.as_str())
        .ok_or_else(|| RuntimeError::BadResponse("response missing images[0]".to_string()))?;

    let image_bytes = base64::engine::general_purpose::STANDARD
        .decode(image_b64)
        .map_err(|e| RuntimeError::BadResponse(format!("invalid base64 image: {e}")))?;

    let info_raw = parsed
        .get("info")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RuntimeError::BadResponse("response missing info".to_string()))?;
    let info: serde_json::Value = serde_json::from_str(info_raw).map_err(RuntimeError::from)?;
    let seed = info
        .get("seed")
        .and_then(serde_json::Value::as_i64)
        .ok_or_else(|| RuntimeError::BadResponse("info missing seed".to_string()))?;

    Ok(GenerationResult { image_bytes, seed })
}
