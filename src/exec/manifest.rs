//! Manifest Updater: atomic incremental rewrite of `manifest.json`
//! (`SPEC_FULL.md` §4.12, §9).

use crate::error::{Result, RuntimeError};
use crate::model::Manifest;
use std::io::Write;
use std::path::Path;

/// Serializes `manifest` to a sibling temp file and renames it over
/// `path`, so a crash mid-write never leaves a partially-written manifest.
///
/// # Errors
///
/// Returns `RuntimeError::ManifestWriteFailure` on any I/O or
/// serialization failure.
pub fn write(path: &Path, manifest: &Manifest) -> Result<()> {
    let json = serde_json::to_vec_pretty(manifest).map_err(|e| RuntimeError::ManifestWriteFailure {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| RuntimeError::ManifestWriteFailure {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    tmp.write_all(&json).map_err(|e| RuntimeError::ManifestWriteFailure {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    tmp.persist(path).map_err(|e| RuntimeError::ManifestWriteFailure {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

/// Reads and parses an existing manifest from `path`, for the `rebuild`
/// command's round-trip path.
///
/// # Errors
///
/// Returns an error if the file is missing or not valid JSON matching the
/// manifest schema.
pub fn read(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path).map_err(|e| RuntimeError::ManifestWriteFailure {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| {
        RuntimeError::ManifestWriteFailure {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::session::{GenerationParamsRecord, ResolvedTemplateRecord, RuntimeInfo, Snapshot};
    use indexmap::IndexMap;
    use tempfile::TempDir;

    fn sample_manifest() -> Manifest {
        Manifest::new(Snapshot {
            version: "2.0".to_string(),
            timestamp: "2026-07-28T00:00:00Z".to_string(),
            runtime_info: RuntimeInfo {
                sd_model_checkpoint: "unknown".to_string(),
            },
            resolved_template: ResolvedTemplateRecord {
                prompt: "masterpiece".to_string(),
                negative: String::new(),
            },
            generation_params: GenerationParamsRecord {
                mode: "combinatorial".to_string(),
                seed_mode: "fixed".to_string(),
                base_seed: 1,
                num_images: 0,
                total_combinations: 1,
            },
            api_params: serde_json::json!({}),
            variations: IndexMap::new(),
            theme_name: None,
            style: None,
        })
    }

    #[test]
    fn test_write_then_read_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        let manifest = sample_manifest();
        write(&path, &manifest).unwrap();
        let loaded = read(&path).unwrap();
        assert_eq!(loaded.snapshot.version, manifest.snapshot.version);
    }

    #[test]
    fn test_write_produces_no_partial_file_on_rewrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        let mut manifest = sample_manifest();
        write(&path, &manifest).unwrap();

        manifest.append(crate::model::session::ImageEntry {
            filename: "0000.png".to_string(),
            seed: 1,
            prompt: "masterpiece".to_string(),
            negative_prompt: String::new(),
            applied_variations: IndexMap::new(),
        });
        write(&path, &manifest).unwrap();

        let loaded = read(&path).unwrap();
        assert_eq!(loaded.images.len(), 1);
    }
}
