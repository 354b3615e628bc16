//! Batch Executor: drives the resolved-prompt sequence through the
//! synthesis API, the image writer, and the manifest, one prompt at a time
//! (`SPEC_FULL.md` §4.10).
//!
//! Per-slot state machine:
//! `Pending -> InFlight -> Written -> Annotated (async) | Skipped`, or
//! `InFlight -> Failed` on error. This module doesn't track the state
//! enum explicitly per slot — with a strictly sequential, non-parallel
//! loop the state is always implied by where the loop counter is.

use crate::api::ApiClient;
use crate::error::Result;
use crate::exec::annotation::{AnnotationJob, AnnotationWorker};
use crate::exec::{manifest, session};
use crate::generate::ResolvedPrompt;
use crate::model::{ImageEntry, Manifest};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// One failed prompt's index and a human-readable reason.
#[derive(Debug, Clone)]
pub struct Failure {
    /// Index of the prompt that failed, in generator-emitted order.
    pub index: usize,
    /// The error's display message.
    pub reason: String,
}

/// The final report for one executed batch.
#[derive(Debug, Clone, Default)]
pub struct ExecutionSummary {
    /// Count of images successfully written.
    pub success: usize,
    /// Every failure encountered, in encounter order.
    pub failures: Vec<Failure>,
}

impl ExecutionSummary {
    /// Number of prompts that failed.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

/// Options controlling one executor run.
#[derive(Debug, Clone)]
pub struct ExecutorOptions {
    /// If set, skips API calls and image writes (still resolves/normalizes
    /// and, if `write_manifest` is also set, writes a manifest).
    pub dry_run: bool,
    /// Whether to enqueue successfully-written images for annotation.
    pub annotations_enabled: bool,
    /// Filename-key convention for this document's output config.
    pub filename_keys: Vec<String>,
}

/// Runs one batch: submits every prompt in order, writing images and
/// updating the manifest incrementally. `cancel` is checked between
/// iterations only — an in-flight API call is never aborted.
///
/// # Errors
///
/// Returns `RuntimeError::ManifestWriteFailure` (via `Error`) if the
/// manifest cannot be rewritten after an image is written. A stale or
/// absent manifest breaks the run's reproducibility, so this aborts the
/// batch immediately rather than continuing with later prompts.
pub fn run(
    prompts: &[ResolvedPrompt],
    client: &ApiClient,
    base_dir: &Path,
    session_dir: &Path,
    manifest_path: &Path,
    manifest: &mut Manifest,
    annotation_worker: Option<&AnnotationWorker>,
    options: &ExecutorOptions,
    cancel: &AtomicBool,
) -> Result<ExecutionSummary> {
    let mut summary = ExecutionSummary::default();

    for (index, prompt) in prompts.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            break;
        }

        if options.dry_run {
            summary.success += 1;
            continue;
        }

        let result = match client.generate(prompt, base_dir) {
            Ok(r) => r,
            Err(e) => {
                summary.failures.push(Failure {
                    index,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let filename = session::build_filename(index, &options.filename_keys, &prompt.variations);
        if let Err(e) = session::write_image(session_dir, &filename, &result.image_bytes) {
            summary.failures.push(Failure {
                index,
                reason: e.to_string(),
            });
            continue;
        }

        manifest.append(ImageEntry {
            filename: filename.clone(),
            seed: result.seed,
            prompt: prompt.positive.clone(),
            negative_prompt: prompt.negative.clone().unwrap_or_default(),
            applied_variations: prompt.variations.clone(),
        });

        manifest::write(manifest_path, manifest).inspect_err(|e| {
            tracing::error!(error = %e, path = %manifest_path.display(), "manifest rewrite failed, aborting batch");
        })?;

        if options.annotations_enabled
            && let Some(worker) = annotation_worker
        {
            worker.enqueue(AnnotationJob {
                image_path: session_dir.join(&filename),
                applied_variations: prompt.variations.clone(),
            });
        }

        summary.success += 1;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::document::Parameters;
    use crate::model::session::{GenerationParamsRecord, ResolvedTemplateRecord, RuntimeInfo, Snapshot};
    use indexmap::IndexMap;

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
    fn test_dry_run_counts_success_without_writes() {
        let prompts = vec![ResolvedPrompt {
            positive: "x".to_string(),
            negative: None,
            seed: 1,
            variations: IndexMap::new(),
            parameters: Parameters::new(),
        }];
        let client = ApiClient::new("http://127.0.0.1:0").unwrap();
        let dir = tempfile::TempDir::new().unwrap();
        let mut manifest = sample_manifest();
        let options = ExecutorOptions {
            dry_run: true,
            annotations_enabled: false,
            filename_keys: Vec::new(),
        };
        let cancel = AtomicBool::new(false);
        let summary = run(
            &prompts,
            &client,
            dir.path(),
            dir.path(),
            &dir.path().join("manifest.json"),
            &mut manifest,
            None,
            &options,
            &cancel,
        )
        .unwrap();
        assert_eq!(summary.success, 1);
        assert_eq!(manifest.images.len(), 0);
    }

    #[test]
    fn test_cancel_stops_before_next_iteration() {
        let prompts: Vec<ResolvedPrompt> = (0..5)
            .map(|_| ResolvedPrompt {
                positive: "x".to_string(),
                negative: None,
                seed: 1,
                variations: IndexMap::new(),
                parameters: Parameters::new(),
            })
            .collect();
        let client = ApiClient::new("http://127.0.0.1:0").unwrap();
        let dir = tempfile::TempDir::new().unwrap();
        let mut manifest = sample_manifest();
        let options = ExecutorOptions {
            dry_run: true,
            annotations_enabled: false,
            filename_keys: Vec::new(),
        };
        let cancel = AtomicBool::new(true);
        let summary = run(
            &prompts,
            &client,
            dir.path(),
            dir.path(),
            &dir.path().join("manifest.json"),
            &mut manifest,
            None,
            &options,
            &cancel,
        )
        .unwrap();
        assert_eq!(summary.success, 0);
    }
}
