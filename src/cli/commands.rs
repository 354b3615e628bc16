//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use crate::api::ApiClient;
use crate::cli::output::{
    format_document_list, format_generation_report, format_init_result, format_string_list,
    format_validation_errors, DocumentSummary, FailureSummary, GenerationReport, OutputFormat,
};
use crate::cli::parser::{ApiQuery, Cli, Commands};
use crate::config::GlobalConfig;
use crate::error::{CommandError, Result};
use crate::exec::{self, annotation::NoopRenderer, executor::ExecutorOptions, AnnotationWorker};
use crate::generate::rng::SplitMix64;
use crate::model::document::Parameters;
use crate::model::generation::{GenerationConfig, Mode, SeedMode};
use crate::model::session::{GenerationParamsRecord, ResolvedTemplateRecord, RuntimeInfo, Snapshot, VariationRecord};
use crate::model::{DocumentKind, Manifest};
use crate::resolve::{context, inheritance, loader, template, validator};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

/// Executes the CLI command.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Generate {
            template,
            max_images,
            dry_run,
            session_name,
            theme,
            theme_file,
            style,
        } => cmd_generate(
            cli,
            template,
            *max_images,
            *dry_run,
            session_name.as_deref(),
            theme.as_deref(),
            theme_file.as_deref(),
            style.as_deref(),
            format,
        ),
        Commands::List => cmd_list(cli, format),
        Commands::Validate { path } => cmd_validate(path, format),
        Commands::Init { force } => cmd_init(*force, format),
        Commands::Api { query } => cmd_api(cli, *query, format),
        Commands::Rebuild { manifest, output_dir } => cmd_rebuild(cli, manifest, output_dir.as_deref(), format),
    }
}

fn load_config(cli: &Cli) -> Result<GlobalConfig> {
    GlobalConfig::load(&cli.get_config_path())
}

fn cmd_generate(
    cli: &Cli,
    template_path: &Path,
    max_images_override: Option<usize>,
    dry_run: bool,
    session_name: Option<&str>,
    theme: Option<&str>,
    theme_file: Option<&Path>,
    style: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    let config = load_config(cli)?;
    let doc_path = config.configs_dir.join(template_path);
    let doc = inheritance::resolve(&doc_path)?;

    let structural_errors = validator::validate(&doc, &doc_path.display().to_string());
    if let Some(first) = structural_errors.into_iter().next() {
        return Err(first.into());
    }

    let base_dir = doc_path.parent().unwrap_or_else(|| Path::new("."));
    let explicit_imports = doc.imports.clone();

    let mut gen_config = doc.generation.clone().unwrap_or_default();
    if let Some(max) = max_images_override {
        gen_config.max_images = max;
    }

    let mut rng = SplitMix64::from_base_seed(gen_config.base_seed);
    let ctx = context::build(&doc, &explicit_imports, base_dir, theme, theme_file, style, &mut rng)?;
    let prompts = crate::generate::generate(&ctx, &gen_config, &mut rng);
    let total = prompts.len();

    let stem = doc_path.file_stem().and_then(|s| s.to_str()).unwrap_or("session");
    let label = exec::session::session_label(
        session_name,
        doc.output.as_ref().and_then(|o| o.session_name.as_deref()),
        &doc.name,
        stem,
    );
    let dir_name = exec::session::session_dir_name(label, chrono::Local::now());
    let session_dir = exec::session::create_session_dir(&config.output_dir, &dir_name)?;
    let manifest_path = session_dir.join("manifest.json");

    let client = ApiClient::new(config.api_url.as_str())?;
    let checkpoint = if dry_run { "unknown".to_string() } else { client.fetch_checkpoint() };

    let mut variations = IndexMap::new();
    for (name, map) in &ctx.placeholders {
        variations.insert(
            name.clone(),
            VariationRecord {
                available: map.values().cloned().collect(),
                used: Vec::new(),
                count: map.len(),
            },
        );
    }

    let total_combinations: usize = ctx.placeholders.values().map(|m| m.len()).product::<usize>().max(1);
    let snapshot = Snapshot {
        version: "2.0".to_string(),
        timestamp: chrono::Local::now().to_rfc3339(),
        runtime_info: RuntimeInfo { sd_model_checkpoint: checkpoint },
        resolved_template: ResolvedTemplateRecord {
            prompt: ctx.template.clone(),
            negative: ctx.negative_template.clone().unwrap_or_default(),
        },
        generation_params: GenerationParamsRecord {
            mode: mode_to_str(gen_config.mode).to_string(),
            seed_mode: seed_mode_to_str(gen_config.seed_mode).to_string(),
            base_seed: gen_config.base_seed,
            num_images: gen_config.max_images,
            total_combinations,
        },
        api_params: serde_json::to_value(&ctx.parameters).unwrap_or_else(|_| serde_json::json!({})),
        variations,
        theme_name: theme.map(str::to_string),
        style: style.map(str::to_string),
    };
    let mut manifest = Manifest::new(snapshot);
    exec::manifest::write(&manifest_path, &manifest)?;

    let output_cfg = doc.output.clone().unwrap_or_default();
    let annotations_enabled = output_cfg.annotation.enabled && !dry_run;
    let worker = annotations_enabled.then(|| AnnotationWorker::spawn(NoopRenderer, 64));

    let options = ExecutorOptions {
        dry_run,
        annotations_enabled,
        filename_keys: output_cfg.filename_keys.clone(),
    };
    let cancel = AtomicBool::new(false);
    let summary = exec::executor::run(
        &prompts,
        &client,
        base_dir,
        &session_dir,
        &manifest_path,
        &mut manifest,
        worker.as_ref(),
        &options,
        &cancel,
    );
    if let Some(worker) = worker {
        worker.stop(Duration::from_secs(30));
    }
    let summary = summary?;

    let report = GenerationReport {
        session_dir: session_dir.display().to_string(),
        total,
        success: summary.success,
        failures: summary
            .failures
            .into_iter()
            .map(|f| FailureSummary { index: f.index, reason: f.reason })
            .collect(),
    };
    Ok(format_generation_report(&report, format))
}

fn cmd_list(cli: &Cli, format: OutputFormat) -> Result<String> {
    let config = load_config(cli)?;
    let mut docs = Vec::new();

    for entry in walkdir::WalkDir::new(&config.configs_dir).into_iter().filter_map(std::result::Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(ext) = path.extension().and_then(std::ffi::OsStr::to_str) else {
            continue;
        };
        if ext != "yaml" && ext != "yml" {
            continue;
        }

        let Ok(kind) = loader::classify_file(path) else {
            continue;
        };
        if !matches!(kind, DocumentKind::Prompt | DocumentKind::Template) {
            continue;
        }
        let Ok(doc) = loader::load_prompt_document(path) else {
            continue;
        };

        let relative = path.strip_prefix(&config.configs_dir).unwrap_or(path);
        let unresolved = doc.template.clone().or_else(|| doc.prompt.clone()).unwrap_or_default();
        let placeholder_count = {
            let mut names: Vec<String> = template::scan_tokens(&unresolved).into_iter().map(|t| t.name).collect();
            names.sort();
            names.dedup();
            names.len()
        };

        docs.push(DocumentSummary {
            path: relative.display().to_string(),
            name: doc.name,
            implements: doc.implements.as_ref().map(|p| p.display().to_string()),
            placeholder_count,
        });
    }

    Ok(format_document_list(&docs, format))
}

fn cmd_validate(path: &Path, format: OutputFormat) -> Result<String> {
    let mut errors = Vec::new();
    let path_str = path.display().to_string();

    let doc = match inheritance::resolve(path) {
        Ok(doc) => doc,
        Err(e) => {
            errors.push(e.to_string());
            return Ok(format_validation_errors(&path_str, &errors, format));
        }
    };

    errors.extend(validator::validate(&doc, &path_str).into_iter().map(|e| e.to_string()));

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let explicit_imports = doc.imports.clone();
    let mut rng = SplitMix64::new(0);
    if let Err(e) = context::build(&doc, &explicit_imports, base_dir, None, None, None, &mut rng) {
        errors.push(e.to_string());
    }

    Ok(format_validation_errors(&path_str, &errors, format))
}

fn cmd_init(force: bool, format: OutputFormat) -> Result<String> {
    let config_path = PathBuf::from(crate::config::DEFAULT_CONFIG_PATH);
    let example_path = PathBuf::from("example.yaml");

    if !force && (config_path.exists() || example_path.exists()) {
        return Err(CommandError::InvalidArgument(
            "sdgen_config.json or example.yaml already exists; pass --force to overwrite".to_string(),
        )
        .into());
    }

    let config_json = serde_json::to_string_pretty(&GlobalConfig::starter())
        .map_err(|e| CommandError::OutputFormat(e.to_string()))?;
    std::fs::write(&config_path, config_json)?;

    let example = "\
version: \"2.0\"\nname: example\nprompt: \"1girl, {Expression}\"\nimports:\n  Expression: [happy, sad, surprised]\nparameters:\n  steps: 20\n  cfg_scale: 7\n  width: 512\n  height: 512\n  sampler_name: Euler a\ngeneration:\n  mode: combinatorial\n  seed_mode: fixed\n  base_seed: 1\n  max_images: 0\n";
    std::fs::write(&example_path, example)?;

    Ok(format_init_result(&config_path.display().to_string(), &example_path.display().to_string(), format))
}

fn cmd_api(cli: &Cli, query: ApiQuery, format: OutputFormat) -> Result<String> {
    let config = load_config(cli)?;
    let client = ApiClient::new(config.api_url.as_str())?;

    let (label, items) = match query {
        ApiQuery::Samplers => ("samplers", client.list_samplers()?),
        ApiQuery::Models => ("models", client.list_models()?),
        ApiQuery::Upscalers => ("upscalers", client.list_upscalers()?),
        ApiQuery::AdetailerModels => ("adetailer models", client.list_adetailer_models()?),
    };
    Ok(format_string_list(label, &items, format))
}

fn cmd_rebuild(cli: &Cli, manifest_path: &Path, output_dir_override: Option<&Path>, format: OutputFormat) -> Result<String> {
    let config = load_config(cli)?;
    let manifest = exec::manifest::read(manifest_path)?;
    let snapshot = &manifest.snapshot;

    let mut placeholders = IndexMap::new();
    for (name, record) in &snapshot.variations {
        placeholders.insert(name.clone(), crate::model::variation::from_inline_list(&record.available));
    }

    let parameters: Parameters = serde_json::from_value(snapshot.api_params.clone()).unwrap_or_default();
    let ctx = context::ResolvedContext {
        template: snapshot.resolved_template.prompt.clone(),
        negative_template: (!snapshot.resolved_template.negative.is_empty()).then(|| snapshot.resolved_template.negative.clone()),
        placeholders,
        parameters,
    };

    let gen_config = GenerationConfig {
        mode: mode_from_str(&snapshot.generation_params.mode),
        seed_mode: seed_mode_from_str(&snapshot.generation_params.seed_mode),
        base_seed: snapshot.generation_params.base_seed,
        max_images: snapshot.generation_params.num_images,
    };
    let mut rng = SplitMix64::from_base_seed(gen_config.base_seed);
    let prompts = crate::generate::generate(&ctx, &gen_config, &mut rng);
    let total = prompts.len();

    let output_dir = output_dir_override.map_or_else(|| config.output_dir.clone(), Path::to_path_buf);
    let label = exec::session::session_label(None, None, "rebuild", "rebuild");
    let dir_name = exec::session::session_dir_name(label, chrono::Local::now());
    let session_dir = exec::session::create_session_dir(&output_dir, &dir_name)?;
    let new_manifest_path = session_dir.join("manifest.json");

    let mut new_manifest = Manifest::new(snapshot.clone());
    exec::manifest::write(&new_manifest_path, &new_manifest)?;

    let client = ApiClient::new(config.api_url.as_str())?;
    let options = ExecutorOptions {
        dry_run: false,
        annotations_enabled: false,
        filename_keys: Vec::new(),
    };
    let cancel = AtomicBool::new(false);
    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    let summary = exec::executor::run(
        &prompts,
        &client,
        base_dir,
        &session_dir,
        &new_manifest_path,
        &mut new_manifest,
        None,
        &options,
        &cancel,
    )?;

    let report = GenerationReport {
        session_dir: session_dir.display().to_string(),
        total,
        success: summary.success,
        failures: summary
            .failures
            .into_iter()
            .map(|f| FailureSummary { index: f.index, reason: f.reason })
            .collect(),
    };
    Ok(format_generation_report(&report, format))
}

fn mode_to_str(mode: Mode) -> &'static str {
    match mode {
        Mode::Combinatorial => "combinatorial",
        Mode::Random => "random",
    }
}

fn mode_from_str(s: &str) -> Mode {
    match s {
        "random" => Mode::Random,
        _ => Mode::Combinatorial,
    }
}

fn seed_mode_to_str(mode: SeedMode) -> &'static str {
    match mode {
        SeedMode::Fixed => "fixed",
        SeedMode::Progressive => "progressive",
        SeedMode::Random => "random",
    }
}

fn seed_mode_from_str(s: &str) -> SeedMode {
    match s {
        "progressive" => SeedMode::Progressive,
        "random" => SeedMode::Random,
        _ => SeedMode::Fixed,
    }
}
