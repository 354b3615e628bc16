//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// sdgen: batch image-generation orchestrator for Stable Diffusion.
///
/// Resolves YAML prompt templates into a concrete prompt space (inheritance,
/// imports, themes, chunk injection, placeholder selection) and drives a
/// remote synthesis API across the resulting combinations.
#[derive(Parser, Debug)]
#[command(name = "sdgen")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the global configuration file.
    #[arg(long, env = "SDGEN_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json, ndjson).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a prompt document and submit its combinations to the
    /// synthesis API.
    Generate {
        /// Path to the prompt document, relative to `configs_dir`.
        #[arg(short = 't', long)]
        template: PathBuf,

        /// Caps the number of images produced (overrides the document's
        /// `generation.max_images`).
        #[arg(short = 'n', long)]
        max_images: Option<usize>,

        /// Resolve and normalize every prompt but skip the API call and
        /// image write.
        #[arg(long)]
        dry_run: bool,

        /// Overrides the session directory's human-readable label.
        #[arg(long)]
        session_name: Option<String>,

        /// Selects an already-declared theme by name.
        #[arg(long)]
        theme: Option<String>,

        /// Loads a theme from an explicit path, bypassing autodiscovery.
        #[arg(long)]
        theme_file: Option<PathBuf>,

        /// Selects which `Name.style` import variants apply.
        #[arg(long)]
        style: Option<String>,
    },

    /// List prompt documents discovered under `configs_dir`.
    List,

    /// Validate a prompt document without enumerating combinations or
    /// touching the network.
    Validate {
        /// Path to the prompt document.
        path: PathBuf,
    },

    /// Write a starter configuration and example prompt document into the
    /// current directory.
    Init {
        /// Overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },

    /// Read-only wrappers around the synthesis API's discovery endpoints.
    Api {
        #[command(subcommand)]
        query: ApiQuery,
    },

    /// Reconstitutes a generation run from a manifest and re-executes it
    /// against a fresh session directory.
    Rebuild {
        /// Path to the `manifest.json` to rebuild from.
        manifest: PathBuf,

        /// Overrides `output_dir` from the global configuration.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

/// `api` subcommands: which discovery endpoint to query.
#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ApiQuery {
    /// Lists available samplers.
    Samplers,
    /// Lists available checkpoints.
    Models,
    /// Lists available upscalers.
    Upscalers,
    /// Lists available ADetailer detection models.
    AdetailerModels,
}

impl Cli {
    /// Returns the global configuration path, using the default if not
    /// specified.
    #[must_use]
    pub fn get_config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(crate::config::DEFAULT_CONFIG_PATH))
    }
}
