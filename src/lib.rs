//! # sdgen
//!
//! Batch image-generation orchestrator for Stable Diffusion.
//!
//! sdgen resolves YAML prompt templates into a concrete prompt space —
//! inheritance, imports, themes, chunk injection, and placeholder
//! selection — and drives a remote synthesis API across the resulting
//! combination space, writing images and an incremental, reproducible
//! manifest to a timestamped session directory.
//!
//! ## Pipeline
//!
//! - **Loader & Validator** (`resolve::loader`, `resolve::validator`):
//!   classify and structurally check a YAML document.
//! - **Inheritance Resolver** (`resolve::inheritance`): merges an
//!   `implements` chain root-to-leaf.
//! - **Import & Theme Resolvers** (`resolve::imports`, `resolve::theme`):
//!   materialize `imports` entries and apply a theme's complete
//!   substitution.
//! - **Template Resolver** (`resolve::template`): injects chunks and scans
//!   placeholder tokens.
//! - **Prompt Generator** (`generate::generator`): enumerates the
//!   combination space and assigns seeds.
//! - **API Client** (`api::client`): submits resolved prompts to the
//!   synthesis backend.
//! - **Batch Executor** (`exec::executor`): drives the end-to-end run,
//!   writing images and the manifest.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![warn(unsafe_code)]

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod generate;
pub mod model;
pub mod resolve;

pub use error::{Error, Result};

pub use api::{ApiClient, GenerationResult};
pub use cli::{Cli, Commands, OutputFormat};
pub use config::GlobalConfig;
pub use generate::{generate, ResolvedPrompt};
pub use model::{Manifest, PromptDocument};
pub use resolve::ResolvedContext;
