//! CLI layer for `sdgen`.
//!
//! Provides the command-line interface using clap, with commands for
//! initializing a workspace, listing and validating prompt documents,
//! generating batches, and rebuilding past sessions from a manifest.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
