//! Binary entry point for sdgen.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::Parser;
use sdgen::cli::output::{OutputFormat, format_error};
use sdgen::cli::{Cli, execute};
use sdgen::error::{Error, RuntimeError};
use std::io::{self, Write};
use std::process::ExitCode;

/// Maps a top-level error to its exit-code bucket: 1 validation/resolution,
/// 2 I/O, 3 API (`SPEC_FULL.md` §6). Errors outside the `Runtime` variant
/// (source, structural, resolution, config, command) all fall in the
/// validation/resolution bucket.
fn exit_code_for(err: &Error) -> u8 {
    match err {
        Error::Runtime(RuntimeError::WriteFailure { .. } | RuntimeError::ManifestWriteFailure { .. } | RuntimeError::DirectoryFailure { .. }) => 2,
        Error::Runtime(RuntimeError::Transport(_) | RuntimeError::BadResponse(_) | RuntimeError::BackendError { .. }) => 3,
        _ => 1,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let format = OutputFormat::parse(&cli.format);

    match execute(&cli) {
        Ok(output) => {
            if !output.is_empty() {
                if let Err(e) = write!(io::stdout(), "{output}")
                    && e.kind() != io::ErrorKind::BrokenPipe
                {
                    eprintln!("Error writing to stdout: {e}");
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            let code = exit_code_for(&e);
            let error_output = format_error(&e, format);
            match format {
                OutputFormat::Json | OutputFormat::Ndjson => {
                    println!("{error_output}");
                }
                OutputFormat::Text => {
                    eprintln!("Error: {error_output}");
                }
            }
            ExitCode::from(code)
        }
    }
}
