//! Output formatting for CLI commands.
//!
//! Supports text, JSON, and NDJSON output formats.

use serde::Serialize;
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
    /// Newline-delimited JSON (NDJSON) for streaming.
    Ndjson,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "ndjson" | "jsonl" | "stream" => Self::Ndjson,
            _ => Self::Text,
        }
    }

    /// Returns true if this format is a streaming format.
    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        matches!(self, Self::Ndjson)
    }
}

/// One entry of `list`'s output: a discovered prompt document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    /// Path relative to `configs_dir`.
    pub path: String,
    /// The document's own `name` field.
    pub name: String,
    /// The `implements` target, if any.
    pub implements: Option<String>,
    /// Count of distinct placeholders found in the unresolved template.
    pub placeholder_count: usize,
}

/// Formats `list`'s output: one line per discovered document.
#[must_use]
pub fn format_document_list(docs: &[DocumentSummary], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_document_list_text(docs),
        OutputFormat::Json | OutputFormat::Ndjson => format_json(&docs),
    }
}

fn format_document_list_text(docs: &[DocumentSummary]) -> String {
    if docs.is_empty() {
        return "No prompt documents found.\n".to_string();
    }
    let mut output = String::new();
    let _ = writeln!(output, "{:<40} {:<20} {:<20} Placeholders", "Path", "Name", "Implements");
    output.push_str(&"-".repeat(90));
    output.push('\n');
    for doc in docs {
        let implements = doc.implements.as_deref().unwrap_or("-");
        let _ = writeln!(
            output,
            "{:<40} {:<20} {:<20} {}",
            truncate(&doc.path, 40),
            truncate(&doc.name, 20),
            truncate(implements, 20),
            doc.placeholder_count
        );
    }
    output
}

/// Formats `validate`'s output: every structural/resolution error found in
/// one accumulate-then-report pass.
#[must_use]
pub fn format_validation_errors(path: &str, errors: &[String], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if errors.is_empty() {
                format!("{path}: OK\n")
            } else {
                let mut output = format!("{path}: {} error(s)\n", errors.len());
                for e in errors {
                    let _ = writeln!(output, "  - {e}");
                }
                output
            }
        }
        OutputFormat::Json | OutputFormat::Ndjson => {
            let json = serde_json::json!({
                "path": path,
                "valid": errors.is_empty(),
                "errors": errors,
            });
            format_json(&json)
        }
    }
}

/// One failed prompt, as reported back to the CLI layer.
#[derive(Debug, Clone, Serialize)]
pub struct FailureSummary {
    /// Index of the prompt that failed.
    pub index: usize,
    /// The error's display message.
    pub reason: String,
}

/// The `generate`/`rebuild` command's result.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    /// Path to the created session directory.
    pub session_dir: String,
    /// Total prompts enumerated.
    pub total: usize,
    /// Images successfully written.
    pub success: usize,
    /// Every failure encountered.
    pub failures: Vec<FailureSummary>,
}

/// Formats a `generate`/`rebuild` run's summary.
#[must_use]
pub fn format_generation_report(report: &GenerationReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let _ = writeln!(output, "Session: {}", report.session_dir);
            let _ = writeln!(output, "  Produced: {}/{}", report.success, report.total);
            if !report.failures.is_empty() {
                let _ = writeln!(output, "  Failures:");
                for f in &report.failures {
                    let _ = writeln!(output, "    [{}] {}", f.index, f.reason);
                }
            }
            output
        }
        OutputFormat::Json | OutputFormat::Ndjson => format_json(&report),
    }
}

/// Formats `init`'s result.
#[must_use]
pub fn format_init_result(config_path: &str, example_path: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("Wrote {config_path}\nWrote {example_path}\n"),
        OutputFormat::Json | OutputFormat::Ndjson => {
            let json = serde_json::json!({ "config": config_path, "example": example_path });
            format_json(&json)
        }
    }
}

/// Formats a flat string list (the `api` subcommand's discovery results).
#[must_use]
pub fn format_string_list(label: &str, items: &[String], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if items.is_empty() {
                format!("No {label} reported.\n")
            } else {
                let mut output = String::new();
                for item in items {
                    let _ = writeln!(output, "{item}");
                }
                output
            }
        }
        OutputFormat::Json | OutputFormat::Ndjson => format_json(&items),
    }
}

/// Formats a value as JSON.
fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Formats an error for output.
///
/// When format is JSON, returns a structured error object.
/// When format is Text, returns the error message string.
#[must_use]
pub fn format_error(error: &crate::Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json | OutputFormat::Ndjson => {
            let (error_type, suggestion) = get_error_details(error);
            let json = serde_json::json!({
                "success": false,
                "error": {
                    "type": error_type,
                    "message": error.to_string(),
                    "suggestion": suggestion
                }
            });
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

/// Extracts error type and recovery suggestion from an error.
fn get_error_details(error: &crate::Error) -> (&'static str, Option<&'static str>) {
    use crate::error::{CommandError, ResolutionError, RuntimeError, SourceError, StructuralError};

    match error {
        crate::Error::Source(e) => match e {
            SourceError::NotFound { .. } => ("FileNotFound", Some("Verify the document path is correct and relative to configs_dir")),
            SourceError::ReadFailed { .. } => ("ReadError", None),
            SourceError::MalformedSource { .. } => ("MalformedYaml", Some("Check the file for YAML syntax errors")),
            SourceError::BadKind { .. } => ("UnrecognizedDocumentKind", None),
        },
        crate::Error::Structural(e) => match e {
            StructuralError::MissingField { .. } => ("MissingField", None),
            StructuralError::BadEnum { .. } => ("BadEnumValue", None),
            StructuralError::BadPlaceholderSyntax { .. } => ("BadPlaceholderSyntax", Some("Placeholders must look like {Name} or {Name[selector]}")),
            StructuralError::ReservedPlaceholderInChunk { .. } => ("ReservedPlaceholderInChunk", None),
        },
        crate::Error::Resolution(e) => match e {
            ResolutionError::CycleDetected { .. } => ("InheritanceCycle", Some("Check the implements chain for a loop")),
            ResolutionError::MaxInheritanceDepthExceeded { .. } => ("InheritanceTooDeep", None),
            ResolutionError::ImportNotFound { .. } => ("ImportNotFound", Some("Verify the import path exists relative to the document")),
            ResolutionError::ImportTypeMismatch { .. } => ("ImportTypeMismatch", None),
            ResolutionError::ThemeNotFound { .. } => ("ThemeNotFound", Some("Run 'sdgen list' or check themes.search_paths")),
            ResolutionError::UnresolvedPlaceholder { .. } => ("UnresolvedPlaceholder", Some("Add an import or chunk default for this placeholder")),
            ResolutionError::UnresolvedChunk { .. } => ("UnresolvedChunk", None),
            ResolutionError::SelectorOutOfRange { .. } => ("SelectorOutOfRange", None),
            ResolutionError::SelectorUnknownKey { .. } => ("SelectorUnknownKey", None),
        },
        crate::Error::Runtime(e) => match e {
            RuntimeError::Transport(_) => ("ApiTransportError", Some("Check that the synthesis backend is reachable at api_url")),
            RuntimeError::BadResponse(_) => ("ApiBadResponse", None),
            RuntimeError::BackendError { .. } => ("ApiBackendError", None),
            RuntimeError::WriteFailure { .. } => ("ImageWriteFailed", None),
            RuntimeError::ManifestWriteFailure { .. } => ("ManifestWriteFailed", None),
            RuntimeError::DirectoryFailure { .. } => ("DirectoryFailed", None),
        },
        crate::Error::Config { .. } => ("ConfigError", Some("Run 'sdgen init' to write a starter configuration")),
        crate::Error::Command(e) => match e {
            CommandError::InvalidArgument(_) => ("InvalidArgument", None),
            CommandError::InputNotFound(_) => ("InputNotFound", None),
            CommandError::OutputFormat(_) => ("OutputFormatError", None),
        },
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        format!("{}...", &s.chars().take(max_len - 3).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CommandError, ResolutionError};

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("ndjson"), OutputFormat::Ndjson);
        assert_eq!(OutputFormat::parse("anything-else"), OutputFormat::Text);
    }

    #[test]
    fn test_format_document_list_empty() {
        let output = format_document_list(&[], OutputFormat::Text);
        assert!(output.contains("No prompt documents"));
    }

    #[test]
    fn test_format_document_list_text() {
        let docs = vec![DocumentSummary {
            path: "char.yaml".to_string(),
            name: "Character".to_string(),
            implements: None,
            placeholder_count: 3,
        }];
        let output = format_document_list(&docs, OutputFormat::Text);
        assert!(output.contains("char.yaml"));
        assert!(output.contains('3'));
    }

    #[test]
    fn test_format_validation_errors_ok() {
        let output = format_validation_errors("x.yaml", &[], OutputFormat::Text);
        assert_eq!(output, "x.yaml: OK\n");
    }

    #[test]
    fn test_format_validation_errors_json() {
        let output = format_validation_errors("x.yaml", &["bad".to_string()], OutputFormat::Json);
        assert!(output.contains("\"valid\": false"));
    }

    #[test]
    fn test_format_error_text() {
        let err: crate::Error = CommandError::InvalidArgument("--max-images".to_string()).into();
        let output = format_error(&err, OutputFormat::Text);
        assert!(output.contains("invalid argument"));
    }

    #[test]
    fn test_format_error_json_includes_type() {
        let err: crate::Error = ResolutionError::ThemeNotFound { name: "cyberpunk".to_string() }.into();
        let output = format_error(&err, OutputFormat::Json);
        assert!(output.contains("ThemeNotFound"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }
}
