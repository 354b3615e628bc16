//! Error types for sdgen operations.
//!
//! This module provides a comprehensive error hierarchy using `thiserror` for
//! every stage of the pipeline: loading/parsing, structural validation,
//! template/import/theme resolution, and runtime (API, I/O) failures.

use thiserror::Error;

/// Result type alias for sdgen operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for sdgen.
#[derive(Error, Debug)]
pub enum Error {
    /// Errors loading or parsing a document from disk.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Structural validation errors (before resolution).
    #[error("validation error: {0}")]
    Structural(#[from] StructuralError),

    /// Errors while resolving inheritance, imports, themes, or templates.
    #[error("resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// Errors during generation or batch execution (API, writes, manifest).
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// Configuration errors (global config file).
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// CLI-level errors (bad arguments, unsupported combinations).
    #[error("command error: {0}")]
    Command(#[from] CommandError),
}

/// Errors loading or parsing a YAML document.
#[derive(Error, Debug)]
pub enum SourceError {
    /// File does not exist.
    #[error("file not found: {path}")]
    NotFound {
        /// Path that was not found.
        path: String,
    },

    /// File exists but could not be read.
    #[error("failed to read {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Underlying OS error message.
        reason: String,
    },

    /// File content is not valid YAML.
    #[error("malformed YAML in {path}: {reason}")]
    MalformedSource {
        /// Path to the file.
        path: String,
        /// Parser error message.
        reason: String,
    },

    /// The document's top-level shape does not match any known document kind.
    #[error("{path}: unrecognized document kind ({reason})")]
    BadKind {
        /// Path to the file.
        path: String,
        /// Why classification failed.
        reason: String,
    },
}

/// Structural validation errors (checked before resolution).
#[derive(Error, Debug)]
pub enum StructuralError {
    /// A required field is missing.
    #[error("{document}: missing required field `{field}`")]
    MissingField {
        /// Document name or path.
        document: String,
        /// The missing field.
        field: String,
    },

    /// A field has a value outside its allowed enumeration.
    #[error("{document}: `{field}` must be one of {allowed:?}, got `{actual}`")]
    BadEnum {
        /// Document name or path.
        document: String,
        /// The offending field.
        field: String,
        /// The allowed values.
        allowed: Vec<&'static str>,
        /// The actual value supplied.
        actual: String,
    },

    /// A `{Placeholder}` or `{Placeholder[selector]}` token is malformed.
    #[error("{document}: bad placeholder syntax `{token}`: {reason}")]
    BadPlaceholderSyntax {
        /// Document name or path.
        document: String,
        /// The offending token.
        token: String,
        /// Why it is malformed.
        reason: String,
    },

    /// A chunk's template body references `{prompt}` or `{negprompt}`.
    #[error("{document}: chunk templates may not reference reserved placeholder `{placeholder}`")]
    ReservedPlaceholderInChunk {
        /// Document name or path.
        document: String,
        /// The reserved placeholder name.
        placeholder: String,
    },
}

/// Errors encountered while resolving inheritance, imports, themes, or templates.
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// The `implements` chain revisits a document already on the path.
    #[error("inheritance cycle detected at {path}")]
    CycleDetected {
        /// Path where the cycle was detected.
        path: String,
    },

    /// The `implements` chain is deeper than the configured maximum.
    #[error("inheritance chain exceeds maximum depth {max} at {path}")]
    MaxInheritanceDepthExceeded {
        /// Path where the limit was hit.
        path: String,
        /// Configured maximum depth.
        max: usize,
    },

    /// An import entry points to a file that does not exist.
    #[error("import `{name}` not found: {path}")]
    ImportNotFound {
        /// The import key.
        name: String,
        /// The path that was not found.
        path: String,
    },

    /// An import resolved to a document kind the caller didn't expect.
    #[error("import `{name}` at {path}: expected {expected}, found {actual}")]
    ImportTypeMismatch {
        /// The import key.
        name: String,
        /// Path of the offending import.
        path: String,
        /// Kind expected by context.
        expected: &'static str,
        /// Kind actually found.
        actual: &'static str,
    },

    /// A requested theme is not in the available-themes map.
    #[error("theme `{name}` not found")]
    ThemeNotFound {
        /// Requested theme name.
        name: String,
    },

    /// A placeholder in the final template has no bound variation map.
    #[error("unresolved placeholder `{name}`")]
    UnresolvedPlaceholder {
        /// The placeholder name.
        name: String,
    },

    /// A `@ChunkName` marker has no corresponding chunk.
    #[error("unresolved chunk `{name}`")]
    UnresolvedChunk {
        /// The chunk name.
        name: String,
    },

    /// A `[#i,j,k]` or `[#i-j]` selector references an out-of-range index.
    #[error("placeholder `{placeholder}`: selector index {index} out of range (size {size})")]
    SelectorOutOfRange {
        /// The placeholder the selector applies to.
        placeholder: String,
        /// The offending index.
        index: usize,
        /// The size of the variation map.
        size: usize,
    },

    /// A `[key1,key2]` selector references a key not present in the variation map.
    #[error("placeholder `{placeholder}`: selector key `{key}` not found")]
    SelectorUnknownKey {
        /// The placeholder the selector applies to.
        placeholder: String,
        /// The offending key.
        key: String,
    },
}

/// Errors during generation / batch execution.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Transport-level failure talking to the synthesis API.
    #[error("API transport error: {0}")]
    Transport(String),

    /// The synthesis API responded with a body that could not be decoded.
    #[error("API returned an unreadable response: {0}")]
    BadResponse(String),

    /// The synthesis API reported an application-level error.
    #[error("API error (status {code}): {body}")]
    BackendError {
        /// HTTP status code.
        code: u16,
        /// Response body (truncated for display).
        body: String,
    },

    /// Writing an image file failed.
    #[error("failed to write image {path}: {reason}")]
    WriteFailure {
        /// Path of the image.
        path: String,
        /// Underlying error message.
        reason: String,
    },

    /// Writing the manifest failed — treated as fatal (see `SPEC_FULL.md` §4.10).
    #[error("failed to write manifest {path}: {reason}")]
    ManifestWriteFailure {
        /// Path of the manifest.
        path: String,
        /// Underlying error message.
        reason: String,
    },

    /// Session directory could not be created.
    #[error("failed to create session directory {path}: {reason}")]
    DirectoryFailure {
        /// Path of the directory.
        path: String,
        /// Underlying error message.
        reason: String,
    },
}

/// CLI-level errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// An argument combination the parser allows but the command rejects.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A required input file path does not exist or isn't readable.
    #[error("{0}")]
    InputNotFound(String),

    /// Output formatting failed.
    #[error("output format error: {0}")]
    OutputFormat(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Runtime(RuntimeError::WriteFailure {
            path: String::new(),
            reason: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for SourceError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::MalformedSource {
            path: String::new(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for RuntimeError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadResponse(err.to_string())
    }
}

impl From<reqwest::Error> for RuntimeError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Config {
            message: "bad config".to_string(),
        };
        assert_eq!(err.to_string(), "configuration error: bad config");
    }

    #[test]
    fn test_source_error_display() {
        let err = SourceError::NotFound {
            path: "missing.yaml".to_string(),
        };
        assert_eq!(err.to_string(), "file not found: missing.yaml");
    }

    #[test]
    fn test_resolution_error_display() {
        let err = ResolutionError::UnresolvedPlaceholder {
            name: "CameraAngle".to_string(),
        };
        assert_eq!(err.to_string(), "unresolved placeholder `CameraAngle`");

        let err = ResolutionError::SelectorOutOfRange {
            placeholder: "Expression".to_string(),
            index: 5,
            size: 3,
        };
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_runtime_error_display() {
        let err = RuntimeError::BackendError {
            code: 500,
            body: "oops".to_string(),
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("oops"));
    }

    #[test]
    fn test_error_from_variants() {
        let err: Error = ResolutionError::ThemeNotFound {
            name: "cyberpunk".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Resolution(_)));

        let err: Error = SourceError::NotFound {
            path: "x".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Source(_)));

        let err: Error = StructuralError::MissingField {
            document: "doc".to_string(),
            field: "name".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Structural(_)));

        let err: Error = RuntimeError::Transport("timeout".to_string()).into();
        assert!(matches!(err, Error::Runtime(_)));
    }

    #[test]
    fn test_command_error_display() {
        let err = CommandError::InvalidArgument("--max-images".to_string());
        assert!(err.to_string().contains("invalid argument"));
    }
}
