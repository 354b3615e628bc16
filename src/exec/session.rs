//! Session Manager & Image Writer (`SPEC_FULL.md` §4.11).

use crate::error::{Result, RuntimeError};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Picks the session's human-readable label, in priority order: CLI
/// override, the document's `output.session_name`, the document's own
/// `name`, the document's filename stem.
#[must_use]
pub fn session_label<'a>(
    cli_override: Option<&'a str>,
    doc_output_name: Option<&'a str>,
    doc_name: &'a str,
    doc_filename_stem: &'a str,
) -> &'a str {
    cli_override
        .or(doc_output_name)
        .filter(|s| !s.is_empty())
        .or_else(|| (!doc_name.is_empty()).then_some(doc_name))
        .unwrap_or(doc_filename_stem)
}

/// Builds the session directory name: `YYYYMMDD_HHMMSS_<label>`.
#[must_use]
pub fn session_dir_name(label: &str, now: chrono::DateTime<chrono::Local>) -> String {
    format!("{}_{label}", now.format("%Y%m%d_%H%M%S"))
}

/// Creates the session directory (and parents) under `output_root`,
/// returning its path.
///
/// # Errors
///
/// Returns `RuntimeError::DirectoryFailure` if the directory cannot be
/// created.
pub fn create_session_dir(output_root: &Path, dir_name: &str) -> Result<PathBuf> {
    let path = output_root.join(dir_name);
    std::fs::create_dir_all(&path).map_err(|e| RuntimeError::DirectoryFailure {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(path)
}

/// Builds an image filename for the `i`-th produced image. When
/// `filename_keys` is non-empty, each listed placeholder's chosen value
/// (if applied to this image) is appended as `_<key>-<value>`, sanitized
/// to a filesystem-safe token.
#[must_use]
pub fn build_filename(index: usize, filename_keys: &[String], applied: &IndexMap<String, String>) -> String {
    let mut name = format!("{index:04}");
    for key in filename_keys {
        if let Some(value) = applied.get(key) {
            name.push('_');
            name.push_str(key);
            name.push('-');
            name.push_str(&sanitize(value));
        }
    }
    name.push_str(".png");
    name
}

/// camelCases a value for filename use: word boundaries (spaces,
/// underscores, hyphens) are removed rather than kept as separators, other
/// non-alphanumerics are stripped outright, the first letter is lowercased,
/// and the first letter of every subsequent word is capitalized
/// (`"front view"` -> `"frontView"`).
fn sanitize(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut capitalize_next = false;
    for c in value.chars() {
        if c == ' ' || c == '_' || c == '-' {
            capitalize_next = true;
            continue;
        }
        if !c.is_ascii_alphanumeric() {
            continue;
        }
        if capitalize_next {
            result.extend(c.to_uppercase());
            capitalize_next = false;
        } else if result.is_empty() {
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// Writes `bytes` to `filename` inside `session_dir`, via write-to-temp-
/// and-rename so a crash never leaves a partial image file.
///
/// # Errors
///
/// Returns `RuntimeError::WriteFailure` if the temp file cannot be created,
/// written, or persisted.
pub fn write_image(session_dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
    use std::io::Write;

    let target = session_dir.join(filename);
    let mut tmp = tempfile::NamedTempFile::new_in(session_dir).map_err(|e| RuntimeError::WriteFailure {
        path: target.display().to_string(),
        reason: e.to_string(),
    })?;
    tmp.write_all(bytes).map_err(|e| RuntimeError::WriteFailure {
        path: target.display().to_string(),
        reason: e.to_string(),
    })?;
    tmp.persist(&target).map_err(|e| RuntimeError::WriteFailure {
        path: target.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_session_label_priority() {
        assert_eq!(session_label(Some("cli"), Some("doc-output"), "doc-name", "stem"), "cli");
        assert_eq!(session_label(None, Some("doc-output"), "doc-name", "stem"), "doc-output");
        assert_eq!(session_label(None, None, "doc-name", "stem"), "doc-name");
        assert_eq!(session_label(None, None, "", "stem"), "stem");
    }

    #[test]
    fn test_build_filename_without_keys() {
        assert_eq!(build_filename(3, &[], &IndexMap::new()), "0003.png");
    }

    #[test]
    fn test_build_filename_with_keys() {
        let mut applied = IndexMap::new();
        applied.insert("Expression".to_string(), "happy".to_string());
        let keys = vec!["Expression".to_string()];
        assert_eq!(build_filename(0, &keys, &applied), "0000_Expression-happy.png");
    }

    #[test]
    fn test_build_filename_sanitizes_to_camel_case() {
        let mut applied = IndexMap::new();
        applied.insert("Pose".to_string(), "front view".to_string());
        let keys = vec!["Pose".to_string()];
        assert_eq!(build_filename(0, &keys, &applied), "0000_Pose-frontView.png");
    }

    #[test]
    fn test_sanitize_strips_punctuation_and_capitalizes_words() {
        assert_eq!(sanitize("front view"), "frontView");
        assert_eq!(sanitize("full_body-shot"), "fullBodyShot");
        assert_eq!(sanitize("A!@#B"), "aB");
    }

    #[test]
    fn test_write_image_atomic() {
        let dir = TempDir::new().unwrap();
        let path = write_image(dir.path(), "0000.png", b"fake-png-bytes").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"fake-png-bytes");
    }

    #[test]
    fn test_create_session_dir() {
        let root = TempDir::new().unwrap();
        let path = create_session_dir(root.path(), "20260101_000000_label").unwrap();
        assert!(path.is_dir());
    }
}
