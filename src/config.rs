//! Global configuration.
//!
//! Discovery of the configuration file (where to look, which path wins when
//! several exist) is out of scope for this crate (`SPEC_FULL.md` §1); this
//! module only reads the three fields the file is expected to yield once a
//! path to it is known.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, used by the CLI when `--config` is
/// not given.
pub const DEFAULT_CONFIG_PATH: &str = "sdgen_config.json";

/// The three-field process-wide configuration value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Base directory under which prompt documents are looked up.
    pub configs_dir: PathBuf,
    /// Base directory under which session directories are created.
    pub output_dir: PathBuf,
    /// Base URL of the synthesis HTTP API.
    pub api_url: String,
}

impl GlobalConfig {
    /// Loads a `GlobalConfig` from a JSON file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        serde_json::from_str(&content).map_err(|e| Error::Config {
            message: format!("failed to parse {}: {e}", path.display()),
        })
    }

    /// A config suitable for `sdgen init`'s starter file.
    #[must_use]
    pub fn starter() -> Self {
        Self {
            configs_dir: PathBuf::from("./configs"),
            output_dir: PathBuf::from("./output"),
            api_url: "http://127.0.0.1:7860".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_valid_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sdgen_config.json");
        std::fs::write(
            &path,
            r#"{"configs_dir": "./configs", "output_dir": "./out", "api_url": "http://x"}"#,
        )
        .unwrap();

        let config = GlobalConfig::load(&path).unwrap();
        assert_eq!(config.configs_dir, PathBuf::from("./configs"));
        assert_eq!(config.api_url, "http://x");
    }

    #[test]
    fn test_load_missing_file() {
        let result = GlobalConfig::load(Path::new("/nonexistent/sdgen_config.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sdgen_config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(GlobalConfig::load(&path).is_err());
    }

    #[test]
    fn test_starter() {
        let config = GlobalConfig::starter();
        assert_eq!(config.configs_dir, PathBuf::from("./configs"));
    }
}
