//! Configuration management for rax-files
//!
//! Values come from built-in defaults, an optional `config.toml` and
//! `RAX_FILES_*` environment variables, in that order of precedence.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the working directory when no explicit path is given
pub const DEFAULT_CONFIG_NAME: &str = "config";

/// Prefix for environment overrides, e.g. `RAX_FILES_DEFAULT_UPLOAD_DIR`
pub const ENV_PREFIX: &str = "RAX_FILES";

pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_MAX_TREE_DEPTH: usize = 64;
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 300;

/// Storage configuration shared by every operation
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory used when a request does not name one
    pub default_upload_dir: PathBuf,

    /// Upload size limit applied by the CLI when no `--max-size` is given
    pub max_file_size_bytes: Option<u64>,

    /// Extension allow-list applied by the CLI when no `--allow` is given
    pub allowed_extensions: Option<Vec<String>>,

    /// Deepest level recursive copy/delete will descend to
    pub max_tree_depth: usize,

    /// Require file names to be both short and made of safe characters
    pub strict_file_names: bool,

    /// Deadline for a single CLI operation
    pub operation_timeout_secs: u64,

    /// Log filter used when RUST_LOG is not set
    pub log_level: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            default_upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_file_size_bytes: None,
            allowed_extensions: None,
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
            strict_file_names: false,
            operation_timeout_secs: DEFAULT_OPERATION_TIMEOUT_SECS,
            log_level: "info".to_string(),
        }
    }
}

impl StorageConfig {
    /// Build a default configuration rooted at `dir`
    pub fn with_upload_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            default_upload_dir: dir.into(),
            ..Self::default()
        }
    }

    /// Load configuration with environment overrides.
    ///
    /// An explicit `path` must exist; otherwise `config.toml` in the working
    /// directory is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: StorageConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.default_upload_dir.as_os_str().is_empty() {
            return Err(config::ConfigError::Message(
                "default_upload_dir cannot be empty".into(),
            ));
        }

        if self.max_tree_depth == 0 {
            return Err(config::ConfigError::Message(
                "max_tree_depth must be greater than 0".into(),
            ));
        }

        if self.operation_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "operation_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.max_file_size_bytes == Some(0) {
            return Err(config::ConfigError::Message(
                "max_file_size_bytes must be greater than 0 when set".into(),
            ));
        }

        Ok(())
    }

    /// Get the operation deadline as Duration
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_permissive() {
        let config = StorageConfig::default();
        assert_eq!(config.default_upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.max_file_size_bytes, None);
        assert_eq!(config.allowed_extensions, None);
        assert!(!config.strict_file_names);
        assert_eq!(config.max_tree_depth, DEFAULT_MAX_TREE_DEPTH);
    }

    #[test]
    fn load_reads_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("files.toml");
        fs::write(
            &path,
            r#"
default_upload_dir = "/srv/uploads"
max_file_size_bytes = 2048
allowed_extensions = ["png", "jpg"]
strict_file_names = true
"#,
        )
        .unwrap();

        let config = StorageConfig::load(Some(path.as_path())).unwrap();

        assert_eq!(config.default_upload_dir, PathBuf::from("/srv/uploads"));
        assert_eq!(config.max_file_size_bytes, Some(2048));
        assert_eq!(
            config.allowed_extensions,
            Some(vec!["png".to_string(), "jpg".to_string()])
        );
        assert!(config.strict_file_names);
        assert_eq!(config.operation_timeout_secs, DEFAULT_OPERATION_TIMEOUT_SECS);
    }

    #[test]
    fn load_rejects_zero_depth() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("files.toml");
        fs::write(&path, "max_tree_depth = 0\n").unwrap();

        assert!(StorageConfig::load(Some(path.as_path())).is_err());
    }

    #[test]
    fn load_fails_on_missing_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.toml");

        assert!(StorageConfig::load(Some(path.as_path())).is_err());
    }
}
