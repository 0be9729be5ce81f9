//! Configuration for the vocabulary tool.
//!
//! Read from `toeic-vocab.toml` in the current directory (or an explicit
//! path). `TOEIC_VOCAB_DB` overrides the database path.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "toeic-vocab.toml";
pub const DATABASE_ENV_VAR: &str = "TOEIC_VOCAB_DB";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabConfig {
    /// SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// How many due words `due` and `study` load when no limit is given.
    #[serde(default = "default_due_limit")]
    pub default_due_limit: usize,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("vocabulary.sqlite3")
}
fn default_log_filter() -> String {
    "toeic_vocab=info".to_string()
}
fn default_due_limit() -> usize {
    20
}

impl Default for VocabConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            log_filter: default_log_filter(),
            default_due_limit: default_due_limit(),
        }
    }
}

impl VocabConfig {
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Load config from an explicit path, or from `toeic-vocab.toml` if present.
///
/// An explicit path that does not exist is an error; a missing default file
/// falls back to built-in defaults.
pub fn load_config_from(path: Option<&Path>) -> Result<VocabConfig, ConfigError> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => return Err(ConfigError::NotFound(p.to_path_buf())),
        None => {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            local.exists().then_some(local)
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            VocabConfig::from_toml_str(&content, &path)?
        }
        None => VocabConfig::default(),
    };

    if let Ok(db) = std::env::var(DATABASE_ENV_VAR) {
        if !db.is_empty() {
            config.database_path = PathBuf::from(db);
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let config =
            VocabConfig::from_toml_str("default_due_limit = 5\n", Path::new("test.toml")).unwrap();
        assert_eq!(config.default_due_limit, 5);
        assert_eq!(config.database_path, PathBuf::from("vocabulary.sqlite3"));
        assert_eq!(config.log_filter, "toeic_vocab=info");
    }

    #[test]
    fn test_full_config() {
        let content = r#"
database_path = "/var/lib/toeic/vocab.db"
log_filter = "toeic_vocab=debug"
default_due_limit = 50
"#;
        let config = VocabConfig::from_toml_str(content, Path::new("test.toml")).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/var/lib/toeic/vocab.db"));
        assert_eq!(config.log_filter, "toeic_vocab=debug");
        assert_eq!(config.default_due_limit, 50);
    }

    #[test]
    fn test_invalid_config_reports_path() {
        let err = VocabConfig::from_toml_str("default_due_limit = \"lots\"", Path::new("bad.toml"))
            .unwrap_err();
        assert!(err.to_string().starts_with("failed to parse config bad.toml"));
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/toeic-vocab.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "log_filter = \"warn\"\n").unwrap();

        let config = load_config_from(Some(path.as_path())).unwrap();
        assert_eq!(config.log_filter, "warn");
    }
}
