//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ServiceConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load from `path` if given, otherwise validated defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = ServiceConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{LogFormat, StoreBackend};

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service.toml");
        fs::write(
            &path,
            r#"
[listener]
bind_address = "0.0.0.0:9100"

[store]
backend = "memory"

[observability]
log_format = "json"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:9100");
        assert_eq!(config.listener.request_timeout_secs, 30);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert!(config.admin.api_key.is_empty());
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.toml");
        assert!(matches!(load_config(&missing), Err(ConfigError::Io { .. })));

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "[listener\nbind_address = 1").unwrap();
        assert!(matches!(load_config(&broken), Err(ConfigError::Parse { .. })));

        let invalid = dir.path().join("invalid.toml");
        fs::write(&invalid, "[listener]\nbind_address = \"localhost\"\n").unwrap();
        let err = load_config(&invalid).unwrap_err();
        assert!(err.to_string().contains("listener.bind_address"));
    }

    #[test]
    fn test_defaults_without_file() {
        let config = load_or_default(None).unwrap();
        assert_eq!(config.store.path, "data/settings.json");
    }
}
