//! Errors for settings reads and updates.

use thiserror::Error;

use crate::settings::store::StoreError;
use crate::settings::validation::ValidationError;

/// Failure of a settings read or update.
///
/// Every variant is local to one request. None of them alter the stored
/// document or the restart flag.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Inbound document could not be decoded.
    #[error("Invalid settings: {0}")]
    Parse(#[source] serde_json::Error),

    /// Stored document could not be decoded.
    #[error("Error parsing settings: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Error encoding settings: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Error fetching settings: {}", .0.sanitized())]
    Fetch(#[source] StoreError),

    #[error("Error updating settings: {}", .0.sanitized())]
    Update(#[source] StoreError),
}

impl SettingsError {
    /// Whether the caller sent something unacceptable, as opposed to a
    /// server-side failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, SettingsError::Parse(_) | SettingsError::Validation(_))
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SettingsError::Parse(_) => "parse",
            SettingsError::Corrupt(_) => "corrupt",
            SettingsError::Validation(_) => "validation",
            SettingsError::Encode(_) => "encode",
            SettingsError::Fetch(_) => "fetch",
            SettingsError::Update(_) => "update",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_messages_sanitized() {
        let err = SettingsError::Update(StoreError::Backend(
            "dial tcp: postgres://app:pw@10.0.0.5/db refused\nstack trace".into(),
        ));
        assert_eq!(
            err.to_string(),
            "Error updating settings: dial tcp: postgres://***@10.0.0.5/db refused"
        );
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_validation_is_client_error() {
        let err = SettingsError::from(ValidationError::NoEnabledSmtp);
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "At least one SMTP block should be enabled");
        assert_eq!(err.kind(), "validation");
    }
}
