//! Settings validation.
//!
//! # Responsibilities
//! - Structural invariants serde cannot express
//! - Runs after decode and before anything is persisted
//!
//! Reasons are shown to API callers verbatim.

use thiserror::Error;

use crate::settings::document::Settings;

/// A settings document rejected before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("At least one SMTP block should be enabled")]
    NoEnabledSmtp,
}

/// Check a candidate document.
pub fn validate(settings: &Settings) -> Result<(), ValidationError> {
    if !settings.has_enabled_smtp() {
        return Err(ValidationError::NoEnabledSmtp);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::document::SmtpServer;

    fn smtp(enabled: bool) -> SmtpServer {
        SmtpServer {
            enabled,
            host: "mx.example.com".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_requires_enabled_smtp() {
        let mut doc = Settings::default();
        assert_eq!(validate(&doc), Err(ValidationError::NoEnabledSmtp));

        doc.smtp = vec![smtp(false), smtp(false)];
        assert_eq!(validate(&doc), Err(ValidationError::NoEnabledSmtp));

        doc.smtp[1].enabled = true;
        assert_eq!(validate(&doc), Ok(()));
    }

    #[test]
    fn test_reason_text() {
        assert_eq!(
            ValidationError::NoEnabledSmtp.to_string(),
            "At least one SMTP block should be enabled"
        );
    }
}
