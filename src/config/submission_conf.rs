use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::{error, info, warn};
use validator::Validate;

use crate::config::ConfigError;

/// Which collaborator relays finished submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierBackend {
    EmailJs,
    Smtp,
}

impl FromStr for NotifierBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "emailjs" => Ok(NotifierBackend::EmailJs),
            "smtp" => Ok(NotifierBackend::Smtp),
            other => Err(ConfigError::InvalidValue(format!("Unknown NOTIFIER_BACKEND: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmissionConfig {
    /// Mailbox that receives every car submission
    #[validate(email)]
    pub recipient_email: String,
    pub notifier: NotifierBackend,
}

impl SubmissionConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let recipient_email = env::var("SUBMISSION_RECIPIENT_EMAIL").map_err(|_| {
            error!("SUBMISSION_RECIPIENT_EMAIL environment variable not found");
            ConfigError::EnvVarNotFound("SUBMISSION_RECIPIENT_EMAIL".to_string())
        })?;

        let notifier = match env::var("NOTIFIER_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => {
                warn!("NOTIFIER_BACKEND not set, defaulting to emailjs");
                NotifierBackend::EmailJs
            }
        };

        let config = Self { recipient_email, notifier };
        config.check()?;
        info!("Submission configuration loaded (notifier: {:?})", config.notifier);
        Ok(config)
    }

    pub fn from_test_env() -> Self {
        Self {
            recipient_email: "leads@example.com".to_string(),
            notifier: NotifierBackend::EmailJs,
        }
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate().map_err(|e| {
            error!("Invalid submission configuration: {}", e);
            ConfigError::ValidationError(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parsing() {
        assert_eq!("EmailJS".parse::<NotifierBackend>().unwrap(), NotifierBackend::EmailJs);
        assert_eq!("smtp".parse::<NotifierBackend>().unwrap(), NotifierBackend::Smtp);
        assert!("sendgrid".parse::<NotifierBackend>().is_err());
    }

    #[test]
    fn test_recipient_must_be_email() {
        let mut config = SubmissionConfig::from_test_env();
        assert!(config.check().is_ok());

        config.recipient_email = "not-an-address".to_string();
        assert!(matches!(config.check(), Err(ConfigError::ValidationError(_))));
    }
}
