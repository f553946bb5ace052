use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpTls {
    /// Plain connection (local relays and test sinks only)
    None,
    /// Upgrade with STARTTLS, the usual mode on port 587
    StartTls,
    /// Implicit TLS, the usual mode on port 465
    Wrapper,
}

impl FromStr for SmtpTls {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(SmtpTls::None),
            "starttls" => Ok(SmtpTls::StartTls),
            "wrapper" | "tls" => Ok(SmtpTls::Wrapper),
            other => Err(ConfigError::InvalidValue(format!("Unknown SMTP_TLS mode: {}", other))),
        }
    }
}

/// SMTP relay settings, used when submissions are mailed directly instead of through EmailJS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Empty username disables authentication
    pub username: String,
    pub password: String,
    pub tls: SmtpTls,
    pub from_email: String,
    pub from_name: String,
    pub connection_timeout_secs: u64,
}

impl SmtpConfig {
    /// Load SMTP configuration from environment variables
    ///
    /// - SMTP_HOST (required)
    /// - SMTP_PORT (defaults to 587)
    /// - SMTP_USERNAME / SMTP_PASSWORD (optional)
    /// - SMTP_TLS: none | starttls | wrapper (defaults to starttls)
    /// - SMTP_FROM_EMAIL (required)
    /// - SMTP_FROM_NAME (defaults to "Car Submissions")
    /// - SMTP_CONNECTION_TIMEOUT in seconds (defaults to 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading SMTP configuration from environment variables");

        let host = env::var("SMTP_HOST").map_err(|_| {
            error!("SMTP_HOST environment variable not found");
            ConfigError::EnvVarNotFound("SMTP_HOST".to_string())
        })?;
        debug!("SMTP host: {}", host);

        let port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| {
                warn!("SMTP_PORT not set, defaulting to 587");
                "587".to_string()
            })
            .parse::<u16>()
            .map_err(|_| {
                error!("Invalid SMTP_PORT value");
                ConfigError::ParseError("Invalid SMTP_PORT value".to_string())
            })?;

        let username = env::var("SMTP_USERNAME").unwrap_or_default();
        let password = env::var("SMTP_PASSWORD").unwrap_or_default();
        if username.is_empty() {
            warn!("SMTP_USERNAME not set, relay will be used without authentication");
        }
        debug!("SMTP password: [REDACTED]");

        let tls = match env::var("SMTP_TLS") {
            Ok(raw) => raw.parse::<SmtpTls>()?,
            Err(_) => {
                warn!("SMTP_TLS not set, defaulting to starttls");
                SmtpTls::StartTls
            }
        };
        debug!("SMTP TLS mode: {:?}", tls);

        let from_email = env::var("SMTP_FROM_EMAIL").map_err(|_| {
            error!("SMTP_FROM_EMAIL environment variable not found");
            ConfigError::EnvVarNotFound("SMTP_FROM_EMAIL".to_string())
        })?;

        let from_name = env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Car Submissions".to_string());

        let connection_timeout_secs = env::var("SMTP_CONNECTION_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        let config = SmtpConfig {
            host,
            port,
            username,
            password,
            tls,
            from_email,
            from_name,
            connection_timeout_secs,
        };

        config.validate()?;
        info!("SMTP configuration loaded successfully");
        Ok(config)
    }

    /// Local mail sink settings (e.g. MailHog on port 1025)
    pub fn from_test_env() -> Self {
        SmtpConfig {
            host: "localhost".to_string(),
            port: 1025,
            username: String::new(),
            password: String::new(),
            tls: SmtpTls::None,
            from_email: "test@example.com".to_string(),
            from_name: "Test App".to_string(),
            connection_timeout_secs: 10,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            error!("SMTP host is empty");
            return Err(ConfigError::ValidationError("SMTP host cannot be empty".to_string()));
        }

        if self.port == 0 {
            return Err(ConfigError::ValidationError("SMTP port cannot be 0".to_string()));
        }

        if !self.username.is_empty() && self.password.is_empty() {
            error!("SMTP username set without a password");
            return Err(ConfigError::ValidationError(
                "SMTP password is required when a username is set".to_string(),
            ));
        }

        if !self.from_email.contains('@') {
            error!("Invalid from email format");
            return Err(ConfigError::ValidationError("Invalid from email format".to_string()));
        }

        if self.connection_timeout_secs == 0 {
            return Err(ConfigError::ValidationError("Connection timeout cannot be 0".to_string()));
        }

        Ok(())
    }

    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty()
    }
}
