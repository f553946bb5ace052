use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::{required_var, ConfigError};

pub const DEFAULT_EMAILJS_API_URL: &str = "https://api.emailjs.com";

/// Sender identity and template used for EmailJS dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailJsConfig {
    pub api_url: String,
    /// EmailJS service (sender account) id
    pub service_id: String,
    pub template_id: String,
    /// Public key, sent as `user_id`
    pub public_key: String,
    /// Optional private key, sent as `accessToken` when strict mode is enabled on the account
    pub private_key: Option<String>,
    pub timeout_secs: u64,
}

impl EmailJsConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading EmailJS configuration from environment variables");

        let service_id = required_var("EMAILJS_SERVICE_ID")?;
        let template_id = required_var("EMAILJS_TEMPLATE_ID")?;
        let public_key = required_var("EMAILJS_PUBLIC_KEY")?;
        debug!("EmailJS service: {}, template: {}", service_id, template_id);

        let private_key = env::var("EMAILJS_PRIVATE_KEY").ok().filter(|k| !k.is_empty());
        if private_key.is_none() {
            debug!("EMAILJS_PRIVATE_KEY not set, sending without access token");
        }

        let api_url = env::var("EMAILJS_API_URL").unwrap_or_else(|_| {
            warn!("EMAILJS_API_URL not set, using default: {}", DEFAULT_EMAILJS_API_URL);
            DEFAULT_EMAILJS_API_URL.to_string()
        });

        let timeout_secs = env::var("EMAILJS_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::ParseError("Invalid EMAILJS_TIMEOUT_SECS value".to_string()))?;

        let config = Self {
            api_url,
            service_id,
            template_id,
            public_key,
            private_key,
            timeout_secs,
        };
        config.validate()?;
        info!("EmailJS configuration loaded successfully");
        Ok(config)
    }

    /// Test account ids against the public API URL. Tests point `api_url` at a local listener.
    pub fn from_test_env() -> Self {
        Self {
            api_url: DEFAULT_EMAILJS_API_URL.to_string(),
            service_id: "service_test".to_string(),
            template_id: "template_test".to_string(),
            public_key: "pk_test".to_string(),
            private_key: None,
            timeout_secs: 5,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            error!("EmailJS API URL must be http(s): {}", self.api_url);
            return Err(ConfigError::ValidationError("EmailJS API URL must start with http:// or https://".to_string()));
        }
        for (name, value) in [
            ("service id", &self.service_id),
            ("template id", &self.template_id),
            ("public key", &self.public_key),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!("EmailJS {} cannot be empty", name)));
            }
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationError("EmailJS timeout cannot be 0".to_string()));
        }
        Ok(())
    }

    /// Full URL of the send endpoint
    pub fn send_url(&self) -> String {
        format!("{}/api/v1.0/email/send", self.api_url.trim_end_matches('/'))
    }
}
