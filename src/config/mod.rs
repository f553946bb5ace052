pub mod app_conf;
pub mod minio_conf;
pub mod smtp_conf;
pub mod emailjs_conf;
pub mod submission_conf;

pub use app_conf::AppConfig;
pub use minio_conf::MinioConfig;
pub use smtp_conf::{SmtpConfig, SmtpTls};
pub use emailjs_conf::EmailJsConfig;
pub use submission_conf::{NotifierBackend, SubmissionConfig};

/// Common configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
    
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
    
    #[error("Validation error: {0}")]
    ValidationError(String),
    
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Read a variable that has no default.
pub(crate) fn required_var(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| {
        tracing::error!("{} environment variable not found", name);
        ConfigError::EnvVarNotFound(name.to_string())
    })
}
