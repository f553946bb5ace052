use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::{required_var, ConfigError};

pub const DEFAULT_PHOTO_BUCKET: &str = "uploads";

/// Connection settings for the S3-compatible store that holds car photos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinioConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket_name: String,
    /// Public base URL that photo links are built from, e.g. `https://cdn.example.com`
    pub links_prefix: String,
    pub region: Option<String>,
    pub secure: bool,
}

impl MinioConfig {
    /// Reads `MINIO_ENDPOINT`, `MINIO_ACCESS_KEY` and `MINIO_SECRET_KEY`, plus the optional
    /// `MINIO_BUCKET_NAME`, `MINIO_REGION`, `MINIO_SECURE` and `MINIO_LINKS_PREFIX`.
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading MinIO configuration from environment variables");

        let endpoint = required_var("MINIO_ENDPOINT")?;
        let access_key = required_var("MINIO_ACCESS_KEY")?;
        let secret_key = required_var("MINIO_SECRET_KEY")?;

        let bucket_name = env::var("MINIO_BUCKET_NAME").unwrap_or_else(|_| {
            warn!("MINIO_BUCKET_NAME not set, photos go to '{}'", DEFAULT_PHOTO_BUCKET);
            DEFAULT_PHOTO_BUCKET.to_string()
        });
        let region = Some(env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string()));
        let secure = match env::var("MINIO_SECURE") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::ParseError(format!("Invalid MINIO_SECURE value: {}", raw)))?,
            Err(_) => false,
        };

        let links_prefix = env::var("MINIO_LINKS_PREFIX")
            .unwrap_or_else(|_| endpoint_url(&endpoint, secure));
        debug!(endpoint = %endpoint, bucket = %bucket_name, links_prefix = %links_prefix, secure, "MinIO settings");

        let config = Self {
            endpoint,
            access_key,
            secret_key,
            bucket_name,
            links_prefix,
            region,
            secure,
        };

        config.validate()?;
        info!("MinIO configuration loaded successfully");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("Endpoint", &self.endpoint),
            ("Access key", &self.access_key),
            ("Secret key", &self.secret_key),
            ("Links prefix", &self.links_prefix),
        ] {
            if value.is_empty() {
                error!("MinIO {} is empty", name.to_lowercase());
                return Err(ConfigError::ValidationError(format!("{} cannot be empty", name)));
            }
        }

        validate_bucket_name(&self.bucket_name)
    }

    /// Get the full endpoint URL with protocol
    pub fn get_endpoint_url(&self) -> String {
        endpoint_url(&self.endpoint, self.secure)
    }
}

fn endpoint_url(endpoint: &str, secure: bool) -> String {
    let protocol = if secure { "https" } else { "http" };
    format!("{}://{}", protocol, endpoint)
}

/// S3 bucket naming: 3 to 63 chars of lowercase letters, digits, '-' and '.'
fn validate_bucket_name(bucket_name: &str) -> Result<(), ConfigError> {
    if bucket_name.len() < 3 || bucket_name.len() > 63 {
        error!("Invalid bucket name length: {}", bucket_name.len());
        return Err(ConfigError::ValidationError(
            "Bucket name must be between 3 and 63 characters".to_string(),
        ));
    }
    if !bucket_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        error!("Invalid bucket name format: {}", bucket_name);
        return Err(ConfigError::ValidationError(
            "Bucket name contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

impl Default for MinioConfig {
    fn default() -> Self {
        warn!("Using default MinIO configuration - this should only be used for testing");
        Self {
            endpoint: "localhost:9000".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            bucket_name: DEFAULT_PHOTO_BUCKET.to_string(),
            links_prefix: "http://localhost:9000".to_string(),
            region: Some("us-east-1".to_string()),
            secure: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_bucket_names() {
        assert!(validate_bucket_name("uploads").is_ok());
        assert!(validate_bucket_name("car-photos.2024").is_ok());
        assert!(validate_bucket_name("ab").is_err());
        assert!(validate_bucket_name("Car_Photos").is_err());
    }

    #[test]
    fn test_links_prefix_is_required() {
        let mut config = MinioConfig::default();
        assert!(config.validate().is_ok());

        config.links_prefix = String::new();
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_endpoint_url_follows_secure_flag() {
        let mut config = MinioConfig::default();
        assert_eq!(config.get_endpoint_url(), "http://localhost:9000");

        config.secure = true;
        assert_eq!(config.get_endpoint_url(), "https://localhost:9000");
    }
}
