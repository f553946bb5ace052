use std::env;
use tracing::warn;

/// Default multipart body limit: 25 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);
        let max_upload_bytes = match env::var("MAX_UPLOAD_BYTES") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Invalid MAX_UPLOAD_BYTES value '{}', using default", raw);
                DEFAULT_MAX_UPLOAD_BYTES
            }),
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };
        AppConfig { host, port, max_upload_bytes }
    }
}
