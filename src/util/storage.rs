use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

/// Object store that receives car photos.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `content` under `key` in the configured bucket.
    async fn upload(&self, key: &str, content: Bytes, content_type: Option<&str>) -> Result<(), StorageError>;

    /// Public URL of an uploaded object. Valid as soon as `upload` returns.
    fn public_url(&self, key: &str) -> String;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Object key for a photo: `<unix-millis>_<id>_<filename>`.
///
/// `id` keeps photos that share a name and a millisecond apart, since the store overwrites on
/// an existing key.
pub fn storage_key(timestamp_ms: i64, id: &Uuid, filename: &str) -> String {
    format!("{}_{}_{}", timestamp_ms, id.simple(), sanitize_filename(filename))
}

/// Last path component of a client-supplied filename, never empty.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() || base == "." || base == ".." {
        "photo".to_string()
    } else {
        base.to_string()
    }
}

/// `<links_prefix>/<bucket>/<key>` with the key percent-encoded as one path segment.
pub fn public_object_url(links_prefix: &str, bucket_name: &str, key: &str) -> String {
    format!(
        "{}/{}/{}",
        links_prefix.trim_end_matches('/'),
        bucket_name,
        urlencoding::encode(key)
    )
}
