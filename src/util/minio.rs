use crate::config::MinioConfig;
use crate::util::storage::{public_object_url, ObjectStorage, StorageError};
use async_trait::async_trait;
use bytes::Bytes;
use minio::s3::args::{BucketExistsArgs, MakeBucketArgs, PutObjectArgs};
use minio::s3::client::{Client, ClientBuilder};
use minio::s3::creds::StaticProvider;
use minio::s3::http::BaseUrl;
use std::io::Cursor;
use tracing::{debug, error, info, instrument, warn};

/// Photo store backed by a MinIO (or any S3-compatible) bucket.
#[derive(Debug, Clone)]
pub struct MinioService {
    client: Client,
    pub config: MinioConfig,
}

impl MinioService {
    /// Connect and make sure the photo bucket exists.
    #[instrument(skip(config), fields(endpoint = %config.endpoint, bucket = %config.bucket_name))]
    pub async fn new(config: MinioConfig) -> Result<Self, MinioError> {
        info!("Initializing MinIO service");

        config.validate().map_err(|e| {
            error!("MinIO configuration validation failed: {}", e);
            MinioError::ConfigError(e.to_string())
        })?;

        let base_url = config.get_endpoint_url().parse::<BaseUrl>()
            .map_err(|e| {
                error!("Failed to parse MinIO endpoint URL: {}", e);
                MinioError::ConnectionError(format!("Invalid endpoint URL: {}", e))
            })?;

        let static_provider = StaticProvider::new(&config.access_key, &config.secret_key, None);

        let client = ClientBuilder::new(base_url)
            .provider(Some(Box::new(static_provider)))
            .build()
            .map_err(|e| {
                error!("Failed to create MinIO client: {}", e);
                MinioError::ConnectionError(format!("Client creation failed: {}", e))
            })?;

        let service = Self { client, config };
        service.ensure_bucket_exists().await?;

        info!("MinIO service initialized successfully");
        Ok(service)
    }

    #[instrument(skip(self))]
    async fn ensure_bucket_exists(&self) -> Result<(), MinioError> {
        let bucket = &self.config.bucket_name;

        let exists_args = BucketExistsArgs::new(bucket)
            .map_err(|e| MinioError::InvalidArguments(e.to_string()))?;
        let exists = self.client.bucket_exists(&exists_args).await
            .map_err(|e| {
                error!("Failed to check if bucket exists: {}", e);
                MinioError::OperationError(format!("Bucket exists check failed: {}", e))
            })?;

        if exists {
            debug!("Bucket '{}' already exists", bucket);
            return Ok(());
        }

        warn!("Bucket '{}' does not exist, creating it", bucket);
        let make_args = MakeBucketArgs::new(bucket)
            .map_err(|e| MinioError::InvalidArguments(e.to_string()))?;
        self.client.make_bucket(&make_args).await
            .map_err(|e| {
                error!("Failed to create bucket '{}': {}", bucket, e);
                MinioError::OperationError(format!("Bucket creation failed: {}", e))
            })?;

        info!("Created bucket '{}'", bucket);
        Ok(())
    }

    /// Upload one object into the photo bucket.
    #[instrument(skip(self, data), fields(object_name = %object_name, size = data.len()))]
    pub async fn put_object(
        &self,
        object_name: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), MinioError> {
        let bucket_name = self.config.bucket_name.clone();
        let object_name_owned = object_name.to_string();
        let client = self.client.clone();
        let content_type_owned = content_type.map(|ct| ct.to_string());

        // PutObjectArgs borrows a non-Send reader, so the upload runs on the blocking pool
        tokio::task::spawn_blocking(move || {
            let mut reader = Cursor::new(data.to_vec());
            let data_len = reader.get_ref().len();

            let mut args = PutObjectArgs::new(
                &bucket_name,
                &object_name_owned,
                &mut reader,
                Some(data_len),
                None,
            )
            .map_err(|e| MinioError::InvalidArguments(e.to_string()))?;

            if let Some(ref ct) = content_type_owned {
                args.content_type = ct;
            }

            futures::executor::block_on(client.put_object(&mut args))
                .map_err(|e| MinioError::OperationError(format!("Upload failed: {}", e)))?;
            Ok::<(), MinioError>(())
        })
        .await
        .map_err(|e| {
            error!("Failed to join blocking task for put_object: {}", e);
            MinioError::OperationError(format!("Join error: {}", e))
        })??;

        info!("Uploaded object '{}' to bucket '{}'", object_name, self.config.bucket_name);
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for MinioService {
    async fn upload(&self, key: &str, content: Bytes, content_type: Option<&str>) -> Result<(), StorageError> {
        self.put_object(key, content, content_type)
            .await
            .map_err(StorageError::from)
    }

    fn public_url(&self, key: &str) -> String {
        public_object_url(&self.config.links_prefix, &self.config.bucket_name, key)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MinioError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Operation error: {0}")]
    OperationError(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

impl From<MinioError> for StorageError {
    fn from(err: MinioError) -> Self {
        match err {
            MinioError::ConfigError(msg) | MinioError::ConnectionError(msg) => StorageError::Unavailable(msg),
            MinioError::OperationError(msg) | MinioError::InvalidArguments(msg) => StorageError::Upload(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let err: StorageError = MinioError::ConnectionError("refused".to_string()).into();
        assert!(matches!(err, StorageError::Unavailable(_)));

        let err: StorageError = MinioError::OperationError("Upload failed: 403".to_string()).into();
        assert_eq!(err.to_string(), "Upload failed: Upload failed: 403");
    }
}
