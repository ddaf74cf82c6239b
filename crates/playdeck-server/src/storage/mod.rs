//! Blob storage
//!
//! [`BlobStore`] is the upload primitive the feature slices depend on;
//! [`Storage`] implements it on top of any S3-compatible service.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::{
    config::{Credentials, Region},
    primitives::ByteStream,
    Client,
};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, instrument};

pub mod config;

/// Bytes to store plus the name and media type to store them under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub media_type: String,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to upload '{key}': {message}")]
    Upload { key: String, message: String },
}

/// Upload primitive. Returns the stored path for `file` under `prefix`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, prefix: &str, file: UploadFile) -> Result<String, StorageError>;
}

/// `<prefix>/<filename>` without doubled separators.
pub fn object_key(prefix: &str, filename: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let filename = filename.trim_start_matches('/');
    if prefix.is_empty() {
        filename.to_string()
    } else {
        format!("{}/{}", prefix, filename)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub key: String,
    pub checksum: String,
    pub size: i64,
}

#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
}

impl Storage {
    pub fn new(config: config::StorageConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            endpoint = ?config.endpoint,
            region = %config.region,
            path_style = config.path_style,
            "Initializing storage"
        );

        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "playdeck-storage",
        );

        let mut s3_config_builder = aws_sdk_s3::Config::builder()
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .force_path_style(config.path_style);

        if let Some(endpoint) = &config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(s3_config_builder.build());

        info!("Storage client initialized for bucket: {}", config.bucket);

        Ok(Self {
            client,
            bucket: config.bucket,
        })
    }

    #[instrument(skip(self, data))]
    pub async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<UploadResult> {
        let checksum = calculate_sha256(&data);
        let size = data.len() as i64;

        debug!("Uploading {} bytes to s3://{}/{}", size, self.bucket, key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .context("Failed to upload to S3")?;

        info!(checksum = %checksum, "Successfully uploaded to s3://{}/{}", self.bucket, key);

        Ok(UploadResult {
            key: key.to_string(),
            checksum,
            size,
        })
    }
}

#[async_trait]
impl BlobStore for Storage {
    async fn upload(&self, prefix: &str, file: UploadFile) -> Result<String, StorageError> {
        let key = object_key(prefix, &file.filename);
        let result = self
            .put_object(&key, file.bytes, &file.media_type)
            .await
            .map_err(|e| StorageError::Upload {
                key: key.clone(),
                message: format!("{:#}", e),
            })?;
        Ok(result.key)
    }
}

fn calculate_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
