//! S3 (or S3-compatible) blob store, enabled with the `s3` feature.

use async_trait::async_trait;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use super::{object_key, validate_key, BlobUploader, ImageUpload, StorageError};

#[derive(Debug, Clone)]
pub struct S3BlobUploader {
    client: Client,
    bucket: String,
}

impl S3BlobUploader {
    /// Build a client from the default AWS credential chain.
    ///
    /// `endpoint` points at an S3-compatible service and switches to
    /// path-style addressing.
    pub async fn new(bucket: &str, region: &str, endpoint: Option<&str>) -> Self {
        info!(bucket, region, endpoint = endpoint.unwrap_or("aws"), "initializing s3 blob store");
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region.to_string()));
        if let Some(url) = endpoint {
            loader = loader.endpoint_url(url);
        }
        let shared = loader.load().await;
        let conf = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(endpoint.is_some())
            .build();
        Self { client: Client::from_conf(conf), bucket: bucket.to_string() }
    }

    pub fn from_client(client: Client, bucket: impl Into<String>) -> Self {
        Self { client, bucket: bucket.into() }
    }
}

#[async_trait]
impl BlobUploader for S3BlobUploader {
    async fn upload(&self, image: &ImageUpload, dir_name: &str, key: &str) -> Result<String, StorageError> {
        let stored_key = object_key(dir_name, key)?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&stored_key)
            .set_content_type(image.content_type.clone())
            .content_length(image.len() as i64)
            .body(ByteStream::from(image.bytes.clone()))
            .send()
            .await
            .map_err(|e| StorageError::Backend(DisplayErrorContext(&e).to_string()))?;
        debug!(bucket = %self.bucket, key = %stored_key, bytes = image.len(), "put object");
        Ok(stored_key)
    }

    async fn delete(&self, stored_key: &str) -> Result<(), StorageError> {
        validate_key(stored_key)?;
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(stored_key)
            .send()
            .await
            .map_err(|e| StorageError::Backend(DisplayErrorContext(&e).to_string()))?;
        debug!(bucket = %self.bucket, key = %stored_key, "deleted object");
        Ok(())
    }
}
