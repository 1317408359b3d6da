//! Blob storage for product images.
//!
//! Objects are addressed by a path-like key `{dir_name}/{key}`. The store is
//! an external side effect: nothing written here is rolled back with a
//! database transaction, callers compensate explicitly.

pub mod local;
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use local::LocalBlobUploader;
pub use memory::InMemoryBlobUploader;
#[cfg(feature = "s3")]
pub use s3::S3BlobUploader;

/// Errors raised by blob backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// An uploaded image as received from the client.
#[derive(Debug, Clone, Default)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, bytes: impl Into<Bytes>) -> Self {
        Self { file_name: file_name.into(), content_type, bytes: bytes.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}

/// Object storage used for product images.
#[async_trait]
pub trait BlobUploader: Send + Sync {
    /// Store `image` under `{dir_name}/{key}`, overwriting any previous object,
    /// and return the stored key.
    async fn upload(&self, image: &ImageUpload, dir_name: &str, key: &str) -> Result<String, StorageError>;

    /// Remove the object stored under `stored_key`. Missing objects are not an error.
    async fn delete(&self, stored_key: &str) -> Result<(), StorageError>;
}

/// Join a directory and a key into a storage key, rejecting anything that
/// could escape the product prefix.
pub fn object_key(dir_name: &str, key: &str) -> Result<String, StorageError> {
    let dir = dir_name.trim_matches('/');
    let key = key.trim_matches('/');
    if key.is_empty() {
        return Err(StorageError::InvalidKey("empty key".into()));
    }
    let joined = if dir.is_empty() { key.to_string() } else { format!("{dir}/{key}") };
    validate_key(&joined)?;
    Ok(joined)
}

pub(crate) fn validate_key(stored_key: &str) -> Result<(), StorageError> {
    if stored_key.is_empty() || stored_key.starts_with('/') {
        return Err(StorageError::InvalidKey(stored_key.to_string()));
    }
    if stored_key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
        return Err(StorageError::InvalidKey(stored_key.to_string()));
    }
    Ok(())
}
