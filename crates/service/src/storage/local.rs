//! Local filesystem blob store.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::{object_key, validate_key, BlobUploader, ImageUpload, StorageError};

/// Stores each object as a file under `root`, the key used as relative path.
#[derive(Debug, Clone)]
pub struct LocalBlobUploader {
    root: PathBuf,
}

impl LocalBlobUploader {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn resolve(&self, stored_key: &str) -> Result<PathBuf, StorageError> {
        validate_key(stored_key)?;
        Ok(self.root.join(stored_key))
    }
}

#[async_trait]
impl BlobUploader for LocalBlobUploader {
    async fn upload(&self, image: &ImageUpload, dir_name: &str, key: &str) -> Result<String, StorageError> {
        let stored_key = object_key(dir_name, key)?;
        let path = self.resolve(&stored_key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, &image.bytes).await?;
        debug!(key = %stored_key, bytes = image.len(), "wrote blob");
        Ok(stored_key)
    }

    async fn delete(&self, stored_key: &str) -> Result<(), StorageError> {
        let path = self.resolve(stored_key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key = %stored_key, "deleted blob");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(key = %stored_key, "blob already absent");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
