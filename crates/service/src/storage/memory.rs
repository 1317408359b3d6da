//! In-memory blob store for tests and doc examples.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::{object_key, BlobUploader, ImageUpload, StorageError};

/// Keeps objects in a map. Uploads and deletes can be switched to fail.
#[derive(Default)]
pub struct InMemoryBlobUploader {
    blobs: Mutex<HashMap<String, Bytes>>,
    uploads: AtomicUsize,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
}

impl InMemoryBlobUploader {
    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Number of upload calls, including failed ones.
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn get(&self, stored_key: &str) -> Option<Bytes> {
        self.blobs.lock().unwrap().get(stored_key).cloned()
    }

    pub fn contains(&self, stored_key: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(stored_key)
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobUploader for InMemoryBlobUploader {
    async fn upload(&self, image: &ImageUpload, dir_name: &str, key: &str) -> Result<String, StorageError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("upload rejected".into()));
        }
        let stored_key = object_key(dir_name, key)?;
        self.blobs.lock().unwrap().insert(stored_key.clone(), image.bytes.clone());
        Ok(stored_key)
    }

    async fn delete(&self, stored_key: &str) -> Result<(), StorageError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("delete rejected".into()));
        }
        self.blobs.lock().unwrap().remove(stored_key);
        Ok(())
    }
}
