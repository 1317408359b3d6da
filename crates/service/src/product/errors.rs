use thiserror::Error;

use crate::errors::ServiceError;
use crate::storage::StorageError;

/// Business errors for product workflows
#[derive(Debug, Error)]
pub enum ProductError {
    #[error("category not found: {0}")]
    CategoryNotFound(String),
    #[error("product not found: {0}")]
    ProductNotFound(i32),
    #[error("invalid receiving date format (expected YYYY-MM-DD): {0}")]
    InvalidDateFormat(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("image upload failed: {0}")]
    ImageUploadFailed(#[source] StorageError),
    #[error("image delete failed: {0}")]
    ImageDeleteFailed(#[source] StorageError),
    #[error("product {0} cannot be deleted: it does not exist")]
    ForbiddenDelete(i32),
    #[error("repository error: {0}")]
    Repository(String),
}

impl ProductError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ProductError::CategoryNotFound(_) => 3001,
            ProductError::ProductNotFound(_) => 3002,
            ProductError::InvalidDateFormat(_) => 3003,
            ProductError::Validation(_) => 3004,
            ProductError::ForbiddenDelete(_) => 3005,
            ProductError::ImageUploadFailed(_) => 3101,
            ProductError::ImageDeleteFailed(_) => 3102,
            ProductError::Repository(_) => 3200,
        }
    }
}

impl From<ServiceError> for ProductError {
    fn from(e: ServiceError) -> Self {
        ProductError::Repository(e.to_string())
    }
}
