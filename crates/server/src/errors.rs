use axum::extract::rejection::PathRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use models::errors::ModelError;
use service::auth::AuthError;
use service::errors::ServiceError;
use service::product::ProductError;
use thiserror::Error;
use tracing::{error, warn};

/// JSON error body `{ "error": ..., "detail": ... }` with its HTTP status.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: String,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, detail: Option<String>) -> Self {
        Self { status, error: error.into(), detail }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request", Some(detail.into()))
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some(detail.into()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.error, detail = ?self.detail, "request failed");
        } else {
            warn!(status = %self.status, error = %self.error, detail = ?self.detail, "request rejected");
        }
        (self.status, Json(serde_json::json!({"error": self.error, "detail": self.detail}))).into_response()
    }
}

impl From<PathRejection> for JsonApiError {
    fn from(e: PathRejection) -> Self {
        JsonApiError::bad_request(e.body_text())
    }
}

impl From<ProductError> for JsonApiError {
    fn from(e: ProductError) -> Self {
        let (status, error) = match &e {
            ProductError::CategoryNotFound(_) => (StatusCode::NOT_FOUND, "Category Not Found"),
            ProductError::ProductNotFound(_) => (StatusCode::NOT_FOUND, "Product Not Found"),
            ProductError::InvalidDateFormat(_) => (StatusCode::BAD_REQUEST, "Invalid Date Format"),
            ProductError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation Error"),
            ProductError::ForbiddenDelete(_) => (StatusCode::FORBIDDEN, "Forbidden"),
            ProductError::ImageUploadFailed(_) => (StatusCode::BAD_GATEWAY, "Image Upload Failed"),
            ProductError::ImageDeleteFailed(_) => (StatusCode::BAD_GATEWAY, "Image Delete Failed"),
            ProductError::Repository(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Repository Error"),
        };
        JsonApiError::new(status, error, Some(e.to_string()))
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let (status, error) = match &e {
            ServiceError::Validation(_) | ServiceError::Model(ModelError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, "Validation Error")
            }
            ServiceError::NotFound(_) | ServiceError::Model(ModelError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "Not Found")
            }
            ServiceError::Conflict(_) => (StatusCode::CONFLICT, "Conflict"),
            ServiceError::Db(_) | ServiceError::Model(ModelError::Db(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "DB Error")
            }
        };
        JsonApiError::new(status, error, Some(e.to_string()))
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        let (status, error) = match &e {
            AuthError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation Error"),
            AuthError::Conflict => (StatusCode::CONFLICT, "Conflict"),
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Auth Error")
            }
        };
        JsonApiError::new(status, error, Some(e.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("storage backend unavailable: {0}")]
    Storage(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
