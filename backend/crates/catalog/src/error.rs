//! Catalog Error Types
//!
//! Catalog-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::object::ObjectStoreError;
use thiserror::Error;

/// Catalog-specific result type alias
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog-specific error variants
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Request input failed validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Authenticated but not allowed to perform this operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Entity not found
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Invalid state transition
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Blob storage failure
    #[error("Object store error: {0}")]
    ObjectStore(#[from] ObjectStoreError),

    /// Error bubbled up from the auth crate (role promotion path)
    #[error(transparent)]
    Auth(#[from] auth::AuthError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::Validation(_) => ErrorKind::BadRequest,
            CatalogError::Forbidden(_) => ErrorKind::Forbidden,
            CatalogError::NotFound(_) => ErrorKind::NotFound,
            CatalogError::Conflict(_) => ErrorKind::Conflict,
            CatalogError::Auth(e) => e.kind(),
            CatalogError::Database(_)
            | CatalogError::ObjectStore(_)
            | CatalogError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    fn log(&self) {
        match self {
            CatalogError::Database(e) => {
                tracing::error!(error = %e, "Catalog database error");
            }
            CatalogError::ObjectStore(e) => {
                tracing::error!(error = %e, "Object store error");
            }
            CatalogError::Internal(msg) => {
                tracing::error!(message = %msg, "Catalog internal error");
            }
            _ => {
                tracing::debug!(error = %self, "Catalog error");
            }
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for CatalogError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => CatalogError::Validation(err.message().to_string()),
            ErrorKind::NotFound => CatalogError::NotFound("Resource"),
            _ => CatalogError::Internal(err.to_string()),
        }
    }
}
