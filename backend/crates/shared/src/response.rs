//! Response Envelope
//!
//! Every HTTP response body follows `{ success, data?, error?, code? }`.
//! Errors are produced by [`crate::error::app_error::AppError`]'s
//! `IntoResponse`; this module covers the success side.

use serde::Serialize;

/// Success envelope for API responses
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap a payload in the success envelope
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
        }
    }

    /// Success with no payload (e.g. logout, delete)
    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
        }
    }
}
