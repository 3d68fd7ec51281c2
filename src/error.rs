//! Error types for the request cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::surface::RemoteError;

// == Cache Error Enum ==
/// Unified error type for the request cache.
///
/// Fetch failures never show up here: they are absorbed by the executor and
/// stored on the cache item. Only the pre-fetch paths fail loudly.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Method path does not exist on the call surface
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No subscription record for the key
    #[error("Key not found: {0}")]
    NotFound(String),

    /// A direct (uncached) call through the mutation hook was rejected
    #[error("Remote call failed: {0}")]
    Remote(#[from] RemoteError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::UnknownMethod(_) => StatusCode::BAD_REQUEST,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::Remote(_) => StatusCode::BAD_GATEWAY,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the request cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (CacheError::UnknownMethod("a.b".into()), StatusCode::BAD_REQUEST),
            (CacheError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (CacheError::NotFound("k".into()), StatusCode::NOT_FOUND),
            (
                CacheError::Remote(RemoteError::new("boom")),
                StatusCode::BAD_GATEWAY,
            ),
            (CacheError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_unknown_method_message() {
        let err = CacheError::UnknownMethod("tickets.lst".to_string());
        assert_eq!(err.to_string(), "Unknown method: tickets.lst");
    }
}
