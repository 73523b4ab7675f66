//! Unified error handling with Sentry integration.
//!
//! Provides a unified `ApiError` type that captures server-side errors to
//! Sentry before responding. All route handlers return `Result<T, ApiError>`;
//! every error response carries a JSON body with a human-readable message:
//! `{"error": "..."}`.
//!
//! Status mapping: validation and business-rule violations (out of stock,
//! empty cart, bad status value) are 400; missing entities are 404; auth-gate
//! failures are 401/403; datastore connectivity or timeout is 503; anything
//! uncategorized is 500 with the detail withheld from the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::checkout::CheckoutError;
use crate::services::upload::UploadError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed required fields.
    #[error("{0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Requested quantity exceeds available stock.
    #[error("insufficient stock")]
    OutOfStock,

    /// Missing or unverifiable bearer token.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but the role lacks the required capability.
    #[error("{0}")]
    Forbidden(String),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Checkout transition failed.
    #[error("checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Image upload failed.
    #[error("upload error: {0}")]
    Upload(#[from] UploadError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::OutOfStock => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_)
                | AuthError::InvalidCredentials
                | AuthError::UserAlreadyExists
                | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
                AuthError::Repository(RepositoryError::Timeout) => StatusCode::SERVICE_UNAVAILABLE,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart => StatusCode::BAD_REQUEST,
                CheckoutError::ProductVanished(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Upload(err) => match err {
                UploadError::NotAnImage => StatusCode::BAD_REQUEST,
                UploadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The client-facing message. Server-side details are withheld.
    fn message(&self) -> String {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => "not found".to_owned(),
                RepositoryError::Timeout => "database connection not available".to_owned(),
                _ => "internal server error".to_owned(),
            },
            Self::Auth(err) => match err {
                AuthError::Repository(RepositoryError::Timeout) => {
                    "database connection not available".to_owned()
                }
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    "internal server error".to_owned()
                }
                other => other.to_string(),
            },
            Self::Checkout(CheckoutError::ProductVanished(_))
            | Self::Upload(UploadError::Io(_))
            | Self::Internal(_) => "internal server error".to_owned(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.status() == StatusCode::INTERNAL_SERVER_ERROR {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let body = Json(json!({ "error": self.message() }));

        (status, body).into_response()
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("product not found".to_string());
        assert_eq!(err.to_string(), "product not found");

        let err = ApiError::Validation("quantity must be at least 1".to_string());
        assert_eq!(err.to_string(), "quantity must be at least 1");
    }

    #[test]
    fn test_taxonomy_status_codes() {
        assert_eq!(
            get_status(ApiError::Validation("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ApiError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(get_status(ApiError::OutOfStock), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_status(ApiError::Checkout(CheckoutError::EmptyCart)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ApiError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(ApiError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(ApiError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_timeout_maps_to_service_unavailable() {
        assert_eq!(
            get_status(ApiError::Database(RepositoryError::Timeout)),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(
            get_status(ApiError::Auth(AuthError::InvalidToken)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(ApiError::Auth(AuthError::InvalidCredentials)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ApiError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_internal_detail_is_withheld() {
        let err = ApiError::Internal("connection string was postgres://secret".to_string());
        assert_eq!(err.message(), "internal server error");

        let err = ApiError::Database(RepositoryError::DataCorruption("bad row".to_string()));
        assert_eq!(err.message(), "internal server error");
    }
}
