//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;
use domain::DomainError;

use crate::auth::AuthError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or invalid session.
    Unauthorized,
    /// Valid session, but not allowed to touch the resource.
    Forbidden(String),
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
    /// Checkout error.
    Checkout(CheckoutError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized access".to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(err) => domain_error_to_response(&err),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        if status.is_server_error() {
            tracing::error!(error = %message, "internal server error");
        }

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: &DomainError) -> (StatusCode, String) {
    match err {
        DomainError::Validation(_) | DomainError::QuantityOverflow { .. } => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        DomainError::PlantNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        DomainError::InsufficientStock { .. } => (StatusCode::CONFLICT, err.to_string()),
        DomainError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    let status = match &err {
        CheckoutError::Domain(inner) => return domain_error_to_response(inner),
        CheckoutError::Invalid(_) => StatusCode::BAD_REQUEST,
        CheckoutError::PlantNotFound(_) => StatusCode::NOT_FOUND,
        CheckoutError::InsufficientStock { .. } => StatusCode::CONFLICT,
        CheckoutError::StepFailed { .. } | CheckoutError::CompensationFailed { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingEmail => ApiError::BadRequest(err.to_string()),
            AuthError::Signing(_) => ApiError::Internal(err.to_string()),
            AuthError::MissingToken | AuthError::InvalidToken(_) => {
                tracing::debug!(error = %err, "request rejected");
                metrics::counter!("auth_rejected_total").increment(1);
                ApiError::Unauthorized
            }
        }
    }
}
