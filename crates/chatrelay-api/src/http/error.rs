//! Application error type mapping to HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use chatrelay_types::error::TransportError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Webhook authentication or payload errors.
    Transport(TransportError),
    /// Generic internal error.
    Internal(String),
}

impl From<TransportError> for AppError {
    fn from(e: TransportError) -> Self {
        AppError::Transport(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Transport(TransportError::MissingSignature) => {
                (StatusCode::BAD_REQUEST, "MISSING_SIGNATURE")
            }
            AppError::Transport(TransportError::SignatureMismatch) => {
                (StatusCode::BAD_REQUEST, "INVALID_SIGNATURE")
            }
            AppError::Transport(TransportError::MalformedPayload(_)) => {
                (StatusCode::BAD_REQUEST, "MALFORMED_PAYLOAD")
            }
            AppError::Transport(TransportError::Delivery(_)) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let message = match &self {
            AppError::Transport(e) => e.to_string(),
            AppError::Internal(msg) => msg.clone(),
        };
        tracing::warn!(status = status.as_u16(), %message, "request rejected");

        let body = json!({
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_errors_are_bad_request() {
        for err in [
            TransportError::MissingSignature,
            TransportError::SignatureMismatch,
            TransportError::MalformedPayload("eof".to_string()),
        ] {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_internal_is_server_error() {
        let response = AppError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
