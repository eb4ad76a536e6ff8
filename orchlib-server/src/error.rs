//! HTTP error mapping
//!
//! Handlers return [`ApiResult`]; the library error is translated to a
//! status code and a JSON body `{ "error", "message", "details"? }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use orchlib_common::Error;
use serde_json::{json, Value};
use tracing::error;

/// API error type
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError(Error::Validation(message.into()))
    }

    fn parts(&self) -> (StatusCode, &'static str, Option<Value>) {
        match &self.0 {
            Error::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", None),
            Error::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", None),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", None),
            Error::InvalidState(_) => (StatusCode::CONFLICT, "INVALID_STATE", None),
            Error::GuardViolation { entity, blocking } => (
                StatusCode::CONFLICT,
                "GUARD_VIOLATION",
                Some(json!({ "entity": entity.to_string(), "blocking": blocking })),
            ),
            Error::Delivery(_) => (StatusCode::BAD_GATEWAY, "DELIVERY_FAILED", None),
            Error::Database(_) | Error::Io(_) | Error::Config(_) | Error::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", None)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, details) = self.parts();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self.0);
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let mut body = json!({
            "error": code,
            "message": message,
        });
        if let Some(details) = details {
            body["details"] = details;
        }

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
