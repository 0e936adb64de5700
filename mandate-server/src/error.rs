use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mandate_protocol::ProfileViolation;
use serde_json::json;
use tracing::error;

/// Error rendered to API clients as `{"error": <code>, ...}`.
///
/// Validation failures carry field-level details; server-side failures keep
/// the body to a bare code and log the underlying message instead.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: Option<String>,
    details: Option<Vec<ProfileViolation>>,
}

impl AppError {
    pub fn invalid_profile(details: Vec<ProfileViolation>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "invalid_profile",
            message: None,
            details: Some(details),
        }
    }

    /// Body never reached the validator: not JSON, too large, wrong shape.
    pub fn malformed_body(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "invalid_profile",
            message: None,
            details: Some(vec![ProfileViolation::new("body", message)]),
        }
    }

    pub fn catalog_unavailable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "catalog_unavailable",
            message: Some(message.into()),
            details: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal_error",
            message: Some(message.into()),
            details: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(message) = &self.message {
                error!(code = self.code, %message, "request failed");
            }
        }

        let mut body = json!({ "error": self.code });
        if let Some(details) = self.details {
            body["details"] = json!(details);
        }

        (self.status, Json(body)).into_response()
    }
}
