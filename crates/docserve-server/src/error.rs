//! Error responses with `Accept` negotiation

use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use docserve_core::DocError;
use serde::Serialize;

/// Shown instead of the details of an internal failure.
pub const INTERNAL_MESSAGE: &str = "Internal error.";

/// An error a handler reports to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    status: u16,
    text: &'a str,
    message: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    }

    fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("Internal Error")
    }

    /// `Error: [404 Not Found] message`
    pub fn plain_text(&self) -> String {
        format!(
            "Error: [{} {}] {}",
            self.status.as_u16(),
            self.status_text(),
            self.message
        )
    }

    /// Render as JSON when the client accepts it, plain text otherwise.
    pub fn negotiate(self, headers: &HeaderMap) -> Response {
        if accepts_json(headers) {
            let body = ErrorBody {
                status: self.status.as_u16(),
                text: self.status_text(),
                message: &self.message,
            };
            (self.status, Json(body)).into_response()
        } else {
            self.into_response()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.plain_text(),
        )
            .into_response()
    }
}

impl From<DocError> for ApiError {
    fn from(err: DocError) -> Self {
        match err {
            DocError::UnresolvableRoot { .. } => ApiError::not_found(err.to_string()),
            DocError::InvalidGraph { .. } => ApiError::bad_request(err.to_string()),
            DocError::Internal(detail) => {
                tracing::error!(error = %detail, "internal error while documenting");
                ApiError::internal()
            }
        }
    }
}

fn accepts_json(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|media| {
            let media = media.split(';').next().unwrap_or("").trim();
            media.eq_ignore_ascii_case("application/json")
        })
}
