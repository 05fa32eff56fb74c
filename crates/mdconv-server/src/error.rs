//! Error types for the HTTP server.
//!
//! [`ServerError`] is route-agnostic. The form route wraps it in
//! [`FormError`] (plain-text body) and the JSON route in [`ApiError`]
//! (`{"error": ...}` body).

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mdconv_convert::ConvertError;
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// Form request without an uploaded file.
    #[error("No file uploaded")]
    NoFileUploaded,

    /// JSON request without a `markdown` string.
    #[error("No Markdown data found")]
    NoMarkdown,

    /// Malformed request body.
    #[error("Invalid request body: {0}")]
    BadRequest(String),

    /// Conversion failed.
    #[error("{0}")]
    Conversion(#[from] ConvertError),

    /// Anything else (e.g. a panicked conversion task).
    #[error("{0}")]
    Internal(String),
}

impl ServerError {
    /// HTTP status for this error.
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Self::NoFileUploaded | Self::NoMarkdown | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Conversion(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Unexpected failures name the route they came from.
    pub(crate) fn message(&self, route: &str) -> String {
        match self {
            Self::Conversion(e) if e.is_tool_error() => e.to_string(),
            Self::Conversion(_) | Self::Internal(_) => {
                format!("Unknown error in {route}: {self}")
            }
            _ => self.to_string(),
        }
    }

    fn log(&self, route: &str) {
        if self.status().is_server_error() {
            tracing::error!(route, error = %self, "Conversion request failed");
        } else {
            tracing::debug!(route, error = %self, "Rejected conversion request");
        }
    }
}

/// Error for `POST /convert`, rendered as plain text.
#[derive(Debug)]
pub(crate) struct FormError(pub(crate) ServerError);

impl From<ServerError> for FormError {
    fn from(err: ServerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for FormError {
    fn into_response(self) -> Response {
        const ROUTE: &str = "/convert";
        self.0.log(ROUTE);
        (self.0.status(), self.0.message(ROUTE)).into_response()
    }
}

/// Error for `POST /api/convert`, rendered as JSON.
#[derive(Debug)]
pub(crate) struct ApiError(pub(crate) ServerError);

impl From<ServerError> for ApiError {
    fn from(err: ServerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        const ROUTE: &str = "/api/convert";
        self.0.log(ROUTE);
        (
            self.0.status(),
            Json(json!({"error": self.0.message(ROUTE)})),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdconv_convert::Stage;

    #[test]
    fn test_client_errors_are_bad_request() {
        assert_eq!(ServerError::NoFileUploaded.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ServerError::NoMarkdown.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ServerError::BadRequest("eof".to_owned()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_tool_error_message_is_raw() {
        let err = ServerError::Conversion(ConvertError::ToolFailed {
            stage: Stage::Primary,
            program: "pandoc".to_owned(),
            status: Some(1),
            stderr: "pandoc: unknown option".to_owned(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.message("/convert"),
            "Error during conversion (CalledProcessError): pandoc: unknown option"
        );
    }

    #[test]
    fn test_missing_tool_is_unknown_error() {
        let err = ServerError::Conversion(ConvertError::ToolMissing {
            stage: Stage::Primary,
            programs: vec!["pandoc".to_owned()],
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.message("/convert"),
            "Unknown error in /convert: pandoc not found in PATH (primary stage)"
        );
    }

    #[test]
    fn test_unexpected_error_names_route() {
        let io = ServerError::Conversion(ConvertError::Io(std::io::Error::other("disk full")));
        assert_eq!(
            io.message("/api/convert"),
            "Unknown error in /api/convert: I/O error: disk full"
        );

        let internal = ServerError::Internal("task panicked".to_owned());
        assert_eq!(
            internal.message("/convert"),
            "Unknown error in /convert: task panicked"
        );
    }

    #[test]
    fn test_client_error_message() {
        assert_eq!(
            ServerError::NoFileUploaded.message("/convert"),
            "No file uploaded"
        );
    }
}
