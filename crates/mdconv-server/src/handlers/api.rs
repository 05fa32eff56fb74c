//! JSON conversion endpoint.
//!
//! Handles `POST /api/convert` with a body like
//! `{"markdown": "# Hi", "filename": "notes.md", "format": "docx"}`.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Response;
use serde::Deserialize;

use crate::error::{ApiError, ServerError};
use crate::handlers::{ConversionRequest, run_conversion};
use crate::relay::Disposition;
use crate::state::AppState;

/// Filename assumed when the client sends none.
const DEFAULT_FILENAME: &str = "imported";

/// Body of POST /api/convert.
#[derive(Debug, Deserialize)]
struct ApiConvertRequest {
    markdown: Option<String>,
    filename: Option<String>,
    format: Option<String>,
    template: Option<String>,
}

impl ApiConvertRequest {
    fn into_conversion(self) -> Result<ConversionRequest, ServerError> {
        let markdown = self.markdown.ok_or(ServerError::NoMarkdown)?;
        Ok(ConversionRequest {
            markdown: markdown.into_bytes(),
            filename: self
                .filename
                .unwrap_or_else(|| DEFAULT_FILENAME.to_owned()),
            format: self.format.unwrap_or_else(|| "pdf".to_owned()),
            template: self.template,
        })
    }
}

/// Handle POST /api/convert.
pub(crate) async fn convert_json(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = parse_body(&body)?;
    let download = run_conversion(state, request).await?;
    Ok(download.into_attachment(Disposition::Plain))
}

fn parse_body(body: &[u8]) -> Result<ConversionRequest, ServerError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ServerError::NoMarkdown);
    }
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| ServerError::BadRequest(e.to_string()))?;
    // `null`, arrays and scalars carry no `markdown` key.
    if !value.is_object() {
        return Err(ServerError::NoMarkdown);
    }
    let parsed: ApiConvertRequest =
        serde_json::from_value(value).map_err(|e| ServerError::BadRequest(e.to_string()))?;
    parsed.into_conversion()
}
