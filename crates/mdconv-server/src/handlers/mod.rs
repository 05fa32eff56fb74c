//! HTTP request handlers.

pub(crate) mod api;
pub(crate) mod convert;
pub(crate) mod index;
pub(crate) mod inspector;

use std::sync::Arc;

use crate::error::ServerError;
use crate::relay::Download;
use crate::state::AppState;

/// Parameters shared by both conversion routes.
#[derive(Debug)]
pub(crate) struct ConversionRequest {
    pub(crate) markdown: Vec<u8>,
    pub(crate) filename: String,
    pub(crate) format: String,
    pub(crate) template: Option<String>,
}

/// Resolve and convert on the blocking pool, returning the finished bytes.
///
/// The staging directory is gone by the time this returns.
pub(crate) async fn run_conversion(
    state: Arc<AppState>,
    request: ConversionRequest,
) -> Result<Download, ServerError> {
    tracing::info!(
        filename = %request.filename,
        format = %request.format,
        template = ?request.template,
        "Conversion requested"
    );

    let task = tokio::task::spawn_blocking(move || {
        let plan = state.resolver.resolve(
            &request.format,
            &request.filename,
            request.template.as_deref(),
        );
        let document = state.converter.convert(&request.markdown, &plan)?;
        Ok::<_, ServerError>(Download {
            bytes: document.read().map_err(mdconv_convert::ConvertError::from)?,
            filename: document.filename().to_owned(),
            format: document.format(),
        })
    });

    task.await
        .map_err(|e| ServerError::Internal(e.to_string()))?
}
