//! Tool diagnostics endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;

use crate::state::AppState;

/// Handle GET /debug/inspector.
pub(crate) async fn inspector(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, (StatusCode, String)> {
    let report = tokio::task::spawn_blocking(move || {
        mdconv_convert::inspect(state.converter.runner(), state.converter.tools())
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let text = report.to_string();
    Ok(Html(format!("<pre>{}</pre>", html_escape::encode_text(&text))))
}
