//! Form upload endpoint.
//!
//! Handles `POST /convert` with a multipart body carrying the Markdown file
//! (`markdown_file`) plus optional `format` and `template` fields.

use std::sync::Arc;

use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::State;
use axum::response::Response;

use crate::error::{FormError, ServerError};
use crate::handlers::{ConversionRequest, run_conversion};
use crate::relay::Disposition;
use crate::state::AppState;

/// Handle POST /convert.
pub(crate) async fn convert_upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, FormError> {
    // A body that isn't multipart can't carry a file.
    let multipart = multipart.map_err(|_| ServerError::NoFileUploaded)?;
    let request = read_form(multipart).await?;
    let download = run_conversion(state, request).await?;
    Ok(download.into_attachment(Disposition::Extended))
}

/// Collect the form fields into a conversion request.
async fn read_form(mut multipart: Multipart) -> Result<ConversionRequest, ServerError> {
    let mut upload = None;
    let mut format = None;
    let mut template = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("markdown_file") => {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await.map_err(bad_form)?;
                upload = Some((filename, bytes.to_vec()));
            }
            Some("format") => format = Some(field.text().await.map_err(bad_form)?),
            Some("template") => template = Some(field.text().await.map_err(bad_form)?),
            _ => {}
        }
    }

    // Browsers send an empty filename when no file was chosen.
    let Some((filename, markdown)) = upload.filter(|(filename, _)| !filename.is_empty()) else {
        return Err(ServerError::NoFileUploaded);
    };

    Ok(ConversionRequest {
        markdown,
        filename,
        format: format.unwrap_or_else(|| "pdf".to_owned()),
        template,
    })
}

fn bad_form(err: MultipartError) -> ServerError {
    ServerError::BadRequest(err.body_text())
}
