//! Download responses.
//!
//! Wraps converted bytes in a response with the format's MIME type and an
//! attachment `Content-Disposition`.

use axum::http::header;
use axum::response::{IntoResponse, Response};
use mdconv_convert::OutputFormat;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left unescaped in `filename*` (unreserved URL characters plus `/`).
const FILENAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// `Content-Disposition` flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Disposition {
    /// `filename` only.
    Plain,
    /// `filename` plus RFC 5987 `filename*` for non-ASCII-safe delivery.
    Extended,
}

/// A converted document ready to send.
#[derive(Debug)]
pub(crate) struct Download {
    pub(crate) bytes: Vec<u8>,
    pub(crate) filename: String,
    pub(crate) format: OutputFormat,
}

impl Download {
    /// Build the attachment response.
    pub(crate) fn into_attachment(self, disposition: Disposition) -> Response {
        tracing::info!(
            filename = %self.filename,
            content_type = self.format.mime_type(),
            bytes = self.bytes.len(),
            "Sending converted document"
        );
        (
            [
                (header::CONTENT_TYPE, self.format.mime_type().to_owned()),
                (
                    header::CONTENT_DISPOSITION,
                    content_disposition(&self.filename, disposition),
                ),
            ],
            self.bytes,
        )
            .into_response()
    }
}

/// `Content-Disposition` header value for an attachment.
pub(crate) fn content_disposition(filename: &str, disposition: Disposition) -> String {
    match disposition {
        Disposition::Plain => format!("attachment; filename=\"{filename}\""),
        Disposition::Extended => {
            let encoded = utf8_percent_encode(filename, FILENAME_ENCODE_SET);
            format!("attachment; filename=\"{filename}\"; filename*=UTF-8''{encoded}")
        }
    }
}
