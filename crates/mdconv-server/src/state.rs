//! Application state.
//!
//! Shared state for all request handlers.

use mdconv_convert::{Converter, FormatResolver};

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Builds conversion plans from request parameters.
    pub(crate) resolver: FormatResolver,
    /// Runs the external tools.
    pub(crate) converter: Converter,
}
