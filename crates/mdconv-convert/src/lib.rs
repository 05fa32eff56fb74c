//! Markdown conversion through external tools.
//!
//! This crate holds everything mdconv does besides HTTP:
//!
//! - [`FormatResolver`] turns request parameters into a [`ConversionPlan`]
//! - [`Converter`] stages the input and runs pandoc (and ImageMagick for PNG)
//! - [`ToolRunner`] abstracts process invocation so tests can script tools
//! - [`list_templates`] and [`inspect`] back the index page and diagnostics
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mdconv_convert::{Converter, FormatResolver, ProcessRunner, ToolSettings};
//!
//! let resolver = FormatResolver::new("xelatex", "/app/latex_templates");
//! let converter = Converter::new(
//!     Arc::new(ProcessRunner),
//!     ToolSettings::default(),
//!     std::env::temp_dir(),
//! );
//!
//! let plan = resolver.resolve("png", "Report (final).md", None);
//! let doc = converter.convert(b"# Report", &plan)?;
//! let bytes = doc.read()?;
//! ```
//!
//! # Mock Runner
//!
//! [`MockToolRunner`] (behind the `mock` feature) scripts per-program
//! outcomes and records every invocation.

mod diagnostics;
mod error;
mod format;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod pipeline;
mod templates;
mod tool;

pub use diagnostics::{DiagnosticsReport, ProbeOutcome, ToolStatus, inspect};
pub use error::{ConvertError, Stage};
pub use format::{ConversionPlan, FormatResolver, OutputFormat, sanitize_stem};
#[cfg(any(test, feature = "mock"))]
pub use mock::{Invocation, MockToolRunner};
pub use pipeline::{ConvertedDocument, Converter, RasterCommand, ToolSettings};
pub use templates::list_templates;
pub use tool::{ProcessRunner, ToolError, ToolOutput, ToolRunner};
