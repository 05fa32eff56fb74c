//! Output format resolution.
//!
//! Turns the loosely-typed request parameters (format string, client
//! filename, template name) into a [`ConversionPlan`]: the effective format,
//! the primary tool options, and a filesystem-safe output filename.
//!
//! Resolution never fails. Unknown formats fall back to PDF and unsafe
//! filename characters are replaced.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

/// Timestamp prefix format for output filenames.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Pdf,
    Png,
    Docx,
    Epub,
    Html,
    Odt,
    Latex,
    Rst,
}

impl OutputFormat {
    /// All formats, in the order offered to clients.
    pub const ALL: [Self; 8] = [
        Self::Pdf,
        Self::Png,
        Self::Docx,
        Self::Epub,
        Self::Html,
        Self::Odt,
        Self::Latex,
        Self::Rst,
    ];

    /// Parse a client-supplied format name.
    ///
    /// Matching is case-insensitive. Anything unrecognized maps to [`OutputFormat::Pdf`].
    #[must_use]
    pub fn from_requested(requested: &str) -> Self {
        match requested.to_ascii_lowercase().as_str() {
            "png" => Self::Png,
            "docx" => Self::Docx,
            "epub" => Self::Epub,
            "html" => Self::Html,
            "odt" => Self::Odt,
            "latex" => Self::Latex,
            "rst" => Self::Rst,
            _ => Self::Pdf,
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Png => "png",
            Self::Docx => "docx",
            Self::Epub => "epub",
            Self::Html => "html",
            Self::Odt => "odt",
            Self::Latex => "latex",
            Self::Rst => "rst",
        }
    }

    /// Extension of the file the primary tool writes.
    ///
    /// PNG is rasterized from a PDF intermediate, so its primary output is `pdf`.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "pdf",
            other => other.as_str(),
        }
    }

    /// MIME type of the final document.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Epub => "application/epub+zip",
            Self::Html => "text/html",
            Self::Odt => "application/vnd.oasis.opendocument.text",
            Self::Latex | Self::Rst => "text/plain",
            Self::Pdf => "application/pdf",
        }
    }

    /// Whether the primary tool renders through a PDF engine.
    #[must_use]
    pub fn uses_pdf_engine(self) -> bool {
        matches!(self, Self::Pdf | Self::Png)
    }

    /// Whether a LaTeX template applies to this format.
    #[must_use]
    pub fn accepts_template(self) -> bool {
        matches!(self, Self::Pdf | Self::Latex)
    }

    /// Whether the primary output is rasterized afterwards.
    #[must_use]
    pub fn is_raster(self) -> bool {
        self == Self::Png
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the pipeline needs to run one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionPlan {
    /// Effective format, used for tool selection and MIME type.
    pub format: OutputFormat,
    /// Extension of the primary tool's output file.
    pub extension: &'static str,
    /// `YYYYMMDD_HHMMSS_<sanitized stem>.<extension>`.
    pub output_filename: String,
    /// Primary tool options, in order.
    pub tool_options: Vec<String>,
    /// Template file passed via `--template`, if any.
    pub template: Option<PathBuf>,
}

impl ConversionPlan {
    /// Template arguments for the primary tool (empty when no template applies).
    #[must_use]
    pub fn template_option(&self) -> Vec<OsString> {
        self.template
            .as_ref()
            .map(|path| vec![OsString::from("--template"), path.as_os_str().to_owned()])
            .unwrap_or_default()
    }

    /// Full argument list for the primary tool.
    #[must_use]
    pub fn primary_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args = vec![
            input.as_os_str().to_owned(),
            OsString::from("-o"),
            output.as_os_str().to_owned(),
        ];
        args.extend(self.tool_options.iter().map(OsString::from));
        args.extend(self.template_option());
        args
    }

    /// Name of the file delivered to the client.
    ///
    /// Same as `output_filename` except for PNG, where the PDF intermediate's
    /// extension is swapped for `png`.
    #[must_use]
    pub fn final_filename(&self) -> String {
        if !self.format.is_raster() {
            return self.output_filename.clone();
        }
        let stem = self
            .output_filename
            .rsplit_once('.')
            .map_or(self.output_filename.as_str(), |(stem, _)| stem);
        format!("{stem}.png")
    }
}

/// Builds [`ConversionPlan`]s from request parameters.
#[derive(Debug, Clone)]
pub struct FormatResolver {
    pdf_engine: String,
    template_dir: PathBuf,
}

impl Default for FormatResolver {
    fn default() -> Self {
        Self::new("xelatex", "/app/latex_templates")
    }
}

impl FormatResolver {
    /// Create a resolver.
    ///
    /// * `pdf_engine` - engine passed as `--pdf-engine` for PDF and PNG output
    /// * `template_dir` - directory template names are resolved against
    pub fn new(pdf_engine: impl Into<String>, template_dir: impl Into<PathBuf>) -> Self {
        Self {
            pdf_engine: pdf_engine.into(),
            template_dir: template_dir.into(),
        }
    }

    /// Directory template names are resolved against.
    #[must_use]
    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    /// Resolve a plan stamped with the current local time.
    #[must_use]
    pub fn resolve(
        &self,
        requested_format: &str,
        original_filename: &str,
        template: Option<&str>,
    ) -> ConversionPlan {
        self.resolve_at(
            requested_format,
            original_filename,
            template,
            Local::now().naive_local(),
        )
    }

    /// Resolve a plan stamped with `now`.
    #[must_use]
    pub fn resolve_at(
        &self,
        requested_format: &str,
        original_filename: &str,
        template: Option<&str>,
        now: NaiveDateTime,
    ) -> ConversionPlan {
        let format = OutputFormat::from_requested(requested_format);
        let extension = format.extension();

        let tool_options = if format.uses_pdf_engine() {
            vec![format!("--pdf-engine={}", self.pdf_engine)]
        } else {
            Vec::new()
        };

        let output_filename = format!(
            "{}_{}.{extension}",
            now.format(TIMESTAMP_FORMAT),
            sanitize_stem(original_filename)
        );

        // Template names are joined as given; callers are trusted to pick from the listing.
        let template = template
            .filter(|name| !name.is_empty() && format.accepts_template())
            .map(|name| self.template_dir.join(name));

        tracing::debug!(
            requested = requested_format,
            format = %format,
            output_filename = %output_filename,
            template = ?template,
            "Resolved conversion plan"
        );

        ConversionPlan {
            format,
            extension,
            output_filename,
            tool_options,
            template,
        }
    }
}

/// Filesystem-safe stem of a client filename.
///
/// Drops the last extension, then replaces every character outside
/// `[A-Za-z0-9_.-]` with `_`.
#[must_use]
pub fn sanitize_stem(filename: &str) -> String {
    let stem = filename.rsplit_once('.').map_or(filename, |(stem, _)| stem);
    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap()
    }

    fn resolver() -> FormatResolver {
        FormatResolver::new("xelatex", "/app/latex_templates")
    }

    #[test]
    fn test_passthrough_formats_any_case() {
        for (input, expected) in [
            ("docx", OutputFormat::Docx),
            ("EPUB", OutputFormat::Epub),
            ("Html", OutputFormat::Html),
            ("odt", OutputFormat::Odt),
            ("LaTeX", OutputFormat::Latex),
            ("rSt", OutputFormat::Rst),
        ] {
            let plan = resolver().resolve_at(input, "doc.md", None, fixed_now());
            assert_eq!(plan.format, expected, "format for {input}");
            assert_eq!(plan.extension, expected.as_str());
            assert!(plan.tool_options.is_empty(), "options for {input}");
        }
    }

    #[test]
    fn test_pdf_uses_engine() {
        let plan = resolver().resolve_at("PDF", "doc.md", None, fixed_now());
        assert_eq!(plan.format, OutputFormat::Pdf);
        assert_eq!(plan.extension, "pdf");
        assert_eq!(plan.tool_options, vec!["--pdf-engine=xelatex".to_owned()]);
    }

    #[test]
    fn test_png_renders_pdf_intermediate() {
        let plan = resolver().resolve_at("png", "doc.md", None, fixed_now());
        assert_eq!(plan.format, OutputFormat::Png);
        assert_eq!(plan.extension, "pdf");
        assert_eq!(plan.tool_options, vec!["--pdf-engine=xelatex".to_owned()]);
        assert_eq!(plan.output_filename, "20240309_140507_doc.pdf");
        assert_eq!(plan.final_filename(), "20240309_140507_doc.png");
    }

    #[test]
    fn test_unknown_format_falls_back_to_pdf() {
        for input in ["", "pptx", "markdown", "p df"] {
            let plan = resolver().resolve_at(input, "doc.md", None, fixed_now());
            assert_eq!(plan.format, OutputFormat::Pdf, "format for {input:?}");
            assert_eq!(plan.extension, "pdf");
            assert_eq!(plan.tool_options, vec!["--pdf-engine=xelatex".to_owned()]);
        }
    }

    #[test]
    fn test_custom_pdf_engine() {
        let resolver = FormatResolver::new("lualatex", "/tpl");
        let plan = resolver.resolve_at("pdf", "doc.md", None, fixed_now());
        assert_eq!(plan.tool_options, vec!["--pdf-engine=lualatex".to_owned()]);
    }

    #[test]
    fn test_output_filename_report_example() {
        let plan = resolver().resolve_at("png", "Report (final).md", None, fixed_now());
        assert_eq!(plan.final_filename(), "20240309_140507_Report__final_.png");
    }

    #[test]
    fn test_output_filename_keeps_inner_dots() {
        let plan = resolver().resolve_at("html", "v1.2-notes.md", None, fixed_now());
        assert_eq!(plan.output_filename, "20240309_140507_v1.2-notes.html");
    }

    #[test]
    fn test_sanitize_stem_without_extension() {
        assert_eq!(sanitize_stem("imported"), "imported");
        assert_eq!(sanitize_stem(""), "");
    }

    #[test]
    fn test_sanitize_stem_path_separators() {
        assert_eq!(sanitize_stem("../../etc/passwd.md"), ".._.._etc_passwd");
        assert_eq!(sanitize_stem("C:\\docs\\notes.md"), "C__docs_notes");
    }

    #[test]
    fn test_sanitize_stem_only_safe_characters() {
        for name in [
            "Über Änderungen.md",
            "a b\tc.md",
            "résumé—final.markdown",
            "«quoted» “text”.md",
            "emoji 🎉.md",
            "semi;colon|pipe*star?.md",
        ] {
            let stem = sanitize_stem(name);
            assert!(
                stem.chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')),
                "unsafe stem {stem:?} for {name:?}"
            );
        }
    }

    #[test]
    fn test_sanitize_stem_one_underscore_per_char() {
        assert_eq!(sanitize_stem("Über.md"), "_ber");
    }

    #[test]
    fn test_template_added_for_pdf_and_latex() {
        for format in ["pdf", "latex"] {
            let plan = resolver().resolve_at(format, "doc.md", Some("eisvogel.tex"), fixed_now());
            assert_eq!(
                plan.template,
                Some(PathBuf::from("/app/latex_templates/eisvogel.tex"))
            );
            assert_eq!(
                plan.template_option(),
                vec![
                    OsString::from("--template"),
                    OsString::from("/app/latex_templates/eisvogel.tex")
                ]
            );
        }
    }

    #[test]
    fn test_template_added_for_unknown_format_fallback() {
        let plan = resolver().resolve_at("weird", "doc.md", Some("a.tex"), fixed_now());
        assert!(plan.template.is_some());
    }

    #[test]
    fn test_template_ignored_for_other_formats() {
        for format in ["png", "docx", "epub", "html", "odt", "rst"] {
            let plan = resolver().resolve_at(format, "doc.md", Some("eisvogel.tex"), fixed_now());
            assert!(plan.template.is_none(), "template for {format}");
            assert!(plan.template_option().is_empty());
        }
    }

    #[test]
    fn test_empty_template_ignored() {
        let plan = resolver().resolve_at("pdf", "doc.md", Some(""), fixed_now());
        assert!(plan.template.is_none());
    }

    #[test]
    fn test_primary_args_order() {
        let plan = resolver().resolve_at("pdf", "doc.md", Some("t.tex"), fixed_now());
        let args = plan.primary_args(Path::new("/s/input.md"), Path::new("/s/out.pdf"));
        assert_eq!(
            args,
            vec![
                OsString::from("/s/input.md"),
                OsString::from("-o"),
                OsString::from("/s/out.pdf"),
                OsString::from("--pdf-engine=xelatex"),
                OsString::from("--template"),
                OsString::from("/app/latex_templates/t.tex"),
            ]
        );
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(OutputFormat::Png.mime_type(), "image/png");
        assert_eq!(
            OutputFormat::Docx.mime_type(),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert_eq!(OutputFormat::Epub.mime_type(), "application/epub+zip");
        assert_eq!(OutputFormat::Html.mime_type(), "text/html");
        assert_eq!(
            OutputFormat::Odt.mime_type(),
            "application/vnd.oasis.opendocument.text"
        );
        assert_eq!(OutputFormat::Latex.mime_type(), "text/plain");
        assert_eq!(OutputFormat::Rst.mime_type(), "text/plain");
        assert_eq!(OutputFormat::Pdf.mime_type(), "application/pdf");
        assert_eq!(
            OutputFormat::from_requested("unknown").mime_type(),
            "application/pdf"
        );
    }
}
