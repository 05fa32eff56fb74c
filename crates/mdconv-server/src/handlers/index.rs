//! Upload form page.
//!
//! Serves `GET /` with a plain HTML form posting to `/convert`. The template
//! dropdown lists the LaTeX templates found in the configured directory.

use std::fmt::Write;
use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use mdconv_convert::{OutputFormat, list_templates};

use crate::state::AppState;

/// Handle GET /.
pub(crate) async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let templates = list_templates(state.resolver.template_dir());
    Html(render_index(&templates))
}

/// Render the upload form.
fn render_index(templates: &[String]) -> String {
    let mut html = String::with_capacity(2048);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>Markdown Converter</title>\n");
    html.push_str("<style>\n");
    html.push_str("body { font-family: sans-serif; max-width: 32rem; margin: 3rem auto; }\n");
    html.push_str("label { display: block; margin-top: 1rem; }\n");
    html.push_str("button { margin-top: 1.5rem; }\n");
    html.push_str("</style>\n</head>\n<body>\n");
    html.push_str("<h1>Markdown Converter</h1>\n");
    html.push_str(
        "<form action=\"/convert\" method=\"post\" enctype=\"multipart/form-data\">\n",
    );

    html.push_str("<label>Markdown file\n");
    html.push_str(
        "<input type=\"file\" name=\"markdown_file\" accept=\".md,.markdown,text/markdown\" required>\n",
    );
    html.push_str("</label>\n");

    html.push_str("<label>Format\n<select name=\"format\">\n");
    for format in OutputFormat::ALL {
        let name = format.as_str();
        let _ = writeln!(
            html,
            "<option value=\"{name}\">{}</option>",
            name.to_ascii_uppercase()
        );
    }
    html.push_str("</select>\n</label>\n");

    html.push_str("<label>LaTeX template (PDF and LaTeX only)\n<select name=\"template\">\n");
    html.push_str("<option value=\"\">Default</option>\n");
    for template in templates {
        let name = html_escape::encode_double_quoted_attribute(template);
        let _ = writeln!(html, "<option value=\"{name}\">{name}</option>");
    }
    html.push_str("</select>\n</label>\n");

    html.push_str("<button type=\"submit\">Convert</button>\n");
    html.push_str("</form>\n</body>\n</html>\n");
    html
}
