//! LaTeX template discovery.

use std::path::Path;

/// Extensions recognized as LaTeX templates.
const TEMPLATE_EXTENSIONS: [&str; 2] = [".tex", ".latex"];

/// List template file names in `dir`, sorted.
///
/// Returns an empty list if the directory is missing or unreadable.
#[must_use]
pub fn list_templates(dir: &Path) -> Vec<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "Template directory not readable");
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| TEMPLATE_EXTENSIONS.iter().any(|ext| name.ends_with(ext)))
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lists_tex_and_latex_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["eisvogel.latex", "article.tex", "notes.md", "README", "b.tex.bak"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }

        assert_eq!(
            list_templates(dir.path()),
            vec!["article.tex".to_owned(), "eisvogel.latex".to_owned()]
        );
    }

    #[test]
    fn test_missing_dir_is_empty() {
        assert!(list_templates(Path::new("/nonexistent/mdconv/templates")).is_empty());
    }
}
