//! `${VAR}` expansion for `mdconv.toml` values.
//!
//! Container deployments point tool names and directories at environment
//! variables (`pandoc = "${PANDOC_BIN:-pandoc}"`). Expansion runs before
//! relative paths are resolved, so an expanded relative path still resolves
//! against the config file's directory.
//!
//! Errors name the TOML field, e.g. `tools.raster[1][0]`, so a failing
//! deployment points at the line to fix.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` in one value.
///
/// Bare `$VAR` is left alone: pandoc options may legitimately contain it.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var)
            .map(Some)
            .map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Expand an optional field in place.
pub(crate) fn expand_opt(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    if let Some(raw) = value.as_deref() {
        *value = Some(expand_env(raw, field)?);
    }
    Ok(())
}

/// Expand every element of the raster command lists in place.
pub(crate) fn expand_commands(
    commands: &mut [Vec<String>],
    field: &str,
) -> Result<(), ConfigError> {
    for (i, command) in commands.iter_mut().enumerate() {
        for (j, part) in command.iter_mut().enumerate() {
            *part = expand_env(part, &format!("{field}[{i}][{j}]"))?;
        }
    }
    Ok(())
}

/// Name of a variable that was referenced but not set.
struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_simple_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MDCONV_EXPAND_SIMPLE", "pandoc-3");
        }
        let result = expand_env("${MDCONV_EXPAND_SIMPLE}", "tools.pandoc").unwrap();
        assert_eq!(result, "pandoc-3");
        unsafe {
            std::env::remove_var("MDCONV_EXPAND_SIMPLE");
        }
    }

    #[test]
    fn test_expand_default_used_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MDCONV_EXPAND_UNSET");
        }
        let result = expand_env("${MDCONV_EXPAND_UNSET:-xelatex}", "tools.pdf_engine").unwrap();
        assert_eq!(result, "xelatex");
    }

    #[test]
    fn test_expand_embedded_in_path() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MDCONV_EXPAND_ROOT", "/srv");
        }
        let result = expand_env("${MDCONV_EXPAND_ROOT}/templates", "paths.template_dir").unwrap();
        assert_eq!(result, "/srv/templates");
        unsafe {
            std::env::remove_var("MDCONV_EXPAND_ROOT");
        }
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MDCONV_EXPAND_MISSING");
        }
        let err = expand_env("${MDCONV_EXPAND_MISSING}", "server.host").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MDCONV_EXPAND_MISSING"));
        assert!(err.to_string().contains("server.host"));
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        let result = expand_env("$HOME/templates", "paths.template_dir").unwrap();
        assert_eq!(result, "$HOME/templates");
    }

    #[test]
    fn test_expand_commands() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MDCONV_EXPAND_MAGICK", "/opt/im/bin/magick");
        }
        let mut commands = vec![
            vec!["convert".to_owned()],
            vec!["${MDCONV_EXPAND_MAGICK}".to_owned(), "convert".to_owned()],
        ];
        expand_commands(&mut commands, "tools.raster").unwrap();
        assert_eq!(commands[0], vec!["convert"]);
        assert_eq!(commands[1], vec!["/opt/im/bin/magick", "convert"]);
        unsafe {
            std::env::remove_var("MDCONV_EXPAND_MAGICK");
        }
    }

    #[test]
    fn test_expand_commands_error_names_element() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MDCONV_EXPAND_NO_RASTER");
        }
        let mut commands = vec![
            vec!["convert".to_owned()],
            vec!["magick".to_owned(), "${MDCONV_EXPAND_NO_RASTER}".to_owned()],
        ];
        let err = expand_commands(&mut commands, "tools.raster").unwrap_err();
        assert!(err.to_string().contains("tools.raster[1][1]"));
    }

    #[test]
    fn test_expand_opt_none_stays_none() {
        let mut value = None;
        expand_opt(&mut value, "paths.staging_dir").unwrap();
        assert!(value.is_none());
    }
}
