//!
//! Utility functions shared across the crate.
//!
//! This module provides:
//! - [`replace_handlebars_with_env`] - Template substitution for environment variables
//!

use {
    regex::{Captures, Regex},
    std::{env, sync::LazyLock},
};

/// Regular expression pattern for matching handlebars-style environment variable references.
/// Matches patterns like `{{ VAR_NAME }}` with optional whitespace around the variable name.
/// Variable names must be uppercase letters, digits, or underscores (standard env var naming).
static HANDLEBAR_REGEXP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Z0-9_]+)\s*\}\}").unwrap());

/// Replaces handlebars-style placeholders with environment variable values.
///
/// Searches through the input string for patterns like `{{ VAR_NAME }}` and replaces
/// them with the corresponding environment variable value. Variable names are
/// case-sensitive and must consist of uppercase letters, digits, or underscores.
///
/// Whitespace around the variable name is allowed: `{{VAR}}`, `{{ VAR }}`, and
/// `{{  VAR  }}` are all valid and equivalent.
///
/// If an environment variable is not set, the placeholder is replaced with an
/// empty string. This keeps deploy-specific values (like the document root)
/// out of the TOML files themselves.
///
/// # Examples
///
/// ```
/// use axum_preencoded::replace_handlebars_with_env;
///
/// let template = "doc_root = \"{{ HOME }}/www\"";
/// let result = replace_handlebars_with_env(template);
/// assert!(result.starts_with("doc_root = \""));
///
/// // Missing variables become empty strings
/// let result = replace_handlebars_with_env("root: {{ MISSING_VAR }}");
/// assert_eq!(result, "root: ");
/// ```
pub fn replace_handlebars_with_env(input: &str) -> String {
    HANDLEBAR_REGEXP
        .replace_all(input, |caps: &Captures| {
            env::var(&caps[1]).unwrap_or_default()
        })
        .to_string()
}
