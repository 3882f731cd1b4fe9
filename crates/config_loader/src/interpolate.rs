//! Environment-variable interpolation for configuration files.
//!
//! Runs over the raw file contents before JSON parsing, so tokens may appear
//! anywhere - including outside string values.

use std::sync::OnceLock;

use regex::Regex;

static ENVVAR_PATTERN: OnceLock<Regex> = OnceLock::new();

fn envvar_pattern() -> &'static Regex {
    // Min 5 chars between the delimiters, uppercase, must start with a
    // letter; underscores and digits allowed after.
    ENVVAR_PATTERN.get_or_init(|| {
        Regex::new("%%[A-Z][A-Z0-9_]{4,}%%").expect("envvar pattern is valid")
    })
}

/// Replace `%%NAME%%` tokens with the value of the environment variable
/// `NAME`.
///
/// Tokens whose variable is unset, and substrings that do not match the
/// pattern exactly (wrong case, too short, digit-leading, single `%`), are
/// left untouched verbatim.
pub fn interpolate_env(contents: &str) -> String {
    let mut result = contents.to_string();
    for token in envvar_pattern().find_iter(contents) {
        let token = token.as_str();
        let name = &token[2..token.len() - 2];
        if let Ok(value) = std::env::var(name) {
            result = result.replace(token, &value);
        }
    }
    result
}
