//! Environment key formatting

use crate::ExportError;
use regex::Regex;
use std::sync::LazyLock;

/// Every run of characters that cannot appear in an environment key
#[allow(clippy::expect_used)]
static INVALID_KEY_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_]+").expect("static pattern is valid"));

/// Derive an environment variable name from a vault title.
///
/// Spaces become underscores, everything outside `[A-Za-z0-9_]` is dropped,
/// and the result is uppercased.
///
/// # Errors
///
/// Returns [`ExportError::EmptyKey`] when nothing is left after stripping,
/// e.g. for `"---"` or `""`.
pub fn format_key(title: &str) -> Result<String, ExportError> {
    let spaced = title.replace(' ', "_");
    let key = INVALID_KEY_CHARS.replace_all(&spaced, "").to_uppercase();

    if key.is_empty() {
        return Err(ExportError::EmptyKey {
            title: title.to_string(),
        });
    }

    Ok(key)
}
