//! Dotenv rendering

use crate::EnvironmentMap;
use std::io::{self, Write};

/// Escape a value for a double-quoted dotenv line.
///
/// Newlines become the two characters `\n` and double quotes become `\"`.
/// Nothing else is touched.
#[must_use]
pub fn escape_value(value: &str) -> String {
    value.replace('\n', "\\n").replace('"', "\\\"")
}

/// Write every entry as a `KEY="value"` line.
///
/// Line order follows map iteration and is not stable between runs.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_dotenv<W: Write>(env: &EnvironmentMap, mut writer: W) -> io::Result<()> {
    for (key, value) in env.iter() {
        writeln!(writer, "{key}=\"{}\"", escape_value(value))?;
    }
    writer.flush()
}

/// Render the map as dotenv text.
#[must_use]
pub fn to_dotenv_string(env: &EnvironmentMap) -> String {
    env.iter()
        .map(|(key, value)| format!("{key}=\"{}\"\n", escape_value(value)))
        .collect()
}
