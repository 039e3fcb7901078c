//! Child-process environment rendering

use crate::EnvironmentMap;
use std::collections::HashMap;

/// Render every entry as a `KEY=value` string. Values are not escaped.
#[must_use]
pub fn env_pairs(env: &EnvironmentMap) -> Vec<String> {
    env.iter().map(|(key, value)| format!("{key}={value}")).collect()
}

/// Build a child environment: the inherited variables first, then the
/// exported ones appended after them.
///
/// An exported key can appear twice in the result when it shadows an
/// inherited variable; pass the list through [`dedupe_last_wins`] before
/// handing it to a process launcher.
#[must_use]
pub fn child_environment<I>(inherited: I, env: &EnvironmentMap) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut entries: Vec<String> = inherited
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    entries.extend(env_pairs(env));
    entries
}

/// Collapse repeated names so that the last occurrence's value wins.
///
/// Each name keeps the position of its first occurrence. Entries without
/// `=` are treated as a name with an empty value; the split happens at the
/// first `=` so values may contain `=`.
#[must_use]
pub fn dedupe_last_wins(entries: Vec<String>) -> Vec<(String, String)> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut result: Vec<(String, String)> = Vec::with_capacity(entries.len());

    for entry in entries {
        let (key, value) = match entry.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (entry, String::new()),
        };

        if let Some(&index) = positions.get(&key) {
            result[index].1 = value;
        } else {
            positions.insert(key.clone(), result.len());
            result.push((key, value));
        }
    }

    result
}
