//! Vault data model and the exported environment
//!
//! - [`VaultOverview`], [`ItemOverview`], [`Item`], [`ItemField`]: what a
//!   vault service hands back, deserializable from its JSON
//! - [`SecureSecret`]: a value that zeroes its memory on drop and never
//!   prints itself
//! - [`EnvironmentMap`]: the flattened key/value result of an export

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A vault as it appears in the service's directory listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VaultOverview {
    /// Canonical vault identifier
    pub id: String,
    /// Display title
    pub title: String,
}

impl VaultOverview {
    /// Create a new vault overview
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// An item summary from a vault listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemOverview {
    /// Item identifier, unique within its vault
    pub id: String,
    /// Display title
    #[serde(default)]
    pub title: String,
}

impl ItemOverview {
    /// Create a new item overview
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// A full item with notes and fields
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Item identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Free-form notes (may be empty)
    #[serde(default)]
    pub notes: String,
    /// Labeled fields in the order the service returns them
    #[serde(default)]
    pub fields: Vec<ItemField>,
}

impl Item {
    /// Create an item without notes or fields
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            notes: String::new(),
            fields: Vec::new(),
        }
    }

    /// Set the item notes
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Append a field
    #[must_use]
    pub fn with_field(mut self, title: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(ItemField::new(title, value));
        self
    }
}

impl std::fmt::Debug for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Item")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("has_notes", &!self.notes.is_empty())
            .field("fields", &self.fields)
            .finish()
    }
}

/// A single labeled value within an item
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemField {
    /// Field identifier, if the service provides one
    #[serde(default)]
    pub id: String,
    /// Field label
    pub title: String,
    /// Field value (may be empty)
    #[serde(default)]
    pub value: String,
}

impl ItemField {
    /// Create a new field
    #[must_use]
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Debug for ItemField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemField")
            .field("title", &self.title)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// A secret value with automatic memory zeroing on drop.
///
/// `Debug` and `Display` show `[REDACTED]`; call [`expose`](Self::expose)
/// to read the value.
#[derive(Clone)]
pub struct SecureSecret {
    inner: SecretString,
}

impl SecureSecret {
    /// Move a string into secure storage.
    #[must_use]
    pub fn new(value: String) -> Self {
        Self {
            inner: SecretString::from(value),
        }
    }

    /// Expose the secret value for use.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.inner.expose_secret()
    }

    /// Length of the value without exposing it.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.expose_secret().len()
    }

    /// Check if the value is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.expose_secret().is_empty()
    }
}

impl std::fmt::Debug for SecureSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl std::fmt::Display for SecureSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Flattened environment produced by an export.
///
/// Keys are unique; a later insert under an existing key replaces the
/// earlier value. Iteration order is unspecified.
#[derive(Debug, Default, Clone)]
pub struct EnvironmentMap {
    vars: HashMap<String, SecureSecret>,
}

impl EnvironmentMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, returning `true` if an earlier value was replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        self.vars
            .insert(key.into(), SecureSecret::new(value.into()))
            .is_some()
    }

    /// Look up a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SecureSecret> {
        self.vars.get(key)
    }

    /// Check whether a key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Check if the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate over key names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    /// Iterate over `(key, value)` pairs with the values exposed.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.expose()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvironmentMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}
