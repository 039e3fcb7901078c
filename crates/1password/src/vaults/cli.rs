//! `op` CLI access and JSON mapping
//!
//! The CLI's JSON differs from the SDK's: vaults have a `name` instead of a
//! `title`, and item notes are an ordinary field whose purpose is `NOTES`.

use openv_secrets::{ExportError, Item, ItemField, ItemOverview, VaultOverview};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use tokio::process::Command;

/// Token variable read by the `op` CLI
pub const TOKEN_ENV: &str = "OP_SERVICE_ACCOUNT_TOKEN";

#[derive(Debug, Deserialize)]
struct CliVault {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct CliItemSummary {
    id: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct CliItem {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    fields: Vec<CliField>,
}

#[derive(Deserialize)]
struct CliField {
    #[serde(default)]
    id: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    purpose: Option<String>,
    #[serde(default)]
    value: Value,
}

impl std::fmt::Debug for CliField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliField")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("purpose", &self.purpose)
            .finish_non_exhaustive()
    }
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

impl From<CliVault> for VaultOverview {
    fn from(vault: CliVault) -> Self {
        Self::new(vault.id, vault.name)
    }
}

impl From<CliItemSummary> for ItemOverview {
    fn from(item: CliItemSummary) -> Self {
        Self::new(item.id, item.title)
    }
}

impl From<CliItem> for Item {
    fn from(item: CliItem) -> Self {
        let mut result = Self::new(item.id, item.title);
        for field in item.fields {
            if field.purpose.as_deref() == Some("NOTES") {
                result.notes = value_to_string(field.value);
            } else {
                result.fields.push(ItemField {
                    id: field.id,
                    title: field.label,
                    value: value_to_string(field.value),
                });
            }
        }
        result
    }
}

/// Runs `op` subcommands with the service account token in their environment
pub struct OpCli<'a> {
    program: &'a Path,
    token: &'a SecretString,
}

impl<'a> OpCli<'a> {
    pub const fn new(program: &'a Path, token: &'a SecretString) -> Self {
        Self { program, token }
    }

    pub async fn list_vaults(&self) -> Result<Vec<VaultOverview>, ExportError> {
        let vaults: Vec<CliVault> = self.run_json(&["vault", "list", "--format", "json"]).await?;
        Ok(vaults.into_iter().map(Into::into).collect())
    }

    pub async fn list_items(&self, vault_id: &str) -> Result<Vec<ItemOverview>, ExportError> {
        let items: Vec<CliItemSummary> = self
            .run_json(&["item", "list", "--vault", vault_id, "--format", "json"])
            .await?;
        Ok(items.into_iter().map(Into::into).collect())
    }

    pub async fn get_item(&self, vault_id: &str, item_id: &str) -> Result<Item, ExportError> {
        let item: CliItem = self
            .run_json(&["item", "get", item_id, "--vault", vault_id, "--format", "json"])
            .await?;
        Ok(item.into())
    }

    async fn run_json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T, ExportError> {
        tracing::trace!(program = %self.program.display(), ?args, "Running op CLI");

        let output = Command::new(self.program)
            .args(args)
            .env(TOKEN_ENV, self.token.expose_secret())
            .output()
            .await
            .map_err(|e| {
                ExportError::provider("onepassword", format!("Failed to execute op CLI: {e}"))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExportError::provider(
                "onepassword",
                format!("op CLI failed: {}", stderr.trim()),
            ));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| {
            ExportError::provider("onepassword", format!("Failed to parse op CLI output: {e}"))
        })
    }
}
