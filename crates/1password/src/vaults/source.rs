//! 1Password vault data source with auto-negotiated mode (WASM SDK or `op` CLI)

use super::cli::OpCli;
use super::core::SharedCore;
use super::wasm;
use async_trait::async_trait;
use openv_secrets::{ExportError, Item, ItemOverview, VaultDataSource, VaultOverview};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// How a [`OnePasswordSource`] talks to 1Password
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnePasswordMode {
    /// Through the WASM SDK core over HTTPS
    Sdk,
    /// Through the `op` CLI
    Cli,
}

impl std::fmt::Display for OnePasswordMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sdk => f.write_str("sdk"),
            Self::Cli => f.write_str("cli"),
        }
    }
}

/// Reads vaults and items from 1Password with a service account token.
///
/// Mode is auto-negotiated:
/// - If the WASM SDK core is installed → SDK mode
/// - Otherwise → CLI mode (runs `op` with `OP_SERVICE_ACCOUNT_TOKEN` set)
pub struct OnePasswordSource {
    token: SecretString,
    /// Client ID for the WASM SDK (SDK mode only)
    client_id: Option<u64>,
    op_program: PathBuf,
}

impl std::fmt::Debug for OnePasswordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnePasswordSource")
            .field("mode", &self.mode())
            .finish_non_exhaustive()
    }
}

impl OnePasswordSource {
    /// Create a source with auto-detected mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the WASM SDK core is installed but fails to
    /// initialize or rejects the token. There is no silent fallback to the
    /// CLI in that case.
    pub fn new(token: SecretString) -> Result<Self, ExportError> {
        if !wasm::sdk_core_installed() {
            tracing::debug!("1Password WASM core not installed, using op CLI");
            return Ok(Self::cli(token));
        }

        let client_id = SharedCore::with_core(|core| core.init_client(token.expose_secret()))
            .map_err(|e| {
                ExportError::provider(
                    "onepassword",
                    format!(
                        "1Password WASM core is installed but initialization failed: {}\n\
                        To use the op CLI instead, remove the WASM file or unset {}.",
                        e.message(),
                        wasm::SDK_CORE_ENV
                    ),
                )
            })?;
        tracing::debug!("1Password WASM client initialized");

        Ok(Self {
            token,
            client_id: Some(client_id),
            op_program: PathBuf::from("op"),
        })
    }

    /// Create a source that always uses the `op` CLI.
    #[must_use]
    pub fn cli(token: SecretString) -> Self {
        Self {
            token,
            client_id: None,
            op_program: PathBuf::from("op"),
        }
    }

    /// Use a specific `op` executable instead of the one on `PATH`.
    #[must_use]
    pub fn with_op_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.op_program = program.into();
        self
    }

    /// The mode this source was created in
    #[must_use]
    pub const fn mode(&self) -> OnePasswordMode {
        if self.client_id.is_some() {
            OnePasswordMode::Sdk
        } else {
            OnePasswordMode::Cli
        }
    }

    fn op(&self) -> OpCli<'_> {
        OpCli::new(&self.op_program, &self.token)
    }

    /// Invoke an SDK method and decode its JSON result
    fn invoke_sdk<T: DeserializeOwned>(
        client_id: u64,
        method: &str,
        params: Map<String, Value>,
        context: &str,
    ) -> Result<T, ExportError> {
        let result =
            SharedCore::with_core(|core| core.invoke(client_id, method, &params, context))?;
        serde_json::from_str(&result).map_err(|e| {
            ExportError::provider(
                "onepassword",
                format!("Failed to parse {method} response for {context}: {e}"),
            )
        })
    }
}

impl Drop for OnePasswordSource {
    fn drop(&mut self) {
        if let Some(client_id) = self.client_id
            && let Ok(core_mutex) = SharedCore::get_or_init()
            && let Ok(mut guard) = core_mutex.lock()
            && let Some(core) = guard.as_mut()
        {
            core.release_client(client_id);
        }
    }
}

fn params<const N: usize>(entries: [(&str, &str); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}

#[async_trait]
impl VaultDataSource for OnePasswordSource {
    fn provider_name(&self) -> &'static str {
        "onepassword"
    }

    async fn list_vaults(&self) -> Result<Vec<VaultOverview>, ExportError> {
        match self.client_id {
            Some(id) => Self::invoke_sdk(id, "VaultsList", Map::new(), "vaults"),
            None => self.op().list_vaults().await,
        }
    }

    async fn list_items(&self, vault_id: &str) -> Result<Vec<ItemOverview>, ExportError> {
        match self.client_id {
            Some(id) => {
                let mut params = params([("vault_id", vault_id)]);
                params.insert("filters".to_string(), Value::Array(Vec::new()));
                Self::invoke_sdk(id, "ItemsList", params, vault_id)
            }
            None => self.op().list_items(vault_id).await,
        }
    }

    async fn get_item(&self, vault_id: &str, item_id: &str) -> Result<Item, ExportError> {
        match self.client_id {
            Some(id) => Self::invoke_sdk(
                id,
                "ItemsGet",
                params([("vault_id", vault_id), ("item_id", item_id)]),
                item_id,
            ),
            None => self.op().get_item(vault_id, item_id).await,
        }
    }
}
