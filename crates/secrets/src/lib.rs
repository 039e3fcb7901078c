//! Vault-to-environment transformation for openv
//!
//! Turns the items of one or more password vaults into a flat set of
//! environment variables and renders that set either as dotenv text or as a
//! child-process environment.
//!
//! The pipeline is:
//!
//! ```ignore
//! use openv_secrets::{export, to_dotenv_string};
//!
//! // list vaults -> resolve selectors -> fetch items -> flatten
//! let env = export(&source, &["Personal".to_string()]).await?;
//! print!("{}", to_dotenv_string(&env));
//! ```
//!
//! Any error anywhere aborts the whole export; there is no partial result.

mod builder;
mod dotenv;
mod key;
mod process;
mod resolve;
mod types;

pub use builder::{EnvironmentBuilder, export};
pub use dotenv::{escape_value, to_dotenv_string, write_dotenv};
pub use key::format_key;
pub use process::{child_environment, dedupe_last_wins, env_pairs};
pub use resolve::{ResolvedVault, resolve_vaults};
pub use types::{EnvironmentMap, Item, ItemField, ItemOverview, SecureSecret, VaultOverview};

use async_trait::async_trait;
use thiserror::Error;

/// Error types for vault export
#[derive(Debug, Error)]
pub enum ExportError {
    /// A title formats to an empty environment key
    #[error("Title '{title}' produces an empty environment key")]
    EmptyKey {
        /// The title as it appears in the vault
        title: String,
    },

    /// Listing the accessible vaults failed
    #[error("Failed to list vaults: {message}")]
    ListVaults {
        /// Error message from the data source
        message: String,
    },

    /// Listing the items of a vault failed
    #[error("Failed to list items in vault '{vault}': {message}")]
    ListItems {
        /// The vault as the caller selected it
        vault: String,
        /// Error message from the data source
        message: String,
    },

    /// Fetching a single item failed
    #[error("Failed to get item '{item}' from vault '{vault}': {message}")]
    GetItem {
        /// The vault as the caller selected it
        vault: String,
        /// Item identifier
        item: String,
        /// Error message from the data source
        message: String,
    },

    /// The data source itself could not be set up or used
    #[error("{provider} error: {message}")]
    Source {
        /// Data source name (e.g. `"onepassword"`)
        provider: String,
        /// Error message
        message: String,
    },
}

impl ExportError {
    /// Create a data source error
    #[must_use]
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from the vault service rather than from key formatting
    #[must_use]
    pub const fn is_source_error(&self) -> bool {
        !matches!(self, Self::EmptyKey { .. })
    }

    /// The underlying message without the operation prefix
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::EmptyKey { .. } => self.to_string(),
            Self::ListVaults { message }
            | Self::ListItems { message, .. }
            | Self::GetItem { message, .. }
            | Self::Source { message, .. } => message.clone(),
        }
    }
}

/// Read access to a password vault service.
///
/// Implementors translate the service's own listing and fetch calls into the
/// common data model. Calls are made one at a time; implementations need not
/// support concurrent use, but must be `Send + Sync` so they can live behind
/// a shared reference across `.await` points.
#[async_trait]
pub trait VaultDataSource: Send + Sync {
    /// Data source name used in diagnostics.
    fn provider_name(&self) -> &'static str;

    /// List every vault the credential can read.
    async fn list_vaults(&self) -> Result<Vec<VaultOverview>, ExportError>;

    /// List the items stored in a vault.
    async fn list_items(&self, vault_id: &str) -> Result<Vec<ItemOverview>, ExportError>;

    /// Fetch a full item, including notes and fields.
    async fn get_item(&self, vault_id: &str, item_id: &str) -> Result<Item, ExportError>;
}
