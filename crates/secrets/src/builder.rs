//! Flattening vault items into an environment

use crate::{
    EnvironmentMap, ExportError, Item, ResolvedVault, VaultDataSource, format_key, resolve_vaults,
};

/// Builds an [`EnvironmentMap`] from the items of a list of vaults.
///
/// Vaults, items and fields are visited in the order the data source returns
/// them, one request at a time. Each item contributes:
///
/// - `ITEM = notes`, when the notes are non-empty
/// - `ITEM_FIELD = value`, for every field
///
/// Later writes to an existing key replace earlier ones. The first error of
/// any kind aborts the build and discards everything collected so far.
pub struct EnvironmentBuilder<'a> {
    source: &'a dyn VaultDataSource,
}

impl std::fmt::Debug for EnvironmentBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentBuilder")
            .field("source", &self.source.provider_name())
            .finish()
    }
}

impl<'a> EnvironmentBuilder<'a> {
    /// Create a builder reading from `source`
    #[must_use]
    pub fn new(source: &'a dyn VaultDataSource) -> Self {
        Self { source }
    }

    /// Fetch every item of every vault and fold them into one map.
    ///
    /// # Errors
    ///
    /// - [`ExportError::ListItems`] if a vault cannot be listed, naming the
    ///   caller's selector for that vault
    /// - [`ExportError::GetItem`] if an item cannot be fetched
    /// - [`ExportError::EmptyKey`] if an item or field title has no usable
    ///   characters
    pub async fn build(&self, vaults: &[ResolvedVault]) -> Result<EnvironmentMap, ExportError> {
        let mut env = EnvironmentMap::new();

        for vault in vaults {
            let items = self.source.list_items(&vault.id).await.map_err(|e| {
                ExportError::ListItems {
                    vault: vault.selector.clone(),
                    message: e.message(),
                }
            })?;
            tracing::debug!(
                vault = %vault.selector,
                vault_id = %vault.id,
                items = items.len(),
                "Listed vault items"
            );

            for summary in &items {
                let item = self
                    .source
                    .get_item(&vault.id, &summary.id)
                    .await
                    .map_err(|e| ExportError::GetItem {
                        vault: vault.selector.clone(),
                        item: summary.id.clone(),
                        message: e.message(),
                    })?;
                Self::fold_item(&mut env, &item)?;
            }
        }

        tracing::info!(
            vaults = vaults.len(),
            keys = env.len(),
            "Built environment from vaults"
        );
        Ok(env)
    }

    /// Add one item's notes and fields to `env`
    fn fold_item(env: &mut EnvironmentMap, item: &Item) -> Result<(), ExportError> {
        let item_key = format_key(&item.title)?;
        tracing::trace!(item = %item.id, key = %item_key, fields = item.fields.len(), "Folding item");

        if !item.notes.is_empty() && env.insert(item_key.clone(), item.notes.clone()) {
            tracing::warn!(key = %item_key, "Environment key collision, keeping the later value");
        }

        for field in &item.fields {
            let key = format!("{item_key}_{}", format_key(&field.title)?);
            if env.insert(key.clone(), field.value.clone()) {
                tracing::warn!(key = %key, "Environment key collision, keeping the later value");
            }
        }

        Ok(())
    }
}

/// Run a complete export: list vaults, resolve `selectors`, build the map.
///
/// The vault directory is always listed, even when every selector is
/// already an ID.
///
/// # Errors
///
/// Returns [`ExportError::ListVaults`] if the directory cannot be listed,
/// or any error from [`EnvironmentBuilder::build`].
pub async fn export(
    source: &dyn VaultDataSource,
    selectors: &[String],
) -> Result<EnvironmentMap, ExportError> {
    let directory = source
        .list_vaults()
        .await
        .map_err(|e| ExportError::ListVaults {
            message: e.message(),
        })?;
    tracing::debug!(
        provider = source.provider_name(),
        vaults = directory.len(),
        "Listed vaults"
    );

    let vaults = resolve_vaults(selectors, &directory);
    EnvironmentBuilder::new(source).build(&vaults).await
}
