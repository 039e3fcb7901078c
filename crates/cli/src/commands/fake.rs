//! In-memory vault source for command tests

use async_trait::async_trait;
use openv_secrets::{ExportError, Item, ItemOverview, VaultDataSource, VaultOverview};

#[derive(Default)]
pub struct StaticSource {
    vaults: Vec<(VaultOverview, Vec<Item>)>,
    fail: bool,
}

impl StaticSource {
    pub fn with_vault(mut self, id: &str, title: &str, items: Vec<Item>) -> Self {
        self.vaults.push((VaultOverview::new(id, title), items));
        self
    }

    pub fn failing() -> Self {
        Self {
            vaults: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl VaultDataSource for StaticSource {
    fn provider_name(&self) -> &'static str {
        "static"
    }

    async fn list_vaults(&self) -> Result<Vec<VaultOverview>, ExportError> {
        if self.fail {
            return Err(ExportError::provider("static", "service unavailable"));
        }
        Ok(self.vaults.iter().map(|(v, _)| v.clone()).collect())
    }

    async fn list_items(&self, vault_id: &str) -> Result<Vec<ItemOverview>, ExportError> {
        self.vaults
            .iter()
            .find(|(v, _)| v.id == vault_id)
            .map(|(_, items)| {
                items
                    .iter()
                    .map(|i| ItemOverview::new(i.id.clone(), i.title.clone()))
                    .collect()
            })
            .ok_or_else(|| ExportError::provider("static", format!("no vault {vault_id}")))
    }

    async fn get_item(&self, vault_id: &str, item_id: &str) -> Result<Item, ExportError> {
        self.vaults
            .iter()
            .find(|(v, _)| v.id == vault_id)
            .and_then(|(_, items)| items.iter().find(|i| i.id == item_id))
            .cloned()
            .ok_or_else(|| ExportError::provider("static", format!("no item {item_id}")))
    }
}
