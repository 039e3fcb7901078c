//! Vault selector resolution

use crate::VaultOverview;

/// A vault chosen for export.
///
/// `selector` is what the caller asked for, kept so that a failing lookup
/// can be reported in the caller's own terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVault {
    /// Identifier passed to the data source
    pub id: String,
    /// The caller's selector, or the vault title when exporting everything
    pub selector: String,
}

impl ResolvedVault {
    /// Create a resolved vault
    #[must_use]
    pub fn new(id: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            selector: selector.into(),
        }
    }

    /// Collect the identifiers of a resolved list, in order
    #[must_use]
    pub fn ids(vaults: &[Self]) -> Vec<String> {
        vaults.iter().map(|v| v.id.clone()).collect()
    }
}

/// Map vault titles or IDs onto canonical vault IDs.
///
/// With no selectors every vault in `directory` is returned, in directory
/// order. Otherwise each selector that equals a vault title is replaced by
/// that vault's ID (the last match wins if titles repeat); a selector that
/// matches no title is passed through unchanged and treated as an ID.
/// Order is preserved and duplicates are kept.
#[must_use]
pub fn resolve_vaults(selectors: &[String], directory: &[VaultOverview]) -> Vec<ResolvedVault> {
    if selectors.is_empty() {
        return directory
            .iter()
            .map(|vault| ResolvedVault::new(&vault.id, &vault.title))
            .collect();
    }

    selectors
        .iter()
        .map(|selector| {
            match directory.iter().rev().find(|vault| vault.title == *selector) {
                Some(vault) => ResolvedVault::new(&vault.id, selector),
                None => {
                    tracing::debug!(
                        selector = %selector,
                        "Vault selector matched no title, using it as an ID"
                    );
                    ResolvedVault::new(selector, selector)
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> Vec<VaultOverview> {
        vec![
            VaultOverview::new("v1", "Personal"),
            VaultOverview::new("v2", "Work"),
            VaultOverview::new("v3", "Shared"),
        ]
    }

    fn selectors(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_no_selectors_returns_all_in_directory_order() {
        let resolved = resolve_vaults(&[], &directory());
        assert_eq!(ResolvedVault::ids(&resolved), vec!["v1", "v2", "v3"]);
        assert_eq!(resolved[1].selector, "Work");
    }

    #[test]
    fn test_no_selectors_empty_directory() {
        assert!(resolve_vaults(&[], &[]).is_empty());
    }

    #[test]
    fn test_title_is_replaced_by_id() {
        let resolved = resolve_vaults(&selectors(&["Personal"]), &directory());
        assert_eq!(resolved, vec![ResolvedVault::new("v1", "Personal")]);
    }

    #[test]
    fn test_unknown_selector_passes_through() {
        let resolved = resolve_vaults(&selectors(&["unknown-xyz"]), &directory());
        assert_eq!(ResolvedVault::ids(&resolved), vec!["unknown-xyz"]);
    }

    #[test]
    fn test_raw_id_passes_through() {
        let resolved = resolve_vaults(&selectors(&["v2"]), &directory());
        assert_eq!(ResolvedVault::ids(&resolved), vec!["v2"]);
    }

    #[test]
    fn test_order_preserved_and_duplicates_kept() {
        let resolved = resolve_vaults(
            &selectors(&["Shared", "Personal", "Shared", "v1"]),
            &directory(),
        );
        assert_eq!(ResolvedVault::ids(&resolved), vec!["v3", "v1", "v3", "v1"]);
    }

    #[test]
    fn test_repeated_title_uses_last_match() {
        let dir = vec![
            VaultOverview::new("a", "Dup"),
            VaultOverview::new("b", "Dup"),
        ];
        let resolved = resolve_vaults(&selectors(&["Dup"]), &dir);
        assert_eq!(ResolvedVault::ids(&resolved), vec!["b"]);
    }

    #[test]
    fn test_title_match_is_case_sensitive() {
        let resolved = resolve_vaults(&selectors(&["personal"]), &directory());
        assert_eq!(ResolvedVault::ids(&resolved), vec!["personal"]);
    }
}
