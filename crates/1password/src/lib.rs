//! 1Password integration for openv
//!
//! This crate reads vaults and items from 1Password for the export engine in
//! `openv-secrets`. Access goes through the [`vaults`] module.

pub mod vaults;

// Re-export main types for convenience
pub use vaults::{OnePasswordMode, OnePasswordSource};
