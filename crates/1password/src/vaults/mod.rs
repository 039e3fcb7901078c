//! 1Password vault access
//!
//! Vaults and items are read either through the 1Password WASM SDK core
//! (when installed) or through the `op` CLI.

mod cli;
pub mod core;
mod source;
pub mod wasm;

pub use source::{OnePasswordMode, OnePasswordSource};
