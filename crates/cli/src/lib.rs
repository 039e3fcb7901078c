//! openv: 1Password vaults as dotenv files or as a command's environment
//!
//! The binary parses arguments into a [`cli::Cli`], converts them into a
//! validated [`commands::Command`], and executes it against 1Password.

pub mod cli;
pub mod commands;
pub mod tracing;

pub use cli::{CliError, exit_code_for, render_error};
pub use commands::{Command, ExportSettings, OutputTarget};
