//! Command implementations for openv

pub mod export;
pub mod run;

#[cfg(test)]
mod fake;

use crate::cli::{CliError, EXIT_OK};
use openv_1password::OnePasswordSource;
use openv_secrets::VaultDataSource;
use secrecy::SecretString;
use std::fmt;
use std::path::PathBuf;
use tracing::Instrument;

/// Settings shared by every command that reads vaults
#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// Service account token
    pub token: SecretString,
    /// Vault selectors in the order given; empty means every vault
    pub vaults: Vec<String>,
}

impl ExportSettings {
    /// Create settings from a token and vault selectors
    #[must_use]
    pub fn new(token: impl Into<String>, vaults: Vec<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            vaults,
        }
    }
}

/// Where dotenv output goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Standard output
    Stdout,
    /// A file, created or truncated
    File(PathBuf),
}

impl OutputTarget {
    /// Interpret an `--out` value; `-` selects stdout.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty path.
    pub fn parse(value: &str) -> Result<Self, CliError> {
        match value {
            "" => Err(CliError::config_with_help(
                "output path not specified",
                "Pass --out <PATH>, or --out - for stdout",
            )),
            "-" => Ok(Self::Stdout),
            path => Ok(Self::File(PathBuf::from(path))),
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A fully validated command ready to execute
#[derive(Debug)]
pub enum Command {
    /// Write the selected vaults as a dotenv file
    Export {
        /// Credentials and vault selection
        settings: ExportSettings,
        /// Destination
        output: OutputTarget,
    },
    /// Run a child process with the selected vaults in its environment
    Run {
        /// Credentials and vault selection
        settings: ExportSettings,
        /// Program to launch
        program: String,
        /// Program arguments
        args: Vec<String>,
    },
}

impl Command {
    /// Short name used in spans and logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Export { .. } => "export",
            Self::Run { .. } => "run",
        }
    }

    const fn settings(&self) -> &ExportSettings {
        match self {
            Self::Export { settings, .. } | Self::Run { settings, .. } => settings,
        }
    }

    /// Execute against a data source and return the process exit code.
    ///
    /// # Errors
    ///
    /// Returns an error if the export, the output write, or the child launch fails.
    pub async fn execute_with(&self, source: &dyn VaultDataSource) -> Result<i32, CliError> {
        let vaults = &self.settings().vaults;
        match self {
            Self::Export { output, .. } => {
                export::execute_export(source, vaults, output).await?;
                Ok(EXIT_OK)
            }
            Self::Run { program, args, .. } => {
                run::execute_run(source, vaults, program, args).await
            }
        }
    }
}

/// Execute a command against 1Password.
///
/// # Errors
///
/// Returns an error if the 1Password source cannot be created or the
/// command fails.
pub async fn execute(command: Command) -> Result<i32, CliError> {
    let span = crate::command_span!(command.name());
    execute_with_onepassword(&command).instrument(span).await
}

async fn execute_with_onepassword(command: &Command) -> Result<i32, CliError> {
    let source = OnePasswordSource::new(command.settings().token.clone())?;
    tracing::debug!(mode = %source.mode(), "1Password source ready");

    command.execute_with(&source).await
}
