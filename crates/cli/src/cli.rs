//! Command-line surface: argument parsing, error types and exit codes

use crate::commands::{Command, ExportSettings, OutputTarget};
use crate::tracing::{TracingConfig, TracingFormat};
use clap::{Args, Parser, Subcommand};
use miette::{Diagnostic, Report};
use openv_secrets::ExportError;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use thiserror::Error;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// CLI or configuration error exit code
pub const EXIT_CLI: i32 = 2;
/// Export, I/O or child launch failure exit code
pub const EXIT_FAILURE: i32 = 3;

/// Environment variable holding the 1Password service account token
pub const TOKEN_ENV: &str = "OP_SERVICE_ACCOUNT_TOKEN";

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// Missing or invalid arguments (exit code 2)
    #[error("Configuration error: {message}")]
    #[diagnostic(code(openv::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// A vault, item or field title has no usable key characters (exit code 3)
    #[error("Key format error: {message}")]
    #[diagnostic(code(openv::format))]
    Format {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// The vault service failed (exit code 3)
    #[error("Vault service error: {message}")]
    #[diagnostic(code(openv::source))]
    Source {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Writing the output or launching the child failed (exit code 3)
    #[error("I/O error: {message}")]
    #[diagnostic(code(openv::io))]
    Io {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new configuration error with help text
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a new vault service error
    #[must_use]
    pub fn service(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new I/O error
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new I/O error with help text
    #[must_use]
    pub fn io_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Short machine-readable code used in the JSON error envelope
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Format { .. } => "format",
            Self::Source { .. } => "source",
            Self::Io { .. } => "io",
        }
    }
}

/// Convert `openv_secrets::ExportError` to the matching `CliError` variant.
///
/// Titles that cannot become keys are a format problem; everything else
/// happened talking to the vault service.
impl From<ExportError> for CliError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::EmptyKey { .. } => Self::Format {
                message: err.to_string(),
                help: Some(
                    "Rename the vault item or field so its title contains a letter, digit or underscore"
                        .to_string(),
                ),
            },
            ExportError::ListVaults { .. } => Self::Source {
                message: err.to_string(),
                help: Some(format!("Check that {TOKEN_ENV} holds a valid service account token")),
            },
            ExportError::ListItems { .. }
            | ExportError::GetItem { .. }
            | ExportError::Source { .. } => Self::service(err.to_string()),
        }
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Format { .. } | CliError::Source { .. } | CliError::Io { .. } => EXIT_FAILURE,
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope<E> {
    /// Status indicator - always "error" for failures
    pub status: &'static str,
    /// The error details
    pub error: E,
}

impl<E> ErrorEnvelope<E> {
    /// Create a new error envelope
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

/// Render error appropriately based on JSON flag.
///
/// Both forms go to stderr; stdout may be carrying dotenv output.
#[allow(clippy::print_stderr)]
pub fn render_error(err: &CliError, json_mode: bool) {
    if json_mode {
        let envelope = ErrorEnvelope::new(serde_json::json!({
            "code": err.code(),
            "message": err.to_string(),
        }));

        match serde_json::to_string(&envelope) {
            Ok(json) => eprintln!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    } else {
        let report = Report::new(err.clone());
        eprintln!("{report:?}");
    }
    let _ = io::stderr().flush();
}

/// Credentials and vault selection shared by export and run.
#[derive(Args, Debug, Clone, Default)]
pub struct VaultArgs {
    /// 1Password service account token. Unset or empty falls back to
    /// `OP_SERVICE_ACCOUNT_TOKEN`.
    #[arg(
        short = 't',
        long,
        help = "1Password service account token [env: OP_SERVICE_ACCOUNT_TOKEN]"
    )]
    pub token: Option<String>,

    /// Vaults to export, by title or ID. Defaults to every accessible vault.
    #[arg(
        short = 'v',
        long = "vault",
        value_name = "VAULT",
        value_delimiter = ',',
        help = "Vault title or ID to export (repeatable, defaults to all vaults)"
    )]
    pub vaults: Vec<String>,
}

/// Main CLI entry point for openv.
///
/// Without a subcommand, writes the selected vaults as a dotenv file.
#[derive(Parser, Debug)]
#[command(name = "openv")]
#[command(about = "Convert 1Password vaults into environment variables")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Credentials and vault selection for the dotenv export.
    #[command(flatten)]
    pub vault_args: VaultArgs,

    /// Output file for the dotenv export, `-` for stdout.
    #[arg(
        short = 'o',
        long,
        visible_alias = "file",
        value_name = "PATH",
        default_value = ".env",
        help = "Output file, or - for stdout"
    )]
    pub out: String,

    /// Logging verbosity level.
    #[arg(
        short = 'L',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: crate::tracing::LogLevel,

    /// Log line format.
    #[arg(
        long,
        global = true,
        help = "Set log output format",
        default_value = "pretty",
        value_enum
    )]
    pub log_format: TracingFormat,

    /// Emit JSON logs and JSON error envelopes.
    #[arg(
        long,
        global = true,
        help = "Emit JSON logs and JSON error envelopes (overrides --log-format)"
    )]
    pub json: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a command with the vault contents added to its environment.
    #[command(about = "Run a command with vault secrets in its environment")]
    Run {
        /// Credentials and vault selection.
        #[command(flatten)]
        vault_args: VaultArgs,

        /// Command to execute followed by its arguments.
        #[arg(
            value_name = "COMMAND",
            help = "Command to execute, followed by its arguments",
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        command: Vec<String>,
    },
}

impl VaultArgs {
    /// Validate the token and build the export settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when neither the flag nor the
    /// environment holds a non-empty token.
    pub fn into_settings(self) -> Result<ExportSettings, CliError> {
        let token = self
            .token
            .filter(|token| !token.is_empty())
            .or_else(|| std::env::var(TOKEN_ENV).ok())
            .filter(|token| !token.is_empty());

        match token {
            Some(token) => Ok(ExportSettings::new(token, self.vaults)),
            None => Err(CliError::config_with_help(
                "service account token not specified",
                format!("Pass --token or set {TOKEN_ENV}"),
            )),
        }
    }
}

impl Cli {
    /// Tracing setup for the parsed flags; `--json` wins over `--log-format`.
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig {
            format: if self.json {
                TracingFormat::Json
            } else {
                self.log_format
            },
            level: self.level.into(),
            ..TracingConfig::default()
        }
    }

    /// Convert parsed arguments into an executable command.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a missing token, an empty output
    /// path, or `run` without a command.
    pub fn into_command(self) -> Result<Command, CliError> {
        match self.command {
            None => {
                let output = OutputTarget::parse(&self.out)?;
                let settings = self.vault_args.into_settings()?;
                Ok(Command::Export { settings, output })
            }
            Some(Commands::Run {
                vault_args,
                command,
            }) => {
                let mut words = command.into_iter();
                let program = words.next().ok_or_else(|| {
                    CliError::config_with_help(
                        "command not specified",
                        "Usage: openv run [OPTIONS] [--] COMMAND [ARGS]...",
                    )
                })?;
                let settings = vault_args.into_settings()?;
                Ok(Command::Run {
                    settings,
                    program,
                    args: words.collect(),
                })
            }
        }
    }
}

/// Parse command line arguments
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
