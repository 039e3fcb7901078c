//! Run a child process with vault contents in its environment

use crate::cli::CliError;
use openv_secrets::{VaultDataSource, child_environment, dedupe_last_wins, export};
use std::process::Stdio;
use tokio::process::Command;

/// Inherited variables with UTF-8 names and values.
///
/// Anything else is left out of the rebuilt list; the child still inherits
/// it because the environment is overlaid rather than cleared.
fn inherited_vars() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

/// Export the selected vaults and run `program` with them added to the
/// inherited environment. Exported keys shadow inherited ones.
///
/// Returns the child's exit code, or 1 if it was terminated by a signal.
///
/// # Errors
///
/// Returns an error if the export fails or the child cannot be launched.
pub async fn execute_run(
    source: &dyn VaultDataSource,
    vaults: &[String],
    program: &str,
    args: &[String],
) -> Result<i32, CliError> {
    let env = export(source, vaults).await?;
    let entries = dedupe_last_wins(child_environment(inherited_vars(), &env));

    tracing::info!(
        program,
        exported = env.len(),
        "Running command with vault environment"
    );

    let status = Command::new(program)
        .args(args)
        .envs(entries)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| {
            CliError::io_with_help(
                format!("Failed to execute command '{program}': {e}"),
                "Check that the command exists and is executable",
            )
        })?;

    tracing::debug!(status = ?status, "Command finished");
    Ok(status.code().unwrap_or(1))
}
