//! Dotenv export command

use super::OutputTarget;
use crate::cli::CliError;
use openv_secrets::{EnvironmentMap, VaultDataSource, export, write_dotenv};
use std::fs::File;
use std::io::{self, BufWriter};

/// Export the selected vaults and write them as dotenv text.
///
/// The whole map is built before the output is opened, so a failed export
/// never creates or truncates the file.
///
/// # Errors
///
/// Returns an error if the export fails or the output cannot be written.
pub async fn execute_export(
    source: &dyn VaultDataSource,
    vaults: &[String],
    output: &OutputTarget,
) -> Result<(), CliError> {
    let env = export(source, vaults).await?;
    write_output(&env, output)?;

    tracing::info!(variables = env.len(), output = %output, "Wrote dotenv output");
    Ok(())
}

fn write_output(env: &EnvironmentMap, output: &OutputTarget) -> Result<(), CliError> {
    match output {
        OutputTarget::Stdout => {
            let stdout = io::stdout();
            write_dotenv(env, stdout.lock())
                .map_err(|e| CliError::io(format!("Failed to write to stdout: {e}")))
        }
        OutputTarget::File(path) => {
            let file = File::create(path).map_err(|e| {
                CliError::io_with_help(
                    format!("Failed to create {}: {e}", path.display()),
                    "Check that the directory exists and is writable",
                )
            })?;
            write_dotenv(env, BufWriter::new(file))
                .map_err(|e| CliError::io(format!("Failed to write {}: {e}", path.display())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fake::StaticSource;
    use super::*;
    use openv_secrets::Item;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn lines(text: &str) -> HashSet<String> {
        text.lines().map(str::to_string).collect()
    }

    fn source() -> StaticSource {
        StaticSource::default()
            .with_vault(
                "v1",
                "Personal",
                vec![
                    Item::new("i1", "GitHub")
                        .with_notes("gh token")
                        .with_field("user name", "octo"),
                ],
            )
            .with_vault(
                "v2",
                "Work",
                vec![Item::new("i2", "Cert").with_notes("line1\nline2")],
            )
    }

    #[tokio::test]
    async fn test_writes_dotenv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");

        execute_export(&source(), &[], &OutputTarget::File(path.clone()))
            .await
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            lines(&written),
            lines("GITHUB=\"gh token\"\nGITHUB_USER_NAME=\"octo\"\nCERT=\"line1\\nline2\"\n")
        );
        assert!(written.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_selected_vault_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("work.env");

        execute_export(
            &source(),
            &["Work".to_string()],
            &OutputTarget::File(path.clone()),
        )
        .await
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "CERT=\"line1\\nline2\"\n"
        );
    }

    #[tokio::test]
    async fn test_empty_export_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");

        execute_export(&StaticSource::default(), &[], &OutputTarget::File(path.clone()))
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[tokio::test]
    async fn test_failed_export_leaves_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "KEEP=\"me\"\n").unwrap();

        let err = execute_export(&StaticSource::failing(), &[], &OutputTarget::File(path.clone()))
            .await
            .unwrap_err();

        assert!(matches!(err, CliError::Source { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "KEEP=\"me\"\n");
    }

    #[tokio::test]
    async fn test_failed_export_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");

        let result =
            execute_export(&StaticSource::failing(), &[], &OutputTarget::File(path.clone())).await;

        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path: PathBuf = dir.path().join("missing").join(".env");

        let err = execute_export(&source(), &[], &OutputTarget::File(path))
            .await
            .unwrap_err();

        assert!(matches!(err, CliError::Io { .. }));
    }
}
