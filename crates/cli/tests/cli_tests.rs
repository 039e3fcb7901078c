//! Integration tests for the openv binary
//!
//! Argument and configuration errors are checked without any vault access.
//! End-to-end runs put a scripted `op` first on `PATH` and point the WASM
//! lookup at a missing file so the binary talks to the script.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const TOKEN_ENV: &str = "OP_SERVICE_ACCOUNT_TOKEN";

fn openv() -> Command {
    let mut cmd = Command::cargo_bin("openv").unwrap();
    cmd.env_remove(TOKEN_ENV).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_export_flags() {
    openv()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--token"))
        .stdout(predicate::str::contains("--vault"))
        .stdout(predicate::str::contains("--out"))
        .stdout(predicate::str::contains("--file"))
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn test_missing_token_exits_with_config_error() {
    let dir = TempDir::new().unwrap();
    openv()
        .current_dir(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("service account token not specified"));
    assert!(!dir.path().join(".env").exists());
}

#[test]
fn test_empty_token_exits_with_config_error() {
    openv()
        .args(["--token", "", "--out", "-"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_empty_out_exits_with_config_error() {
    openv()
        .args(["-t", "tok", "--out", ""])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("output path not specified"));
}

#[test]
fn test_run_without_command_exits_with_config_error() {
    openv()
        .args(["run", "-t", "tok"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("command not specified"));
}

#[test]
fn test_json_error_envelope() {
    openv()
        .arg("--json")
        .assert()
        .code(2)
        .stderr(predicate::str::contains(r#""status":"error""#))
        .stderr(predicate::str::contains(r#""code":"config""#));
}

#[cfg(unix)]
mod with_fake_op {
    use super::*;
    use std::collections::HashSet;
    use std::os::unix::fs::PermissionsExt;

    const FAKE_OP: &str = r#"#!/bin/sh
if [ "$OP_SERVICE_ACCOUNT_TOKEN" != "ops_fake_token" ]; then
  echo "[ERROR] invalid service account token" >&2
  exit 1
fi
case "$1 $2" in
  "vault list")
    printf '%s\n' '[{"id":"v1","name":"Personal"},{"id":"v2","name":"Work"}]'
    ;;
  "item list")
    if [ "$4" = "v1" ]; then
      printf '%s\n' '[{"id":"i1","title":"Database"}]'
    else
      printf '%s\n' '[{"id":"i2","title":"API Key"}]'
    fi
    ;;
  "item get")
    if [ "$3" = "i1" ]; then
      printf '%s\n' '{"id":"i1","title":"Database","fields":[{"id":"notesPlain","purpose":"NOTES","label":"notesPlain","value":"prod"},{"id":"h","label":"Host","value":"db.example.com"}]}'
    else
      printf '%s\n' '{"id":"i2","title":"API Key","fields":[{"id":"notesPlain","purpose":"NOTES","label":"notesPlain","value":"line1\nline2"}]}'
    fi
    ;;
  *)
    echo "unexpected: $*" >&2
    exit 1
    ;;
esac
"#;

    struct FakeOp {
        dir: TempDir,
    }

    impl FakeOp {
        fn install() -> Self {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("op");
            std::fs::write(&path, FAKE_OP).unwrap();
            let mut perms = std::fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).unwrap();
            Self { dir }
        }

        fn openv(&self) -> Command {
            let path = format!(
                "{}:{}",
                self.dir.path().display(),
                std::env::var("PATH").unwrap_or_default()
            );
            let mut cmd = openv();
            cmd.env("PATH", path)
                .env("ONEPASSWORD_WASM_PATH", self.dir.path().join("missing.wasm"))
                .current_dir(self.dir.path());
            cmd
        }
    }

    fn lines(bytes: &[u8]) -> HashSet<String> {
        String::from_utf8_lossy(bytes)
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_export_to_stdout() {
        let op = FakeOp::install();
        let output = op
            .openv()
            .args(["-t", "ops_fake_token", "-o", "-"])
            .output()
            .unwrap();

        assert!(output.status.success());
        let expected: HashSet<String> = [
            r#"DATABASE="prod""#,
            r#"DATABASE_HOST="db.example.com""#,
            r#"API_KEY="line1\nline2""#,
        ]
        .into_iter()
        .map(str::to_string)
        .collect();
        assert_eq!(lines(&output.stdout), expected);
    }

    #[test]
    fn test_export_to_default_file_with_env_token() {
        let op = FakeOp::install();
        op.openv()
            .env(TOKEN_ENV, "ops_fake_token")
            .args(["-v", "Personal"])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());

        let written = std::fs::read(op.dir.path().join(".env")).unwrap();
        let expected: HashSet<String> = [r#"DATABASE="prod""#, r#"DATABASE_HOST="db.example.com""#]
            .into_iter()
            .map(str::to_string)
            .collect();
        assert_eq!(lines(&written), expected);
    }

    #[test]
    fn test_empty_token_flag_uses_env_token() {
        let op = FakeOp::install();
        op.openv()
            .env(TOKEN_ENV, "ops_fake_token")
            .args(["--token", "", "-v", "Personal", "-o", "-"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"DATABASE_HOST="db.example.com""#));
    }

    #[test]
    fn test_rejected_token_exits_with_source_error() {
        let op = FakeOp::install();
        op.openv()
            .args(["--json", "-t", "wrong", "--file", "out.env"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains(r#""code":"source""#))
            .stderr(predicate::str::contains("invalid service account token"));
        assert!(!op.dir.path().join("out.env").exists());
    }

    #[test]
    fn test_run_passes_environment_and_exit_code() {
        let op = FakeOp::install();
        op.openv()
            .args([
                "run",
                "-t",
                "ops_fake_token",
                "--",
                "sh",
                "-c",
                r#"echo "$DATABASE_HOST"; exit 4"#,
            ])
            .assert()
            .code(4)
            .stdout(predicate::str::contains("db.example.com"));
    }

    #[test]
    fn test_run_keeps_multiline_values_raw() {
        let op = FakeOp::install();
        op.openv()
            .args(["run", "-t", "ops_fake_token", "-v", "Work", "--"])
            .args(["sh", "-c", r#"printf '%s' "$API_KEY""#])
            .assert()
            .success()
            .stdout("line1\nline2");
    }
}
