//! Locating the 1Password SDK core on disk
//!
//! openv does not ship the core. An installed copy is picked up from
//! `ONEPASSWORD_WASM_PATH`, or else from the user cache directory; when
//! neither holds a file, [`OnePasswordSource`](super::OnePasswordSource)
//! drives the `op` CLI instead.

use openv_secrets::ExportError;
use std::io;
use std::path::PathBuf;

/// Environment variable pointing at an installed SDK core
pub const SDK_CORE_ENV: &str = "ONEPASSWORD_WASM_PATH";

/// Where the SDK core is expected, if anywhere.
///
/// A non-empty [`SDK_CORE_ENV`] wins; otherwise the core lives at
/// `<cache dir>/openv/wasm/onepassword-core.wasm`. `None` only when the
/// variable is unset and the platform has no cache directory.
#[must_use]
pub fn sdk_core_path() -> Option<PathBuf> {
    std::env::var_os(SDK_CORE_ENV)
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            dirs::cache_dir().map(|cache| {
                cache
                    .join("openv")
                    .join("wasm")
                    .join("onepassword-core.wasm")
            })
        })
}

/// Whether an SDK core file is present, which selects SDK mode
#[must_use]
pub fn sdk_core_installed() -> bool {
    sdk_core_path().is_some_and(|path| path.is_file())
}

/// Read the SDK core bytes.
///
/// # Errors
///
/// A missing file is reported as "not installed" together with the path that
/// was tried; any other I/O failure is reported as a read error.
pub fn read_sdk_core() -> Result<Vec<u8>, ExportError> {
    let path = sdk_core_path().ok_or_else(|| {
        ExportError::provider(
            "onepassword",
            format!("1Password SDK core is not installed and no cache directory exists; set {SDK_CORE_ENV}"),
        )
    })?;

    std::fs::read(&path).map_err(|e| {
        let message = match e.kind() {
            io::ErrorKind::NotFound => format!(
                "1Password SDK core is not installed at {}; set {SDK_CORE_ENV} to its location",
                path.display()
            ),
            _ => format!("Failed to read 1Password SDK core at {}: {e}", path.display()),
        };
        ExportError::provider("onepassword", message)
    })
}
