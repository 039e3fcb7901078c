//! 1Password WASM SDK SharedCore wrapper
//!
//! A process-wide Extism plugin hosting the 1Password SDK core. The WASM
//! runtime is single-threaded, so every call goes through one mutex.

use super::wasm;
use extism::{Manifest, Plugin, Wasm};
use openv_secrets::ExportError;
use serde_json::{Map, Value};
use std::sync::{LazyLock, Mutex};

/// Name reported to 1Password for this integration
pub const INTEGRATION_NAME: &str = "OP-ENV";

/// Global SharedCore instance, lazily initialized
static SHARED_CORE: LazyLock<Mutex<Option<SharedCore>>> = LazyLock::new(|| Mutex::new(None));

fn core_error(message: impl Into<String>) -> ExportError {
    ExportError::provider("onepassword", message)
}

/// SharedCore wraps the 1Password WASM plugin.
pub struct SharedCore {
    plugin: Plugin,
}

impl SharedCore {
    /// Get or initialize the shared core.
    ///
    /// The first call loads the WASM from disk; later calls reuse it.
    ///
    /// # Errors
    ///
    /// Returns an error if the WASM cannot be loaded or the plugin fails to start.
    pub fn get_or_init() -> Result<&'static Mutex<Option<Self>>, ExportError> {
        let mut guard = SHARED_CORE
            .lock()
            .map_err(|_| core_error("Failed to acquire shared core lock"))?;

        if guard.is_none() {
            let wasm_bytes = wasm::read_sdk_core()?;

            let manifest = Manifest::new([Wasm::data(wasm_bytes)]).with_allowed_hosts(
                [
                    "*.1password.com".to_string(),
                    "*.1password.ca".to_string(),
                    "*.1password.eu".to_string(),
                ]
                .into_iter(),
            );

            let plugin = Plugin::new(&manifest, [], true)
                .map_err(|e| core_error(format!("Failed to initialize WASM plugin: {e}")))?;

            tracing::debug!("1Password WASM core loaded");
            *guard = Some(Self { plugin });
        }

        drop(guard);
        Ok(&SHARED_CORE)
    }

    /// Run `f` against the initialized shared core.
    ///
    /// # Errors
    ///
    /// Returns an error if the core cannot be initialized or locked, or
    /// whatever `f` returns.
    pub fn with_core<T>(
        f: impl FnOnce(&mut Self) -> Result<T, ExportError>,
    ) -> Result<T, ExportError> {
        let core_mutex = Self::get_or_init()?;
        let mut guard = core_mutex
            .lock()
            .map_err(|_| core_error("Failed to acquire shared core lock"))?;
        let core = guard
            .as_mut()
            .ok_or_else(|| core_error("SharedCore not initialized"))?;
        f(core)
    }

    /// Authenticate a new client with a service account token.
    ///
    /// # Errors
    ///
    /// Returns an error if the core rejects the token or answers unexpectedly.
    pub fn init_client(&mut self, token: &str) -> Result<u64, ExportError> {
        let config = serde_json::json!({
            "serviceAccountToken": token,
            "programmingLanguage": "Rust",
            "sdkVersion": env!("CARGO_PKG_VERSION"),
            "integrationName": INTEGRATION_NAME,
            "integrationVersion": env!("CARGO_PKG_VERSION"),
            "requestLibraryName": "extism",
            "requestLibraryVersion": "1",
            "os": std::env::consts::OS,
            "osVersion": "",
            "architecture": std::env::consts::ARCH,
        });

        let result = self
            .plugin
            .call::<_, String>("init_client", config.to_string())
            .map_err(|e| core_error(format!("Failed to initialize client: {e}")))?;

        parse_client_id(&result)
    }

    /// Invoke an SDK method on an initialized client.
    ///
    /// `context` names what is being fetched and is included in error messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the core reports an error.
    pub fn invoke(
        &mut self,
        client_id: u64,
        method: &str,
        params: &Map<String, Value>,
        context: &str,
    ) -> Result<String, ExportError> {
        let request = serde_json::json!({
            "invocation": {
                "clientId": client_id,
                "parameters": {
                    "name": method,
                    "parameters": params,
                }
            }
        });

        tracing::trace!(method, context, "Invoking 1Password SDK method");
        let result = self
            .plugin
            .call::<_, String>("invoke", request.to_string())
            .map_err(|e| core_error(format!("{method} failed for {context}: {e}")))?;

        check_error(&result, method, context)?;
        Ok(result)
    }

    /// Release a client. Errors are ignored.
    pub fn release_client(&mut self, client_id: u64) {
        let _ = self
            .plugin
            .call::<_, String>("release_client", client_id.to_string());
    }
}

/// Read a client ID from an `init_client` response
fn parse_client_id(response: &str) -> Result<u64, ExportError> {
    let value: Value = serde_json::from_str(response)
        .map_err(|e| core_error(format!("Failed to parse init_client response: {e}")))?;

    if let Some(error) = value.get("error") {
        return Err(core_error(format!("1Password client init failed: {error}")));
    }

    value
        .as_u64()
        .or_else(|| value.get("clientId").and_then(Value::as_u64))
        .ok_or_else(|| core_error("No client ID in init_client response"))
}

/// Turn an `{"error": ...}` invoke response into an error
fn check_error(response: &str, method: &str, context: &str) -> Result<(), ExportError> {
    let Ok(value) = serde_json::from_str::<Value>(response) else {
        return Ok(());
    };

    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| error.to_string(), str::to_string);
        return Err(core_error(format!("{method} failed for {context}: {message}")));
    }

    Ok(())
}
