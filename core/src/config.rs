//! Base-path configuration shared by every resource builder.
//!
//! The process-wide value is written at most once. `install` sets it
//! explicitly; otherwise the first `global` read derives it from
//! `RESOURCE_API_BASE_PATH`, falling back to `DEFAULT_BASE_PATH`.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

pub const BASE_PATH_ENV: &str = "RESOURCE_API_BASE_PATH";
pub const DEFAULT_BASE_PATH: &str = "http://localhost:3000";

static GLOBAL: OnceLock<ClientConfig> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Prefix of every request URL, without a trailing slash.
    #[serde(default = "default_base_path")]
    pub base_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_path: &str) -> Self {
        Self {
            base_path: base_path.trim_end_matches('/').to_string(),
        }
    }

    /// Read the base path from the environment. Unset or blank values fall
    /// back to the default.
    pub fn from_env() -> Self {
        match std::env::var(BASE_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::new(path.trim()),
            _ => Self::default(),
        }
    }
}

fn default_base_path() -> String {
    DEFAULT_BASE_PATH.to_string()
}

/// Set the process-wide configuration. Fails if it was already set or read.
pub fn install(config: ClientConfig) -> Result<()> {
    let base_path = config.base_path.clone();
    GLOBAL.set(config).map_err(|rejected| {
        ApiError::ConfigError(format!(
            "base path already configured as {}; refusing {}",
            global().base_path,
            rejected.base_path
        ))
    })?;
    tracing::debug!(base_path = %base_path, "installed client configuration");
    Ok(())
}

/// The process-wide configuration.
pub fn global() -> &'static ClientConfig {
    GLOBAL.get_or_init(|| {
        let config = ClientConfig::from_env();
        tracing::debug!(base_path = %config.base_path, "client configuration from environment");
        config
    })
}
