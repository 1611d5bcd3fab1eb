//! Configuration service implementation.
//!
//! Loads [`ClientConfig`] from `~/.config/casa/config.toml`, then applies
//! environment variables and explicit overrides on top, in that order.

use crate::paths::CasaPaths;
use casa_core::config::ClientConfig;
use casa_core::error::{CasaError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides the base URL from the file.
pub const ENV_BASE_URL: &str = "CASA_BASE_URL";
/// Overrides the request timeout (seconds) from the file.
pub const ENV_TIMEOUT_SECS: &str = "CASA_TIMEOUT_SECS";

/// Values supplied explicitly by the caller, e.g. command-line flags.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

/// Loads the client configuration from a TOML file.
#[derive(Debug, Clone)]
pub struct ConfigService {
    config_path: PathBuf,
}

impl ConfigService {
    /// Uses the platform config directory.
    pub fn new() -> Result<Self> {
        let config_path = CasaPaths::default()
            .config_file()
            .map_err(|e| CasaError::config(e.to_string()))?;
        Ok(Self { config_path })
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Reads the file, then applies environment variables and `overrides`.
    pub fn load(&self, overrides: &ConfigOverrides) -> Result<ClientConfig> {
        let mut config = self.load_file()?;
        apply_env(&mut config, |key| std::env::var(key).ok())?;
        apply_overrides(&mut config, overrides);
        tracing::debug!(
            "Loaded config from {:?}: base_url={}",
            self.config_path,
            config.base_url
        );
        Ok(config)
    }

    /// Reads only the file. A missing or empty file yields defaults.
    pub fn load_file(&self) -> Result<ClientConfig> {
        if !self.config_path.exists() {
            return Ok(ClientConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)?;
        if content.trim().is_empty() {
            return Ok(ClientConfig::default());
        }

        let config: ClientConfig = toml::from_str(&content)?;
        validate(&config)?;
        Ok(config)
    }
}

fn apply_env(
    config: &mut ClientConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
        config.base_url = base_url;
    }
    if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
        config.request_timeout_secs = raw.trim().parse().map_err(|_| {
            CasaError::config(format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{raw}'"))
        })?;
    }
    validate(config)
}

fn apply_overrides(config: &mut ClientConfig, overrides: &ConfigOverrides) {
    if let Some(base_url) = &overrides.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(timeout) = overrides.request_timeout_secs {
        config.request_timeout_secs = timeout;
    }
}

fn validate(config: &ClientConfig) -> Result<()> {
    if config.base_url.trim().is_empty() {
        return Err(CasaError::config("base_url must not be empty"));
    }
    if config.request_timeout_secs == 0 {
        return Err(CasaError::config("request_timeout_secs must be greater than zero"));
    }
    Ok(())
}
