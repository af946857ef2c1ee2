//! Environment loading for [`SyncConfig`].

use anyhow::{Context, Result};

use crate::domain::SyncConfig;

/// Prefix of every environment variable read by [`SyncConfig::from_env`].
pub const ENV_PREFIX: &str = "CONSTRUCT_SYNC_";

impl SyncConfig {
    /// Load from `CONSTRUCT_SYNC_*` environment variables.
    ///
    /// List values (`CONSTRUCT_SYNC_ALLOWED_HOSTS`) are comma-separated.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or the resulting
    /// configuration is invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Same as [`SyncConfig::from_env`] over an explicit variable set.
    ///
    /// # Errors
    ///
    /// See [`SyncConfig::from_env`].
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::prefixed(ENV_PREFIX)
            .from_iter(vars)
            .with_context(|| format!("failed to load sync config from {ENV_PREFIX}* env vars"))?;
        config
            .validate()
            .map_err(|msg| anyhow::anyhow!("invalid sync config: {msg}"))?;
        Ok(config)
    }
}
