//! Configuration service implementation.
//!
//! Loads `CompassConfig` from `config.toml` in the Compass config directory,
//! creating the file with defaults on first run.

use crate::paths::CompassPaths;
use compass_core::config::CompassConfig;
use compass_core::error::{CompassError, Result};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

/// Overrides the remote service origin.
pub const ENV_API_BASE_URL: &str = "COMPASS_API_BASE_URL";

/// API key used when none is given on the command line. Never persisted.
pub const ENV_API_KEY: &str = "COMPASS_API_KEY";

/// Reads the API key from the environment, ignoring blank values.
pub fn env_api_key() -> Option<String> {
    std::env::var(ENV_API_KEY)
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}

/// Configuration service that loads and caches the client configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    paths: CompassPaths,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<CompassConfig>>>,
}

impl ConfigService {
    /// Creates a new ConfigService. Nothing is read until the first access.
    pub fn new(paths: CompassPaths) -> Self {
        Self {
            paths,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading from file if not cached.
    ///
    /// A missing or unreadable file falls back to defaults; the problem is
    /// logged rather than surfaced.
    pub fn get_config(&self) -> CompassConfig {
        {
            let read_lock = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let loaded = match self.load_config() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("[ConfigService] Falling back to default config: {}", e);
                CompassConfig::default()
            }
        };
        let loaded = apply_env_overrides(loaded, |key| std::env::var(key).ok());

        {
            let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
            *write_lock = Some(loaded.clone());
        }

        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = None;
    }

    /// Writes `config` to disk and refreshes the cache.
    pub fn save_config(&self, config: &CompassConfig) -> Result<()> {
        let path = self.config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(config)?;
        std::fs::write(&path, content)?;

        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = Some(config.clone());
        Ok(())
    }

    pub fn config_path(&self) -> Result<PathBuf> {
        self.paths
            .config_file()
            .map_err(|e| CompassError::config(e.to_string()))
    }

    /// Reads the config file, creating it with defaults when missing.
    fn load_config(&self) -> Result<CompassConfig> {
        let path = self.config_path()?;

        if !path.exists() {
            let default_config = CompassConfig::default();
            self.save_config(&default_config)?;
            tracing::info!("[ConfigService] Created default config at {:?}", path);
            return Ok(default_config);
        }

        let content = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new(CompassPaths::default())
    }
}

/// Applies environment overrides on top of the file configuration.
pub fn apply_env_overrides<F>(mut config: CompassConfig, lookup: F) -> CompassConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_API_BASE_URL).filter(|v| !v.trim().is_empty()) {
        config.api_base_url = url.trim().to_string();
    }
    config
}
