#![allow(clippy::result_large_err)]

use super::LaunchpadConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "LAUNCHPAD_CONFIG";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Resolve the config file location: `LAUNCHPAD_CONFIG`, else
    /// `<config_dir>/launchpad/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = env::var(CONFIG_ENV) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        dirs_next::config_dir().map(|dir| dir.join("launchpad").join("config.toml"))
    }

    /// Load config from the default location.
    /// Environment variables override config file values.
    pub fn load() -> Result<LaunchpadConfig, AppError> {
        let path = Self::default_path();
        Self::load_with_overrides(path.as_deref())
    }

    /// Load config from `path` (if any) and apply environment overrides.
    pub fn load_with_overrides(path: Option<&Path>) -> Result<LaunchpadConfig, AppError> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?.unwrap_or_default(),
            None => LaunchpadConfig::default(),
        };

        Self::apply_env_overrides(&mut config);
        super::ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Load config from specific file path
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<LaunchpadConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let config: LaunchpadConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ValidationError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
        })?;

        Ok(Some(config))
    }

    fn apply_env_overrides(config: &mut LaunchpadConfig) {
        if let Ok(url) = env::var("LAUNCHPAD_API_URL") {
            if !url.trim().is_empty() {
                config.api.base_url = url;
            }
        }

        if let Ok(url) = env::var("LAUNCHPAD_BUILDER_URL") {
            if !url.trim().is_empty() {
                config.api.builder_url = url;
            }
        }
    }
}
