#![allow(clippy::result_large_err)]

use super::LaunchpadConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use url::Url;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration rules
    pub fn validate(config: &LaunchpadConfig) -> Result<(), AppError> {
        Self::validate_url("api.base_url", &config.api.base_url)?;
        Self::validate_url("api.builder_url", &config.api.builder_url)?;
        Ok(())
    }

    fn validate_url(key: &str, value: &str) -> Result<(), AppError> {
        let parsed = Url::parse(value).map_err(|err| {
            AppError::new(
                ErrorCategory::ValidationError,
                format!("invalid {}: {}", key, err),
            )
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                format!("{} must use http or https", key),
            ));
        }
        Ok(())
    }
}
