use crate::{ConfigError, ConfigErrorResult, DEFAULT_PREDICTION_URL};

use serde::Deserialize;

pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;
pub const MAX_MAX_IMAGE_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Base URL of the disease-prediction service
    pub url: String,
    /// Images above this size are rejected before upload
    pub max_image_bytes: u64,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            url: String::from(DEFAULT_PREDICTION_URL),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl PredictionConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ConfigError::config(format!(
                "prediction.url must start with http:// or https://, got {}",
                self.url
            )));
        }

        if self.max_image_bytes == 0 || self.max_image_bytes > MAX_MAX_IMAGE_BYTES {
            return Err(ConfigError::config(format!(
                "prediction.max_image_bytes must be 1-{}, got {}",
                MAX_MAX_IMAGE_BYTES, self.max_image_bytes
            )));
        }

        Ok(())
    }
}
