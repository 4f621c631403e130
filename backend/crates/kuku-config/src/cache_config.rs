use crate::{ConfigError, ConfigErrorResult, DEFAULT_CACHE_DIRECTORY};

use std::path::Path;

use serde::Deserialize;

/// Location of the local key-value cache, relative to the config dir.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: String::from(DEFAULT_CACHE_DIRECTORY),
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.dir.trim().is_empty() {
            return Err(ConfigError::cache("cache.dir cannot be empty"));
        }

        if Path::new(&self.dir).is_absolute() || self.dir.contains("..") {
            return Err(ConfigError::cache(
                "cache.dir must be relative and cannot contain '..'",
            ));
        }

        Ok(())
    }
}
