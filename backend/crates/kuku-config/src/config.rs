use crate::{
    CONFIG_DIR_ENV, CONFIG_FILENAME, CacheConfig, ConfigError, ConfigErrorResult,
    DEFAULT_CONFIG_DIR_NAME, EntitlementConfig, LoggingConfig, PredictionConfig, RemoteConfig,
    RetryConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub remote: RemoteConfig,
    pub prediction: PredictionConfig,
    pub cache: CacheConfig,
    pub retry: RetryConfig,
    pub entitlement: EntitlementConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config.
    ///
    /// Loading order:
    /// 1. Check for KUKU_CONFIG_DIR env var, else use ./.kuku/
    /// 2. Auto-create config directory if it doesn't exist
    /// 3. Load config.toml if it exists, else use defaults
    /// 4. Apply KUKU_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.clone(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: KUKU_CONFIG_DIR env var > ./.kuku/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(DEFAULT_CONFIG_DIR_NAME))
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.remote.validate()?;
        self.prediction.validate()?;
        self.cache.validate()?;
        self.retry.validate()?;
        self.entitlement.validate()?;

        if let Some(file) = &self.logging.file
            && (Path::new(file).is_absolute() || file.contains(".."))
        {
            return Err(ConfigError::logging(
                "logging.file must be relative and cannot contain '..'",
            ));
        }

        Ok(())
    }

    /// Absolute path of the local cache directory.
    pub fn cache_path(&self) -> ConfigErrorResult<PathBuf> {
        Ok(Self::config_dir()?.join(&self.cache.dir))
    }

    /// Absolute path of the log file, if file logging is configured.
    pub fn log_file_path(&self) -> ConfigErrorResult<Option<PathBuf>> {
        match &self.logging.file {
            Some(file) => Ok(Some(
                Self::config_dir()?.join(&self.logging.dir).join(file),
            )),
            None => Ok(None),
        }
    }

    /// Log configuration summary (NEVER logs the anon key).
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  remote: {} (timeout {}s, key {})",
            self.remote.url,
            self.remote.request_timeout_secs,
            if self.remote.anon_key.is_empty() {
                "missing"
            } else {
                "set"
            }
        );
        info!(
            "  prediction: {} (max image {} bytes)",
            self.prediction.url, self.prediction.max_image_bytes
        );
        info!("  cache: {}", self.cache.dir);
        info!(
            "  retry: attempts={}, delay={}ms, backoff={}x, max={}s",
            self.retry.max_attempts,
            self.retry.delay_ms,
            self.retry.backoff_multiplier,
            self.retry.max_delay_secs
        );
        info!(
            "  entitlement: usage failure={:?}, near limit={}%",
            self.entitlement.usage_failure_policy, self.entitlement.near_limit_percent
        );
        info!(
            "  logging: {} (colored: {})",
            *self.logging.level, self.logging.colored
        );
    }

    fn apply_env_overrides(&mut self) {
        // Remote
        Self::apply_env_string("KUKU_REMOTE_URL", &mut self.remote.url);
        Self::apply_env_string("KUKU_REMOTE_ANON_KEY", &mut self.remote.anon_key);
        Self::apply_env_parse(
            "KUKU_REMOTE_REQUEST_TIMEOUT_SECS",
            &mut self.remote.request_timeout_secs,
        );

        // Prediction
        Self::apply_env_string("KUKU_PREDICTION_URL", &mut self.prediction.url);
        Self::apply_env_parse(
            "KUKU_PREDICTION_MAX_IMAGE_BYTES",
            &mut self.prediction.max_image_bytes,
        );

        // Cache
        Self::apply_env_string("KUKU_CACHE_DIR", &mut self.cache.dir);

        // Retry
        Self::apply_env_parse("KUKU_RETRY_MAX_ATTEMPTS", &mut self.retry.max_attempts);
        Self::apply_env_parse("KUKU_RETRY_DELAY_MS", &mut self.retry.delay_ms);
        Self::apply_env_parse(
            "KUKU_RETRY_BACKOFF_MULTIPLIER",
            &mut self.retry.backoff_multiplier,
        );
        Self::apply_env_parse("KUKU_RETRY_MAX_DELAY_SECS", &mut self.retry.max_delay_secs);

        // Entitlement
        Self::apply_env_parse(
            "KUKU_USAGE_FAILURE_POLICY",
            &mut self.entitlement.usage_failure_policy,
        );
        Self::apply_env_parse(
            "KUKU_NEAR_LIMIT_PERCENT",
            &mut self.entitlement.near_limit_percent,
        );

        // Logging
        Self::apply_env_parse("KUKU_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("KUKU_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("KUKU_LOG_FILE", &mut self.logging.file);
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<String> values
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }
}
