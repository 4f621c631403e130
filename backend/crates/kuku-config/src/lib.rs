mod cache_config;
mod config;
mod entitlement_config;
mod error;
mod log_level;
mod logging_config;
mod prediction_config;
mod remote_config;
mod retry_config;

pub use cache_config::CacheConfig;
pub use config::Config;
pub use entitlement_config::{EntitlementConfig, UsageFailurePolicy};
pub use error::{ConfigError, ConfigErrorResult};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use prediction_config::PredictionConfig;
pub use remote_config::RemoteConfig;
pub use retry_config::RetryConfig;

#[cfg(test)]
mod tests;

pub const CONFIG_DIR_ENV: &str = "KUKU_CONFIG_DIR";
const DEFAULT_CONFIG_DIR_NAME: &str = ".kuku";
const CONFIG_FILENAME: &str = "config.toml";

const DEFAULT_CACHE_DIRECTORY: &str = "cache";
const DEFAULT_PREDICTION_URL: &str = "http://localhost:8000";
const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "log";
const DEFAULT_LOG_COLORED: bool = true;
