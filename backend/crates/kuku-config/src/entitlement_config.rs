use crate::{ConfigError, ConfigErrorResult};

use std::str::FromStr;

use serde::Deserialize;

pub const MIN_NEAR_LIMIT_PERCENT: u8 = 1;
pub const MAX_NEAR_LIMIT_PERCENT: u8 = 99;
pub const DEFAULT_NEAR_LIMIT_PERCENT: u8 = 80;

/// What the gate does when the live usage count cannot be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UsageFailurePolicy {
    /// Deny and ask the user to retry.
    #[default]
    FailClosed,
    /// Allow the action unmetered.
    FailOpen,
}

impl FromStr for UsageFailurePolicy {
    type Err = ConfigError;

    #[track_caller]
    fn from_str(s: &str) -> ConfigErrorResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "fail_closed" | "closed" => Ok(Self::FailClosed),
            "fail_open" | "open" => Ok(Self::FailOpen),
            _ => Err(ConfigError::config(format!(
                "entitlement.usage_failure_policy must be fail_closed or fail_open, got {s}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EntitlementConfig {
    pub usage_failure_policy: UsageFailurePolicy,
    /// Usage percentage above which a limit is reported as nearly reached
    pub near_limit_percent: u8,
}

impl Default for EntitlementConfig {
    fn default() -> Self {
        Self {
            usage_failure_policy: UsageFailurePolicy::default(),
            near_limit_percent: DEFAULT_NEAR_LIMIT_PERCENT,
        }
    }
}

impl EntitlementConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.near_limit_percent < MIN_NEAR_LIMIT_PERCENT
            || self.near_limit_percent > MAX_NEAR_LIMIT_PERCENT
        {
            return Err(ConfigError::config(format!(
                "entitlement.near_limit_percent must be {}-{}, got {}",
                MIN_NEAR_LIMIT_PERCENT, MAX_NEAR_LIMIT_PERCENT, self.near_limit_percent
            )));
        }

        Ok(())
    }
}
