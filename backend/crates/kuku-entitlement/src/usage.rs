use kuku_core::{LimitName, LimitValue};

use serde::Serialize;

const FULL_PERCENT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageLevel {
    Unlimited,
    Ok,
    NearLimit,
    AtLimit,
}

/// "Used 3 of 5 this month" for one limit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSummary {
    pub limit_name: LimitName,
    pub used: u64,
    pub limit: LimitValue,
    /// Share of the limit consumed, capped at 100. Zero for unlimited.
    pub percentage: f64,
    pub level: UsageLevel,
}

impl UsageSummary {
    pub fn new(
        limit_name: LimitName,
        used: u64,
        limit: LimitValue,
        near_limit_percent: u8,
    ) -> Self {
        let percentage = match limit {
            LimitValue::Unlimited => 0.0,
            LimitValue::Count(0) => FULL_PERCENT,
            LimitValue::Count(max) => (used as f64 * FULL_PERCENT / max as f64).min(FULL_PERCENT),
            LimitValue::Feature(true) => 0.0,
            LimitValue::Feature(false) => FULL_PERCENT,
        };

        let level = if limit.is_unlimited() {
            UsageLevel::Unlimited
        } else if percentage >= FULL_PERCENT {
            UsageLevel::AtLimit
        } else if percentage > f64::from(near_limit_percent) {
            UsageLevel::NearLimit
        } else {
            UsageLevel::Ok
        };

        Self {
            limit_name,
            used,
            limit,
            percentage,
            level,
        }
    }

    /// Actions left before the limit is hit. `None` when not a count limit.
    pub fn remaining(&self) -> Option<u64> {
        self.limit.count().map(|max| max.saturating_sub(self.used))
    }
}

impl std::fmt::Display for UsageSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.limit {
            LimitValue::Count(max) => write!(
                f,
                "{}: {} / {} ({:.0}%)",
                self.limit_name.label(),
                self.used,
                max,
                self.percentage
            ),
            _ => write!(
                f,
                "{}: {} ({})",
                self.limit_name.label(),
                self.used,
                self.limit
            ),
        }
    }
}
