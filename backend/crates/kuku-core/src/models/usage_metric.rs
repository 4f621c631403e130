use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Usage counters the remote store can compute on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageMetric {
    /// Predictions recorded since the start of the current calendar month.
    MonthlyPredictions,
    /// Batches currently in the ACTIVE state.
    ActiveBatches,
}

impl UsageMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MonthlyPredictions => "monthly_predictions",
            Self::ActiveBatches => "active_batches",
        }
    }

    /// Lower bound of the counting window, `None` when the count is not
    /// time-scoped.
    pub fn window_start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::MonthlyPredictions => Utc
                .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
                .single(),
            Self::ActiveBatches => None,
        }
    }
}

impl std::fmt::Display for UsageMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
