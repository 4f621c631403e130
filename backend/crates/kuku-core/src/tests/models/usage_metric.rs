use crate::UsageMetric;

use chrono::{TimeZone, Utc};

#[test]
fn given_mid_month_when_window_start_then_first_of_month_midnight() {
    let now = Utc.with_ymd_and_hms(2025, 2, 17, 9, 30, 0).unwrap();
    assert_eq!(
        UsageMetric::MonthlyPredictions.window_start(now),
        Some(Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap())
    );
}

#[test]
fn given_active_batches_when_window_start_then_unscoped() {
    assert_eq!(UsageMetric::ActiveBatches.window_start(Utc::now()), None);
}
