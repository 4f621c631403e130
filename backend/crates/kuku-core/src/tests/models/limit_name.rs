use crate::{CoreError, LimitName, UsageMetric};

use std::str::FromStr;

#[test]
fn given_snake_and_camel_case_when_from_str_then_same_limit() {
    assert_eq!(
        LimitName::from_str("max_predictions").unwrap(),
        LimitName::MaxPredictions
    );
    assert_eq!(
        LimitName::from_str("maxPredictions").unwrap(),
        LimitName::MaxPredictions
    );
    assert_eq!(
        LimitName::from_str("inventory-management").unwrap(),
        LimitName::InventoryManagement
    );
}

#[test]
fn given_unknown_name_when_from_str_then_unknown_limit_error() {
    match LimitName::from_str("max_cows") {
        Err(CoreError::UnknownLimit { value, .. }) => assert_eq!(value, "max_cows"),
        other => panic!("Expected UnknownLimit, got {other:?}"),
    }
}

#[test]
fn given_every_limit_when_as_str_then_round_trips() {
    for name in LimitName::ALL {
        assert_eq!(LimitName::from_str(name.as_str()).unwrap(), name);
    }
}

#[test]
fn given_count_limits_when_usage_metric_then_remote_counters_mapped() {
    assert_eq!(
        LimitName::MaxPredictions.usage_metric(),
        Some(UsageMetric::MonthlyPredictions)
    );
    assert_eq!(
        LimitName::MaxBatches.usage_metric(),
        Some(UsageMetric::ActiveBatches)
    );
    assert_eq!(LimitName::MaxBirds.usage_metric(), None);
    assert_eq!(LimitName::ApiAccess.usage_metric(), None);
}
