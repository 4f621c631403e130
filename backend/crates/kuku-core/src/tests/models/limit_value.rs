use crate::LimitValue;

use proptest::prelude::*;

#[test]
fn given_count_limit_when_usage_reaches_bound_then_denied() {
    let limit = LimitValue::Count(5);
    assert!(limit.permits(4));
    assert!(!limit.permits(5));
}

#[test]
fn given_zero_count_when_permits_then_always_denied() {
    assert!(!LimitValue::Count(0).permits(0));
}

#[test]
fn given_feature_flag_when_permits_then_ignores_usage() {
    assert!(LimitValue::Feature(true).permits(u64::MAX));
    assert!(!LimitValue::Feature(false).permits(0));
}

#[test]
fn given_sentinel_json_when_deserialize_then_unlimited() {
    let value: LimitValue = serde_json::from_str("-1").unwrap();
    assert_eq!(value, LimitValue::Unlimited);

    let value: LimitValue = serde_json::from_str("25").unwrap();
    assert_eq!(value, LimitValue::Count(25));

    let value: LimitValue = serde_json::from_str("true").unwrap();
    assert_eq!(value, LimitValue::Feature(true));
}

#[test]
fn given_other_negative_json_when_deserialize_then_error() {
    assert!(serde_json::from_str::<LimitValue>("-2").is_err());
}

proptest! {
    #[test]
    fn given_unlimited_when_any_usage_then_permits(usage in any::<u64>()) {
        prop_assert!(LimitValue::Unlimited.permits(usage));
    }

    #[test]
    fn given_denied_usage_when_usage_grows_then_still_denied(
        max in 0u64..1_000,
        usage in 0u64..2_000,
        extra in 0u64..1_000_000,
    ) {
        let limit = LimitValue::Count(max);
        if !limit.permits(usage) {
            prop_assert!(!limit.permits(usage + extra));
        }
    }
}
