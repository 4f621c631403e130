use crate::{LimitName, LimitValue, PlanTier};

use std::str::FromStr;

#[test]
fn given_tiers_when_compared_then_ordered_by_entitlement() {
    assert!(PlanTier::Free < PlanTier::Basic);
    assert!(PlanTier::Basic < PlanTier::Premium);
    assert!(PlanTier::Premium < PlanTier::Enterprise);
}

#[test]
fn given_tier_when_next_then_returns_tier_above() {
    assert_eq!(PlanTier::Free.next(), Some(PlanTier::Basic));
    assert_eq!(PlanTier::Premium.next(), Some(PlanTier::Enterprise));
    assert_eq!(PlanTier::Enterprise.next(), None);
}

#[test]
fn given_current_tier_when_can_upgrade_to_then_only_higher_tiers() {
    assert!(PlanTier::Basic.can_upgrade_to(PlanTier::Premium));
    assert!(!PlanTier::Basic.can_upgrade_to(PlanTier::Basic));
    assert!(!PlanTier::Basic.can_upgrade_to(PlanTier::Free));
}

#[test]
fn given_lowercase_tier_when_from_str_then_parses() {
    assert_eq!(PlanTier::from_str("premium").unwrap(), PlanTier::Premium);
    assert!(PlanTier::from_str("gold").is_err());
}

#[test]
fn given_free_tier_when_limits_then_matches_catalogue() {
    let limits = PlanTier::Free.limits();
    assert_eq!(limits.max_birds, LimitValue::Count(10));
    assert_eq!(limits.max_predictions, LimitValue::Count(5));
    assert_eq!(limits.batch_management, LimitValue::Feature(false));
}

#[test]
fn given_premium_tier_when_limits_then_predictions_unlimited() {
    let limits = PlanTier::Premium.limits();
    assert_eq!(limits.get(LimitName::MaxPredictions), LimitValue::Unlimited);
    assert_eq!(limits.get(LimitName::MaxBirds), LimitValue::Count(500));
}

#[test]
fn given_any_limit_when_tier_increases_then_entitlement_never_shrinks() {
    for pair in PlanTier::ALL.windows(2) {
        let lower = pair[0].limits();
        let higher = pair[1].limits();
        for name in LimitName::ALL {
            for usage in [0, 1, 5, 49, 50, 499, 10_000] {
                if lower.get(name).permits(usage) {
                    assert!(
                        higher.get(name).permits(usage),
                        "{name} at usage {usage} allowed on {} but denied on {}",
                        pair[0],
                        pair[1]
                    );
                }
            }
        }
    }
}

#[test]
fn given_limits_when_serialized_then_unlimited_is_sentinel() {
    let json = serde_json::to_value(PlanTier::Enterprise.limits()).unwrap();
    assert_eq!(json["max_birds"], -1);
    assert_eq!(json["api_access"], true);

    let json = serde_json::to_value(PlanTier::Free.limits()).unwrap();
    assert_eq!(json["max_predictions"], 5);
}
