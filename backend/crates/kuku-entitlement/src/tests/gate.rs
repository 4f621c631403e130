use crate::tests::subscription;
use crate::{Decision, EntitlementError, EntitlementGate};

use kuku_core::{LimitName, LimitValue, PlanTier, SubscriptionStatus};

use chrono::Utc;
use googletest::assert_that;
use googletest::prelude::{anything, contains_substring, eq, err, ok};

#[test]
fn given_free_tier_when_under_prediction_limit_then_allowed() {
    let gate = EntitlementGate::for_tier(PlanTier::Free);

    assert!(gate.check_limit("max_predictions", 4));
}

#[test]
fn given_free_tier_when_at_prediction_limit_then_denied() {
    let gate = EntitlementGate::for_tier(PlanTier::Free);

    assert!(!gate.check_limit("max_predictions", 5));
    assert!(!gate.check_limit("maxPredictions", 6));
}

#[test]
fn given_unknown_limit_name_when_check_limit_then_denied_on_every_tier() {
    for tier in PlanTier::ALL {
        let gate = EntitlementGate::for_tier(tier);
        assert!(!gate.check_limit("max_tractors", 0), "{tier} should deny");
    }
}

#[test]
fn given_feature_flag_when_check_then_usage_ignored() {
    let basic = EntitlementGate::for_tier(PlanTier::Basic);
    let free = EntitlementGate::for_tier(PlanTier::Free);

    assert!(basic.check(LimitName::BatchManagement, 1_000));
    assert!(!free.check(LimitName::BatchManagement, 0));
}

#[test]
fn given_premium_tier_when_plan_limits_then_matches_table() {
    let gate = EntitlementGate::for_tier(PlanTier::Premium);
    let limits = gate.plan_limits();

    assert_eq!(limits.max_birds, LimitValue::Count(500));
    assert_eq!(limits.max_predictions, LimitValue::Unlimited);
    assert_eq!(limits.max_batches, LimitValue::Count(50));
    assert_eq!(limits.advanced_analytics, LimitValue::Feature(true));
    assert_eq!(limits.multi_farm, LimitValue::Feature(false));
}

#[test]
fn given_active_subscription_past_end_date_when_for_subscription_then_free() {
    let expired = subscription(PlanTier::Premium, SubscriptionStatus::Active, Some(-1));

    let gate = EntitlementGate::for_subscription(Some(&expired), Utc::now());

    assert_eq!(gate.tier(), PlanTier::Free);
}

#[test]
fn given_active_subscription_in_future_when_for_subscription_then_plan_type() {
    let current = subscription(PlanTier::Basic, SubscriptionStatus::Active, Some(10));

    let gate = EntitlementGate::for_subscription(Some(&current), Utc::now());

    assert_eq!(gate.tier(), PlanTier::Basic);
}

#[test]
fn given_cancelled_subscription_when_for_subscription_then_free() {
    let cancelled = subscription(PlanTier::Enterprise, SubscriptionStatus::Cancelled, None);

    let gate = EntitlementGate::for_subscription(Some(&cancelled), Utc::now());

    assert_eq!(gate.tier(), PlanTier::Free);
}

#[test]
fn given_no_subscription_when_for_subscription_then_free() {
    let gate = EntitlementGate::for_subscription(None, Utc::now());

    assert_eq!(gate.tier(), PlanTier::Free);
}

#[test]
fn given_free_tier_when_upgrade_message_then_names_basic() {
    let gate = EntitlementGate::for_tier(PlanTier::Free);

    let message = gate.upgrade_message("Disease Predictions");

    assert_that!(message, contains_substring("Basic"));
    assert_that!(message, contains_substring("disease predictions"));
}

#[test]
fn given_premium_tier_when_upgrade_message_then_names_enterprise() {
    let gate = EntitlementGate::for_tier(PlanTier::Premium);

    assert_that!(
        gate.upgrade_message("Active Batches"),
        contains_substring("Enterprise")
    );
}

#[test]
fn given_top_tier_when_upgrade_message_then_contact_sales() {
    let gate = EntitlementGate::for_tier(PlanTier::Enterprise);

    assert_that!(
        gate.upgrade_message("Birds Tracked"),
        contains_substring("Contact sales")
    );
}

#[test]
fn given_denied_check_when_decide_then_carries_upgrade_message() {
    let gate = EntitlementGate::for_tier(PlanTier::Basic);

    let decision = gate.decide(LimitName::MaxBatches, 10);

    match decision {
        Decision::Denied {
            limit,
            tier,
            upgrade_message,
        } => {
            assert_eq!(limit, LimitName::MaxBatches);
            assert_eq!(tier, PlanTier::Basic);
            assert_that!(upgrade_message, contains_substring("Premium"));
        }
        other => panic!("expected denial, got {other:?}"),
    }
}

#[test]
fn given_limit_names_when_parse_limit_then_known_ok_unknown_err() {
    assert_that!(
        EntitlementGate::parse_limit("max_birds"),
        ok(eq(&LimitName::MaxBirds))
    );
    assert_that!(
        EntitlementGate::parse_limit("apiAccess"),
        ok(eq(&LimitName::ApiAccess))
    );

    let result = EntitlementGate::parse_limit("max_tractors");
    assert_that!(result, err(anything()));
    assert!(matches!(result, Err(EntitlementError::UnknownLimit { .. })));
}
