use crate::{PlanTier, Subscription, SubscriptionStatus};

use std::str::FromStr;

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
}

fn subscription(
    plan_type: PlanTier,
    status: SubscriptionStatus,
    end_date: Option<DateTime<Utc>>,
) -> Subscription {
    Subscription {
        id: Uuid::new_v4(),
        farmer_id: Uuid::new_v4(),
        plan_type,
        status,
        start_date: now() - Duration::days(30),
        end_date,
        amount: 35.0,
        created_at: now() - Duration::days(30),
    }
}

#[test]
fn given_no_subscription_when_effective_tier_then_free() {
    assert_eq!(Subscription::effective_tier(None, now()), PlanTier::Free);
}

#[test]
fn given_active_unexpired_subscription_when_effective_tier_then_plan_type() {
    let sub = subscription(
        PlanTier::Premium,
        SubscriptionStatus::Active,
        Some(now() + Duration::days(3)),
    );
    assert_eq!(Subscription::effective_tier(Some(&sub), now()), PlanTier::Premium);
}

#[test]
fn given_active_subscription_with_past_end_date_when_effective_tier_then_free() {
    let sub = subscription(
        PlanTier::Enterprise,
        SubscriptionStatus::Active,
        Some(now() - Duration::seconds(1)),
    );
    assert_eq!(Subscription::effective_tier(Some(&sub), now()), PlanTier::Free);
}

#[test]
fn given_open_ended_active_subscription_when_effective_tier_then_plan_type() {
    let sub = subscription(PlanTier::Basic, SubscriptionStatus::Active, None);
    assert_eq!(Subscription::effective_tier(Some(&sub), now()), PlanTier::Basic);
}

#[test]
fn given_cancelled_subscription_when_effective_tier_then_free() {
    let sub = subscription(
        PlanTier::Premium,
        SubscriptionStatus::Cancelled,
        Some(now() + Duration::days(10)),
    );
    assert_eq!(Subscription::effective_tier(Some(&sub), now()), PlanTier::Free);
}

#[test]
fn given_partial_day_left_when_days_remaining_then_rounds_up() {
    let sub = subscription(
        PlanTier::Basic,
        SubscriptionStatus::Active,
        Some(now() + Duration::hours(36)),
    );
    assert_eq!(sub.days_remaining(now()), Some(2));
}

#[test]
fn given_lowercase_status_when_parsed_then_accepted() {
    assert_eq!(
        SubscriptionStatus::from_str("active").unwrap(),
        SubscriptionStatus::Active
    );
    assert_eq!(
        SubscriptionStatus::from_str("Cancelled").unwrap(),
        SubscriptionStatus::Cancelled
    );
    assert!(SubscriptionStatus::from_str("paused").is_err());
}

#[test]
fn given_remote_row_json_when_deserialize_then_parses() {
    let json = r#"{
        "id": "550e8400-e29b-41d4-a716-446655440000",
        "farmer_id": "550e8400-e29b-41d4-a716-446655440001",
        "plan_type": "BASIC",
        "status": "active",
        "start_date": "2025-06-01T00:00:00Z",
        "end_date": null,
        "amount": 15,
        "created_at": "2025-06-01T00:00:00Z"
    }"#;

    let sub: Subscription = serde_json::from_str(json).unwrap();
    assert_eq!(sub.plan_type, PlanTier::Basic);
    assert_eq!(sub.status, SubscriptionStatus::Active);
    assert!(sub.end_date.is_none());
}
