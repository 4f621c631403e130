//! Subscription record and the tier derived from it.

use crate::{PlanTier, SubscriptionStatus};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Row of the remote `subscriptions` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub plan_type: PlanTier,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Active and not past its end date. Expiry wins over the stored status.
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active
            && self.end_date.is_none_or(|end_date| end_date > now)
    }

    /// Whole days until the end date, rounded up. `None` for open-ended plans.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        self.end_date.map(|end_date| {
            let secs = (end_date - now).num_seconds();
            secs.div_euclid(SECONDS_PER_DAY) + i64::from(secs.rem_euclid(SECONDS_PER_DAY) != 0)
        })
    }

    /// Tier granted by the latest subscription record, if any.
    pub fn effective_tier(latest: Option<&Subscription>, now: DateTime<Utc>) -> PlanTier {
        match latest {
            Some(subscription) if subscription.is_current(now) => subscription.plan_type,
            _ => PlanTier::Free,
        }
    }
}
