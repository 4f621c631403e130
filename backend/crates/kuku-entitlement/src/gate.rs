use crate::{Decision, EntitlementError, EntitlementErrorResult, UsageSummary};

use kuku_core::{LimitName, LimitValue, PlanLimits, PlanTier, Subscription};

use std::str::FromStr;

use chrono::{DateTime, Utc};
use log::warn;

/// Allow/deny decisions for one plan tier.
///
/// Cheap to build; callers derive a fresh gate from the latest subscription
/// instead of holding on to one across an upgrade or expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitlementGate {
    tier: PlanTier,
    limits: PlanLimits,
}

impl EntitlementGate {
    pub fn for_tier(tier: PlanTier) -> Self {
        Self {
            tier,
            limits: tier.limits(),
        }
    }

    /// Gate for the tier granted by the latest subscription record.
    /// Expired, cancelled or missing records grant FREE.
    pub fn for_subscription(latest: Option<&Subscription>, now: DateTime<Utc>) -> Self {
        Self::for_tier(Subscription::effective_tier(latest, now))
    }

    pub fn tier(&self) -> PlanTier {
        self.tier
    }

    pub fn plan_limits(&self) -> &PlanLimits {
        &self.limits
    }

    pub fn limit(&self, limit: LimitName) -> LimitValue {
        self.limits.get(limit)
    }

    /// Lookup by name, as used by callers holding a raw string.
    ///
    /// An unknown name is denied and logged.
    pub fn check_limit(&self, limit_name: &str, current_usage: u64) -> bool {
        match Self::parse_limit(limit_name) {
            Ok(limit) => self.check(limit, current_usage),
            Err(_) => {
                warn!(
                    "Unknown limit '{limit_name}' checked on the {} plan, denying",
                    self.tier
                );
                false
            }
        }
    }

    /// Unlimited always passes, counts pass while `current_usage < max`,
    /// feature flags ignore usage.
    pub fn check(&self, limit: LimitName, current_usage: u64) -> bool {
        self.limits.get(limit).permits(current_usage)
    }

    /// `check` as a [`Decision`], with the upgrade prompt filled in on denial.
    pub fn decide(&self, limit: LimitName, current_usage: u64) -> Decision {
        if self.check(limit, current_usage) {
            Decision::Allowed
        } else {
            Decision::Denied {
                limit,
                tier: self.tier,
                upgrade_message: self.upgrade_message(limit.label()),
            }
        }
    }

    /// Prompt naming the next tier up, or a contact-sales message at the top.
    pub fn upgrade_message(&self, feature_label: &str) -> String {
        match self.tier.next() {
            Some(next) => format!(
                "Upgrade to the {} plan (${}/month) to get more {}.",
                next.label(),
                next.monthly_price(),
                feature_label.to_lowercase()
            ),
            None => format!(
                "You are on the {} plan. Contact sales to raise your {} limit.",
                self.tier.label(),
                feature_label.to_lowercase()
            ),
        }
    }

    pub fn usage_summary(
        &self,
        limit: LimitName,
        used: u64,
        near_limit_percent: u8,
    ) -> UsageSummary {
        UsageSummary::new(limit, used, self.limits.get(limit), near_limit_percent)
    }

    pub fn parse_limit(limit_name: &str) -> EntitlementErrorResult<LimitName> {
        LimitName::from_str(limit_name).map_err(|_| EntitlementError::unknown_limit(limit_name))
    }
}
