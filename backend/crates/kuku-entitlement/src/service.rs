use crate::{Decision, EntitlementError, EntitlementErrorResult, EntitlementGate, UsageSummary};

use kuku_config::{EntitlementConfig, UsageFailurePolicy};
use kuku_core::{LimitName, LimitValue, PlanTier, PredictionResult, RemoteStore};

use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};
use uuid::Uuid;

/// Live entitlement checks against the remote subscription and usage
/// records. Nothing is cached: the tier and usage are fetched per call.
pub struct EntitlementService {
    remote: Arc<dyn RemoteStore>,
    usage_failure_policy: UsageFailurePolicy,
    near_limit_percent: u8,
}

impl EntitlementService {
    pub fn new(remote: Arc<dyn RemoteStore>, config: &EntitlementConfig) -> Self {
        Self {
            remote,
            usage_failure_policy: config.usage_failure_policy,
            near_limit_percent: config.near_limit_percent,
        }
    }

    pub fn usage_failure_policy(&self) -> UsageFailurePolicy {
        self.usage_failure_policy
    }

    /// Tier from the latest subscription. A failed lookup grants FREE.
    pub async fn current_tier(&self, user_id: Uuid) -> PlanTier {
        self.gate(user_id).await.tier()
    }

    pub async fn gate(&self, user_id: Uuid) -> EntitlementGate {
        match self.remote.latest_subscription(user_id).await {
            Ok(latest) => EntitlementGate::for_subscription(latest.as_ref(), Utc::now()),
            Err(e) => {
                warn!("Subscription lookup for {user_id} failed, assuming FREE: {e}");
                EntitlementGate::for_tier(PlanTier::Free)
            }
        }
    }

    /// Decide whether `user_id` may use `limit` once more.
    ///
    /// `known_usage` skips the remote count. Limits that are unlimited or
    /// plain feature flags never need a count.
    pub async fn authorize(
        &self,
        user_id: Uuid,
        limit: LimitName,
        known_usage: Option<u64>,
    ) -> Decision {
        let gate = self.gate(user_id).await;

        let decision = match (gate.limit(limit), known_usage) {
            (LimitValue::Unlimited | LimitValue::Feature(_), _) => gate.decide(limit, 0),
            (LimitValue::Count(_), Some(usage)) => gate.decide(limit, usage),
            (LimitValue::Count(_), None) => match self.usage(user_id, limit).await {
                Ok(usage) => gate.decide(limit, usage),
                Err(e) => self.on_usage_failure(limit, &e.to_string()),
            },
        };

        debug!(
            "{} on the {} plan for {user_id}: {:?}",
            limit,
            gate.tier(),
            decision
        );
        decision
    }

    /// Live count backing `limit`, scoped to the current window.
    pub async fn usage(&self, user_id: Uuid, limit: LimitName) -> EntitlementErrorResult<u64> {
        let Some(metric) = limit.usage_metric() else {
            return Err(EntitlementError::untracked_usage(limit));
        };

        let since = metric.window_start(Utc::now());
        let used = self.remote.count_usage(user_id, metric, since).await?;
        Ok(used)
    }

    /// Usage summaries for every count limit the remote store can measure.
    /// Limits whose count cannot be fetched are left out.
    pub async fn usage_summaries(&self, user_id: Uuid) -> Vec<UsageSummary> {
        let gate = self.gate(user_id).await;
        let mut summaries = Vec::new();

        for limit in LimitName::ALL {
            if limit.usage_metric().is_none() {
                continue;
            }
            match self.usage(user_id, limit).await {
                Ok(used) => {
                    summaries.push(gate.usage_summary(limit, used, self.near_limit_percent))
                }
                Err(e) => warn!("Skipping {limit} usage: {e}"),
            }
        }

        summaries
    }

    /// Record a completed prediction so the monthly counter advances.
    pub async fn record_prediction(
        &self,
        user_id: Uuid,
        result: &PredictionResult,
    ) -> EntitlementErrorResult<()> {
        self.remote.record_prediction(user_id, result).await?;
        info!("Recorded prediction '{}' for {user_id}", result.prediction);
        Ok(())
    }

    fn on_usage_failure(&self, limit: LimitName, error: &str) -> Decision {
        match self.usage_failure_policy {
            UsageFailurePolicy::FailClosed => {
                warn!("Could not verify {limit} usage, denying: {error}");
                Decision::Unverified {
                    limit,
                    message: format!(
                        "We couldn't check your {} usage right now. Please try again.",
                        limit.label().to_lowercase()
                    ),
                }
            }
            UsageFailurePolicy::FailOpen => {
                warn!("Could not verify {limit} usage, allowing unmetered: {error}");
                Decision::Allowed
            }
        }
    }
}

impl std::fmt::Debug for EntitlementService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitlementService")
            .field("usage_failure_policy", &self.usage_failure_policy)
            .field("near_limit_percent", &self.near_limit_percent)
            .finish_non_exhaustive()
    }
}
