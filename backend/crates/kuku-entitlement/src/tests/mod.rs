mod gate;

use kuku_core::{
    NewProfile, PlanTier, PredictionResult, RemoteError, RemoteErrorResult, RemoteStore, Session,
    Subscription, SubscriptionStatus, UsageMetric, UserMetadata, UserProfile,
};

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Remote store serving a fixed subscription and usage count.
#[derive(Default)]
pub(crate) struct FakeRemote {
    pub subscription: Mutex<Option<RemoteErrorResult<Option<Subscription>>>>,
    pub usage: Mutex<Option<RemoteErrorResult<u64>>>,
    pub usage_calls: AtomicU32,
    pub usage_since: Mutex<Option<Option<DateTime<Utc>>>>,
    pub recorded: Mutex<Vec<PredictionResult>>,
}

impl FakeRemote {
    pub(crate) fn with(subscription: Option<Subscription>, usage: RemoteErrorResult<u64>) -> Self {
        let remote = Self::default();
        *remote.subscription.lock().unwrap() = Some(Ok(subscription));
        *remote.usage.lock().unwrap() = Some(usage);
        remote
    }

    pub(crate) fn usage_count_calls(&self) -> u32 {
        self.usage_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn current_session(&self) -> RemoteErrorResult<Option<Session>> {
        Ok(None)
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> RemoteErrorResult<Session> {
        Err(RemoteError::invalid_credentials("not supported"))
    }

    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        _metadata: &UserMetadata,
    ) -> RemoteErrorResult<Option<Session>> {
        Ok(None)
    }

    async fn sign_out(&self) -> RemoteErrorResult<()> {
        Ok(())
    }

    async fn fetch_profile(&self, _user_id: Uuid) -> RemoteErrorResult<UserProfile> {
        Err(RemoteError::not_found("users row"))
    }

    async fn ensure_profile(&self, _profile: &NewProfile) -> RemoteErrorResult<()> {
        Ok(())
    }

    async fn latest_subscription(
        &self,
        _user_id: Uuid,
    ) -> RemoteErrorResult<Option<Subscription>> {
        self.subscription.lock().unwrap().take().unwrap_or(Ok(None))
    }

    async fn count_usage(
        &self,
        _user_id: Uuid,
        _metric: UsageMetric,
        since: Option<DateTime<Utc>>,
    ) -> RemoteErrorResult<u64> {
        self.usage_calls.fetch_add(1, Ordering::SeqCst);
        *self.usage_since.lock().unwrap() = Some(since);
        match self.usage.lock().unwrap().as_ref() {
            Some(Ok(count)) => Ok(*count),
            Some(Err(_)) => Err(RemoteError::network("usage query timed out")),
            None => Ok(0),
        }
    }

    async fn record_prediction(
        &self,
        _user_id: Uuid,
        result: &PredictionResult,
    ) -> RemoteErrorResult<()> {
        self.recorded.lock().unwrap().push(result.clone());
        Ok(())
    }
}

pub(crate) fn subscription(
    plan_type: PlanTier,
    status: SubscriptionStatus,
    end_in_days: Option<i64>,
) -> Subscription {
    let now = Utc::now();
    Subscription {
        id: Uuid::new_v4(),
        farmer_id: Uuid::new_v4(),
        plan_type,
        status,
        start_date: now - Duration::days(30),
        end_date: end_in_days.map(|days| now + Duration::days(days)),
        amount: f64::from(plan_type.monthly_price()),
        created_at: now - Duration::days(30),
    }
}
