
use crate::App;

use kuku_config::{EntitlementConfig, PredictionConfig};
use kuku_core::{
    NewProfile, PredictionResult, RemoteError, RemoteErrorResult, RemoteStore, Role, Session,
    SessionUser, Subscription, UsageMetric, UserMetadata, UserProfile,
};
use kuku_entitlement::EntitlementService;
use kuku_remote::PredictionClient;
use kuku_session::{
    IdentityCache, MemoryKeyValueStore, RetryPolicy, SessionResolver, TokioDelay,
};

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub(crate) const EMAIL: &str = "wanjiku@farm.example";
pub(crate) const PASSWORD: &str = "s3cret";

/// In-memory backend with one farmer account.
pub(crate) struct FakeRemote {
    pub user_id: Uuid,
    pub session: Mutex<Option<Session>>,
    pub usage: AtomicU64,
    pub profile_missing: AtomicBool,
    pub recorded: Mutex<Vec<PredictionResult>>,
}

impl FakeRemote {
    pub(crate) fn new() -> Self {
        Self {
            user_id: Uuid::new_v4(),
            session: Mutex::new(None),
            usage: AtomicU64::new(0),
            profile_missing: AtomicBool::new(false),
            recorded: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn signed_in(self) -> Self {
        *self.session.lock().unwrap() = Some(self.session_value());
        self
    }

    pub(crate) fn with_usage(self, used: u64) -> Self {
        self.usage.store(used, Ordering::SeqCst);
        self
    }

    /// Account whose profile row never becomes readable.
    pub(crate) fn without_profile(self) -> Self {
        self.profile_missing.store(true, Ordering::SeqCst);
        self
    }

    fn session_value(&self) -> Session {
        Session {
            access_token: "access".to_string(),
            refresh_token: None,
            expires_at: None,
            user: SessionUser {
                id: self.user_id,
                email: Some(EMAIL.to_string()),
                user_metadata: UserMetadata::default(),
            },
        }
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn current_session(&self) -> RemoteErrorResult<Option<Session>> {
        Ok(self.session.lock().unwrap().clone())
    }

    async fn sign_in(&self, email: &str, password: &str) -> RemoteErrorResult<Session> {
        if email != EMAIL || password != PASSWORD {
            return Err(RemoteError::invalid_credentials("Invalid login credentials"));
        }
        let session = self.session_value();
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(session)
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
        *self.session.lock().unwrap() = None;
        Ok(())
    }

    async fn fetch_profile(&self, user_id: Uuid) -> RemoteErrorResult<UserProfile> {
        if self.profile_missing.load(Ordering::SeqCst) {
            return Err(RemoteError::not_found("users row"));
        }
        Ok(UserProfile {
            id: user_id,
            email: EMAIL.to_string(),
            role: Role::Farmer,
            full_name: Some("Wanjiku Kamau".to_string()),
            first_name: None,
            last_name: None,
            phone: None,
            avatar_url: None,
            created_at: None,
            updated_at: None,
        })
    }

    async fn ensure_profile(&self, _profile: &NewProfile) -> RemoteErrorResult<()> {
        Ok(())
    }

    async fn latest_subscription(
        &self,
        _user_id: Uuid,
    ) -> RemoteErrorResult<Option<Subscription>> {
        Ok(None)
    }

    async fn count_usage(
        &self,
        _user_id: Uuid,
        _metric: UsageMetric,
        _since: Option<DateTime<Utc>>,
    ) -> RemoteErrorResult<u64> {
        Ok(self.usage.load(Ordering::SeqCst))
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

/// App over the fake backend. The prediction service URL is unroutable, so
/// any test that reaches it fails loudly.
pub(crate) async fn app_with(remote: FakeRemote) -> (App, Arc<FakeRemote>) {
    let remote = Arc::new(remote);
    let policy = RetryPolicy {
        max_attempts: 1,
        initial_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
        backoff_multiplier: 1.0,
    };
    let resolver = Arc::new(SessionResolver::new(
        remote.clone(),
        IdentityCache::new(Arc::new(MemoryKeyValueStore::new())),
        policy,
        Arc::new(TokioDelay),
    ));
    resolver.bootstrap().await;

    let entitlement = EntitlementService::new(remote.clone(), &EntitlementConfig::default());
    let predictions = PredictionClient::new(&PredictionConfig {
        url: "http://127.0.0.1:1".to_string(),
        max_image_bytes: 1024,
    })
    .unwrap();

    (App::new(resolver, entitlement, predictions), remote)
}
