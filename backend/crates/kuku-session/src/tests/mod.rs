
use crate::{Delay, IdentityCache, MemoryKeyValueStore, RetryPolicy, SessionResolver};

use kuku_core::{
    NewProfile, PredictionResult, RemoteError, RemoteErrorResult, RemoteStore, Role, Session,
    SessionUser, Subscription, UsageMetric, UserMetadata, UserProfile,
};

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::oneshot;
use uuid::Uuid;

/// One scripted response of `fetch_profile`.
pub(crate) enum FetchStep {
    Respond(RemoteErrorResult<UserProfile>),
    /// Signal `started`, then wait for the test to hand over the response.
    Gated {
        started: oneshot::Sender<()>,
        release: oneshot::Receiver<RemoteErrorResult<UserProfile>>,
    },
}

/// Scripted remote store. Unscripted profile fetches report a missing row.
#[derive(Default)]
pub(crate) struct FakeRemote {
    pub session: Mutex<Option<Session>>,
    pub session_error: Mutex<Option<RemoteError>>,
    pub fetch_steps: Mutex<VecDeque<FetchStep>>,
    pub fetch_calls: AtomicU32,
    pub ensured: Mutex<Vec<NewProfile>>,
    pub sign_in_result: Mutex<Option<RemoteErrorResult<Session>>>,
    pub sign_up_result: Mutex<Option<RemoteErrorResult<Option<Session>>>>,
    pub sign_out_error: Mutex<Option<RemoteError>>,
    pub sign_out_calls: AtomicU32,
}

impl FakeRemote {
    pub(crate) fn with_session(session: Option<Session>) -> Self {
        let remote = Self::default();
        *remote.session.lock().unwrap() = session;
        remote
    }

    pub(crate) fn push_fetch(&self, step: FetchStep) {
        self.fetch_steps.lock().unwrap().push_back(step);
    }

    pub(crate) fn push_profile(&self, profile: UserProfile) {
        self.push_fetch(FetchStep::Respond(Ok(profile)));
    }

    pub(crate) fn push_error(&self, error: RemoteError) {
        self.push_fetch(FetchStep::Respond(Err(error)));
    }

    pub(crate) fn fetch_count(&self) -> u32 {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn current_session(&self) -> RemoteErrorResult<Option<Session>> {
        if let Some(error) = self.session_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(self.session.lock().unwrap().clone())
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> RemoteErrorResult<Session> {
        self.sign_in_result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(RemoteError::invalid_credentials("not scripted")))
    }

    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        _metadata: &UserMetadata,
    ) -> RemoteErrorResult<Option<Session>> {
        self.sign_up_result.lock().unwrap().take().unwrap_or(Ok(None))
    }

    async fn sign_out(&self) -> RemoteErrorResult<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        match self.sign_out_error.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn fetch_profile(&self, _user_id: Uuid) -> RemoteErrorResult<UserProfile> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let step = self.fetch_steps.lock().unwrap().pop_front();

        match step {
            Some(FetchStep::Respond(result)) => result,
            Some(FetchStep::Gated { started, release }) => {
                let _ = started.send(());
                release
                    .await
                    .unwrap_or_else(|_| Err(RemoteError::network("gate dropped")))
            }
            None => Err(RemoteError::not_found("users row")),
        }
    }

    async fn ensure_profile(&self, profile: &NewProfile) -> RemoteErrorResult<()> {
        self.ensured.lock().unwrap().push(profile.clone());
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
        Ok(0)
    }

    async fn record_prediction(
        &self,
        _user_id: Uuid,
        _result: &PredictionResult,
    ) -> RemoteErrorResult<()> {
        Ok(())
    }
}

/// Records requested delays and returns immediately.
#[derive(Default)]
pub(crate) struct RecordingDelay {
    pub delays: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    pub(crate) fn recorded(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Delay for RecordingDelay {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

pub(crate) struct Harness {
    pub remote: Arc<FakeRemote>,
    pub store: Arc<MemoryKeyValueStore>,
    pub delay: Arc<RecordingDelay>,
    pub resolver: Arc<SessionResolver>,
}

impl Harness {
    pub(crate) fn new(remote: FakeRemote) -> Self {
        Self::with_store(remote, Arc::new(MemoryKeyValueStore::new()))
    }

    pub(crate) fn with_store(remote: FakeRemote, store: Arc<MemoryKeyValueStore>) -> Self {
        let remote = Arc::new(remote);
        let delay = Arc::new(RecordingDelay::default());
        let resolver = Arc::new(SessionResolver::new(
            remote.clone(),
            IdentityCache::new(store.clone()),
            RetryPolicy::default(),
            delay.clone(),
        ));

        Self {
            remote,
            store,
            delay,
            resolver,
        }
    }

    pub(crate) fn cache(&self) -> IdentityCache {
        IdentityCache::new(self.store.clone())
    }
}

pub(crate) fn profile(id: Uuid, email: &str, role: Role) -> UserProfile {
    UserProfile {
        id,
        email: email.to_string(),
        role,
        full_name: None,
        first_name: None,
        last_name: None,
        phone: None,
        avatar_url: None,
        created_at: None,
        updated_at: None,
    }
}

pub(crate) fn session_for(id: Uuid, email: &str) -> Session {
    Session {
        access_token: format!("token-{id}"),
        refresh_token: Some(String::from("refresh")),
        expires_at: None,
        user: SessionUser {
            id,
            email: Some(email.to_string()),
            user_metadata: UserMetadata::default(),
        },
    }
}
