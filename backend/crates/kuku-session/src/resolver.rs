use crate::{
    Delay, IdentityCache, ProfileStatus, RetryOutcome, RetryPolicy, SessionErrorResult,
    SessionState, StateSource, with_retry,
};

use kuku_core::{AuthEvent, Identity, RemoteStore, Role, Session, UserMetadata};

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use log::{debug, info, warn};
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

pub type AuthEventSender = mpsc::Sender<(AuthEvent, Option<Session>)>;
pub type AuthEventReceiver = mpsc::Receiver<(AuthEvent, Option<Session>)>;

#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    SignedIn(Session),
    /// Account created; the provider is waiting for e-mail confirmation.
    ConfirmationRequired,
}

/// Cache write applied together with a state publish.
enum CacheAction<'a> {
    Keep,
    Save(&'a Identity),
    Clear,
}

/// Establishes the current identity and role and republishes them across
/// auth transitions.
///
/// Every resolution takes a ticket from a monotonic sequence. A result is
/// only published (and only written to the cache) while its ticket is still
/// the latest one, so a slow fetch can never overwrite a newer one. After
/// [`dispose`](Self::dispose) nothing is published at all.
pub struct SessionResolver {
    remote: Arc<dyn RemoteStore>,
    cache: IdentityCache,
    retry: RetryPolicy,
    delay: Arc<dyn Delay>,
    state: watch::Sender<SessionState>,
    sequence: AtomicU64,
    commit_lock: Mutex<()>,
    bootstrapped: AtomicBool,
    disposed: AtomicBool,
}

impl SessionResolver {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        cache: IdentityCache,
        retry: RetryPolicy,
        delay: Arc<dyn Delay>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::default());

        Self {
            remote,
            cache,
            retry,
            delay,
            state,
            sequence: AtomicU64::new(0),
            commit_lock: Mutex::new(()),
            bootstrapped: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
        }
    }

    /// Resolve the session found at process start.
    ///
    /// Paints the cached identity first, then confirms it remotely. Always
    /// ends with `ready == true` unless a newer resolution took over.
    pub async fn bootstrap(&self) {
        let token = self.begin();
        info!("Bootstrapping session (request {token})");

        match self.remote.current_session().await {
            Ok(Some(session)) => {
                self.restore(token, &session).await;
            }
            Ok(None) => {
                info!("No existing session");
                self.commit(token, "bootstrap", CacheAction::Clear, |state| {
                    *state = SessionState::signed_out();
                });
            }
            Err(e) => {
                warn!("Failed to read current session: {e}");
                let cache_action = if e.is_terminal_auth() {
                    CacheAction::Clear
                } else {
                    CacheAction::Keep
                };
                self.commit(token, "bootstrap", cache_action, |state| {
                    *state = SessionState::signed_out();
                });
            }
        }

        self.bootstrapped.store(true, Ordering::SeqCst);
    }

    /// Apply an auth transition reported by the identity provider.
    pub async fn on_auth_state_change(&self, event: AuthEvent, session: Option<Session>) {
        if self.is_disposed() {
            debug!("Resolver disposed, ignoring {event}");
            return;
        }

        info!("Auth state changed: {event}");

        match (event, session) {
            (AuthEvent::SignedOut, _) => self.clear_session("sign-out"),
            (AuthEvent::InitialSession, _) if self.is_bootstrapped() => {
                debug!("Ignoring duplicate {event}, bootstrap already completed");
            }
            (AuthEvent::InitialSession, Some(session)) => {
                let token = self.begin();
                self.restore(token, &session).await;
                self.bootstrapped.store(true, Ordering::SeqCst);
            }
            (AuthEvent::InitialSession, None) => {
                self.clear_session("initial session");
                self.bootstrapped.store(true, Ordering::SeqCst);
            }
            (AuthEvent::SignedIn, Some(session)) => {
                let token = self.begin();
                let user_id = session.user_id();
                self.paint_from_cache(token, user_id);
                self.ensure_profile(&session).await;
                self.resolve(token, user_id).await;
            }
            (AuthEvent::TokenRefreshed | AuthEvent::UserUpdated, Some(session)) => {
                let token = self.begin();
                self.resolve(token, session.user_id()).await;
            }
            (event, None) => warn!("Ignoring {event} without a session"),
        }
    }

    /// Drain auth events until the channel closes or the resolver is
    /// disposed.
    pub async fn listen(&self, mut events: AuthEventReceiver) {
        while let Some((event, session)) = events.recv().await {
            if self.is_disposed() {
                break;
            }
            self.on_auth_state_change(event, session).await;
        }
        debug!("Auth event listener stopped");
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> SessionErrorResult<Session> {
        let session = self.remote.sign_in(email, password).await?;
        self.on_auth_state_change(AuthEvent::SignedIn, Some(session.clone()))
            .await;
        Ok(session)
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> SessionErrorResult<SignUpOutcome> {
        match self.remote.sign_up(email, password, metadata).await? {
            Some(mut session) => {
                if session.user.user_metadata == UserMetadata::default() {
                    session.user.user_metadata = metadata.clone();
                }
                self.on_auth_state_change(AuthEvent::SignedIn, Some(session.clone()))
                    .await;
                Ok(SignUpOutcome::SignedIn(session))
            }
            None => {
                info!("Sign-up pending e-mail confirmation");
                Ok(SignUpOutcome::ConfirmationRequired)
            }
        }
    }

    /// Sign out remotely and clear local state.
    ///
    /// Local state is cleared even when the remote call fails. A session the
    /// provider already rejected counts as signed out.
    pub async fn sign_out(&self) -> SessionErrorResult<()> {
        let result = self.remote.sign_out().await;
        self.clear_session("sign-out");

        match result {
            Ok(()) => Ok(()),
            Err(e) if e.is_terminal_auth() => {
                debug!("Session was already invalid: {e}");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Stop publishing. In-flight resolutions finish but their results are
    /// dropped.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        self.sequence.fetch_add(1, Ordering::SeqCst);
        info!("Session resolver disposed");
    }

    /// Normalised role of the published identity, or the default role.
    pub fn current_role(&self) -> Role {
        self.state.borrow().role
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Wait until a resolution has completed.
    pub async fn wait_ready(&self) -> SessionState {
        let mut receiver = self.state.subscribe();
        match receiver.wait_for(|state| state.ready).await {
            Ok(state) => state.clone(),
            Err(_) => self.snapshot(),
        }
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped.load(Ordering::SeqCst)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn begin(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, token: u64) -> bool {
        !self.is_disposed() && self.sequence.load(Ordering::SeqCst) == token
    }

    /// Publish and update the cache atomically, if `token` is still current.
    fn commit(
        &self,
        token: u64,
        reason: &str,
        cache: CacheAction<'_>,
        apply: impl FnOnce(&mut SessionState),
    ) -> bool {
        let _guard = self
            .commit_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if !self.is_current(token) {
            debug!("Dropping superseded {reason} result (request {token})");
            return false;
        }

        let written = match cache {
            CacheAction::Keep => Ok(()),
            CacheAction::Save(identity) => self.cache.save(identity, Utc::now()),
            CacheAction::Clear => self.cache.clear(),
        };
        if let Err(e) = written {
            warn!("Failed to update identity cache during {reason}: {e}");
        }

        self.state.send_modify(apply);
        true
    }

    fn clear_session(&self, reason: &str) {
        let token = self.begin();
        if self.commit(token, reason, CacheAction::Clear, |state| {
            *state = SessionState::signed_out();
        }) {
            info!("Session cleared ({reason})");
        }
    }

    async fn restore(&self, token: u64, session: &Session) {
        let user_id = session.user_id();
        self.paint_from_cache(token, user_id);
        self.resolve(token, user_id).await;
    }

    /// Publish the cached identity while the remote fetch runs.
    fn paint_from_cache(&self, token: u64, user_id: Uuid) {
        let cached = self.cached_identity_for(user_id);

        self.commit(token, "cache paint", CacheAction::Keep, |state| {
            let already_resolved = state.source == StateSource::Remote
                && state
                    .identity
                    .as_ref()
                    .is_some_and(|identity| identity.id == user_id);

            state.ready = false;
            state.profile_status = ProfileStatus::Unresolved;

            if already_resolved {
                return;
            }

            match cached {
                Some(identity) => {
                    state.role = identity.role;
                    state.identity = Some(identity);
                    state.source = StateSource::Cache;
                }
                None => {
                    state.identity = None;
                    state.role = Role::default();
                    state.source = StateSource::None;
                }
            }
        });
    }

    fn cached_identity_for(&self, user_id: Uuid) -> Option<Identity> {
        let loaded = match self.cache.load() {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!("Failed to read identity cache: {e}");
                return None;
            }
        };

        if let Some(error) = loaded.corruption_error {
            warn!("Ignoring corrupted identity cache: {error}");
            return None;
        }

        let mut identity = loaded.snapshot?.identity;
        if identity.id != user_id {
            debug!(
                "Cached identity {} does not belong to session user {user_id}",
                identity.id
            );
            return None;
        }

        if let Some(role) = loaded.role {
            identity.role = role;
        }
        Some(identity)
    }

    /// At-most-once profile creation for a freshly signed-in account.
    async fn ensure_profile(&self, session: &Session) {
        let profile = session.user.default_profile();
        let remote = self.remote.as_ref();
        let new_profile = &profile;
        let outcome = with_retry(&self.retry, self.delay.as_ref(), "Profile upsert", move || {
            remote.ensure_profile(new_profile)
        })
        .await;

        if let Err(e) = outcome.into_result() {
            warn!("Could not ensure profile for {}: {e}", profile.id);
        }
    }

    /// Fetch the authoritative profile and publish the outcome.
    async fn resolve(&self, token: u64, user_id: Uuid) {
        if !self.is_current(token) {
            debug!("Skipping profile fetch for superseded request {token}");
            return;
        }

        let remote = self.remote.as_ref();
        let outcome = with_retry(&self.retry, self.delay.as_ref(), "Profile fetch", move || {
            remote.fetch_profile(user_id)
        })
        .await;

        match outcome {
            RetryOutcome::Succeeded {
                value: profile,
                attempts,
            } => {
                let identity = Identity::from(&profile);
                let published = identity.clone();
                let committed = self.commit(
                    token,
                    "profile fetch",
                    CacheAction::Save(&identity),
                    |state| {
                        state.role = published.role;
                        state.identity = Some(published);
                        state.ready = true;
                        state.source = StateSource::Remote;
                        state.profile_status = ProfileStatus::Resolved;
                    },
                );
                if committed {
                    info!(
                        "Resolved {} as {} ({attempts} attempt(s))",
                        identity.id, identity.role
                    );
                }
            }
            RetryOutcome::Exhausted { error, attempts } => {
                let status = if error.is_not_found() {
                    ProfileStatus::Missing
                } else {
                    ProfileStatus::Unavailable
                };
                warn!("Profile {user_id} unresolved after {attempts} attempts: {error}");
                self.commit(token, "profile fetch", CacheAction::Keep, |state| {
                    state.ready = true;
                    state.profile_status = status;
                });
            }
            RetryOutcome::Aborted { error, .. } if error.is_terminal_auth() => {
                warn!("Session rejected while fetching profile: {error}");
                self.commit(token, "profile fetch", CacheAction::Clear, |state| {
                    *state = SessionState::signed_out();
                });
            }
            RetryOutcome::Aborted { error, .. } => {
                warn!("Profile fetch for {user_id} failed and will not recover: {error}");
                self.commit(token, "profile fetch", CacheAction::Clear, |state| {
                    *state = SessionState::signed_out();
                });
            }
        }
    }
}

impl std::fmt::Debug for SessionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionResolver")
            .field("state", &*self.state.borrow())
            .field("sequence", &self.sequence.load(Ordering::SeqCst))
            .field("bootstrapped", &self.is_bootstrapped())
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}
