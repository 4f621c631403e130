use crate::response::{ensure_success, json_body, total_from_content_range};
use crate::{ClientError, ClientErrorResult};

use kuku_config::RemoteConfig;
use kuku_core::{
    AuthEvent, NewProfile, PredictionResult, RemoteError, RemoteErrorResult, RemoteStore, Session,
    Subscription, UsageMetric, UserMetadata, UserProfile,
};
use kuku_session::{AuthEventSender, KeyValueStore};

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::CONTENT_RANGE;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Url};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Key under which the signed-in session is persisted between runs.
pub const SESSION_KEY: &str = "auth_session";

const AUTH_PATH: &str = "/auth/v1";
const REST_PATH: &str = "/rest/v1";

const USERS_TABLE: &str = "users";
const SUBSCRIPTIONS_TABLE: &str = "subscriptions";
const PREDICTIONS_TABLE: &str = "predictions";
const BATCHES_TABLE: &str = "batches";

const ACTIVE_BATCH_STATUS: &str = "ACTIVE";

/// Adapter for the hosted auth service and its PostgREST row API.
pub struct SupabaseClient {
    base_url: String,
    anon_key: String,
    client: ReqwestClient,
    session: Mutex<Option<Session>>,
    session_store: Option<Arc<dyn KeyValueStore>>,
    events: Option<AuthEventSender>,
}

impl SupabaseClient {
    pub fn new(config: &RemoteConfig) -> ClientErrorResult<Self> {
        let base_url = config.url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| ClientError::invalid_url(&base_url, e.to_string()))?;

        let client = ReqwestClient::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            base_url,
            anon_key: config.anon_key.clone(),
            client,
            session: Mutex::new(None),
            session_store: None,
            events: None,
        })
    }

    /// Persist the session so a later process can pick it up.
    pub fn with_session_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.session_store = Some(store);
        self
    }

    /// Report token refreshes to the session resolver.
    pub fn with_auth_events(mut self, events: AuthEventSender) -> Self {
        self.events = Some(events);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    fn url(&self, path: &str, query: &[(&str, String)]) -> ClientErrorResult<Url> {
        let raw = format!("{}{}", self.base_url, path);
        let mut url = Url::parse(&raw).map_err(|e| ClientError::invalid_url(&raw, e.to_string()))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn rest_url(&self, table: &str, query: &[(&str, String)]) -> ClientErrorResult<Url> {
        self.url(&format!("{REST_PATH}/{table}"), query)
    }

    /// Every call carries the project key; row calls authenticate as the
    /// signed-in user when there is one.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let token = self
            .cached_session()
            .map(|session| session.access_token)
            .unwrap_or_else(|| self.anon_key.clone());

        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    // =========================================================================
    // Session bookkeeping
    // =========================================================================

    fn cached_session(&self) -> Option<Session> {
        let mut guard = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.is_none() {
            *guard = self.load_persisted_session();
        }
        guard.clone()
    }

    fn load_persisted_session(&self) -> Option<Session> {
        let store = self.session_store.as_ref()?;
        let raw = match store.get(SESSION_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                log::warn!("Failed to read persisted session: {e}");
                return None;
            }
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                log::warn!("Discarding unreadable persisted session: {e}");
                if let Err(e) = store.remove(SESSION_KEY) {
                    log::warn!("Failed to remove persisted session: {e}");
                }
                None
            }
        }
    }

    fn store_session(&self, session: Option<&Session>) {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = session.cloned();

        let Some(store) = self.session_store.as_ref() else {
            return;
        };

        let outcome = match session {
            Some(session) => serde_json::to_string(session)
                .map_err(ClientError::from)
                .and_then(|raw| store.set(SESSION_KEY, &raw).map_err(ClientError::from)),
            None => store.remove(SESSION_KEY).map_err(ClientError::from),
        };
        if let Err(e) = outcome {
            log::warn!("Failed to persist session: {e}");
        }
    }

    fn emit(&self, event: AuthEvent, session: Option<Session>) {
        let Some(events) = self.events.as_ref() else {
            return;
        };
        if let Err(e) = events.try_send((event, session)) {
            log::warn!("Dropped {event} auth event: {e}");
        }
    }

    async fn refresh(&self, refresh_token: &str) -> RemoteErrorResult<Session> {
        #[derive(Serialize)]
        struct RefreshRequest<'a> {
            refresh_token: &'a str,
        }

        let url = self
            .url(
                &format!("{AUTH_PATH}/token"),
                &[("grant_type", "refresh_token".to_string())],
            )
            .map_err(|e| e.into_remote("session"))?;
        let req = self
            .client
            .request(Method::POST, url)
            .header("apikey", &self.anon_key)
            .json(&RefreshRequest { refresh_token });

        match self.send_json::<Session>(req).await {
            Ok(session) => Ok(session),
            // A rejected refresh token is a dead session, not a bad request.
            Err(e) if e.http_status() == Some(400) => {
                Err(RemoteError::unauthorized(e.to_string()))
            }
            Err(e) => Err(e.into_remote("session")),
        }
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> ClientErrorResult<T> {
        let response = req.send().await?;
        json_body(response).await
    }

    async fn send_empty(&self, req: RequestBuilder) -> ClientErrorResult<()> {
        let response = req.send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn count(&self, table: &str, query: &[(&str, String)]) -> ClientErrorResult<u64> {
        let url = self.rest_url(table, query)?;
        let req = self
            .request(Method::HEAD, url)
            .header("Prefer", "count=exact");
        let response = ensure_success(req.send().await?).await?;

        let header = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok());
        total_from_content_range(header).ok_or_else(|| {
            ClientError::status(
                response.status().as_u16(),
                "MISSING_COUNT",
                format!("no usable Content-Range header on {table} count ({header:?})"),
            )
        })
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl RemoteStore for SupabaseClient {
    async fn current_session(&self) -> RemoteErrorResult<Option<Session>> {
        let Some(session) = self.cached_session() else {
            return Ok(None);
        };
        if !session.is_expired(Utc::now()) {
            return Ok(Some(session));
        }

        let Some(refresh_token) = session.refresh_token.as_deref() else {
            log::info!("Stored session expired and cannot be refreshed");
            self.store_session(None);
            return Ok(None);
        };

        match self.refresh(refresh_token).await {
            Ok(refreshed) => {
                log::debug!("Refreshed session for user {}", refreshed.user_id());
                self.store_session(Some(&refreshed));
                self.emit(AuthEvent::TokenRefreshed, Some(refreshed.clone()));
                Ok(Some(refreshed))
            }
            Err(e) => {
                if e.is_terminal_auth() {
                    self.store_session(None);
                }
                Err(e)
            }
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> RemoteErrorResult<Session> {
        #[derive(Serialize)]
        struct PasswordGrant<'a> {
            email: &'a str,
            password: &'a str,
        }

        let url = self
            .url(
                &format!("{AUTH_PATH}/token"),
                &[("grant_type", "password".to_string())],
            )
            .map_err(|e| e.into_remote("session"))?;
        let req = self
            .client
            .request(Method::POST, url)
            .header("apikey", &self.anon_key)
            .json(&PasswordGrant { email, password });

        let session = match self.send_json::<Session>(req).await {
            Ok(session) => session,
            Err(ClientError::Status {
                status: 400,
                message,
                ..
            }) => return Err(RemoteError::invalid_credentials(message)),
            Err(e) => return Err(e.into_remote("session")),
        };

        self.store_session(Some(&session));
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> RemoteErrorResult<Option<Session>> {
        #[derive(Serialize)]
        struct SignUpRequest<'a> {
            email: &'a str,
            password: &'a str,
            data: &'a UserMetadata,
        }

        let url = self
            .url(&format!("{AUTH_PATH}/signup"), &[])
            .map_err(|e| e.into_remote("account"))?;
        let req = self
            .client
            .request(Method::POST, url)
            .header("apikey", &self.anon_key)
            .json(&SignUpRequest {
                email,
                password,
                data: metadata,
            });

        let body: Value = match self.send_json(req).await {
            Ok(body) => body,
            Err(ClientError::Status {
                status: 422,
                message,
                ..
            }) => return Err(RemoteError::conflict(message)),
            Err(e) => return Err(e.into_remote("account")),
        };

        // Without auto-confirm the service answers with the bare user record.
        if body.get("access_token").is_none() {
            log::info!("Sign-up for {email} awaits e-mail confirmation");
            return Ok(None);
        }

        let session: Session = serde_json::from_value(body)?;
        self.store_session(Some(&session));
        Ok(Some(session))
    }

    async fn sign_out(&self) -> RemoteErrorResult<()> {
        let Some(session) = self.cached_session() else {
            return Ok(());
        };

        let result = match self.url(&format!("{AUTH_PATH}/logout"), &[]) {
            Ok(url) => {
                let req = self
                    .client
                    .request(Method::POST, url)
                    .header("apikey", &self.anon_key)
                    .bearer_auth(&session.access_token);
                self.send_empty(req).await
            }
            Err(e) => Err(e),
        };

        // Local state goes regardless of what the server said.
        self.store_session(None);
        result.map_err(|e| e.into_remote("session"))
    }

    async fn fetch_profile(&self, user_id: Uuid) -> RemoteErrorResult<UserProfile> {
        let url = self
            .rest_url(
                USERS_TABLE,
                &[
                    ("select", "*".to_string()),
                    ("id", format!("eq.{user_id}")),
                ],
            )
            .map_err(|e| e.into_remote("profile"))?;

        let rows: Vec<UserProfile> = self
            .send_json(self.request(Method::GET, url))
            .await
            .map_err(|e| e.into_remote("profile"))?;

        rows.into_iter()
            .next()
            .ok_or_else(|| RemoteError::not_found(format!("profile for user {user_id}")))
    }

    async fn ensure_profile(&self, profile: &NewProfile) -> RemoteErrorResult<()> {
        let url = self
            .rest_url(USERS_TABLE, &[("on_conflict", "id".to_string())])
            .map_err(|e| e.into_remote("profile"))?;
        let req = self
            .request(Method::POST, url)
            .header("Prefer", "resolution=ignore-duplicates,return=minimal")
            .json(profile);

        match self.send_empty(req).await {
            Ok(()) => Ok(()),
            Err(e) if e.http_status() == Some(409) => {
                log::debug!("Profile {} already exists", profile.id);
                Ok(())
            }
            Err(e) => Err(e.into_remote("profile")),
        }
    }

    async fn latest_subscription(
        &self,
        user_id: Uuid,
    ) -> RemoteErrorResult<Option<Subscription>> {
        let url = self
            .rest_url(
                SUBSCRIPTIONS_TABLE,
                &[
                    ("select", "*".to_string()),
                    ("farmer_id", format!("eq.{user_id}")),
                    ("status", "ilike.active".to_string()),
                    ("order", "created_at.desc".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .map_err(|e| e.into_remote("subscription"))?;

        let rows: Vec<Subscription> = self
            .send_json(self.request(Method::GET, url))
            .await
            .map_err(|e| e.into_remote("subscription"))?;

        Ok(rows.into_iter().next())
    }

    async fn count_usage(
        &self,
        user_id: Uuid,
        metric: UsageMetric,
        since: Option<DateTime<Utc>>,
    ) -> RemoteErrorResult<u64> {
        let (table, mut query) = match metric {
            UsageMetric::MonthlyPredictions => (
                PREDICTIONS_TABLE,
                vec![
                    ("select", "id".to_string()),
                    ("user_id", format!("eq.{user_id}")),
                ],
            ),
            UsageMetric::ActiveBatches => (
                BATCHES_TABLE,
                vec![
                    ("select", "id,farms!inner(farmers!inner(user_id))".to_string()),
                    ("farms.farmers.user_id", format!("eq.{user_id}")),
                    ("status", format!("eq.{ACTIVE_BATCH_STATUS}")),
                ],
            ),
        };
        if let Some(since) = since {
            query.push(("created_at", format!("gte.{}", timestamp(since))));
        }

        let count = self
            .count(table, &query)
            .await
            .map_err(|e| e.into_remote(metric.as_str()))?;
        log::debug!("Usage {metric} for user {user_id}: {count}");
        Ok(count)
    }

    async fn record_prediction(
        &self,
        user_id: Uuid,
        result: &PredictionResult,
    ) -> RemoteErrorResult<()> {
        #[derive(Serialize)]
        struct PredictionRow<'a> {
            user_id: Uuid,
            prediction: &'a str,
            confidence: f64,
            #[serde(skip_serializing_if = "Option::is_none")]
            crop_type: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            filename: Option<&'a str>,
            predicted_at: &'a str,
        }

        let url = self
            .rest_url(PREDICTIONS_TABLE, &[])
            .map_err(|e| e.into_remote("prediction"))?;
        let row = PredictionRow {
            user_id,
            prediction: &result.prediction,
            confidence: result.confidence,
            crop_type: result.crop_type.as_deref(),
            filename: result.filename.as_deref(),
            predicted_at: &result.timestamp,
        };
        let req = self
            .request(Method::POST, url)
            .header("Prefer", "return=minimal")
            .json(&row);

        self.send_empty(req)
            .await
            .map_err(|e| e.into_remote("prediction"))
    }
}
