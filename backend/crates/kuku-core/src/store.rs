//! Port to the hosted identity provider and row store.
//!
//! The core only needs a handful of operations from the remote service; the
//! HTTP adapter lives in `kuku-remote` and test doubles implement the same
//! trait.

use crate::{
    NewProfile, PredictionResult, Session, Subscription, UsageMetric, UserMetadata, UserProfile,
};

use std::panic::Location;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use error_location::ErrorLocation;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("No {resource} found {location}")]
    NotFound {
        resource: String,
        location: ErrorLocation,
    },

    #[error("Network error: {message} {location}")]
    Network {
        message: String,
        location: ErrorLocation,
    },

    #[error("Remote server error ({status}): {message} {location}")]
    Server {
        status: u16,
        message: String,
        location: ErrorLocation,
    },

    #[error("Session rejected: {message} {location}")]
    Unauthorized {
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid credentials: {message} {location}")]
    InvalidCredentials {
        message: String,
        location: ErrorLocation,
    },

    #[error("Conflict: {message} {location}")]
    Conflict {
        message: String,
        location: ErrorLocation,
    },

    #[error("Malformed response: {message} {location}")]
    Decode {
        message: String,
        location: ErrorLocation,
    },

    #[error("Remote API error ({code}): {message} {location}")]
    Api {
        code: String,
        message: String,
        location: ErrorLocation,
    },
}

impl RemoteError {
    /// Transient failures absorbed by the bounded retry loop. A missing row
    /// counts as transient because freshly created accounts are not always
    /// readable straight away.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Network { .. } | Self::Server { .. }
        )
    }

    /// Failures that must be shown to the user and never retried.
    pub fn is_terminal_auth(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. } | Self::InvalidCredentials { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "The requested record does not exist yet. Try again shortly.",
            Self::Network { .. } => {
                "Unable to reach the server. Check your connection and try again."
            }
            Self::Server { .. } => "The server had a problem. Try again in a moment.",
            Self::Unauthorized { .. } => "Your session has expired. Please sign in again.",
            Self::InvalidCredentials { .. } => "Incorrect e-mail or password.",
            Self::Conflict { .. } => "The record was changed elsewhere. Reload and try again.",
            Self::Decode { .. } | Self::Api { .. } => {
                "Unexpected response from the server. Please report this issue."
            }
        }
    }

    #[track_caller]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::InvalidCredentials {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            code: code.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    #[track_caller]
    fn from(source: serde_json::Error) -> Self {
        Self::decode(source.to_string())
    }
}

pub type RemoteErrorResult<T> = std::result::Result<T, RemoteError>;

/// Operations the core needs from the hosted backend.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Session currently held by the provider, if any.
    async fn current_session(&self) -> RemoteErrorResult<Option<Session>>;

    async fn sign_in(&self, email: &str, password: &str) -> RemoteErrorResult<Session>;

    /// Returns `None` when the account still needs e-mail confirmation.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> RemoteErrorResult<Option<Session>>;

    async fn sign_out(&self) -> RemoteErrorResult<()>;

    /// `users` row for the given id. A missing row is `RemoteError::NotFound`.
    async fn fetch_profile(&self, user_id: Uuid) -> RemoteErrorResult<UserProfile>;

    /// Insert the profile unless a row with the same id already exists.
    /// Safe to repeat.
    async fn ensure_profile(&self, profile: &NewProfile) -> RemoteErrorResult<()>;

    /// Most recent ACTIVE subscription of the farmer owned by `user_id`.
    async fn latest_subscription(&self, user_id: Uuid)
    -> RemoteErrorResult<Option<Subscription>>;

    /// Count of `metric` for `user_id`, restricted to rows at or after
    /// `since` when given.
    async fn count_usage(
        &self,
        user_id: Uuid,
        metric: UsageMetric,
        since: Option<DateTime<Utc>>,
    ) -> RemoteErrorResult<u64>;

    async fn record_prediction(
        &self,
        user_id: Uuid,
        result: &PredictionResult,
    ) -> RemoteErrorResult<()>;
}
