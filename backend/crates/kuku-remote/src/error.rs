use kuku_core::RemoteError;

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

/// Errors raised by the HTTP adapters before they are mapped onto
/// [`RemoteError`] for the rest of the application.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request error: {message} {location}")]
    Http {
        message: String,
        location: ErrorLocation,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status}: {message} (code: {code}) {location}")]
    Status {
        status: u16,
        code: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("JSON parse error: {message} {location}")]
    Json {
        message: String,
        location: ErrorLocation,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid URL {url}: {message} {location}")]
    InvalidUrl {
        url: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Image is {size} bytes, the limit is {max} bytes {location}")]
    ImageTooLarge {
        size: u64,
        max: u64,
        location: ErrorLocation,
    },

    #[error("Session store error: {message} {location}")]
    SessionStore {
        message: String,
        location: ErrorLocation,
    },
}

impl ClientError {
    #[track_caller]
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        ClientError::Http {
            message: err.to_string(),
            location: ErrorLocation::from(Location::caller()),
            source: err,
        }
    }

    #[track_caller]
    pub fn from_json(err: serde_json::Error) -> Self {
        ClientError::Json {
            message: err.to_string(),
            location: ErrorLocation::from(Location::caller()),
            source: err,
        }
    }

    #[track_caller]
    pub fn status(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        ClientError::Status {
            status,
            code: code.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        ClientError::InvalidUrl {
            url: url.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn image_too_large(size: u64, max: u64) -> Self {
        ClientError::ImageTooLarge {
            size,
            max,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn session_store(message: impl Into<String>) -> Self {
        ClientError::SessionStore {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// HTTP status of a non-success response, if that is what this is.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ClientError::Http { .. } => {
                "Unable to reach the server. Check your connection and try again."
            }
            ClientError::Status { status, .. } => match status {
                401 | 403 => "Your session has expired. Please sign in again.",
                500..=599 => "The server had a problem. Try again in a moment.",
                _ => "The server rejected the request.",
            },
            ClientError::Json { .. } => {
                "Unexpected response from the server. Please report this issue."
            }
            ClientError::InvalidUrl { .. } => "Check the configured service URL.",
            ClientError::ImageTooLarge { .. } => {
                "Use a smaller image or raise prediction.max_image_bytes."
            }
            ClientError::SessionStore { .. } => {
                "Unable to read or write the saved session. Check the cache directory."
            }
        }
    }

    /// Classify into the store-level error the resolver and gate reason about.
    #[track_caller]
    pub fn into_remote(self, resource: &str) -> RemoteError {
        match self {
            ClientError::Http { source, message, .. } => {
                if source.is_decode() {
                    RemoteError::decode(message)
                } else {
                    RemoteError::network(message)
                }
            }
            ClientError::Status {
                status,
                code,
                message,
                ..
            } => match status {
                401 | 403 => RemoteError::unauthorized(message),
                404 => RemoteError::not_found(resource),
                409 => RemoteError::conflict(message),
                500..=599 => RemoteError::server(status, message),
                _ => RemoteError::api(code, message),
            },
            ClientError::Json { message, .. } => RemoteError::decode(message),
            ClientError::InvalidUrl { url, message, .. } => {
                RemoteError::api("INVALID_URL", format!("{url}: {message}"))
            }
            ClientError::ImageTooLarge { size, max, .. } => RemoteError::api(
                "IMAGE_TOO_LARGE",
                format!("image is {size} bytes, the limit is {max} bytes"),
            ),
            ClientError::SessionStore { message, .. } => RemoteError::api("SESSION_STORE", message),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        ClientError::from_reqwest(err)
    }
}

impl From<serde_json::Error> for ClientError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        ClientError::from_json(err)
    }
}

impl From<kuku_session::SessionError> for ClientError {
    #[track_caller]
    fn from(err: kuku_session::SessionError) -> Self {
        ClientError::session_store(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
