use std::panic::Location;
use std::result::Result as StdResult;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid role: {value} {location}")]
    InvalidRole {
        value: String,
        location: ErrorLocation,
    },

    #[error("Invalid plan tier: {value} {location}")]
    InvalidPlanTier {
        value: String,
        location: ErrorLocation,
    },

    #[error("Invalid subscription status: {value} {location}")]
    InvalidSubscriptionStatus {
        value: String,
        location: ErrorLocation,
    },

    #[error("Unknown limit: {value} {location}")]
    UnknownLimit {
        value: String,
        location: ErrorLocation,
    },
}

impl CoreError {
    #[track_caller]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = StdResult<T, CoreError>;
