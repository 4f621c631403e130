use kuku_core::{LimitName, RemoteError};

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EntitlementError {
    #[error("Unknown limit '{name}' {location}")]
    UnknownLimit {
        name: String,
        location: ErrorLocation,
    },

    #[error("No remote usage counter for {limit} {location}")]
    UntrackedUsage {
        limit: LimitName,
        location: ErrorLocation,
    },

    #[error("{source}")]
    Remote {
        #[source]
        source: RemoteError,
        location: ErrorLocation,
    },
}

impl EntitlementError {
    #[track_caller]
    pub fn unknown_limit(name: impl Into<String>) -> Self {
        Self::UnknownLimit {
            name: name.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn untracked_usage(limit: LimitName) -> Self {
        Self::UntrackedUsage {
            limit,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::UnknownLimit { .. } => {
                "Unknown limit name. Use one of the names listed by the plan command."
            }
            Self::UntrackedUsage { .. } => "Pass the current usage explicitly for this limit.",
            Self::Remote { source, .. } => source.recovery_hint(),
        }
    }
}

impl From<RemoteError> for EntitlementError {
    #[track_caller]
    fn from(source: RemoteError) -> Self {
        Self::Remote {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, EntitlementError>;
