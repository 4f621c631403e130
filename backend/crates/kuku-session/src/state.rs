use kuku_core::{Identity, Role};

use serde::Serialize;

/// Where the published identity came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateSource {
    #[default]
    None,
    Cache,
    Remote,
}

/// Outcome of the most recent authoritative profile fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    /// No fetch has completed for the current session.
    #[default]
    Unresolved,
    Resolved,
    /// The profile row was still missing after every retry.
    Missing,
    /// The remote store could not be reached.
    Unavailable,
}

/// State published by the resolver.
///
/// `ready == false` means resolution is still running, which is distinct
/// from "resolved with no identity".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionState {
    pub identity: Option<Identity>,
    pub role: Role,
    pub ready: bool,
    pub source: StateSource,
    pub profile_status: ProfileStatus,
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        !self.ready
    }

    /// Whether routing should treat the user as signed in. A profile that
    /// stayed missing after every retry counts as signed out even if a cached
    /// identity is still published.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some() && self.profile_status != ProfileStatus::Missing
    }

    pub(crate) fn signed_out() -> Self {
        Self {
            ready: true,
            ..Self::default()
        }
    }
}
