use kuku_core::{LimitName, PlanTier};

use serde::Serialize;

/// Answer to "may the user do this right now".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Allowed,
    /// Over the plan limit. A normal outcome, not an error.
    Denied {
        limit: LimitName,
        tier: PlanTier,
        upgrade_message: String,
    },
    /// Usage could not be determined and the failure policy is fail-closed.
    Unverified { limit: LimitName, message: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Text to show the user when the action is not allowed.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Allowed => None,
            Self::Denied {
                upgrade_message, ..
            } => Some(upgrade_message),
            Self::Unverified { message, .. } => Some(message),
        }
    }
}
