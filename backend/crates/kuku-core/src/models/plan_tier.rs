use crate::{CoreError, CoreErrorResult, PlanLimits};

use std::panic::Location;
use std::str::FromStr;

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// Subscription plan tiers, ordered by increasing entitlement.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlanTier {
    #[default]
    Free,
    Basic,
    Premium,
    Enterprise,
}

impl PlanTier {
    pub const ALL: [PlanTier; 4] = [Self::Free, Self::Basic, Self::Premium, Self::Enterprise];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "FREE",
            Self::Basic => "BASIC",
            Self::Premium => "PREMIUM",
            Self::Enterprise => "ENTERPRISE",
        }
    }

    /// Human-readable plan name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Basic => "Basic",
            Self::Premium => "Premium",
            Self::Enterprise => "Enterprise",
        }
    }

    /// Monthly price in whole currency units.
    pub const fn monthly_price(&self) -> u32 {
        match self {
            Self::Free => 0,
            Self::Basic => 15,
            Self::Premium => 35,
            Self::Enterprise => 99,
        }
    }

    /// The tier directly above this one, `None` at the top.
    pub fn next(&self) -> Option<PlanTier> {
        match self {
            Self::Free => Some(Self::Basic),
            Self::Basic => Some(Self::Premium),
            Self::Premium => Some(Self::Enterprise),
            Self::Enterprise => None,
        }
    }

    pub fn can_upgrade_to(&self, target: PlanTier) -> bool {
        target > *self
    }

    pub fn limits(&self) -> PlanLimits {
        PlanLimits::for_tier(*self)
    }
}

impl FromStr for PlanTier {
    type Err = CoreError;

    #[track_caller]
    fn from_str(s: &str) -> CoreErrorResult<Self> {
        match s.trim().to_uppercase().as_str() {
            "FREE" => Ok(Self::Free),
            "BASIC" => Ok(Self::Basic),
            "PREMIUM" => Ok(Self::Premium),
            "ENTERPRISE" => Ok(Self::Enterprise),
            _ => Err(CoreError::InvalidPlanTier {
                value: s.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
