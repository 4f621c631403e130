use crate::{CoreError, CoreErrorResult, UsageMetric};

use std::panic::Location;
use std::str::FromStr;

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// Keys of the per-tier limit table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitName {
    MaxBirds,
    MaxPredictions,
    MaxBatches,
    BatchManagement,
    InventoryManagement,
    AdvancedAnalytics,
    FinancialTracking,
    CustomReports,
    PrioritySupport,
    MultiFarm,
    ApiAccess,
}

impl LimitName {
    pub const ALL: [LimitName; 11] = [
        Self::MaxBirds,
        Self::MaxPredictions,
        Self::MaxBatches,
        Self::BatchManagement,
        Self::InventoryManagement,
        Self::AdvancedAnalytics,
        Self::FinancialTracking,
        Self::CustomReports,
        Self::PrioritySupport,
        Self::MultiFarm,
        Self::ApiAccess,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaxBirds => "max_birds",
            Self::MaxPredictions => "max_predictions",
            Self::MaxBatches => "max_batches",
            Self::BatchManagement => "batch_management",
            Self::InventoryManagement => "inventory_management",
            Self::AdvancedAnalytics => "advanced_analytics",
            Self::FinancialTracking => "financial_tracking",
            Self::CustomReports => "custom_reports",
            Self::PrioritySupport => "priority_support",
            Self::MultiFarm => "multi_farm",
            Self::ApiAccess => "api_access",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::MaxBirds => "Birds Tracked",
            Self::MaxPredictions => "Disease Predictions (This Month)",
            Self::MaxBatches => "Active Batches",
            Self::BatchManagement => "Batch Management",
            Self::InventoryManagement => "Inventory Management",
            Self::AdvancedAnalytics => "Advanced Analytics",
            Self::FinancialTracking => "Financial Tracking",
            Self::CustomReports => "Custom Reports",
            Self::PrioritySupport => "Priority Support",
            Self::MultiFarm => "Multi-farm Management",
            Self::ApiAccess => "API Access",
        }
    }

    /// Remote counter backing a count limit, if the remote store can
    /// compute one.
    pub fn usage_metric(&self) -> Option<UsageMetric> {
        match self {
            Self::MaxPredictions => Some(UsageMetric::MonthlyPredictions),
            Self::MaxBatches => Some(UsageMetric::ActiveBatches),
            _ => None,
        }
    }
}

impl FromStr for LimitName {
    type Err = CoreError;

    /// Accepts `snake_case` and `camelCase` spellings.
    #[track_caller]
    fn from_str(s: &str) -> CoreErrorResult<Self> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        let name = match key.as_str() {
            "maxbirds" => Self::MaxBirds,
            "maxpredictions" => Self::MaxPredictions,
            "maxbatches" => Self::MaxBatches,
            "batchmanagement" => Self::BatchManagement,
            "inventorymanagement" => Self::InventoryManagement,
            "advancedanalytics" => Self::AdvancedAnalytics,
            "financialtracking" => Self::FinancialTracking,
            "customreports" => Self::CustomReports,
            "prioritysupport" => Self::PrioritySupport,
            "multifarm" => Self::MultiFarm,
            "apiaccess" => Self::ApiAccess,
            _ => {
                return Err(CoreError::UnknownLimit {
                    value: s.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        Ok(name)
    }
}

impl std::fmt::Display for LimitName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
