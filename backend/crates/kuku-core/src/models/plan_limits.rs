use crate::{LimitName, LimitValue, PlanTier};

use serde::{Deserialize, Serialize};

/// Limit table of a single plan tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    pub max_birds: LimitValue,
    pub max_predictions: LimitValue,
    pub max_batches: LimitValue,
    pub batch_management: LimitValue,
    pub inventory_management: LimitValue,
    pub advanced_analytics: LimitValue,
    pub financial_tracking: LimitValue,
    pub custom_reports: LimitValue,
    pub priority_support: LimitValue,
    pub multi_farm: LimitValue,
    pub api_access: LimitValue,
}

impl PlanLimits {
    pub const fn for_tier(tier: PlanTier) -> Self {
        use LimitValue::{Count, Feature, Unlimited};

        match tier {
            PlanTier::Free => Self {
                max_birds: Count(10),
                max_predictions: Count(5),
                max_batches: Count(1),
                batch_management: Feature(false),
                inventory_management: Feature(false),
                advanced_analytics: Feature(false),
                financial_tracking: Feature(false),
                custom_reports: Feature(false),
                priority_support: Feature(false),
                multi_farm: Feature(false),
                api_access: Feature(false),
            },
            PlanTier::Basic => Self {
                max_birds: Count(100),
                max_predictions: Count(50),
                max_batches: Count(10),
                batch_management: Feature(true),
                inventory_management: Feature(true),
                advanced_analytics: Feature(false),
                financial_tracking: Feature(false),
                custom_reports: Feature(false),
                priority_support: Feature(false),
                multi_farm: Feature(false),
                api_access: Feature(false),
            },
            PlanTier::Premium => Self {
                max_birds: Count(500),
                max_predictions: Unlimited,
                max_batches: Count(50),
                batch_management: Feature(true),
                inventory_management: Feature(true),
                advanced_analytics: Feature(true),
                financial_tracking: Feature(true),
                custom_reports: Feature(true),
                priority_support: Feature(true),
                multi_farm: Feature(false),
                api_access: Feature(false),
            },
            PlanTier::Enterprise => Self {
                max_birds: Unlimited,
                max_predictions: Unlimited,
                max_batches: Unlimited,
                batch_management: Feature(true),
                inventory_management: Feature(true),
                advanced_analytics: Feature(true),
                financial_tracking: Feature(true),
                custom_reports: Feature(true),
                priority_support: Feature(true),
                multi_farm: Feature(true),
                api_access: Feature(true),
            },
        }
    }

    pub fn get(&self, name: LimitName) -> LimitValue {
        match name {
            LimitName::MaxBirds => self.max_birds,
            LimitName::MaxPredictions => self.max_predictions,
            LimitName::MaxBatches => self.max_batches,
            LimitName::BatchManagement => self.batch_management,
            LimitName::InventoryManagement => self.inventory_management,
            LimitName::AdvancedAnalytics => self.advanced_analytics,
            LimitName::FinancialTracking => self.financial_tracking,
            LimitName::CustomReports => self.custom_reports,
            LimitName::PrioritySupport => self.priority_support,
            LimitName::MultiFarm => self.multi_farm,
            LimitName::ApiAccess => self.api_access,
        }
    }

    /// All entries in table order, for display.
    pub fn entries(&self) -> impl Iterator<Item = (LimitName, LimitValue)> + '_ {
        LimitName::ALL.into_iter().map(|name| (name, self.get(name)))
    }
}
