pub mod error;
pub mod models;
pub mod store;

pub use error::{CoreError, Result as CoreErrorResult};
pub use models::auth_event::AuthEvent;
pub use models::identity::{Identity, NewProfile, UserProfile};
pub use models::limit_name::LimitName;
pub use models::limit_value::LimitValue;
pub use models::plan_limits::PlanLimits;
pub use models::plan_tier::PlanTier;
pub use models::prediction::PredictionResult;
pub use models::role::Role;
pub use models::session::{Session, SessionUser, UserMetadata};
pub use models::subscription::Subscription;
pub use models::subscription_status::SubscriptionStatus;
pub use models::usage_metric::UsageMetric;
pub use store::{RemoteError, RemoteErrorResult, RemoteStore};

#[cfg(test)]
mod tests;
