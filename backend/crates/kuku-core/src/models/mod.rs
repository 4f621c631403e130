pub mod auth_event;
pub mod identity;
pub mod limit_name;
pub mod limit_value;
pub mod plan_limits;
pub mod plan_tier;
pub mod prediction;
pub mod role;
pub mod session;
pub mod subscription;
pub mod subscription_status;
pub mod usage_metric;
