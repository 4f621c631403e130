mod identity;
mod limit_name;
mod limit_value;
mod plan_tier;
mod role;
mod subscription;
mod usage_metric;
