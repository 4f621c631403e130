//! Plan-tier entitlement checks.
//!
//! [`EntitlementGate`] is the pure decision over `(tier, limit, usage)`.
//! [`EntitlementService`] feeds it a freshly derived tier and a live usage
//! count and turns usage-query failures into an explicit [`Decision`].

mod decision;
mod error;
mod gate;
mod service;
mod usage;

pub use decision::Decision;
pub use error::{EntitlementError, Result as EntitlementErrorResult};
pub use gate::EntitlementGate;
pub use service::EntitlementService;
pub use usage::{UsageLevel, UsageSummary};

#[cfg(test)]
mod tests;
