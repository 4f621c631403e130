//! Session and identity resolution.
//!
//! [`SessionResolver`] owns the published `(identity, role, ready)` state.
//! It paints from the local [`IdentityCache`] first, then confirms against the
//! remote store with a bounded retry, and only lets the most recently started
//! resolution write the result.

mod error;
mod identity_cache;
mod kv_store;
mod resolver;
mod retry;
mod route_guard;
mod state;

pub use error::{Result as SessionErrorResult, SessionError};
pub use identity_cache::{
    CachedIdentitySnapshot, IdentityCache, LoadResult, PROFILE_KEY, ROLE_KEY,
    SNAPSHOT_SCHEMA_VERSION,
};
pub use kv_store::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use resolver::{AuthEventReceiver, AuthEventSender, SessionResolver, SignUpOutcome};
pub use retry::{Delay, IsRetryable, RetryOutcome, RetryPolicy, TokioDelay, with_retry};
pub use route_guard::{RouteDecision, RouteGuard};
pub use state::{ProfileStatus, SessionState, StateSource};

#[cfg(test)]
mod tests;
