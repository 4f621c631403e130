use crate::SessionState;

use kuku_core::Role;

use log::{debug, warn};

/// What a protected route should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Loading,
    RedirectToLogin,
    /// Signed in, but without the role the route requires.
    Forbidden,
    Allow,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard;

impl RouteGuard {
    pub fn decide(state: &SessionState, required_role: Option<Role>) -> RouteDecision {
        if state.is_loading() {
            return RouteDecision::Loading;
        }

        if !state.is_authenticated() {
            debug!("No authenticated user, redirecting to login");
            return RouteDecision::RedirectToLogin;
        }

        match required_role {
            Some(required) if state.role != required => {
                warn!(
                    "Access denied. User role: {}, Required: {}",
                    state.role, required
                );
                RouteDecision::Forbidden
            }
            _ => RouteDecision::Allow,
        }
    }
}
