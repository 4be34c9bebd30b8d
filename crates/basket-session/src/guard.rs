//! Navigation gating on auth state.
//!
//! ## Behavior
//!
//! The guard returns no decision at all until the first session
//! resolution has completed. Redirecting off the pre-resolution state
//! would bounce a returning user through the login screen on every
//! cold start, so "undecided" is an explicit outcome here, not an
//! error.

use crate::orchestrator::AuthState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    RedirectToLogin,
}

/// Maps a route path plus the current [`AuthState`] to a navigation
/// decision.
pub struct RouteGuard {
    protected_prefixes: Vec<String>,
}

impl RouteGuard {
    pub fn new<I, S>(protected_prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            protected_prefixes: protected_prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// `None` means "not decided yet": the caller keeps rendering
    /// whatever it was rendering. This happens before the first
    /// resolution and while a transition is in flight.
    pub fn decide(&self, path: &str, state: &AuthState) -> Option<RouteDecision> {
        match state {
            AuthState::Uninitialized | AuthState::Resolving => None,
            AuthState::Authenticated(_) => Some(RouteDecision::Allow),
            AuthState::Unauthenticated => {
                if self.is_protected(path) {
                    Some(RouteDecision::RedirectToLogin)
                } else {
                    Some(RouteDecision::Allow)
                }
            }
        }
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(["/account", "/checkout", "/orders"])
    }
}
