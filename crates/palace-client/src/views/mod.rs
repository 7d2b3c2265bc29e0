//! Headless view controllers.
//!
//! Each controller receives the shared [`SessionContext`] and a
//! [`BackendGateway`] and reports either state to render or a [`Route`] to
//! move to. Every gateway failure goes through [`gateway_failure`], which is
//! where a 401 turns into session invalidation and a sign-in redirect.

mod dashboard;
mod landing;
mod onboarding;
mod search;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use thiserror::Error;
use tracing::warn;

pub use dashboard::{DashboardController, DashboardState, HeatMapCell};
pub use landing::{dispatch, resolve_onboarding_route, sign_in};
pub use onboarding::{OnboardingController, OnboardingStep};
pub use search::{SearchController, SearchOutcome, SearchState};

use crate::gateway::GatewayError;
use crate::session::{AccessToken, SessionContext, SessionError};
use crate::validation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    SignIn,
    Onboarding,
    Dashboard,
}

impl Route {
    pub const fn path(self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::SignIn => "/auth/signin",
            Self::Onboarding => "/onboarding",
            Self::Dashboard => "/dashboard",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "" => Some(Self::Landing),
            "/auth/signin" => Some(Self::SignIn),
            "/onboarding" => Some(Self::Onboarding),
            "/dashboard" => Some(Self::Dashboard),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("session is missing or expired; sign in again")]
    Reauthenticate,
    #[error("{0}")]
    Network(String),
    #[error("{0}")]
    Server(String),
    #[error("{0}")]
    SignInFailed(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a request from this view is already running")]
    Busy,
    #[error("a newer request from this view replaced this one")]
    Superseded,
}

impl ViewError {
    /// Route the shell must navigate to, if any. Everything else is inline.
    pub fn redirect(&self) -> Option<Route> {
        match self {
            Self::Reauthenticate => Some(Route::SignIn),
            _ => None,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Server(_) | Self::SignInFailed(_) | Self::Validation(_)
        )
    }
}

impl From<SessionError> for ViewError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Exchange(GatewayError::NetworkError { .. }) => {
                Self::Network("Could not reach Memory Palace to sign you in.".to_string())
            }
            SessionError::Superseded => Self::Superseded,
            other => Self::SignInFailed(format!("Sign-in failed: {other}")),
        }
    }
}

pub(crate) fn require_token(session: &SessionContext) -> Result<AccessToken, ViewError> {
    session.current_token().ok_or(ViewError::Reauthenticate)
}

/// The one place gateway errors become view errors.
pub(crate) fn gateway_failure(session: &SessionContext, err: GatewayError) -> ViewError {
    match err {
        GatewayError::Unauthorized { operation } => {
            warn!("{operation} was rejected as unauthorized; redirecting to sign-in");
            session.invalidate();
            ViewError::Reauthenticate
        }
        GatewayError::NetworkError { .. } => ViewError::Network(err.user_message()),
        other => ViewError::Server(other.user_message()),
    }
}

/// Per-view counter; only the newest request may apply its response.
#[derive(Debug, Default)]
pub(crate) struct RequestGeneration(AtomicU64);

impl RequestGeneration {
    pub(crate) fn begin(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn is_current(&self, ticket: u64) -> bool {
        self.0.load(Ordering::SeqCst) == ticket
    }
}

/// Loading flag held for the duration of one submission.
pub(crate) struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
