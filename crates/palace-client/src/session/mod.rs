mod token;

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

pub use token::AccessToken;
use token::inspect_issued_token;

use crate::gateway::{BackendGateway, GatewayError};
use crate::models::{AuthTokenResponse, ExternalIdentity, NextAuthRequest};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("sign-in identity is incomplete: {0}")]
    InvalidIdentity(&'static str),
    #[error("backend sign-in exchange failed: {0}")]
    Exchange(#[from] GatewayError),
    #[error("backend issued an unusable token: {0}")]
    InvalidToken(String),
    #[error("backend issued a token that has already expired")]
    TokenExpired,
    #[error("sign-in was superseded by a sign-out")]
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub user: SessionUser,
    token: AccessToken,
    pub expires_at: Option<DateTime<Utc>>,
    pub authenticated_at: DateTime<Utc>,
}

impl Session {
    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    fn from_token_response(
        response: AuthTokenResponse,
        identity: &ExternalIdentity,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if !response.token_type.trim().eq_ignore_ascii_case("bearer") {
            return Err(SessionError::InvalidToken(format!(
                "unsupported token type '{}'",
                response.token_type
            )));
        }

        let expires_at =
            inspect_issued_token(&response.access_token, &response.user.id.to_string(), now)?;

        let name = if response.user.name.trim().is_empty() {
            identity.name.trim().to_string()
        } else {
            response.user.name
        };

        Ok(Self {
            user: SessionUser {
                id: response.user.id,
                email: response.user.email,
                name,
                image_url: response.user.avatar_url.or_else(|| identity.image_url.clone()),
            },
            token: AccessToken::new(response.access_token),
            expires_at,
            authenticated_at: now,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Pending,
    Authenticated(Session),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Anonymous,
    Pending,
    Authenticated,
}

#[derive(Debug, Default)]
struct SessionSlot {
    state: SessionState,
    epoch: u64,
}

/// Shared, injectable session. Clones observe the same state.
///
/// `invalidate` is the only way back to anonymous once a session exists.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    slot: Arc<RwLock<SessionSlot>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SessionStatus {
        match self.read().state {
            SessionState::Anonymous => SessionStatus::Anonymous,
            SessionState::Pending => SessionStatus::Pending,
            SessionState::Authenticated(_) => SessionStatus::Authenticated,
        }
    }

    pub fn state(&self) -> SessionState {
        self.read().state.clone()
    }

    pub fn session(&self) -> Option<Session> {
        match &self.read().state {
            SessionState::Authenticated(session) => Some(session.clone()),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.session().map(|session| session.user)
    }

    pub fn current_token(&self) -> Option<AccessToken> {
        self.current_token_at(Utc::now())
    }

    /// A token past its expiry invalidates the session and yields `None`.
    pub fn current_token_at(&self, now: DateTime<Utc>) -> Option<AccessToken> {
        let session = self.session()?;
        if session.is_expired_at(now) {
            warn!("held session expired; invalidating");
            self.invalidate();
            return None;
        }
        Some(session.token)
    }

    /// Exchanges an externally verified identity for a backend session.
    ///
    /// Fails closed: on any error the context is left anonymous.
    pub async fn authenticate(
        &self,
        gateway: &BackendGateway,
        identity: &ExternalIdentity,
    ) -> Result<Session, SessionError> {
        validate_identity(identity)?;

        let epoch = {
            let mut slot = self.write();
            slot.epoch = slot.epoch.wrapping_add(1);
            slot.state = SessionState::Pending;
            slot.epoch
        };

        let request = NextAuthRequest::from(identity);
        let outcome = match gateway.exchange_identity(&request).await {
            Ok(response) => Session::from_token_response(response, identity, Utc::now()),
            Err(err) => Err(SessionError::Exchange(err)),
        };

        let mut slot = self.write();
        if slot.epoch != epoch {
            return Err(SessionError::Superseded);
        }

        match outcome {
            Ok(session) => {
                info!("signed in user {}", session.user.id);
                slot.state = SessionState::Authenticated(session.clone());
                Ok(session)
            }
            Err(err) => {
                warn!("sign-in exchange failed closed: {err}");
                slot.state = SessionState::Anonymous;
                Err(err)
            }
        }
    }

    pub fn invalidate(&self) {
        let mut slot = self.write();
        slot.epoch = slot.epoch.wrapping_add(1);
        if !matches!(slot.state, SessionState::Anonymous) {
            info!("session invalidated");
        }
        slot.state = SessionState::Anonymous;
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionSlot> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionSlot> {
        self.slot.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn validate_identity(identity: &ExternalIdentity) -> Result<(), SessionError> {
    if identity.subject.trim().is_empty() {
        return Err(SessionError::InvalidIdentity("provider subject is missing"));
    }
    let email = identity.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(SessionError::InvalidIdentity("email is missing or malformed"));
    }
    Ok(())
}
