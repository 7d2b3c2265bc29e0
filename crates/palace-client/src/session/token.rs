use std::fmt;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use super::SessionError;

/// Backend-issued bearer token. Only the session hands these out.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub(crate) fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[derive(Debug, Deserialize)]
struct BackendTokenClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    exp: Option<i64>,
}

/// Checks what the client can check about a freshly issued token and returns
/// its expiry when the token carries one.
///
/// The signature is not verified: the backend owns the signing secret and
/// will reject a forged token with a 401 on first use.
pub(crate) fn inspect_issued_token(
    raw: &str,
    expected_subject: &str,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, SessionError> {
    if raw.trim().is_empty() {
        return Err(SessionError::InvalidToken(
            "access token is empty".to_string(),
        ));
    }
    if raw.chars().any(char::is_whitespace) {
        return Err(SessionError::InvalidToken(
            "access token contains whitespace".to_string(),
        ));
    }

    let Some(claims) = decode_unverified_claims(raw) else {
        return Ok(None);
    };

    if let Some(subject) = claims.sub.as_deref()
        && subject != expected_subject
    {
        return Err(SessionError::InvalidToken(
            "token subject does not match the signed-in user".to_string(),
        ));
    }

    let Some(exp) = claims.exp else {
        return Ok(None);
    };
    let expires_at = DateTime::<Utc>::from_timestamp(exp, 0).ok_or_else(|| {
        SessionError::InvalidToken("token expiry is out of range".to_string())
    })?;
    if expires_at <= now {
        return Err(SessionError::TokenExpired);
    }

    Ok(Some(expires_at))
}

fn decode_unverified_claims(raw: &str) -> Option<BackendTokenClaims> {
    if raw.split('.').count() != 3 {
        return None;
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<BackendTokenClaims>(raw, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims)
}
