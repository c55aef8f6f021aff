//! Access token codec.
//!
//! Tokens are JWTs issued by the portfolio backend. The dashboard never holds
//! the signing key, so decoding reads the claims without verifying the
//! signature; the backend verifies on every API call. Any token that cannot
//! be read is [`TokenError`] and counts as expired.

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;

/// Largest accepted NumericDate (9999-12-31T23:59:59Z), in seconds.
///
/// A millisecond timestamp for any date after 1978 exceeds this, so a token
/// minted with the wrong unit is rejected instead of read as far future.
pub const MAX_NUMERIC_DATE: i64 = 253_402_300_799;

/// Identity carried by an access token. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Backend user id (`userId`, or `sub` when absent).
    pub subject_id: CompactString,
    /// Account email, matched against the allow-list.
    pub email: CompactString,
    /// Issue time, when the token carries `iat`.
    pub issued_at: Option<DateTime<Utc>>,
    /// Expiry time from `exp`.
    pub expires_at: DateTime<Utc>,
}

impl Identity {
    /// Whether the token had expired at `now`. Expiry is inclusive.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Token decoding error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// No token, or an empty string.
    #[error("token is empty")]
    Empty,
    /// Not a readable JWT (bad segments, base64, JSON or claim types).
    #[error("malformed token: {0}")]
    Malformed(String),
    /// A required claim is missing.
    #[error("missing claim `{0}`")]
    MissingClaim(&'static str),
    /// A time claim is negative or past [`MAX_NUMERIC_DATE`].
    #[error("claim `{0}` is out of range")]
    OutOfRange(&'static str),
}

#[derive(Deserialize)]
struct Claims {
    #[serde(default, rename = "userId")]
    user_id: Option<CompactString>,
    #[serde(default)]
    sub: Option<CompactString>,
    #[serde(default)]
    email: Option<CompactString>,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    exp: Option<i64>,
}

/// Decode a token into an [`Identity`].
pub fn decode(token: &str) -> Result<Identity, TokenError> {
    if token.is_empty() {
        return Err(TokenError::Empty);
    }

    let data = jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(&[]), &unverified())
        .map_err(|e| TokenError::Malformed(e.to_string()))?;
    let claims = data.claims;

    let subject_id = claims
        .user_id
        .or(claims.sub)
        .ok_or(TokenError::MissingClaim("userId"))?;
    let email = claims.email.ok_or(TokenError::MissingClaim("email"))?;
    let exp = claims.exp.ok_or(TokenError::MissingClaim("exp"))?;
    let issued_at = claims.iat.map(|iat| numeric_date(iat, "iat")).transpose()?;

    Ok(Identity {
        subject_id,
        email,
        issued_at,
        expires_at: numeric_date(exp, "exp")?,
    })
}

/// Whether `token` is unusable at `now`: absent, empty, undecodable, or
/// expired.
pub fn is_expired(token: Option<&str>, now: DateTime<Utc>) -> bool {
    let Some(token) = token else {
        return true;
    };
    match decode(token) {
        Ok(identity) => identity.is_expired_at(now),
        Err(e) => {
            tracing::debug!("treating undecodable token as expired: {e}");
            true
        }
    }
}

/// Claims-only validation: signature, audience and expiry checks are off
/// because expiry is compared against the injected clock instead.
fn unverified() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation
}

fn numeric_date(secs: i64, claim: &'static str) -> Result<DateTime<Utc>, TokenError> {
    if !(0..=MAX_NUMERIC_DATE).contains(&secs) {
        return Err(TokenError::OutOfRange(claim));
    }
    DateTime::from_timestamp(secs, 0).ok_or(TokenError::OutOfRange(claim))
}
