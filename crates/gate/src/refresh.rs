//! Token refresher interface.

use serde::{Deserialize, Serialize};
use std::future::Future;

/// Tokens returned by a successful refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedTokens {
    /// New access token.
    pub access_token: String,
    /// Rotated refresh token, when the endpoint issues one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl RefreshedTokens {
    /// Access token only.
    pub fn access(token: impl Into<String>) -> Self {
        Self {
            access_token: token.into(),
            refresh_token: None,
        }
    }
}

/// Refresh failure. The gate treats every variant as "no session".
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    /// The store holds no refresh token; no request was sent.
    #[error("no refresh token in session")]
    MissingRefreshToken,
    /// The request could not be sent or the body not read.
    #[error("refresh request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The endpoint answered with a non-success status.
    #[error("refresh endpoint returned {0}")]
    Status(reqwest::StatusCode),
    /// The endpoint answered `success: false`.
    #[error("refresh rejected: {0}")]
    Rejected(String),
    /// The body did not carry an access token.
    #[error("malformed refresh response: {0}")]
    Malformed(String),
    /// No answer within the refresh timeout.
    #[error("refresh timed out")]
    TimedOut,
}

/// Exchanges a refresh token for a new access token.
///
/// Uses RPITIT (no dyn dispatch).
pub trait Refresher: Send + Sync {
    /// Request a new access token from the auth backend.
    fn refresh(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<RefreshedTokens, RefreshError>> + Send;
}

impl<R: Refresher> Refresher for std::sync::Arc<R> {
    fn refresh(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<RefreshedTokens, RefreshError>> + Send {
        (**self).refresh(refresh_token)
    }
}
