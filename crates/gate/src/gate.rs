//! The authorization gate.
//!
//! Per request: read the access token, refresh it once if it is missing or
//! expired, decode the identity, then apply the route policy and the
//! allow-list. The result is always a [`Verdict`]; refresh and decode
//! failures degrade to "no identity", never to "allow".

use crate::{
    clock::{Clock, SystemClock},
    codec::{self, Identity},
    policy::{GatePolicy, PolicyError, Route},
    refresh::{RefreshError, Refresher},
    store::{CredentialStore, Slot},
};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::time::Duration;

/// Default bound on a single refresh call.
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(10);

/// Query parameter naming where to return after login.
pub const REDIRECT_PARAM: &str = "redirectPath";

/// Characters escaped in the return path. `/` stays readable.
const RETURN_PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'`');

/// Terminal gate outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The request proceeds to its handler.
    Allow,
    /// The request is answered with a redirect to this location.
    Redirect(String),
}

impl Decision {
    /// Whether the request proceeds.
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Redirect target, if any.
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Allow => None,
            Self::Redirect(location) => Some(location.as_str()),
        }
    }
}

/// Decision plus the identity it was made for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub decision: Decision,
    pub identity: Option<Identity>,
}

/// Request-level session gate.
pub struct Gate<R, C = SystemClock> {
    policy: GatePolicy,
    refresher: R,
    clock: C,
    refresh_timeout: Duration,
}

impl<R: Refresher> Gate<R> {
    /// Gate over the wall clock. Fails if `policy` does not validate.
    pub fn new(policy: GatePolicy, refresher: R) -> Result<Self, PolicyError> {
        policy.validate()?;
        Ok(Self {
            policy,
            refresher,
            clock: SystemClock,
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
        })
    }
}

impl<R: Refresher, C: Clock> Gate<R, C> {
    /// Replace the clock.
    pub fn with_clock<K: Clock>(self, clock: K) -> Gate<R, K> {
        Gate {
            policy: self.policy,
            refresher: self.refresher,
            clock,
            refresh_timeout: self.refresh_timeout,
        }
    }

    /// Bound each refresh call by `timeout`.
    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    /// The policy this gate enforces.
    pub fn policy(&self) -> &GatePolicy {
        &self.policy
    }

    /// The refresher this gate calls.
    pub fn refresher(&self) -> &R {
        &self.refresher
    }

    /// Decide a request for `path` with the credentials in `store`.
    ///
    /// A refreshed access token is written back to `store` before the
    /// decision is made.
    pub async fn authorize<S: CredentialStore>(&self, store: &mut S, path: &str) -> Verdict {
        let identity = self.current_identity(store).await;
        let decision = self.decide(identity.as_ref(), path);
        Verdict { decision, identity }
    }

    /// Apply route policy and the allow-list to an already resolved identity.
    pub fn decide(&self, identity: Option<&Identity>, path: &str) -> Decision {
        let policy = &self.policy;
        let allowed = identity.is_some_and(|id| policy.is_allowed(&id.email));

        match (policy.route(path), identity) {
            (Route::Public, _) => Decision::Allow,
            (Route::Root, None) => Decision::Redirect(self.login_with_return(&policy.home_path)),
            (Route::Protected, None) => Decision::Redirect(self.login_with_return(path)),
            (Route::Root, Some(_)) if allowed => Decision::Redirect(policy.home_path.to_string()),
            (Route::Protected, Some(_)) if allowed => {
                tracing::debug!("allowed {path}");
                Decision::Allow
            }
            (_, Some(id)) => {
                tracing::info!("denied {path}: {} is not on the allow-list", id.email);
                Decision::Redirect(policy.login_path.to_string())
            }
        }
    }

    /// Resolve the session identity, refreshing the access token if needed.
    pub async fn current_identity<S: CredentialStore>(&self, store: &mut S) -> Option<Identity> {
        let token = match self.valid_token(store).await {
            Ok(token) => token,
            Err(RefreshError::MissingRefreshToken) => {
                tracing::debug!("no usable session credentials");
                return None;
            }
            Err(e) => {
                tracing::warn!("session refresh failed: {e}");
                return None;
            }
        };

        match codec::decode(&token) {
            Ok(identity) if !identity.is_expired_at(self.clock.now()) => Some(identity),
            Ok(_) => {
                tracing::warn!("refreshed access token is already expired");
                None
            }
            Err(e) => {
                tracing::warn!("refreshed access token is unreadable: {e}");
                None
            }
        }
    }

    /// Return a usable access token for outbound API calls.
    ///
    /// The stored token is returned while it is unexpired. Otherwise a
    /// single refresh is attempted within the refresh timeout and its result
    /// written back to `store`.
    pub async fn valid_token<S: CredentialStore>(
        &self,
        store: &mut S,
    ) -> Result<String, RefreshError> {
        if let Some(token) = store.get(Slot::Access)
            && !codec::is_expired(Some(&token), self.clock.now())
        {
            return Ok(token);
        }

        let refresh_token = store
            .get(Slot::Refresh)
            .filter(|token| !token.is_empty())
            .ok_or(RefreshError::MissingRefreshToken)?;

        let tokens = tokio::time::timeout(
            self.refresh_timeout,
            self.refresher.refresh(&refresh_token),
        )
        .await
        .map_err(|_| RefreshError::TimedOut)??;

        store.apply_refresh(&tokens);
        tracing::debug!("access token refreshed");
        Ok(tokens.access_token)
    }

    fn login_with_return(&self, path: &str) -> String {
        format!(
            "{}?{REDIRECT_PARAM}={}",
            self.policy.login_path,
            utf8_percent_encode(path, RETURN_PATH)
        )
    }
}
