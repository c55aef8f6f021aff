//! Shared fixtures: token minting, a fixed clock and fake refreshers.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use folio_gate::{Clock, RefreshError, RefreshedTokens, Refresher};
use jsonwebtoken::{EncodingKey, Header};
use serde_json::json;
use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

/// Fixed "now" used across tests: 2026-01-01T00:00:00Z.
pub const NOW: i64 = 1_767_225_600;

pub fn now() -> DateTime<Utc> {
    Utc.timestamp_opt(NOW, 0).unwrap()
}

/// Sign arbitrary claims with a throwaway key.
pub fn mint(claims: serde_json::Value) -> String {
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"not-the-backend-key"),
    )
    .unwrap()
}

/// Backend-shaped access token expiring `ttl` seconds after [`NOW`].
pub fn access_token(email: &str, ttl: i64) -> String {
    mint(json!({
        "userId": "665f1c2e9b1d4a0012345678",
        "email": email,
        "iat": NOW - 60,
        "exp": NOW + ttl,
    }))
}

#[derive(Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// What a [`FakeRefresher`] answers.
#[derive(Clone)]
pub enum Answer {
    Token(String),
    Rotate(String, String),
    Fail,
    Hang,
}

/// Refresher that records calls and answers from a script.
#[derive(Clone)]
pub struct FakeRefresher {
    answer: Answer,
    calls: Arc<AtomicUsize>,
    last_refresh_token: Arc<std::sync::Mutex<Option<String>>>,
}

impl FakeRefresher {
    pub fn new(answer: Answer) -> Self {
        Self {
            answer,
            calls: Arc::new(AtomicUsize::new(0)),
            last_refresh_token: Arc::new(std::sync::Mutex::new(None)),
        }
    }

    pub fn issuing(token: String) -> Self {
        Self::new(Answer::Token(token))
    }

    pub fn failing() -> Self {
        Self::new(Answer::Fail)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_refresh_token(&self) -> Option<String> {
        self.last_refresh_token.lock().unwrap().clone()
    }
}

impl Refresher for FakeRefresher {
    fn refresh(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<RefreshedTokens, RefreshError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_refresh_token.lock().unwrap() = Some(refresh_token.to_owned());
        let answer = self.answer.clone();
        async move {
            match answer {
                Answer::Token(token) => Ok(RefreshedTokens::access(token)),
                Answer::Rotate(access, refresh) => Ok(RefreshedTokens {
                    access_token: access,
                    refresh_token: Some(refresh),
                }),
                Answer::Fail => Err(RefreshError::Rejected("network unreachable".into())),
                Answer::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Err(RefreshError::Rejected("unreachable".into()))
                }
            }
        }
    }
}
