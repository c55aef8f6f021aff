//! HTTP-only cookie credential store.
//!
//! Wraps the request's [`CookieJar`]. Writes land in the jar's delta, so
//! they are visible to later reads in the same request and are emitted as
//! `Set-Cookie` when the jar is returned with the response.

use crate::config::CookieConfig;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use gate::{CredentialStore, Slot};

/// Credential store over the session cookies of one request.
pub struct CookieStore<'a> {
    jar: CookieJar,
    config: &'a CookieConfig,
}

impl<'a> CookieStore<'a> {
    pub fn new(jar: CookieJar, config: &'a CookieConfig) -> Self {
        Self { jar, config }
    }

    /// Give back the jar, with any pending cookie changes.
    pub fn into_jar(self) -> CookieJar {
        self.jar
    }

    fn name(&self, slot: Slot) -> &'a str {
        match slot {
            Slot::Access => &self.config.access_name,
            Slot::Refresh => &self.config.refresh_name,
        }
    }
}

impl CredentialStore for CookieStore<'_> {
    fn get(&self, slot: Slot) -> Option<String> {
        self.jar
            .get(self.name(slot))
            .map(|cookie| cookie.value().to_owned())
            .filter(|value| !value.is_empty())
    }

    fn set(&mut self, slot: Slot, token: &str) {
        let cookie = Cookie::build((self.name(slot).to_owned(), token.to_owned()))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.config.secure)
            .path("/");
        self.jar = std::mem::take(&mut self.jar).add(cookie);
    }

    fn delete(&mut self, slot: Slot) {
        let cookie = Cookie::build((self.name(slot).to_owned(), "")).path("/");
        self.jar = std::mem::take(&mut self.jar).remove(cookie);
    }
}
