//! Route policy and email allow-list.
//!
//! One `GatePolicy` is loaded at startup and shared by every request. Paths
//! are matched by segment-boundary prefix: `/login` covers `/login` and
//! `/login/reset` but not `/loginx`. Anything not declared public is
//! protected, and `/` is always redirected.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Outcome of resolving a path against the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The site root; always redirected.
    Root,
    /// Reachable without a session.
    Public,
    /// Requires an allow-listed identity.
    Protected,
}

/// Policy validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// A declared path does not start with `/`.
    #[error("path `{0}` must start with `/`")]
    Relative(CompactString),
    /// `/` was declared public, which would expose every route.
    #[error("the root path cannot be public")]
    PublicRoot,
    /// The home path was declared public.
    #[error("home path `{0}` cannot be public")]
    PublicHome(CompactString),
    /// Login and home paths collide.
    #[error("login and home paths are both `{0}`")]
    SameLoginAndHome(CompactString),
}

/// Gate policy: reserved paths, public prefixes and the allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatePolicy {
    /// Login screen; implicitly public.
    pub login_path: CompactString,
    /// Landing page for authorized users.
    pub home_path: CompactString,
    /// Additional public path prefixes.
    pub public_paths: Vec<CompactString>,
    /// Emails allowed past the gate. Exact, case-sensitive match.
    pub allowed_emails: BTreeSet<CompactString>,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            login_path: "/login".into(),
            home_path: "/dashboard".into(),
            public_paths: Vec::new(),
            allowed_emails: BTreeSet::new(),
        }
    }
}

impl GatePolicy {
    /// Policy with the default paths and the given allow-list.
    pub fn with_allowed<I, E>(emails: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<CompactString>,
    {
        Self {
            allowed_emails: emails.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Check the policy is consistent.
    pub fn validate(&self) -> Result<(), PolicyError> {
        for path in [&self.login_path, &self.home_path]
            .into_iter()
            .chain(&self.public_paths)
        {
            if !path.starts_with('/') {
                return Err(PolicyError::Relative(path.clone()));
            }
        }
        let is_root = |p: &CompactString| p.trim_end_matches('/').is_empty();
        if is_root(&self.login_path) || self.public_paths.iter().any(is_root) {
            return Err(PolicyError::PublicRoot);
        }
        if self.login_path.trim_end_matches('/') == self.home_path.trim_end_matches('/') {
            return Err(PolicyError::SameLoginAndHome(self.login_path.clone()));
        }
        if is_root(&self.home_path) || self.route(&self.home_path) == Route::Public {
            return Err(PolicyError::PublicHome(self.home_path.clone()));
        }
        Ok(())
    }

    /// Resolve a request path. Total: every path has exactly one route.
    pub fn route(&self, path: &str) -> Route {
        if path.is_empty() || path == "/" {
            return Route::Root;
        }
        let public = std::iter::once(&self.login_path)
            .chain(&self.public_paths)
            .any(|prefix| matches_prefix(prefix, path));
        if public {
            Route::Public
        } else {
            Route::Protected
        }
    }

    /// Whether `email` is on the allow-list.
    pub fn is_allowed(&self, email: &str) -> bool {
        self.allowed_emails.contains(email)
    }
}

fn matches_prefix(prefix: &str, path: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return false;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
