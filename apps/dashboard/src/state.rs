//! Shared application state for the dashboard server.

use crate::config::CookieConfig;
use gate::{ApiClient, Gate, GatePolicy};
use std::sync::Arc;

/// Shared state available to all request handlers.
pub struct AppState {
    /// Session gate; its refresher is the backend client.
    pub gate: Arc<Gate<ApiClient>>,
    /// Session cookie settings.
    pub cookies: Arc<CookieConfig>,
}

impl AppState {
    pub fn new(gate: Gate<ApiClient>, cookies: CookieConfig) -> Self {
        Self {
            gate: Arc::new(gate),
            cookies: Arc::new(cookies),
        }
    }

    /// Backend auth client.
    pub fn api(&self) -> &ApiClient {
        self.gate.refresher()
    }

    pub fn policy(&self) -> &GatePolicy {
        self.gate.policy()
    }
}

impl Clone for AppState {
    fn clone(&self) -> Self {
        Self {
            gate: Arc::clone(&self.gate),
            cookies: Arc::clone(&self.cookies),
        }
    }
}
