//! Folio dashboard: axum server behind the session gate.
//!
//! Session credentials live in two HTTP-only cookies. Every gated request
//! goes through [`middleware::guard`], which refreshes an expired access
//! token, writes it back as a cookie, and redirects to login when the
//! caller has no authorized session.

pub mod cli;
pub mod config;
pub mod cookie;
pub mod menu;
pub mod middleware;
pub mod routes;
pub mod serve;
pub mod state;
pub mod utils;

pub use config::DashboardConfig;
pub use cookie::CookieStore;
pub use middleware::Session;
pub use routes::{router, sanitize_redirect};
pub use serve::{ServeHandle, serve, serve_with_config};
pub use state::AppState;
