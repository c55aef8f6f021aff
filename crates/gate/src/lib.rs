//! Folio session gate: decides, per request, whether the caller holds a
//! valid dashboard session.
//!
//! The gate reads the access token from a [`CredentialStore`], refreshes it
//! through a [`Refresher`] when it is missing or expired, decodes the
//! [`Identity`] and applies the [`GatePolicy`] allow-list and route rules.
//! Every failure resolves to a redirect; nothing here fails open.

pub mod api;
pub mod clock;
pub mod codec;
pub mod gate;
pub mod policy;
pub mod refresh;
pub mod store;

pub use api::{ApiClient, ApiError, ApiResponse, LoginResponse};
pub use clock::{Clock, SystemClock};
pub use codec::{Identity, TokenError, decode, is_expired};
pub use gate::{DEFAULT_REFRESH_TIMEOUT, Decision, Gate, REDIRECT_PARAM, Verdict};
pub use policy::{GatePolicy, PolicyError, Route};
pub use refresh::{RefreshError, RefreshedTokens, Refresher};
pub use store::{CredentialStore, MemoryStore, SessionTokens, Slot};
