//! Session gate middleware.

use crate::{cookie::CookieStore, state::AppState};
use axum::{
    extract::{Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use gate::{CredentialStore, Decision, Identity, Slot};

/// Authorized session, inserted into request extensions when the gate allows
/// a request carrying a usable access token.
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: Identity,
    /// Access token valid for outbound API calls.
    pub access_token: String,
}

/// Run the gate for every request passing through this layer.
///
/// A refreshed access token is written back as a cookie on both the redirect
/// and the pass-through response. When the handler sets cookies itself, its
/// cookies are kept as the session outcome.
pub async fn guard(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    let mut store = CookieStore::new(jar, &state.cookies);
    let verdict = state.gate.authorize(&mut store, &path).await;

    if let Decision::Redirect(location) = verdict.decision {
        tracing::debug!("{path} -> {location}");
        return (store.into_jar(), Redirect::temporary(&location)).into_response();
    }

    if let Some(identity) = verdict.identity
        && let Some(access_token) = store.get(Slot::Access)
    {
        request.extensions_mut().insert(Session {
            identity,
            access_token,
        });
    }

    let response = next.run(request).await;
    if response.headers().contains_key(SET_COOKIE) {
        response
    } else {
        (store.into_jar(), response).into_response()
    }
}
