//! Shared helpers: token minting, a fake portfolio backend and a running
//! dashboard.

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::{patch, post},
};
use folio_dashboard::{DashboardConfig, ServeHandle, serve_with_config};
use jsonwebtoken::{EncodingKey, Header};
use reqwest::{
    Client, Response,
    header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
};
use serde_json::{Value, json};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

pub const ADMIN: &str = "admin@mail.com";
pub const PASSWORD: &str = "secret";
pub const REFRESH_TOKEN: &str = "refresh-1";

/// Mint a backend-style access token for `email`, expiring `ttl` seconds
/// from now.
pub fn access_token(email: &str, ttl: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = json!({
        "userId": "665f1c2e9b1d4a0012345678",
        "email": email,
        "iat": now - 60,
        "exp": now + ttl,
    });
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"backend-secret"),
    )
    .unwrap()
}

/// Observations of the fake backend.
#[derive(Clone, Default)]
pub struct Backend {
    refreshes: Arc<AtomicUsize>,
    password_token: Arc<Mutex<Option<String>>>,
}

impl Backend {
    /// Number of refresh calls received.
    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// `Authorization` of the last password change.
    pub fn password_token(&self) -> Option<String> {
        self.password_token.lock().unwrap().clone()
    }
}

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

async fn refresh(State(backend): State<Backend>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    backend.refreshes.fetch_add(1, Ordering::SeqCst);
    if authorization(&headers).as_deref() == Some(REFRESH_TOKEN) {
        let body = json!({
            "success": true,
            "message": "Access token retrieved successfully!",
            "data": { "accessToken": access_token(ADMIN, 900) },
        });
        (StatusCode::OK, Json(body))
    } else {
        let body = json!({ "success": false, "message": "You are not authorized!" });
        (StatusCode::UNAUTHORIZED, Json(body))
    }
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] == PASSWORD {
        let email = body["email"].as_str().unwrap_or_default();
        let body = json!({
            "success": true,
            "message": "User logged in successfully!",
            "data": {
                "accessToken": access_token(email, 900),
                "refreshToken": REFRESH_TOKEN,
            },
        });
        (StatusCode::OK, Json(body))
    } else {
        let body = json!({ "success": false, "message": "Password is incorrect" });
        (StatusCode::UNAUTHORIZED, Json(body))
    }
}

async fn change_password(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    *backend.password_token.lock().unwrap() = authorization(&headers);
    if body["oldPassword"] == PASSWORD && body["newPassword"].is_string() {
        let body = json!({ "success": true, "message": "Password changed successfully!", "data": null });
        (StatusCode::OK, Json(body))
    } else {
        let body = json!({ "success": false, "message": "Password is incorrect" });
        (StatusCode::FORBIDDEN, Json(body))
    }
}

/// Start the fake backend. Returns its API base URL.
pub async fn spawn_backend() -> (String, Backend) {
    let backend = Backend::default();
    let router = Router::new()
        .route("/api/v1/auth/refresh-token", post(refresh))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/change-password", patch(change_password))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    (format!("http://{addr}/api/v1"), backend)
}

/// Dashboard config against `api_base`, allowing [`ADMIN`].
pub fn config(api_base: &str) -> DashboardConfig {
    let mut config = DashboardConfig::default();
    config.api.base_url = api_base.to_owned();
    config.api.timeout_secs = 5;
    config.merge_allowed_emails(ADMIN);
    config
}

/// A running dashboard and its base URL.
pub struct Dashboard {
    pub url: String,
    pub handle: ServeHandle,
}

pub async fn start(config: &DashboardConfig) -> Dashboard {
    let handle = serve_with_config(config, "127.0.0.1:0").await.unwrap();
    Dashboard {
        url: format!("http://127.0.0.1:{}", handle.port),
        handle,
    }
}

/// Fake backend plus a dashboard wired to it.
pub async fn start_with_backend() -> (Dashboard, Backend) {
    let (base, backend) = spawn_backend().await;
    (start(&config(&base)).await, backend)
}

/// HTTP client that does not follow redirects.
pub fn client() -> Client {
    Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// `Cookie` header value for a session.
pub fn cookies(access: Option<&str>, refresh: Option<&str>) -> String {
    let mut pairs = Vec::new();
    if let Some(access) = access {
        pairs.push(format!("accessToken={access}"));
    }
    if let Some(refresh) = refresh {
        pairs.push(format!("refreshToken={refresh}"));
    }
    pairs.join("; ")
}

pub async fn get(url: &str, cookie: &str) -> Response {
    let mut request = client().get(url);
    if !cookie.is_empty() {
        request = request.header(COOKIE, cookie);
    }
    request.send().await.unwrap()
}

/// POST an already urlencoded form body.
pub async fn post_form(url: &str, cookie: &str, body: &'static str) -> Response {
    let mut request = client()
        .post(url)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(body);
    if !cookie.is_empty() {
        request = request.header(COOKIE, cookie);
    }
    request.send().await.unwrap()
}

pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

/// All `Set-Cookie` values of a response.
pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_owned)
        .collect()
}

/// `Set-Cookie` value for cookie `name`, if emitted.
pub fn set_cookie(response: &Response, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    set_cookies(response)
        .into_iter()
        .find(|cookie| cookie.starts_with(&prefix))
}

/// Value part of a `Set-Cookie` line.
pub fn cookie_value(set_cookie: &str) -> &str {
    let pair = set_cookie.split(';').next().unwrap_or_default();
    pair.split_once('=').map(|(_, value)| value).unwrap_or_default()
}
