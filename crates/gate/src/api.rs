//! Portfolio backend auth client.
//!
//! `ApiClient` wraps a `reqwest::Client` and the API base URL. It serves the
//! three auth endpoints the dashboard needs: login, refresh and password
//! change. The backend expects the raw token in `Authorization`, without a
//! `Bearer` scheme.

use crate::{
    refresh::{RefreshError, RefreshedTokens, Refresher},
    store::SessionTokens,
};
use reqwest::{
    Client, StatusCode,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{future::Future, time::Duration};
use url::Url;

/// Standard backend response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the backend accepted the request.
    #[serde(default)]
    pub success: bool,
    /// Human-readable outcome.
    #[serde(default)]
    pub message: String,
    /// Payload, absent on most failures.
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

/// Response of `POST /auth/login`.
pub type LoginResponse = ApiResponse<SessionTokens>;

impl LoginResponse {
    /// Issued credentials, only when the login succeeded.
    pub fn tokens(&self) -> Option<&SessionTokens> {
        self.data.as_ref().filter(|_| self.success)
    }
}

/// Backend client error.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The configured base URL is unusable.
    #[error("invalid api base url `{url}`: {reason}")]
    BaseUrl { url: String, reason: String },
    /// The request could not be sent or the body not read.
    #[error("api request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-success status with a body that is not a response envelope.
    #[error("api returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    /// Success status with an unreadable body.
    #[error("failed to decode api response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordRequest<'a> {
    old_password: &'a str,
    new_password: &'a str,
}

#[derive(Deserialize)]
struct RefreshEnvelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<RefreshData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshData {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Client for the backend auth endpoints.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client with its own connection pool and request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(client, base_url)
    }

    /// Create a client over an existing `reqwest::Client`.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url).map_err(|e| ApiError::BaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::BaseUrl {
                url: base_url.to_owned(),
                reason: format!("unsupported scheme `{}`", parsed.scheme()),
            });
        }
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// The base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of an endpoint below the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `POST /auth/login`.
    ///
    /// The envelope is returned for any status the backend answers with, so
    /// callers can show its message; check [`LoginResponse::tokens`].
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint("auth/login");
        tracing::trace!("POST {url}");
        let response = self
            .client
            .post(&url)
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        read_envelope(response).await
    }

    /// `PATCH /auth/change-password`, authorized with a valid access token.
    pub async fn change_password(
        &self,
        access_token: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<ApiResponse<serde_json::Value>, ApiError> {
        let url = self.endpoint("auth/change-password");
        tracing::trace!("PATCH {url}");
        let response = self
            .client
            .patch(&url)
            .header(AUTHORIZATION, access_token)
            .json(&ChangePasswordRequest {
                old_password,
                new_password,
            })
            .send()
            .await?;
        read_envelope(response).await
    }

    async fn refresh_access(&self, refresh_token: &str) -> Result<RefreshedTokens, RefreshError> {
        let url = self.endpoint("auth/refresh-token");
        tracing::trace!("POST {url}");
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, refresh_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RefreshError::Status(status));
        }

        let text = response.text().await?;
        let envelope: RefreshEnvelope =
            serde_json::from_str(&text).map_err(|e| RefreshError::Malformed(e.to_string()))?;
        if envelope.success == Some(false) {
            return Err(RefreshError::Rejected(envelope.message.unwrap_or_default()));
        }

        let data = envelope
            .data
            .ok_or_else(|| RefreshError::Malformed("missing `data`".to_owned()))?;
        let access_token = data
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| RefreshError::Malformed("missing `data.accessToken`".to_owned()))?;

        Ok(RefreshedTokens {
            access_token,
            refresh_token: data.refresh_token.filter(|token| !token.is_empty()),
        })
    }
}

impl Refresher for ApiClient {
    fn refresh(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<RefreshedTokens, RefreshError>> + Send {
        self.refresh_access(refresh_token)
    }
}

async fn read_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<ApiResponse<T>, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    match serde_json::from_str(&body) {
        Ok(envelope) => Ok(envelope),
        Err(e) if status.is_success() => Err(ApiError::Decode(e)),
        Err(_) => Err(ApiError::Status { status, body }),
    }
}
