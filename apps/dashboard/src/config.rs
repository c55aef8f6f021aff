//! Dashboard configuration loaded from TOML.

use anyhow::{Context, Result};
use gate::GatePolicy;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Config directory name under platform config dir.
pub const CONFIG_DIR: &str = "folio";
/// Config file name inside the config directory.
pub const CONFIG_FILE: &str = "folio.toml";
/// Environment variable with extra allow-listed emails, comma-separated.
pub const ALLOWED_EMAILS_ENV: &str = "FOLIO_ALLOWED_EMAILS";

/// Resolve the global configuration directory (`~/.config/folio/` on unix).
pub fn global_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR))
        .context("no platform config directory")
}

/// Top-level dashboard configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Portfolio backend API.
    #[serde(default)]
    pub api: ApiConfig,
    /// Route policy and allow-list.
    #[serde(default)]
    pub gate: GatePolicy,
    /// Session cookie settings.
    #[serde(default)]
    pub cookies: CookieConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3000,
        }
    }
}

/// Backend API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://localhost:5000/api/v1` (supports `${ENV_VAR}`).
    pub base_url: String,
    /// Per-request timeout in seconds. Also bounds token refresh.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api/v1".to_owned(),
            timeout_secs: 10,
        }
    }
}

/// Names and flags of the two session cookies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Access token cookie.
    pub access_name: String,
    /// Refresh token cookie.
    pub refresh_name: String,
    /// Mark cookies `Secure`. Enable behind TLS.
    pub secure: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            access_name: "accessToken".to_owned(),
            refresh_name: "refreshToken".to_owned(),
            secure: false,
        }
    }
}

impl DashboardConfig {
    /// Parse a TOML string, expanding `${ENV_VAR}` references first, and
    /// validate the gate policy.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let expanded = crate::utils::expand_env_vars(toml_str);
        let config: Self = toml::from_str(&expanded).context("invalid dashboard config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file path and merge the allow-list from
    /// [`ALLOWED_EMAILS_ENV`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut config = Self::from_toml(&content)
            .with_context(|| format!("failed to load {}", path.display()))?;
        if let Ok(raw) = std::env::var(ALLOWED_EMAILS_ENV) {
            config.merge_allowed_emails(&raw);
        }
        Ok(config)
    }

    /// Add comma-separated emails to the allow-list. Blank entries are skipped.
    pub fn merge_allowed_emails(&mut self, raw: &str) {
        self.gate.allowed_emails.extend(
            raw.split(',')
                .map(str::trim)
                .filter(|email| !email.is_empty())
                .map(Into::into),
        );
    }

    /// Check the gate policy and the API settings.
    pub fn validate(&self) -> Result<()> {
        self.gate.validate().context("invalid [gate] policy")?;
        anyhow::ensure!(self.api.timeout_secs > 0, "[api] timeout_secs must be positive");
        anyhow::ensure!(
            self.cookies.access_name != self.cookies.refresh_name,
            "[cookies] access_name and refresh_name must differ"
        );
        Ok(())
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Backend request timeout.
    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

/// Write a default config file at `config_path`, creating its directory.
///
/// An existing config file is left untouched.
pub fn scaffold(config_path: &Path) -> Result<()> {
    if let Some(dir) = config_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    if config_path.exists() {
        tracing::info!("keeping existing {}", config_path.display());
        return Ok(());
    }

    let contents = toml::to_string_pretty(&DashboardConfig::default())
        .context("failed to serialize default config")?;
    std::fs::write(config_path, contents)
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    tracing::info!("wrote default config to {}", config_path.display());
    Ok(())
}
