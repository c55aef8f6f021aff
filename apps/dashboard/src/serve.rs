//! Dashboard serve entrypoint, shared by the binary and tests.

use crate::{config::DashboardConfig, routes, state::AppState};
use anyhow::{Context, Result};
use gate::{ApiClient, Gate};
use std::{io, path::Path};
use tokio::{sync::oneshot, task::JoinHandle};

/// A running dashboard server.
pub struct ServeHandle {
    /// Bound port; useful when binding port 0.
    pub port: u16,
    stop: oneshot::Sender<()>,
    task: JoinHandle<io::Result<()>>,
}

impl ServeHandle {
    /// Stop accepting connections, let in-flight requests finish, and wait
    /// for the server task.
    pub async fn shutdown(self) -> Result<()> {
        // Err only when the server already exited; the task result says why.
        let _ = self.stop.send(());
        self.task.await.context("dashboard server task failed")??;
        Ok(())
    }
}

/// Load config from `config_path` and start serving on `bind`, or on the
/// configured address when `bind` is `None`.
pub async fn serve(config_path: &Path, bind: Option<&str>) -> Result<ServeHandle> {
    let config = DashboardConfig::load(config_path)?;
    tracing::info!("loaded configuration from {}", config_path.display());
    let bind = bind.map_or_else(|| config.bind_address(), str::to_owned);
    serve_with_config(&config, &bind).await
}

/// Build the gate and router from an already loaded config, bind, and serve
/// in a spawned task.
pub async fn serve_with_config(config: &DashboardConfig, bind: &str) -> Result<ServeHandle> {
    let api = ApiClient::new(&config.api.base_url, config.api_timeout())
        .context("failed to build api client")?;
    tracing::info!("using api at {}", api.base_url());

    let gate = Gate::new(config.gate.clone(), api)
        .context("invalid [gate] policy")?
        .with_refresh_timeout(config.api_timeout());
    tracing::info!(
        "gate: login {}, home {}, {} allowed email(s)",
        config.gate.login_path,
        config.gate.home_path,
        config.gate.allowed_emails.len()
    );

    let app = routes::router(AppState::new(gate, config.cookies.clone()));
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    let port = listener.local_addr()?.port();
    tracing::info!("dashboard listening on {bind} (port {port})");

    let (stop, stopped) = oneshot::channel();
    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = stopped.await;
                tracing::info!("dashboard shutting down");
            })
            .await
    });

    Ok(ServeHandle { port, stop, task })
}
