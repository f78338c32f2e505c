//! HTTP server command implementation.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::info;

use bulksweep::config::{self, Config};
use bulksweep::log::ActivityLog;
use bulksweep::operation::OperationRegistry;
use bulksweep::retention;
use bulksweep::server::{self, AppState, RuntimeServices};
use bulksweep::store::file::{FileLogStore, FileSiteStore};

pub async fn run(
    config_path: &str,
    host_override: Option<IpAddr>,
    port_override: Option<u16>,
) -> Result<()> {
    let mut config = Config::load(config_path).await?;

    // CLI overrides config
    if let Some(host) = host_override {
        config.server.host = host.to_string();
    }
    if let Some(port) = port_override {
        config.server.port = port;
    }

    // Resolve workspace root, then derive paths from it when not explicitly set
    let config_path_ref = Path::new(config_path);
    let workspace_raw = config
        .workspace
        .as_deref()
        .unwrap_or(Path::new(config::DEFAULT_WORKSPACE));
    let workspace = config::resolve_path(config_path_ref, workspace_raw);
    let site_path = config
        .site
        .path
        .as_ref()
        .map(|p| config::resolve_path(config_path_ref, p))
        .unwrap_or_else(|| workspace.join(config::DEFAULT_SITE_FILE));
    let logs_path = config
        .logs
        .path
        .as_ref()
        .map(|p| config::resolve_path(config_path_ref, p))
        .unwrap_or_else(|| workspace.join(config::DEFAULT_LOGS_DIR));

    // Load the site snapshot and wire the shared services
    let site = Arc::new(
        FileSiteStore::load(&site_path)
            .await
            .with_context(|| format!("failed to load site snapshot {}", site_path.display()))?,
    );
    let logbook = ActivityLog::new(Arc::new(FileLogStore::new(&logs_path)));
    let operations = OperationRegistry::new(Duration::from_secs(config.operation.ttl_minutes * 60));

    let services = RuntimeServices {
        content: site.clone(),
        terms: site,
        logbook: logbook.clone(),
        operations,
    };
    info!(site = %site_path.display(), "Site snapshot loaded");

    // Start the daily retention sweeper (no-op when retention is 0)
    let schedule = retention::parse_schedule(&config.logs.sweep_cron)
        .map_err(|e| anyhow::anyhow!("invalid sweep schedule: {e}"))?;
    let sweeper = retention::start(logbook, config.logs.retention_days, schedule).await;

    let state = AppState {
        services,
        api_token: config.server.api_token.clone(),
        admin_token: config.server.admin_token.clone(),
        retention_days: config.logs.retention_days,
        max_connections: config.server.max_connections,
    };
    let app = server::build_app(state, config.server.request_timeout_seconds);

    let ip: IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(ip, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(addr = %addr, "Starting server");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if let Some(sweeper) = sweeper {
        sweeper.stop();
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
