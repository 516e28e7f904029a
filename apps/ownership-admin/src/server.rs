use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use crate::api::rest::routes;
use crate::auth::TokenIdentities;
use crate::config::AppConfig;
use crate::domain::site::AdminSite;

/// Build the admin router from configuration.
///
/// # Errors
///
/// Returns an error if a record type or a user entry is invalid.
pub fn build_router(config: &AppConfig) -> anyhow::Result<Router> {
    let site = AdminSite::from_config(&config.ownership).context("invalid record types")?;
    let identities = TokenIdentities::from_config(&config.users).context("invalid users")?;

    if identities.is_empty() {
        tracing::warn!("no users configured; every request will be rejected");
    }

    Ok(routes::router(Arc::new(site), Arc::new(identities)))
}

/// Serve the admin interface until Ctrl+C.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the listener fails.
pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let app = build_router(config)?;

    let addr = format!("{}:{}", config.server.bind_addr, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, prefix = %config.ownership.admin_prefix, "ownership admin listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("ownership admin stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
