//! Axum-based HTTP gateway serving link previews.
//!
//! - `GET /health` — liveness and cache occupancy
//! - `GET /api/preview?url=…` — Open Graph preview of an external page
//!
//! Request bodies are capped at 64KB and every request is bounded by a 30s
//! timeout; the outbound preview fetch has its own, shorter timeout.
//! Ctrl+C stops accepting connections and lets in-flight requests finish.

mod handlers;

use handlers::{handle_health, handle_preview};

use crate::config::Config;
use crate::links::{PreviewCache, PreviewFetcher};
use anyhow::Result;
use axum::{Router, http::StatusCode, routing::get};
use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Maximum request body size (64KB)
pub const MAX_BODY_SIZE: usize = 65_536;
/// Request timeout (30s)
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<PreviewFetcher>,
    pub cache: Arc<PreviewCache>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            fetcher: Arc::new(PreviewFetcher::new(&config.preview)?),
            cache: Arc::new(PreviewCache::new(config.preview.cache_capacity)),
        })
    }
}

/// Preview query params
#[derive(Debug, serde::Deserialize)]
pub struct PreviewQuery {
    pub url: Option<String>,
}

fn bare_host(host: &str) -> &str {
    host.strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host)
}

/// Anything other than a loopback address or `localhost`.
pub fn is_public_bind(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return false;
    }
    !bare_host(host)
        .parse::<IpAddr>()
        .is_ok_and(|ip| ip.is_loopback())
}

/// Bind `host:port`, where `host` is a name (`localhost`), an IPv4 literal,
/// or an IPv6 literal with or without brackets.
pub async fn bind_listener(host: &str, port: u16) -> Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind((bare_host(host), port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind gateway to {host}:{port}: {e}"))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/preview", get(handle_preview))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ))
}

/// Run the HTTP gateway on `host:port`.
pub async fn run_gateway(host: &str, port: u16, config: Config) -> Result<()> {
    if is_public_bind(host) && !config.gateway.allow_public_bind {
        anyhow::bail!(
            "Refusing to bind to {host}: the preview endpoint would be reachable from the network.\n\
             Use --host 127.0.0.1 (default) or set [gateway] allow_public_bind = true in config.toml."
        );
    }

    let listener = bind_listener(host, port).await?;

    run_gateway_with_listener(host, listener, config).await
}

/// Run the HTTP gateway from a pre-bound listener until Ctrl+C.
pub async fn run_gateway_with_listener(
    host: &str,
    listener: tokio::net::TcpListener,
    config: Config,
) -> Result<()> {
    run_gateway_until(host, listener, config, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Ctrl+C handler unavailable; gateway runs until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested, draining in-flight requests");
}

/// Run the HTTP gateway from a pre-bound listener until `shutdown` resolves.
pub async fn run_gateway_until(
    host: &str,
    listener: tokio::net::TcpListener,
    config: Config,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let actual_port = listener.local_addr()?.port();
    let state = AppState::from_config(&config)?;

    tracing::info!(
        addr = %format!("{host}:{actual_port}"),
        preview_timeout_secs = config.preview.timeout_secs,
        cache_capacity = config.preview.cache_capacity,
        "gateway listening"
    );
    println!("◆ Gateway listening on http://{host}:{actual_port}");
    println!("  GET  /api/preview?url=<absolute URL>");
    println!("  GET  /health");
    println!("  Press Ctrl+C to stop.\n");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("gateway stopped");
    Ok(())
}
