use super::handlers::{handle_health, handle_predict, handle_shutdown};
use super::{AppState, MAX_BODY_SIZE};

use crate::config::GatewayConfig;
use anyhow::{Context, Result};
use axum::{
    Router,
    http::{HeaderValue, StatusCode, header},
    routing::{get, post},
};
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::cors::{AllowMethods, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Returns true when the bind address is not a loopback address.
pub fn is_public_bind(host: &str) -> bool {
    !matches!(
        host,
        "127.0.0.1" | "localhost" | "::1" | "[::1]" | "0:0:0:0:0:0:0:1"
    )
}

/// Run the HTTP gateway on the configured address until shutdown is signalled.
pub async fn run_gateway(config: &GatewayConfig, state: AppState) -> Result<()> {
    // ── Security: refuse public bind without explicit opt-in ──
    if is_public_bind(&config.host) && !config.allow_public_bind {
        anyhow::bail!(
            "Refusing to bind to {}: the companion API would be reachable from the network.\n\
             Fix: use --host 127.0.0.1 (default), or set\n\
             [gateway] allow_public_bind = true in config.toml.",
            config.host
        );
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("parse gateway bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind gateway socket")?;

    run_gateway_with_listener(listener, config, state).await
}

/// Run the HTTP gateway from a pre-bound listener.
pub async fn run_gateway_with_listener(
    listener: tokio::net::TcpListener,
    config: &GatewayConfig,
    state: AppState,
) -> Result<()> {
    let local_addr = listener
        .local_addr()
        .context("get gateway listener local address")?;

    print_gateway_banner(&local_addr.to_string(), state.manager.model_name());
    tracing::info!(addr = %local_addr, "gateway listening");

    let shutdown = state.shutdown.clone();
    let app = build_app(state, config);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await
        .context("serve HTTP gateway")?;

    tracing::info!("gateway stopped");
    Ok(())
}

fn print_gateway_banner(display_addr: &str, model: &str) {
    println!("PsychPal listening on {display_addr} (model runtime: {model})");
    println!("  GET  /health");
    println!("  POST /predict");
    println!("  GET  /shutdown");
    println!("  Press Ctrl+C to stop.\n");
}

pub fn build_app(state: AppState, config: &GatewayConfig) -> Router {
    let app = Router::new()
        .route("/health", get(handle_health))
        .route("/predict", post(handle_predict))
        .route("/shutdown", get(handle_shutdown))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ));

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return app;
    }

    // Credentials rule out wildcards, so methods are mirrored from the preflight.
    app.layer(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers([
                header::ACCEPT,
                header::ACCEPT_LANGUAGE,
                header::CONTENT_LANGUAGE,
                header::CONTENT_TYPE,
            ])
            .allow_credentials(true),
    )
}
