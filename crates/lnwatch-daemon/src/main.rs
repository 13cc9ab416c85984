mod config;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Json;
use config::DaemonConfig;
use futures::StreamExt;
use lnwatch_core::lightning::{MonitorConfig, Wallet};
use lnwatch_core::metrics::render_metrics;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Clone)]
struct AppState {
    wallet: Wallet,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let cfg = DaemonConfig::load().context("failed to load configuration")?;
    let wallet = Wallet::new(cfg.backend.build());

    match wallet.status().await {
        Ok(status) => match status.error_message {
            Some(message) => warn!("backend status check failed: {message}"),
            None => info!("backend balance {} msat", status.balance_msat),
        },
        Err(e) => warn!("backend status unavailable: {e}"),
    }

    let monitor_config = MonitorConfig {
        poll_interval: Duration::from_secs(cfg.poll_interval_secs),
    };
    let mut paid = wallet.paid_invoices_stream(monitor_config).await;
    tokio::spawn(async move {
        while let Some(checking_id) = paid.next().await {
            info!("invoice {checking_id} settled");
        }
    });

    let state = AppState {
        wallet: wallet.clone(),
    };

    let app = axum::Router::new()
        .route("/health", get(health))
        .route("/status", get(backend_status))
        .route(
            "/metrics",
            get(|| async {
                let body = render_metrics();
                (
                    [(
                        axum::http::header::CONTENT_TYPE,
                        "text/plain; version=0.0.4",
                    )],
                    body,
                )
            }),
        )
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    info!("starting lnwatch on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    wallet.cleanup().await;
    info!("lnwatch stopped");
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn backend_status(State(state): State<AppState>) -> Response {
    match state.wallet.status().await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(e) if e.is_unsupported() => {
            (StatusCode::NOT_IMPLEMENTED, e.to_string()).into_response()
        }
        Err(e) => {
            error!("backend status error: {e}");
            (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
