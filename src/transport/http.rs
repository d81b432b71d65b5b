//! HTTP surface: read-only health/stats/version endpoints plus the `/ws`
//! upgrade route. The RPC protocol itself only travels over WebSocket.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use super::{websocket, TransportError};
use crate::handlers::{Dispatcher, SERVER_NAME};
use crate::stats::StatsSnapshot;
use crate::version::VersionInfo;

/// Per-request bound for plain HTTP handlers.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// How long in-flight requests may drain after a shutdown signal.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// State shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/version", get(version))
        .route("/ws", get(websocket::upgrade))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .with_state(AppState { dispatcher })
}

/// Bind `0.0.0.0:<port>` and serve until SIGINT/SIGTERM.
pub async fn run(dispatcher: Arc<Dispatcher>, port: u16) -> Result<(), TransportError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await.map_err(|source| {
        error!(%addr, error = %source, "failed to bind");
        TransportError::Bind { addr, source }
    })?;

    info!("starting MCP server in HTTP mode on port {port}");
    info!("health endpoint: http://localhost:{port}/health");
    info!("stats endpoint: http://localhost:{port}/stats");
    info!("version endpoint: http://localhost:{port}/version");
    info!("websocket endpoint: ws://localhost:{port}/ws");

    serve(listener, dispatcher, shutdown_signal()).await
}

/// Serve on an already-bound listener until `shutdown` resolves, then give
/// in-flight requests [`SHUTDOWN_GRACE`] to finish before stopping.
pub async fn serve<F>(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    shutdown: F,
) -> Result<(), TransportError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(dispatcher);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = stop_rx.await;
    });
    let mut task = tokio::spawn(async move { server.await });

    tokio::select! {
        joined = &mut task => return flatten(joined),
        _ = shutdown => info!("shutting down server..."),
    }

    let _ = stop_tx.send(());
    match tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await {
        Ok(joined) => flatten(joined)?,
        Err(_) => {
            warn!(grace = ?SHUTDOWN_GRACE, "in-flight requests did not drain, forcing stop");
            task.abort();
        }
    }

    info!("server stopped");
    Ok(())
}

fn flatten(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), TransportError> {
    match joined {
        Ok(result) => result.map_err(TransportError::Serve),
        Err(e) => Err(TransportError::Serve(std::io::Error::new(
            std::io::ErrorKind::Other,
            e,
        ))),
    }
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("received shutdown signal");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix;
        match unix::signal(unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("received TERM signal");
            }
            Err(e) => {
                error!(error = %e, "failed to install TERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// GET /health
async fn health() -> Json<Value> {
    let info = VersionInfo::current();
    Json(json!({
        "status": "healthy",
        "service": SERVER_NAME,
        "version": info.version,
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        "build_info": {
            "version": info.version,
            "build_time": info.build_time,
            "git_commit": info.git_commit,
            "rustc_version": info.rustc_version,
        }
    }))
}

/// GET /stats
async fn stats(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.dispatcher.stats().snapshot())
}

/// GET /version
async fn version() -> Json<VersionInfo> {
    Json(VersionInfo::current())
}
