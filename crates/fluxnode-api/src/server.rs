//! Axum server setup and router construction.

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use axum::routing::get;
use fluxnode_common::error::{FluxError, Result};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::handlers::{self, AppState};

/// Build the full axum router.
///
/// Path and query forms of each endpoint are routed to handlers that
/// merge both sources, so `/apps/applog/web` and
/// `/apps/applog?container=web` are equivalent.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/apps/applog", get(handlers::app_log))
        .route("/apps/applog/{container}", get(handlers::app_log_path))
        .route("/apps/appexec", get(handlers::app_exec))
        .route("/apps/appexec/{container}", get(handlers::app_exec_path))
        .route("/apps/appexec/{container}/{cmd}", get(handlers::app_exec_path))
        .route(
            "/apps/appexec/{container}/{cmd}/{env}",
            get(handlers::app_exec_path),
        )
        .route("/apps/fluxusage", get(handlers::flux_usage))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` for the API.
///
/// # Errors
///
/// Returns [`FluxError::Io`] if the address cannot be bound.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr).await.map_err(|source| FluxError::Io {
        path: PathBuf::from(addr.to_string()),
        source,
    })
}

/// Serve `router` on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`FluxError::Io`] if the server fails while accepting.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().map_err(|source| FluxError::Io {
        path: PathBuf::from("listener"),
        source,
    })?;
    tracing::info!(%addr, "api listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|source| FluxError::Io {
            path: PathBuf::from(addr.to_string()),
            source,
        })?;

    tracing::info!("api stopped");
    Ok(())
}
