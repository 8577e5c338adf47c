//! Endpoint handlers.

use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use fluxnode_common::error::{FluxError, Result};
use fluxnode_common::response::ApiResponse;
use fluxnode_common::types::UsageScore;
use fluxnode_runtime::engine::Engine;
use fluxnode_usage::aggregator::UsageAggregator;

use crate::params::AppParams;

/// Shared application state passed to all handlers via axum's `State`
/// extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Log and exec capture.
    pub engine: Engine,
    /// Node usage computation.
    pub usage: UsageAggregator,
}

type Reply<T> = Json<ApiResponse<T>>;

/// Merges path and query parameters, path first.
fn merge(
    path: Option<std::result::Result<Path<AppParams>, PathRejection>>,
    query: std::result::Result<Query<AppParams>, QueryRejection>,
) -> Result<AppParams> {
    let query = query
        .map(|Query(q)| q)
        .map_err(|e| FluxError::InvalidRequest {
            message: e.body_text(),
        })?;
    match path {
        None => Ok(query),
        Some(path) => {
            let Path(path) = path.map_err(|e| FluxError::InvalidRequest {
                message: e.body_text(),
            })?;
            Ok(path.or(query))
        }
    }
}

fn reply<T>(operation: &'static str, result: Result<T>) -> Reply<T> {
    if let Err(e) = &result {
        tracing::error!(operation, error = %e, name = e.name(), "request failed");
    }
    Json(ApiResponse::from_result(result))
}

async fn capture_logs(state: &AppState, params: Result<AppParams>) -> Result<String> {
    let container = params?.container()?;
    Ok(state.engine.logs(&container).await?.text)
}

async fn capture_exec(state: &AppState, params: Result<AppParams>) -> Result<String> {
    let request = params?.exec_request()?;
    Ok(state.engine.exec(&request).await?.text)
}

/// `GET /apps/applog?container=`: Container log capture.
pub async fn app_log(
    State(state): State<AppState>,
    query: std::result::Result<Query<AppParams>, QueryRejection>,
) -> Reply<String> {
    reply("applog", capture_logs(&state, merge(None, query)).await)
}

/// `GET /apps/applog/{container}`: Container log capture.
pub async fn app_log_path(
    State(state): State<AppState>,
    path: std::result::Result<Path<AppParams>, PathRejection>,
    query: std::result::Result<Query<AppParams>, QueryRejection>,
) -> Reply<String> {
    reply("applog", capture_logs(&state, merge(Some(path), query)).await)
}

/// `GET /apps/appexec?container=&cmd=&env=`: Command execution.
pub async fn app_exec(
    State(state): State<AppState>,
    query: std::result::Result<Query<AppParams>, QueryRejection>,
) -> Reply<String> {
    reply("appexec", capture_exec(&state, merge(None, query)).await)
}

/// `GET /apps/appexec/{container}[/{cmd}[/{env}]]`: Command execution.
pub async fn app_exec_path(
    State(state): State<AppState>,
    path: std::result::Result<Path<AppParams>, PathRejection>,
    query: std::result::Result<Query<AppParams>, QueryRejection>,
) -> Reply<String> {
    reply("appexec", capture_exec(&state, merge(Some(path), query)).await)
}

/// `GET /apps/fluxusage`: Node usage score as an 8-decimal string.
pub async fn flux_usage(State(state): State<AppState>) -> Reply<UsageScore> {
    reply("fluxusage", state.usage.compute_usage().await)
}
