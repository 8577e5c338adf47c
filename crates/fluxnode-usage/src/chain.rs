//! Chain height from the local chain daemon.

use std::time::Duration;

use async_trait::async_trait;
use fluxnode_common::config::ChainRpcConfig;
use fluxnode_common::constants::APP_NAME;
use fluxnode_common::error::{FluxError, Result};
use serde::Deserialize;
use serde_json::json;

use crate::SignalError;

/// Summary of the chain as seen by the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ChainInfo {
    /// Current chain head height.
    pub blocks: u64,
}

/// Source of the reference chain height.
#[async_trait]
pub trait ChainInfoProvider: Send + Sync {
    /// Fetches current chain info.
    ///
    /// # Errors
    ///
    /// Returns a [`SignalError`] if the daemon is unreachable or answers
    /// without a height.
    async fn info(&self) -> std::result::Result<ChainInfo, SignalError>;
}

/// JSON-RPC `getinfo` client for the chain daemon.
#[derive(Debug, Clone)]
pub struct RpcChainInfo {
    client: reqwest::Client,
    config: ChainRpcConfig,
}

#[derive(Debug, Deserialize)]
struct RpcReply {
    result: Option<ChainInfo>,
    error: Option<serde_json::Value>,
}

impl RpcChainInfo {
    /// Builds a client for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`FluxError::Config`] if the HTTP client cannot be built.
    pub fn new(config: ChainRpcConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FluxError::Config {
                message: format!("cannot build chain RPC client: {e}"),
            })?;
        Ok(Self { client, config })
    }
}

fn unavailable(message: impl Into<String>) -> SignalError {
    SignalError::Unavailable {
        signal: "chain height",
        message: message.into(),
    }
}

#[async_trait]
impl ChainInfoProvider for RpcChainInfo {
    async fn info(&self) -> std::result::Result<ChainInfo, SignalError> {
        let body = json!({
            "jsonrpc": "1.0",
            "id": APP_NAME,
            "method": "getinfo",
            "params": [],
        });
        let mut request = self.client.post(&self.config.url).json(&body);
        if let Some(user) = &self.config.user {
            request = request.basic_auth(user, self.config.password.as_deref());
        }

        let response = request.send().await.map_err(|e| unavailable(e.to_string()))?;
        let status = response.status();
        // bitcoind-style daemons answer RPC errors with 500 and a JSON body.
        let reply: RpcReply = response
            .json()
            .await
            .map_err(|e| unavailable(format!("HTTP {status}: {e}")))?;
        if let Some(error) = reply.error.filter(|e| !e.is_null()) {
            return Err(unavailable(format!("RPC error: {error}")));
        }
        if !status.is_success() {
            return Err(unavailable(format!("HTTP {status}")));
        }
        reply
            .result
            .ok_or_else(|| unavailable("getinfo returned no result"))
    }
}

#[cfg(test)]
mod tests {
    use axum::Json;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;

    use super::*;

    async fn spawn_daemon(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        }));
        format!("http://{addr}")
    }

    fn client(url: String) -> RpcChainInfo {
        RpcChainInfo::new(ChainRpcConfig {
            url,
            user: Some("rpcuser".into()),
            password: Some("rpcpass".into()),
            timeout_secs: 2,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn reads_block_height() {
        let router = Router::new().route(
            "/",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["method"], "getinfo");
                Json(json!({
                    "result": {"blocks": 812_345, "version": 4},
                    "error": null,
                    "id": "fluxnode"
                }))
            }),
        );
        let url = spawn_daemon(router).await;
        let info = client(url).info().await.unwrap();
        assert_eq!(info.blocks, 812_345);
    }

    #[tokio::test]
    async fn rpc_error_is_unavailable() {
        let router = Router::new().route(
            "/",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "result": null,
                        "error": {"code": -28, "message": "Loading block index..."}
                    })),
                )
            }),
        );
        let url = spawn_daemon(router).await;
        let err = client(url).info().await.unwrap_err();
        assert!(err.to_string().contains("Loading block index"));
    }

    #[tokio::test]
    async fn unreachable_daemon_is_unavailable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = client(format!("http://{addr}")).info().await.unwrap_err();
        assert!(matches!(err, SignalError::Unavailable { .. }));
    }
}
