//! `fluxnode serve`: Serve the HTTP API until interrupted.

use std::net::SocketAddr;
use std::process::ExitCode;

use anyhow::Context;
use clap::Args;
use fluxnode_api::AppState;
use fluxnode_common::config::FluxConfig;
use fluxnode_runtime::engine::Engine;
use fluxnode_usage::aggregator::UsageAggregator;

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address, overriding the configuration.
    #[arg(short, long)]
    pub listen: Option<String>,

    /// Chain daemon RPC URL, overriding the configuration.
    #[arg(long)]
    pub chain_rpc_url: Option<String>,
}

impl ServeArgs {
    /// Applies the command's overrides to `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the listen address does not parse.
    pub fn apply(self, config: &mut FluxConfig) -> anyhow::Result<()> {
        if let Some(listen) = self.listen {
            config.listen_addr = listen;
        }
        if let Some(url) = self.chain_rpc_url {
            config.chain_rpc.url = url;
        }
        let _: SocketAddr = parse_addr(&config.listen_addr)?;
        Ok(())
    }
}

fn parse_addr(addr: &str) -> anyhow::Result<SocketAddr> {
    addr.parse()
        .with_context(|| format!("invalid listen address: {addr}"))
}

/// Executes the `serve` command.
///
/// # Errors
///
/// Returns an error if a backend client cannot be built or the address
/// cannot be bound.
pub async fn execute(config: FluxConfig) -> anyhow::Result<ExitCode> {
    let engine = Engine::docker(&config)?;
    if !engine.is_available().await {
        tracing::warn!("container runtime not reachable; log and exec requests will fail");
    }
    let state = AppState {
        engine,
        usage: UsageAggregator::from_config(&config)?,
    };

    let listener = fluxnode_api::bind(parse_addr(&config.listen_addr)?).await?;
    fluxnode_api::serve(listener, fluxnode_api::build_router(state), shutdown_signal()).await?;
    Ok(ExitCode::SUCCESS)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
