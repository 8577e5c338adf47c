//! Gathers the load signals and feeds them to the estimator.
//!
//! Each optional signal falls back to a default when it cannot be read; only
//! an unreachable state store aborts the computation.

use std::sync::Arc;

use fluxnode_common::config::{EstimatorConfig, FluxConfig};
use fluxnode_common::constants::{FALLBACK_CHAIN_HEIGHT, UNSCANNED_LAG_SENTINEL};
use fluxnode_common::error::Result;
use fluxnode_common::types::{LoadSample, UsageScore};

use crate::chain::{ChainInfoProvider, RpcChainInfo};
use crate::estimator::LoadEstimator;
use crate::host::{HostProbe, SystemHost};
use crate::state::{JsonStateStore, StateStore};

/// Computes the node usage score from live signals.
#[derive(Clone)]
pub struct UsageAggregator {
    store: Arc<dyn StateStore>,
    chain: Arc<dyn ChainInfoProvider>,
    host: Arc<dyn HostProbe>,
    estimator: LoadEstimator,
}

impl UsageAggregator {
    /// Creates an aggregator over explicit signal sources.
    #[must_use]
    pub fn new(
        store: Arc<dyn StateStore>,
        chain: Arc<dyn ChainInfoProvider>,
        host: Arc<dyn HostProbe>,
        estimator: EstimatorConfig,
    ) -> Self {
        Self {
            store,
            chain,
            host,
            estimator: LoadEstimator::new(estimator),
        }
    }

    /// Creates an aggregator reading the configured state document, chain
    /// daemon and the running host.
    ///
    /// # Errors
    ///
    /// Returns an error if the chain RPC client cannot be built.
    pub fn from_config(config: &FluxConfig) -> Result<Self> {
        Ok(Self::new(
            Arc::new(JsonStateStore::new(config.state_file.clone())),
            Arc::new(RpcChainInfo::new(config.chain_rpc.clone())?),
            Arc::new(SystemHost),
            config.estimator,
        ))
    }

    /// Gathers a fresh [`LoadSample`].
    ///
    /// # Errors
    ///
    /// Returns a `StateStore` error if the shared state store cannot be
    /// reached. Every other missing signal is replaced by its default.
    pub async fn sample(&self) -> Result<LoadSample> {
        let mut reader = self.store.connect().await.inspect_err(|e| {
            tracing::error!(error = %e, "cannot open shared state store");
        })?;

        let scanned_height = match reader.scanned_height().await {
            Ok(Some(height)) => Some(height),
            Ok(None) => {
                tracing::warn!("scanning not initiated, treating node as far behind");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "treating node as far behind");
                None
            }
        };

        let chain_height = match self.chain.info().await {
            Ok(info) => info.blocks,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    fallback = FALLBACK_CHAIN_HEIGHT,
                    "using fallback chain height"
                );
                FALLBACK_CHAIN_HEIGHT
            }
        };

        let sync_lag_blocks =
            scanned_height.map_or(UNSCANNED_LAG_SENTINEL, |h| chain_height.saturating_sub(h));

        let core_count = self.host.core_count().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "assuming zero cores");
            0
        });

        let reserved_cpu_share = match reader.reserved_cpu().await {
            Ok(cpu) => cpu.unwrap_or(0.0),
            Err(e) => {
                tracing::warn!(error = %e, "assuming no reserved cpu");
                0.0
            }
        };

        let five_minute_load_avg = match self.host.load_average() {
            Ok(load) if load.five.is_finite() && load.five >= 0.0 => load.five,
            Ok(load) => {
                tracing::warn!(five = load.five, "ignoring invalid load average");
                0.0
            }
            Err(e) => {
                tracing::warn!(error = %e, "assuming zero load average");
                0.0
            }
        };

        let sample = LoadSample {
            sync_lag_blocks,
            core_count,
            reserved_cpu_share,
            five_minute_load_avg,
        };
        tracing::debug!(?sample, chain_height, ?scanned_height, "load sample gathered");
        Ok(sample)
    }

    /// Computes the current usage score.
    ///
    /// # Errors
    ///
    /// See [`UsageAggregator::sample`].
    pub async fn compute_usage(&self) -> Result<UsageScore> {
        let sample = self.sample().await?;
        Ok(self.score(&sample))
    }

    /// Scores an already gathered sample.
    pub fn score(&self, sample: &LoadSample) -> UsageScore {
        let score = self.estimator.estimate(sample);
        tracing::info!(%score, "node usage computed");
        score
    }
}

impl std::fmt::Debug for UsageAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageAggregator")
            .field("estimator", &self.estimator)
            .finish_non_exhaustive()
    }
}
