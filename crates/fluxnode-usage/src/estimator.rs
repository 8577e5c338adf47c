//! Node load heuristic.
//!
//! Blends a synthetic, sync-phase based CPU estimate with the OS five-minute
//! load average by taking their mean. Pure and deterministic.

use fluxnode_common::config::EstimatorConfig;
use fluxnode_common::types::{LoadSample, UsageScore};

/// Sync phase derived from the lag behind the chain head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// Far behind the head; the scanner is doing bulk work.
    InitialScan,
    /// A few blocks behind.
    CatchingUp,
    /// At the head.
    SteadyState,
}

impl SyncPhase {
    /// Classifies a lag. Thresholds are strict: a lag equal to the
    /// initial-scan threshold is still catching up.
    pub const fn classify(sync_lag_blocks: u64, config: &EstimatorConfig) -> Self {
        if sync_lag_blocks > config.initial_scan_lag_blocks {
            Self::InitialScan
        } else if sync_lag_blocks > 0 {
            Self::CatchingUp
        } else {
            Self::SteadyState
        }
    }

    /// Per-core load factor for this phase.
    pub const fn factor(self, config: &EstimatorConfig) -> f64 {
        match self {
            Self::InitialScan => config.initial_scan_factor,
            Self::CatchingUp => config.catching_up_factor,
            Self::SteadyState => config.steady_state_factor,
        }
    }
}

/// Pure load estimator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadEstimator {
    config: EstimatorConfig,
}

impl LoadEstimator {
    /// Creates an estimator with the given constants.
    #[must_use]
    pub const fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// Estimates node usage for `sample`.
    #[must_use]
    pub fn estimate(&self, sample: &LoadSample) -> UsageScore {
        let effective_cores = sample.core_count.min(self.config.max_cores);
        let effective_cores = f64::from(u32::try_from(effective_cores).unwrap_or(u32::MAX));
        let phase = SyncPhase::classify(sample.sync_lag_blocks, &self.config);
        let cpu_usage = phase
            .factor(&self.config)
            .mul_add(effective_cores, sample.reserved_cpu_share);
        UsageScore::new(f64::midpoint(sample.five_minute_load_avg, cpu_usage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(lag: u64, cores: usize, reserved: f64, load: f64) -> LoadSample {
        LoadSample {
            sync_lag_blocks: lag,
            core_count: cores,
            reserved_cpu_share: reserved,
            five_minute_load_avg: load,
        }
    }

    #[test]
    fn far_behind_on_large_host() {
        let score = LoadEstimator::default().estimate(&sample(10, 16, 1.0, 2.0));
        assert_eq!(score.to_string(), "3.50000000");
    }

    #[test]
    fn steady_state_on_small_idle_host() {
        let score = LoadEstimator::default().estimate(&sample(0, 2, 0.0, 0.0));
        assert_eq!(score.to_string(), "0.10000000");
    }

    #[test]
    fn lag_at_threshold_is_catching_up() {
        let config = EstimatorConfig::default();
        assert_eq!(SyncPhase::classify(5, &config), SyncPhase::CatchingUp);
        assert_eq!(SyncPhase::classify(6, &config), SyncPhase::InitialScan);
        assert_eq!(SyncPhase::classify(1, &config), SyncPhase::CatchingUp);
        assert_eq!(SyncPhase::classify(0, &config), SyncPhase::SteadyState);

        // 0.25 * 4 cores = 1.0, (1.0 + 1.0) / 2 = 1.0
        let score = LoadEstimator::default().estimate(&sample(5, 4, 0.0, 1.0));
        assert_eq!(score.to_string(), "1.00000000");
    }

    #[test]
    fn zero_cores_removes_phase_term() {
        let score = LoadEstimator::default().estimate(&sample(100, 0, 0.5, 1.5));
        assert_eq!(score.to_string(), "1.00000000");
    }

    #[test]
    fn reserved_share_is_uncapped() {
        // 0.1 * 8 + 20 = 20.8, (20.8 + 0) / 2 = 10.4
        let score = LoadEstimator::default().estimate(&sample(0, 64, 20.0, 0.0));
        assert_eq!(score.to_string(), "10.40000000");
    }

    #[test]
    fn identical_samples_give_identical_scores() {
        let estimator = LoadEstimator::default();
        let s = sample(3, 6, 0.333_333_333_3, 1.234_567_891);
        let first = estimator.estimate(&s);
        let second = estimator.estimate(&s);
        assert_eq!(first.to_string(), second.to_string());
        assert_eq!(first.value().to_bits(), second.value().to_bits());
    }

    #[test]
    fn overridden_constants_are_used() {
        let config = EstimatorConfig {
            initial_scan_factor: 1.0,
            catching_up_factor: 0.5,
            steady_state_factor: 0.0,
            initial_scan_lag_blocks: 100,
            max_cores: 2,
        };
        let estimator = LoadEstimator::new(config);
        // lag 50 <= 100 → catching up: 0.5 * min(8, 2) = 1.0, (1.0 + 3.0) / 2 = 2.0
        assert_eq!(estimator.estimate(&sample(50, 8, 0.0, 3.0)).to_string(), "2.00000000");
    }
}
