//! Mean-shift detection, the end-to-end entry point.
//!
//! Fixes the statistic to balance-of-means and the null to permutation, and
//! drives the significance engine over the whole series. Callers wanting the
//! median balance, the CUSUM statistic, or the bootstrap-CI path assemble
//! [`crate::significance::significance`] or
//! [`crate::bootstrap::bootstrap_significance`] directly.
//!
//! # Example
//!
//! ```
//! use meanshift::detect::{detect_mean_shift, MeanShiftConfig};
//!
//! let mut series = vec![1.0; 40];
//! series.extend(vec![7.0; 40]);
//!
//! let config = MeanShiftConfig::default().with_seed(42);
//! let result = detect_mean_shift(&series, &config).unwrap();
//!
//! assert_eq!(result.p_values.len(), series.len() - 1);
//! assert!(result.p_values[39] < 0.01);
//! ```

use crate::error::Result;
use crate::resample::NullModel;
use crate::significance::{significance, SignificanceConfig, SignificanceResult};
use crate::statistic::Statistic;

/// Configuration for mean-shift detection.
#[derive(Debug, Clone)]
pub struct MeanShiftConfig {
    /// Number of permutation draws.
    pub n_surrogates: usize,
    /// Random seed for reproducibility (None for entropy).
    pub seed: Option<u64>,
    /// Worker threads for the permutation fan-out. 1 runs serially.
    pub workers: usize,
}

impl Default for MeanShiftConfig {
    fn default() -> Self {
        Self {
            n_surrogates: 1000,
            seed: None,
            workers: 1,
        }
    }
}

impl MeanShiftConfig {
    /// Create a config with the given number of permutation draws.
    pub fn new(n_surrogates: usize) -> Self {
        Self {
            n_surrogates,
            ..Default::default()
        }
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the number of worker threads.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }
}

/// Detect a single abrupt mean shift in `series`.
///
/// Computes the balance-of-means trajectory and calibrates it against
/// `config.n_surrogates` random permutations of the observed values. The
/// returned trajectory, p-values, and counts all have `series.len() - 1`
/// entries, one per split point.
pub fn detect_mean_shift(series: &[f64], config: &MeanShiftConfig) -> Result<SignificanceResult> {
    let engine_config = SignificanceConfig {
        n_surrogates: config.n_surrogates,
        seed: config.seed,
        workers: config.workers,
        ..Default::default()
    };
    significance(
        series,
        Statistic::BalanceMean,
        NullModel::Permutation,
        &engine_config,
    )
}
