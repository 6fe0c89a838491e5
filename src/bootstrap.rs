//! Block-bootstrap confidence intervals and derived p-values.
//!
//! Alternative inference path to the permutation engine: at each split point
//! the statistic is recomputed on moving-block resamples of the series, a
//! percentile confidence interval is taken over the bootstrap distribution,
//! and the interval width is converted to a two-sided p-value through a
//! normal approximation.
//!
//! The normal approximation is a deliberate simplification: when the bootstrap
//! distribution is markedly non-normal (heavy-tailed statistics), the p-value
//! is biased. This is preserved as documented behavior; callers needing exact
//! resampling p-values should use the permutation engine instead.

use crate::error::{Result, ShiftError};
use crate::resample::{block_resample, derive_seed};
use crate::statistic::Statistic;
use crate::stats::std_dev;
use rand::prelude::*;
use statrs::distribution::{ContinuousCDF, Normal};

/// Configuration for bootstrap significance estimation.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// Number of bootstrap resamples per split point.
    pub n_resamples: usize,
    /// Length of the contiguous blocks tiled into each resample.
    pub block_length: usize,
    /// Random seed for reproducibility (None for entropy).
    pub seed: Option<u64>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            n_resamples: 1000,
            block_length: 3,
            seed: None,
        }
    }
}

impl BootstrapConfig {
    /// Create a config with the given number of resamples.
    pub fn new(n_resamples: usize) -> Self {
        Self {
            n_resamples,
            ..Default::default()
        }
    }

    /// Set the block length.
    pub fn with_block_length(mut self, block_length: usize) -> Self {
        self.block_length = block_length;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Empirical 95% confidence interval over a bootstrap distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceInterval {
    /// 2.5th percentile element of the sorted finite draws.
    pub low: f64,
    /// 97.5th percentile element of the sorted finite draws.
    pub high: f64,
    /// Standard-error proxy, scaled by the square root of the block ratio to
    /// correct for the reduced effective sample size under blocking.
    /// Diagnostic only; the p-value derives from the percentile width.
    pub se: f64,
}

/// Build the 95% percentile interval over `theta_star`.
///
/// Non-finite draws are discarded before sorting. `block_ratio` is
/// `block_length / trajectory_len` and scales the standard-error proxy.
///
/// # Errors
///
/// [`ShiftError::InsufficientSamples`] when fewer than two finite draws
/// remain; a one-point interval would be meaningless.
pub fn confidence_interval(theta_star: &[f64], block_ratio: f64) -> Result<ConfidenceInterval> {
    let mut finite: Vec<f64> = theta_star
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    if finite.len() < 2 {
        return Err(ShiftError::InsufficientSamples {
            needed: 2,
            got: finite.len(),
        });
    }
    finite.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = finite.len() as f64;
    let low = finite[(0.025 * n).floor() as usize];
    let high = finite[(0.975 * n).floor() as usize];
    let se = std_dev(&finite) * block_ratio.sqrt();

    Ok(ConfidenceInterval { low, high, se })
}

/// Convert a percentile interval into an approximate two-sided p-value.
///
/// Treats the interval as `±1.96` standard errors of a normal distribution:
/// `se = (high - low) / (2 * 1.96)`, `z = value / se`, `p = 2 * Phi(-|z|)`.
/// A zero-width interval means the bootstrap distribution is degenerate; any
/// nonzero observed value is then maximally significant.
pub fn pvalue_from_interval(value: f64, ci: &ConfidenceInterval) -> f64 {
    let se = (ci.high - ci.low) / (2.0 * 1.96);
    if !(se > 0.0) {
        return if value.abs() > 0.0 { 0.0 } else { 1.0 };
    }
    let z = value / se;
    let normal = Normal::new(0.0, 1.0).unwrap();
    (-2.0 * normal.cdf(-z.abs())).abs()
}

/// Bootstrap-based p-value at every split point of the observed trajectory.
///
/// For each split index `t`, draws `config.n_resamples` moving-block resamples
/// of `series`, evaluates the point statistic at `t` on each, forms the
/// percentile confidence interval, and converts it to a p-value against
/// `observed[t]`.
///
/// # Errors
///
/// - [`ShiftError::SeriesTooShort`] when `series.len() < 2`
/// - [`ShiftError::InvalidParameter`] when `n_resamples == 0` or
///   `block_length == 0`
/// - [`ShiftError::InsufficientSamples`] when a block length beyond the series
///   length leaves fewer than two finite draws at some split index
pub fn bootstrap_significance(
    series: &[f64],
    observed: &[f64],
    statistic: Statistic,
    config: &BootstrapConfig,
) -> Result<Vec<f64>> {
    if series.len() < 2 {
        return Err(ShiftError::SeriesTooShort {
            needed: 2,
            got: series.len(),
        });
    }
    if config.n_resamples == 0 {
        return Err(ShiftError::InvalidParameter(
            "n_resamples must be positive".to_string(),
        ));
    }
    if config.block_length == 0 {
        return Err(ShiftError::InvalidParameter(
            "block_length must be positive".to_string(),
        ));
    }

    let root = match config.seed {
        Some(seed) => seed,
        None => StdRng::from_entropy().gen(),
    };
    let block_ratio = config.block_length as f64 / observed.len() as f64;

    let mut p_values = Vec::with_capacity(observed.len());
    let mut theta_star = vec![0.0; config.n_resamples];
    for (t, &obs) in observed.iter().enumerate() {
        for (i, theta) in theta_star.iter_mut().enumerate() {
            let draw = (t * config.n_resamples + i) as u64;
            let mut rng = StdRng::seed_from_u64(derive_seed(root, draw));
            let surrogate = block_resample(series, config.block_length, &mut rng);
            *theta = statistic.point(&surrogate, t);
        }
        let ci = confidence_interval(&theta_star, block_ratio)?;
        p_values.push(pvalue_from_interval(obs, &ci));
    }

    Ok(p_values)
}
