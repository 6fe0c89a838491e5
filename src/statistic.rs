//! Pointwise test statistics for level-shift detection.
//!
//! A statistic maps a series and a split point to a scalar measuring how
//! different the two segments are. The trajectory form evaluates the statistic
//! at every valid split point.
//!
//! # Available statistics
//!
//! - **BalanceMean**: right-segment mean minus left-segment mean (default)
//! - **BalanceMedian**: same shape with medians, robust to outliers
//! - **Cusum**: cumulative sum of mean-centered observations
//!
//! Sign convention for the balance statistics is directional: positive means
//! the right segment is higher.

use crate::error::{Result, ShiftError};
use crate::stats::{mean, median};

/// Statistic type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Statistic {
    /// Difference of segment means. Detects a rightward increase in level.
    #[default]
    BalanceMean,
    /// Difference of segment medians. Robust to outliers.
    BalanceMedian,
    /// Cumulative sum of mean-centered observations.
    Cusum,
}

impl Statistic {
    /// Evaluate the statistic at a single split point.
    ///
    /// Returns NaN when the split leaves an empty segment, so that bootstrap
    /// draws over truncated surrogates filter out cleanly.
    pub fn point(&self, series: &[f64], t: usize) -> f64 {
        match self {
            Statistic::BalanceMean => balance_of_means(series, t),
            Statistic::BalanceMedian => balance_of_medians(series, t),
            Statistic::Cusum => cusum_point(series, t),
        }
    }

    /// Evaluate the statistic at every valid split point.
    ///
    /// The balance statistics produce `n - 1` values, one per split. The CUSUM
    /// statistic produces `n` values; its terminal value telescopes to zero and
    /// is verified as a self-check.
    pub fn trajectory(&self, series: &[f64]) -> Result<Vec<f64>> {
        match self {
            Statistic::BalanceMean => balance_of_means_trajectory(series),
            Statistic::BalanceMedian => balance_of_medians_trajectory(series),
            Statistic::Cusum => cusum_trajectory(series),
        }
    }
}

fn check_length(series: &[f64]) -> Result<()> {
    if series.len() < 2 {
        return Err(ShiftError::SeriesTooShort {
            needed: 2,
            got: series.len(),
        });
    }
    Ok(())
}

/// Balance of means at split `t`: `mean(series[t+1..]) - mean(series[..=t])`.
///
/// NaN when `t` leaves the right segment empty or falls outside the series.
pub fn balance_of_means(series: &[f64], t: usize) -> f64 {
    if series.len() < t + 2 {
        return f64::NAN;
    }
    mean(&series[t + 1..]) - mean(&series[..=t])
}

/// Balance of means at every split `t` in `0..n-1`.
pub fn balance_of_means_trajectory(series: &[f64]) -> Result<Vec<f64>> {
    check_length(series)?;
    Ok((0..series.len() - 1)
        .map(|t| balance_of_means(series, t))
        .collect())
}

/// Balance of medians at split `t`: `median(series[t+1..]) - median(series[..=t])`.
pub fn balance_of_medians(series: &[f64], t: usize) -> f64 {
    if series.len() < t + 2 {
        return f64::NAN;
    }
    median(&series[t + 1..]) - median(&series[..=t])
}

/// Balance of medians at every split `t` in `0..n-1`.
pub fn balance_of_medians_trajectory(series: &[f64]) -> Result<Vec<f64>> {
    check_length(series)?;
    Ok((0..series.len() - 1)
        .map(|t| balance_of_medians(series, t))
        .collect())
}

/// Running sum of mean-centered observations through index `t`.
pub fn cusum_point(series: &[f64], t: usize) -> f64 {
    if series.is_empty() || t >= series.len() {
        return f64::NAN;
    }
    let m = mean(series);
    series[..=t].iter().map(|x| x - m).sum()
}

/// Cumulative sum of mean-centered observations at every index.
///
/// The terminal entry telescopes to zero for any finite series; a terminal
/// value outside floating tolerance indicates an arithmetic defect upstream
/// and fails with [`ShiftError::NumericAssertion`].
pub fn cusum_trajectory(series: &[f64]) -> Result<Vec<f64>> {
    check_length(series)?;
    let m = mean(series);
    let mut cusums = Vec::with_capacity(series.len());
    let mut acc = 0.0;
    for x in series {
        acc += x - m;
        cusums.push(acc);
    }

    // Tolerance scales with the total centered mass so large-magnitude series
    // don't trip the check on accumulated rounding alone.
    let scale: f64 = series.iter().map(|x| x.abs()).sum();
    let tol = 1e-9_f64.max(scale * f64::EPSILON * series.len() as f64);
    let terminal = *cusums.last().unwrap_or(&f64::NAN);
    if !(terminal.abs() <= tol) {
        return Err(ShiftError::NumericAssertion(format!(
            "cusum terminal value {terminal} exceeds tolerance {tol}"
        )));
    }
    Ok(cusums)
}
