//! # meanshift
//!
//! Resampling-based changepoint significance testing for scalar time series.
//!
//! Detects a single abrupt level shift by combining a deterministic test
//! statistic (balance of means, balance of medians, or CUSUM) with an
//! empirical null distribution built by resampling: either one-shot
//! permutation testing, or moving-block bootstrap confidence intervals
//! converted to p-values through a normal approximation.
//!
//! # Quick start
//!
//! ```
//! use meanshift::prelude::*;
//!
//! let mut series = vec![0.0; 50];
//! series.extend(vec![5.0; 50]);
//!
//! let config = MeanShiftConfig::default().with_seed(42);
//! let result = detect_mean_shift(&series, &config).unwrap();
//!
//! let (split, p) = result.most_significant().unwrap();
//! assert!(p < 0.01, "shift at split {split} should be significant");
//! ```

pub mod bootstrap;
pub mod detect;
pub mod error;
pub mod parallel;
pub mod resample;
pub mod significance;
pub mod statistic;
pub mod stats;

pub use error::{Result, ShiftError};

pub mod prelude {
    pub use crate::bootstrap::{bootstrap_significance, BootstrapConfig, ConfidenceInterval};
    pub use crate::detect::{detect_mean_shift, MeanShiftConfig};
    pub use crate::error::{Result, ShiftError};
    pub use crate::resample::NullModel;
    pub use crate::significance::{significance, SignificanceConfig, SignificanceResult};
    pub use crate::statistic::Statistic;
}
