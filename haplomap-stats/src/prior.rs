//! Global Beta prior fitted once per estimation pass.

use haplomap_core::Summarizable;
use log::debug;

use crate::bayesian::Beta;
use crate::config::EstimatorConfig;
use crate::descriptive::Moments;

/// The dataset-wide prior over marker frequencies.
///
/// `mean` and `variance` are the raw moments of the per-location
/// frequencies. The `safe_*` values are the clamped moments the Beta shape
/// parameters were fitted from.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlobalPrior {
    /// Number of locations the prior was fitted from.
    pub locations: usize,
    /// Unclamped mean of raw frequencies; the null for the significance test.
    pub mean: f64,
    /// Population variance of raw frequencies.
    pub variance: f64,
    /// Mean after clamping to the configured bounds.
    pub safe_mean: f64,
    /// Variance after clamping to `[floor, safe_mean(1-safe_mean)·factor]`.
    pub safe_variance: f64,
    /// Beta shape α.
    pub alpha: f64,
    /// Beta shape β.
    pub beta: f64,
}

impl GlobalPrior {
    /// Fit the prior from raw frequencies by method of moments.
    ///
    /// Returns `None` for an empty slice; there is nothing to estimate.
    pub fn fit(raw_frequencies: &[f64], config: &EstimatorConfig) -> Option<Self> {
        let Moments { n, mean, variance } = Moments::of(raw_frequencies)?;

        let (lo, hi) = config.mean_bounds;
        let safe_mean = mean.max(lo).min(hi);
        let ceiling = safe_mean * (1.0 - safe_mean) * config.variance_ceiling_factor;
        let safe_variance = variance.max(config.variance_floor).min(ceiling);

        let shape = Beta::from_moments(safe_mean, safe_variance, config.min_shape);
        let prior = Self {
            locations: n,
            mean,
            variance,
            safe_mean,
            safe_variance,
            alpha: shape.alpha(),
            beta: shape.beta(),
        };
        debug!("fitted global prior: {}", prior.summary());
        Some(prior)
    }

    /// The fitted prior as a [`Beta`] distribution.
    pub fn distribution(&self) -> Beta {
        Beta::from_shapes(self.alpha, self.beta)
    }
}

impl Summarizable for GlobalPrior {
    fn summary(&self) -> String {
        format!(
            "n={}, mean={:.4}, var={:.6}, alpha={:.3}, beta={:.3}",
            self.locations, self.mean, self.variance, self.alpha, self.beta,
        )
    }
}
