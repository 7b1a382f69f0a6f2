//! Beta-Binomial conjugate prior and Empirical-Bayes shrinkage.
//!
//! The heatmap treats every location's marker frequency as drawn from one
//! shared [`Beta`] prior fitted to the whole dataset. A location's shrunk
//! frequency is the posterior mean after observing its own counts:
//!
//! ```text
//! shrunk = (successes + α) / (trials + α + β)
//! ```
//!
//! Locations with few samples stay close to the prior mean; well-sampled
//! locations keep close to their raw frequency.

use haplomap_core::{HaplomapError, Result};

use crate::distribution::Distribution;

/// Beta distribution, conjugate prior for binomial likelihood.
///
/// After observing `s` successes in `n` trials, the posterior is
/// `Beta(α + s, β + n − s)`; only its mean is needed here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beta {
    alpha: f64,
    beta: f64,
}

impl Beta {
    /// Create a Beta distribution with shape parameters `alpha` and `beta`.
    ///
    /// Both must be positive and finite.
    pub fn new(alpha: f64, beta: f64) -> Result<Self> {
        if !(alpha > 0.0 && beta > 0.0) || !alpha.is_finite() || !beta.is_finite() {
            return Err(HaplomapError::InvalidInput(format!(
                "Beta: alpha and beta must be positive and finite (got {alpha}, {beta})"
            )));
        }
        Ok(Self { alpha, beta })
    }

    /// Method-of-moments fit from a mean and variance.
    ///
    /// Solves `m = α/(α+β)`, `v = αβ/((α+β)²(α+β+1))` for α and β, then
    /// raises both to at least `min_shape`. The caller is responsible for
    /// `0 < mean < 1` and `0 < variance < mean(1-mean)`; outside that range
    /// the floor is what keeps the result usable.
    pub fn from_moments(mean: f64, variance: f64, min_shape: f64) -> Self {
        let common = mean * (1.0 - mean) / variance - 1.0;
        Self {
            alpha: (mean * common).max(min_shape),
            beta: ((1.0 - mean) * common).max(min_shape),
        }
    }

    /// Shapes already known to be positive (fitted priors).
    pub(crate) fn from_shapes(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    /// Alpha parameter (prior pseudo-successes).
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Beta parameter (prior pseudo-failures).
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Posterior mean after observing `successes` in `trials`.
    ///
    /// This is the Empirical-Bayes shrunk frequency. Strictly inside (0, 1)
    /// whenever `successes <= trials`.
    pub fn posterior_mean(&self, successes: u64, trials: u64) -> f64 {
        (successes as f64 + self.alpha) / (trials as f64 + self.alpha + self.beta)
    }
}

impl Distribution for Beta {
    fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    fn variance(&self) -> f64 {
        let ab = self.alpha + self.beta;
        (self.alpha * self.beta) / (ab * ab * (ab + 1.0))
    }
}
