//! Wilson score confidence intervals for binomial proportions.

/// Critical value for a two-sided 95% interval.
pub const Z_95: f64 = 1.96;

/// A confidence interval for a proportion, clamped to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProportionInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ProportionInterval {
    /// `upper - lower`.
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Wilson score interval for `successes` out of `trials`.
///
/// ```text
/// center = (p + z²/2n) / (1 + z²/n)
/// margin = z·sqrt(p(1-p)/n + z²/4n²) / (1 + z²/n)
/// ```
///
/// Returns `None` when `trials == 0`. `successes` above `trials` are treated
/// as `trials`.
pub fn wilson(successes: u64, trials: u64, z: f64) -> Option<ProportionInterval> {
    if trials == 0 {
        return None;
    }
    let n = trials as f64;
    let p = successes.min(trials) as f64 / n;
    let z2 = z * z;

    let denominator = 1.0 + z2 / n;
    let center = (p + z2 / (2.0 * n)) / denominator;
    let spread = (p * (1.0 - p) / n + z2 / (4.0 * n * n)).max(0.0);
    let margin = z * spread.sqrt() / denominator;

    let lower = (center - margin).max(0.0);
    let upper = (center + margin).min(1.0);
    Some(ProportionInterval {
        lower,
        upper: upper.max(lower),
    })
}
