//! Hypothesis testing.
//!
//! Provides [`binomial_z_test`], the normal-approximation test of whether a
//! location's marker count deviates from what the dataset-wide frequency
//! predicts.

use haplomap_core::{Scored, Summarizable};

use crate::distribution::NormalCdf;

/// Result of a hypothesis test.
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    /// The test statistic (|z| here).
    pub statistic: f64,
    /// Two-tailed p-value.
    pub p_value: f64,
    /// Name of the test method.
    pub method: &'static str,
}

impl TestResult {
    /// Whether `p_value` is below `level`.
    pub fn is_significant(&self, level: f64) -> bool {
        self.p_value < level
    }
}

impl Scored for TestResult {
    fn score(&self) -> f64 {
        self.p_value
    }
}

impl Summarizable for TestResult {
    fn summary(&self) -> String {
        format!(
            "{}: statistic={:.4}, p={:.6}",
            self.method, self.statistic, self.p_value,
        )
    }
}

// ── Binomial z-test ────────────────────────────────────────────────────────

const BINOMIAL_Z: &str = "Binomial z-test (normal approximation)";

/// Two-tailed test of `successes ~ Binomial(trials, p0)`.
///
/// ```text
/// z = |successes − n·p0| / sqrt(n·p0·(1 − p0))
/// p = 2·(1 − Φ(z))
/// ```
///
/// A zero standard deviation (no trials, or `p0` at 0 or 1) gives `z = 0`
/// and `p = 1`. Never returns NaN for finite `p0`.
pub fn binomial_z_test(successes: u64, trials: u64, p0: f64, cdf: NormalCdf) -> TestResult {
    let n = trials as f64;
    let expected = n * p0;
    let sd = (n * p0 * (1.0 - p0)).sqrt();
    let z = if sd > 0.0 {
        (successes as f64 - expected).abs() / sd
    } else {
        0.0
    };
    TestResult {
        statistic: z,
        p_value: cdf.two_tailed_p(z),
        method: BINOMIAL_Z,
    }
}
