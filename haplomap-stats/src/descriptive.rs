//! Sample moments of per-location frequencies.

/// Count, mean, and population variance of a set of values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub n: usize,
    pub mean: f64,
    /// Population variance (divisor `n`).
    pub variance: f64,
}

impl Moments {
    /// Moments of `data`, or `None` when it is empty.
    ///
    /// Two passes over the data; the second accumulates squared deviations
    /// from the finished mean.
    pub fn of(data: &[f64]) -> Option<Self> {
        if data.is_empty() {
            return None;
        }
        let n = data.len();
        let mean = data.iter().sum::<f64>() / n as f64;
        let variance = data.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / n as f64;
        Some(Self { n, mean, variance })
    }
}
