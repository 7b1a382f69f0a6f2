//! Estimator configuration.
//!
//! [`EstimatorConfig::default`] reproduces the browser heatmap exactly. Every
//! knob is a plain public field; [`EstimatorConfig::validate`] is run once by
//! [`HeatmapEstimator::new`](crate::estimate::HeatmapEstimator::new) so the
//! estimation pass itself never has to check them.

use haplomap_core::{HaplomapError, Result};

use crate::correction::CorrectionMethod;
use crate::distribution::NormalCdf;
use crate::interval::Z_95;

/// What to do with a marker-scoped location that has no baseline entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MissingBaseline {
    /// Use the marker count as its own total (raw frequency 1.0).
    ///
    /// This is what the heatmap has always done. It overstates the frequency
    /// of locations the baseline query missed, so a warning is logged each
    /// time it fires.
    #[default]
    UseMarkerCount,
    /// Drop the location from the pass.
    Exclude,
}

/// Tunable constants of the heatmap estimation pass.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EstimatorConfig {
    /// Critical value for the Wilson interval (default: 1.96, i.e. 95%).
    pub z: f64,
    /// p-value threshold for `is_significant` (default: 0.05).
    pub significance_level: f64,
    /// Clamp applied to the prior mean before fitting (default: 0.001..0.999).
    pub mean_bounds: (f64, f64),
    /// Lower clamp for the prior variance (default: 0.0001).
    pub variance_floor: f64,
    /// Upper clamp for the prior variance as a fraction of `m(1-m)` (default: 0.9).
    pub variance_ceiling_factor: f64,
    /// Floor for both Beta shape parameters (default: 0.5).
    pub min_shape: f64,
    /// Missing-baseline policy (default: [`MissingBaseline::UseMarkerCount`]).
    pub missing_baseline: MissingBaseline,
    /// CDF used for p-values (default: [`NormalCdf::ZelenSevero`]).
    pub normal_cdf: NormalCdf,
    /// Multiple-testing correction used for q-values (default: Benjamini-Hochberg).
    pub correction: CorrectionMethod,
    /// Number of locations in the "highest frequency" ranking (default: 5).
    pub top_n: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            z: Z_95,
            significance_level: 0.05,
            mean_bounds: (0.001, 0.999),
            variance_floor: 0.0001,
            variance_ceiling_factor: 0.9,
            min_shape: 0.5,
            missing_baseline: MissingBaseline::UseMarkerCount,
            normal_cdf: NormalCdf::ZelenSevero,
            correction: CorrectionMethod::BenjaminiHochberg,
            top_n: 5,
        }
    }
}

impl EstimatorConfig {
    /// Set the Wilson critical value.
    pub fn with_z(mut self, z: f64) -> Self {
        self.z = z;
        self
    }

    /// Set the significance threshold.
    pub fn with_significance_level(mut self, level: f64) -> Self {
        self.significance_level = level;
        self
    }

    /// Set the missing-baseline policy.
    pub fn with_missing_baseline(mut self, policy: MissingBaseline) -> Self {
        self.missing_baseline = policy;
        self
    }

    /// Set the CDF approximation used for p-values.
    pub fn with_normal_cdf(mut self, cdf: NormalCdf) -> Self {
        self.normal_cdf = cdf;
        self
    }

    /// Set the multiple-testing correction.
    pub fn with_correction(mut self, method: CorrectionMethod) -> Self {
        self.correction = method;
        self
    }

    /// Set the ranking size.
    pub fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = n;
        self
    }

    /// Check that every constant is usable.
    pub fn validate(&self) -> Result<()> {
        if !self.z.is_finite() || self.z <= 0.0 {
            return Err(invalid(format!("z must be positive and finite (got {})", self.z)));
        }
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(invalid(format!(
                "significance_level must be in (0, 1) (got {})",
                self.significance_level
            )));
        }
        let (lo, hi) = self.mean_bounds;
        if !(lo > 0.0 && lo < hi && hi < 1.0) {
            return Err(invalid(format!(
                "mean_bounds must satisfy 0 < lo < hi < 1 (got ({lo}, {hi}))"
            )));
        }
        if !self.variance_floor.is_finite() || self.variance_floor <= 0.0 {
            return Err(invalid(format!(
                "variance_floor must be positive (got {})",
                self.variance_floor
            )));
        }
        if !(self.variance_ceiling_factor > 0.0 && self.variance_ceiling_factor <= 1.0) {
            return Err(invalid(format!(
                "variance_ceiling_factor must be in (0, 1] (got {})",
                self.variance_ceiling_factor
            )));
        }
        if !self.min_shape.is_finite() || self.min_shape <= 0.0 {
            return Err(invalid(format!(
                "min_shape must be positive (got {})",
                self.min_shape
            )));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> HaplomapError {
    HaplomapError::InvalidInput(format!("EstimatorConfig: {msg}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let c = EstimatorConfig::default();
        c.validate().unwrap();
        assert_eq!(c.z, Z_95);
        assert_eq!(c.z, 1.96);
    }

    #[test]
    fn builder_setters() {
        let c = EstimatorConfig::default()
            .with_z(2.5758)
            .with_significance_level(0.01)
            .with_missing_baseline(MissingBaseline::Exclude)
            .with_normal_cdf(NormalCdf::Erf)
            .with_correction(CorrectionMethod::Bonferroni)
            .with_top_n(10);
        assert_eq!(c.z, 2.5758);
        assert_eq!(c.significance_level, 0.01);
        assert_eq!(c.missing_baseline, MissingBaseline::Exclude);
        assert_eq!(c.normal_cdf, NormalCdf::Erf);
        assert_eq!(c.correction, CorrectionMethod::Bonferroni);
        assert_eq!(c.top_n, 10);
        c.validate().unwrap();
    }

    #[test]
    fn rejects_bad_z() {
        for z in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(EstimatorConfig::default().with_z(z).validate().is_err());
        }
    }

    #[test]
    fn rejects_bad_significance() {
        for a in [0.0, 1.0, -0.1, f64::NAN] {
            let c = EstimatorConfig::default().with_significance_level(a);
            assert!(c.validate().is_err());
        }
    }

    #[test]
    fn rejects_bad_prior_clamps() {
        let mut c = EstimatorConfig::default();
        c.mean_bounds = (0.5, 0.4);
        assert!(c.validate().is_err());

        let mut c = EstimatorConfig::default();
        c.mean_bounds = (0.0, 0.999);
        assert!(c.validate().is_err());

        let mut c = EstimatorConfig::default();
        c.variance_floor = 0.0;
        assert!(c.validate().is_err());

        let mut c = EstimatorConfig::default();
        c.variance_ceiling_factor = 1.5;
        assert!(c.validate().is_err());

        let mut c = EstimatorConfig::default();
        c.min_shape = 0.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn error_names_the_field() {
        let err = EstimatorConfig::default().with_z(-2.0).validate().unwrap_err();
        assert!(err.to_string().contains("z must be positive"));
    }
}
