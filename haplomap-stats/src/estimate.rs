//! The heatmap estimation pass.
//!
//! [`HeatmapEstimator::estimate`] runs the whole pipeline for one filter
//! state:
//!
//! 1. [`aggregate`] joins marker and baseline counts per location.
//! 2. [`GlobalPrior::fit`] fits the dataset-wide Beta prior.
//! 3. Each location gets a shrunk frequency, a Wilson interval, and a
//!    binomial z-test against the unclamped prior mean.
//! 4. p-values are adjusted across locations into q-values.
//!
//! The pass is a pure function of its inputs. It allocates fresh output every
//! time and never fails; empty or degenerate input degrades to empty output
//! or documented per-location defaults.

use haplomap_core::{Located, Result, Scored, Summarizable};
use log::{debug, trace};

use crate::aggregate::{aggregate, FrequencyObservation, LocationObservation};
use crate::config::EstimatorConfig;
use crate::correction;
use crate::interval;
use crate::palette::Shading;
use crate::prior::GlobalPrior;
use crate::rank;
use crate::testing;

/// Adjusted frequency, interval, and significance for one location.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocationEstimate {
    pub location_key: String,
    pub country: String,
    pub province: String,
    pub marker_count: u64,
    pub total_count: u64,
    /// `marker_count / total_count`.
    pub raw_frequency: f64,
    /// Empirical-Bayes posterior mean, strictly inside (0, 1).
    pub shrunk_frequency: f64,
    /// Wilson lower bound.
    pub lower_ci: f64,
    /// Wilson upper bound.
    pub upper_ci: f64,
    /// Two-tailed p-value against the dataset mean.
    pub p_value: f64,
    /// `p_value` adjusted across all locations of the pass.
    pub q_value: f64,
    /// `p_value < significance_level`.
    pub is_significant: bool,
    /// `upper_ci - lower_ci`.
    pub uncertainty: f64,
    /// The baseline had no entry for this location.
    pub baseline_missing: bool,
}

impl LocationEstimate {
    /// Map fill for this estimate.
    pub fn shading(&self) -> Shading {
        Shading::new(self.shrunk_frequency, self.uncertainty)
    }
}

impl Scored for LocationEstimate {
    fn score(&self) -> f64 {
        self.shrunk_frequency
    }
}

impl Located for LocationEstimate {
    fn key(&self) -> &str {
        &self.location_key
    }

    fn region(&self) -> Option<&str> {
        (!self.province.is_empty()).then_some(self.province.as_str())
    }
}

impl Summarizable for LocationEstimate {
    fn summary(&self) -> String {
        format!(
            "{}: {}/{} raw={:.1}% adj={:.1}% CI=[{:.1}%, {:.1}%] p={:.4}{}",
            self.location_key,
            self.marker_count,
            self.total_count,
            self.raw_frequency * 100.0,
            self.shrunk_frequency * 100.0,
            self.lower_ci * 100.0,
            self.upper_ci * 100.0,
            self.p_value,
            if self.is_significant { " *" } else { "" },
        )
    }
}

/// Estimate one location against a fitted prior.
///
/// The q-value is left equal to the p-value; adjustment needs the whole pass.
/// A location with `total_count == 0` gets the zero-confidence defaults:
/// shrunk 0, interval [0, 0], p 1, uncertainty 1.
pub fn estimate_location(
    obs: &FrequencyObservation,
    prior: &GlobalPrior,
    config: &EstimatorConfig,
) -> LocationEstimate {
    let successes = obs.marker_count.min(obs.total_count);
    let trials = obs.total_count;

    let base = LocationEstimate {
        location_key: obs.location_key.clone(),
        country: obs.country.clone(),
        province: obs.province.clone(),
        marker_count: obs.marker_count,
        total_count: obs.total_count,
        raw_frequency: 0.0,
        shrunk_frequency: 0.0,
        lower_ci: 0.0,
        upper_ci: 0.0,
        p_value: 1.0,
        q_value: 1.0,
        is_significant: false,
        uncertainty: 1.0,
        baseline_missing: obs.baseline_missing,
    };

    let Some(ci) = interval::wilson(successes, trials, config.z) else {
        trace!("{}: no trials, using defaults", obs.location_key);
        return base;
    };

    let shrunk = prior.distribution().posterior_mean(successes, trials);
    let test = testing::binomial_z_test(successes, trials, prior.mean, config.normal_cdf);

    let estimate = LocationEstimate {
        raw_frequency: successes as f64 / trials as f64,
        shrunk_frequency: shrunk,
        lower_ci: ci.lower,
        upper_ci: ci.upper,
        p_value: test.p_value,
        q_value: test.p_value,
        is_significant: test.is_significant(config.significance_level),
        uncertainty: ci.width(),
        ..base
    };
    trace!("{}", estimate.summary());
    estimate
}

/// Output of one estimation pass.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Heatmap {
    /// `None` when no location survived aggregation.
    pub prior: Option<GlobalPrior>,
    /// One entry per marker location with a non-zero total, in input order.
    pub estimates: Vec<LocationEstimate>,
}

impl Heatmap {
    /// Whether there is anything to draw.
    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    /// The `n` highest shrunk frequencies, highest first.
    pub fn top(&self, n: usize) -> Vec<&LocationEstimate> {
        rank::top_locations(&self.estimates, n)
    }

    /// Aggregate figures for the pass.
    pub fn summary_stats(&self) -> HeatmapSummary {
        let n = self.estimates.len();
        let mean_uncertainty = if n == 0 {
            0.0
        } else {
            self.estimates.iter().map(|e| e.uncertainty).sum::<f64>() / n as f64
        };
        HeatmapSummary {
            locations: n,
            significant: self.estimates.iter().filter(|e| e.is_significant).count(),
            baseline_missing: self.estimates.iter().filter(|e| e.baseline_missing).count(),
            mean_uncertainty,
            global_mean: self.prior.map(|p| p.mean),
        }
    }
}

/// Aggregate figures for one [`Heatmap`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeatmapSummary {
    pub locations: usize,
    pub significant: usize,
    pub baseline_missing: usize,
    pub mean_uncertainty: f64,
    pub global_mean: Option<f64>,
}

impl Summarizable for HeatmapSummary {
    fn summary(&self) -> String {
        match self.global_mean {
            Some(m) => format!(
                "{} locations, {} significant, global mean {:.1}%, mean CI width {:.1}%",
                self.locations,
                self.significant,
                m * 100.0,
                self.mean_uncertainty * 100.0,
            ),
            None => "no locations".to_string(),
        }
    }
}

/// Runs estimation passes with a validated configuration.
#[derive(Debug, Clone, Default)]
pub struct HeatmapEstimator {
    config: EstimatorConfig,
}

impl HeatmapEstimator {
    /// Validate `config` and build an estimator around it.
    pub fn new(config: EstimatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Run one pass over marker-scoped and baseline observations.
    pub fn estimate(
        &self,
        marker: &[LocationObservation],
        baseline: &[LocationObservation],
    ) -> Heatmap {
        let observations = aggregate(marker, baseline, self.config.missing_baseline);
        debug!(
            "aggregated {} marker / {} baseline observations into {} locations",
            marker.len(),
            baseline.len(),
            observations.len()
        );
        self.estimate_observations(&observations)
    }

    /// Run one pass over already-joined observations.
    pub fn estimate_observations(&self, observations: &[FrequencyObservation]) -> Heatmap {
        let raw: Vec<f64> = observations.iter().map(|o| o.raw_frequency).collect();
        let Some(prior) = GlobalPrior::fit(&raw, &self.config) else {
            return Heatmap {
                prior: None,
                estimates: Vec::new(),
            };
        };

        let mut estimates: Vec<LocationEstimate> = observations
            .iter()
            .map(|o| estimate_location(o, &prior, &self.config))
            .collect();

        let p_values: Vec<f64> = estimates.iter().map(|e| e.p_value).collect();
        match correction::correct(&p_values, self.config.correction) {
            Ok(q_values) => {
                for (e, q) in estimates.iter_mut().zip(q_values) {
                    e.q_value = q;
                }
            }
            // p-values are clamped to [0, 1] upstream; keep raw values if not.
            Err(e) => debug!("q-value adjustment skipped: {e}"),
        }

        Heatmap {
            prior: Some(prior),
            estimates,
        }
    }
}

/// One pass with the default configuration.
pub fn estimate(
    marker: &[LocationObservation],
    baseline: &[LocationObservation],
) -> Vec<LocationEstimate> {
    HeatmapEstimator::default().estimate(marker, baseline).estimates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MissingBaseline;
    use crate::distribution::NormalCdf;

    fn obs(key: &str, n: u64) -> LocationObservation {
        LocationObservation::with_key(key, "Iraq", key, n)
    }

    fn joined(key: &str, successes: u64, trials: u64) -> FrequencyObservation {
        FrequencyObservation {
            location_key: key.into(),
            country: "Iraq".into(),
            province: key.into(),
            marker_count: successes,
            total_count: trials,
            raw_frequency: if trials == 0 { 0.0 } else { successes as f64 / trials as f64 },
            baseline_missing: false,
        }
    }

    #[test]
    fn two_locations_shrink_toward_half() {
        let out = estimate(&[obs("A", 8), obs("B", 2)], &[obs("A", 10), obs("B", 10)]);
        assert_eq!(out.len(), 2);
        let (a, b) = (&out[0], &out[1]);
        assert!((a.raw_frequency - 0.8).abs() < 1e-12);
        assert!((b.raw_frequency - 0.2).abs() < 1e-12);
        assert!(a.shrunk_frequency > 0.5 && a.shrunk_frequency < 0.8);
        assert!(b.shrunk_frequency < 0.5 && b.shrunk_frequency > 0.2);
        // alpha = beta = 0.5 * (0.25/0.09 - 1)
        let ab = 0.25 / 0.09 - 1.0;
        assert!((a.shrunk_frequency - (8.0 + ab / 2.0) / (10.0 + ab)).abs() < 1e-12);
        assert!((a.shrunk_frequency + b.shrunk_frequency - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_trial_location_excluded() {
        assert!(estimate(&[obs("C", 0)], &[obs("C", 0)]).is_empty());
    }

    #[test]
    fn empty_input_has_no_prior() {
        let heatmap = HeatmapEstimator::default().estimate(&[], &[obs("A", 3)]);
        assert!(heatmap.is_empty());
        assert!(heatmap.prior.is_none());
        assert_eq!(heatmap.summary_stats().summary(), "no locations");
    }

    #[test]
    fn saturated_location_is_significant() {
        // Global mean 0.3 from the other locations; one location at 50/50.
        let est = HeatmapEstimator::default();
        let mut observations = vec![joined("Hot", 50, 50)];
        for i in 0..13 {
            observations.push(joined(&format!("L{i}"), 2, 10));
        }
        // (1.0 + 13 * 0.2) / 14 = 0.2571...; shift one location to land on 0.3.
        observations[1] = joined("L0", 8, 10);
        let heatmap = est.estimate_observations(&observations);
        let prior = heatmap.prior.unwrap();
        assert!((prior.mean - 0.3).abs() < 1e-12);

        let hot = &heatmap.estimates[0];
        assert_eq!(hot.raw_frequency, 1.0);
        assert!(hot.p_value < 0.01);
        assert!(hot.is_significant);
        assert!(hot.shrunk_frequency < 0.99);
        assert!(hot.upper_ci <= 1.0);
    }

    #[test]
    fn zero_trials_defaults() {
        let prior = GlobalPrior::fit(&[0.4, 0.6], &EstimatorConfig::default()).unwrap();
        let e = estimate_location(&joined("Z", 0, 0), &prior, &EstimatorConfig::default());
        assert_eq!(e.shrunk_frequency, 0.0);
        assert_eq!((e.lower_ci, e.upper_ci), (0.0, 0.0));
        assert_eq!(e.p_value, 1.0);
        assert!(!e.is_significant);
        assert_eq!(e.uncertainty, 1.0);
    }

    #[test]
    fn idempotent() {
        let marker = [obs("A", 3), obs("B", 17), obs("C", 0), obs("D", 40)];
        let baseline = [obs("A", 9), obs("B", 20), obs("C", 6), obs("D", 200)];
        let first = estimate(&marker, &baseline);
        let second = estimate(&marker, &baseline);
        assert_eq!(first, second);
        for (x, y) in first.iter().zip(&second) {
            assert_eq!(x.shrunk_frequency.to_bits(), y.shrunk_frequency.to_bits());
            assert_eq!(x.p_value.to_bits(), y.p_value.to_bits());
        }
    }

    #[test]
    fn q_values_not_below_p_values() {
        let marker = [obs("A", 3), obs("B", 17), obs("C", 1), obs("D", 40)];
        let baseline = [obs("A", 9), obs("B", 20), obs("C", 30), obs("D", 200)];
        for e in estimate(&marker, &baseline) {
            assert!(e.q_value >= e.p_value - 1e-12);
            assert!(e.q_value <= 1.0);
        }
    }

    #[test]
    fn no_correction_keeps_p_values() {
        let est = HeatmapEstimator::new(
            EstimatorConfig::default().with_correction(crate::correction::CorrectionMethod::None),
        )
        .unwrap();
        let heatmap = est.estimate(&[obs("A", 3), obs("B", 9)], &[obs("A", 10), obs("B", 10)]);
        for e in &heatmap.estimates {
            assert_eq!(e.q_value, e.p_value);
        }
    }

    #[test]
    fn exclude_policy_drops_unmatched() {
        let est = HeatmapEstimator::new(
            EstimatorConfig::default().with_missing_baseline(MissingBaseline::Exclude),
        )
        .unwrap();
        let heatmap = est.estimate(&[obs("A", 3), obs("Z", 9)], &[obs("A", 10)]);
        assert_eq!(heatmap.estimates.len(), 1);
        assert_eq!(heatmap.summary_stats().baseline_missing, 0);
    }

    #[test]
    fn fallback_is_flagged() {
        let heatmap = HeatmapEstimator::default()
            .estimate(&[obs("A", 3), obs("Z", 9)], &[obs("A", 10)]);
        let z = &heatmap.estimates[1];
        assert!(z.baseline_missing);
        assert_eq!(z.raw_frequency, 1.0);
        assert_eq!(heatmap.summary_stats().baseline_missing, 1);
    }

    #[test]
    fn invalid_config_rejected() {
        assert!(HeatmapEstimator::new(EstimatorConfig::default().with_z(0.0)).is_err());
    }

    #[test]
    fn erf_cdf_changes_only_p_values() {
        let marker = [obs("A", 3), obs("B", 17), obs("D", 40)];
        let baseline = [obs("A", 9), obs("B", 20), obs("D", 200)];
        let zs = estimate(&marker, &baseline);
        let erf = HeatmapEstimator::new(EstimatorConfig::default().with_normal_cdf(NormalCdf::Erf))
            .unwrap()
            .estimate(&marker, &baseline)
            .estimates;
        for (a, b) in zs.iter().zip(&erf) {
            assert_eq!(a.shrunk_frequency, b.shrunk_frequency);
            assert_eq!(a.lower_ci, b.lower_ci);
            assert!((a.p_value - b.p_value).abs() < 1e-6);
        }
    }

    #[test]
    fn summary_counts() {
        let heatmap = HeatmapEstimator::default()
            .estimate(&[obs("A", 8), obs("B", 2)], &[obs("A", 10), obs("B", 10)]);
        let s = heatmap.summary_stats();
        assert_eq!(s.locations, 2);
        assert_eq!(s.global_mean, Some(0.5));
        assert!(s.mean_uncertainty > 0.0 && s.mean_uncertainty < 1.0);
        assert!(s.summary().starts_with("2 locations"));
        assert_eq!(heatmap.top(1)[0].location_key, "A");
    }

    #[test]
    fn huge_summed_totals_stay_finite() {
        let out = estimate(
            &[obs("A", 1), obs("B", 5)],
            &[obs("A", u64::MAX), obs("A", 2), obs("B", 10)],
        );
        assert_eq!(out.len(), 2);
        for e in &out {
            assert!(e.shrunk_frequency > 0.0 && e.shrunk_frequency < 1.0);
            assert!(e.lower_ci <= e.upper_ci && e.upper_ci <= 1.0);
            assert!((0.0..=1.0).contains(&e.p_value));
        }
    }

    #[test]
    fn outputs_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Heatmap>();
        assert_send_sync::<HeatmapEstimator>();
    }

    #[test]
    fn located_by_key_and_province() {
        let out = estimate(&[obs("A", 1)], &[obs("A", 4)]);
        assert_eq!(out[0].key(), "A");
        assert_eq!(out[0].region(), Some("A"));
        assert_eq!(out[0].score(), out[0].shrunk_frequency);
    }

    #[test]
    fn shading_uses_shrunk_frequency() {
        let out = estimate(&[obs("A", 8), obs("B", 2)], &[obs("A", 10), obs("B", 10)]);
        let a = out[0].shading();
        assert_eq!(a.bucket, crate::palette::ColorBucket::VeryHigh);
        assert!((a.opacity - (1.0 - out[0].uncertainty).max(0.3)).abs() < 1e-12);
        assert!(out[0].summary().starts_with("A: 8/10"));
    }
}
