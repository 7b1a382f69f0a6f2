//! Heatmap estimation with JSON input/output.
//!
//! Observation arrays arrive exactly as the samples service returns them:
//!
//! ```json
//! [{"locationKey": "Basra, Iraq", "country": "Iraq", "province": "Basra", "sampleCount": 8}]
//! ```
//!
//! `locationKey` may be omitted when `province` and `country` are present.
//! Output field names follow the same camelCase convention.

use serde::{Deserialize, Serialize};

use haplomap_core::{HaplomapError, Result};
use haplomap_stats::{
    ColorBucket, CorrectionMethod, EstimatorConfig, GlobalPrior, Heatmap, HeatmapEstimator,
    HeatmapSummary, LocationEstimate, LocationObservation, MissingBaseline, NormalCdf, Shading,
};

use crate::error::{wasm_err, wasm_ok, wasm_result};

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

// ── Input types ──────────────────────────────────────────────────────────

/// One record of the samples service response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsLocationObservation {
    #[serde(default)]
    pub location_key: Option<String>,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub province: String,
    #[serde(alias = "count")]
    pub sample_count: u64,
}

impl JsLocationObservation {
    fn into_observation(self) -> Result<LocationObservation> {
        match self.location_key {
            Some(key) if !key.is_empty() => Ok(LocationObservation::with_key(
                key,
                self.country,
                self.province,
                self.sample_count,
            )),
            _ if !self.province.is_empty() || !self.country.is_empty() => Ok(
                LocationObservation::new(self.country, self.province, self.sample_count),
            ),
            _ => Err(HaplomapError::InvalidInput(
                "observation needs a locationKey or a province/country".into(),
            )),
        }
    }
}

/// Optional overrides of the estimator defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JsEstimatorConfig {
    pub z: Option<f64>,
    pub significance_level: Option<f64>,
    /// `"use_marker_count"` or `"exclude"`.
    pub missing_baseline: Option<String>,
    /// `"zelen_severo"` or `"erf"`.
    pub normal_cdf: Option<String>,
    /// `"none"`, `"bonferroni"` or `"benjamini_hochberg"`.
    pub correction: Option<String>,
    pub top_n: Option<usize>,
}

impl JsEstimatorConfig {
    fn into_config(self) -> Result<EstimatorConfig> {
        let mut config = EstimatorConfig::default();
        if let Some(z) = self.z {
            config.z = z;
        }
        if let Some(level) = self.significance_level {
            config.significance_level = level;
        }
        if let Some(policy) = self.missing_baseline {
            config.missing_baseline = match policy.as_str() {
                "use_marker_count" => MissingBaseline::UseMarkerCount,
                "exclude" => MissingBaseline::Exclude,
                other => return Err(unknown("missingBaseline", other)),
            };
        }
        if let Some(cdf) = self.normal_cdf {
            config.normal_cdf = match cdf.as_str() {
                "zelen_severo" => NormalCdf::ZelenSevero,
                "erf" => NormalCdf::Erf,
                other => return Err(unknown("normalCdf", other)),
            };
        }
        if let Some(method) = self.correction {
            config.correction = match method.as_str() {
                "none" => CorrectionMethod::None,
                "bonferroni" => CorrectionMethod::Bonferroni,
                "benjamini_hochberg" => CorrectionMethod::BenjaminiHochberg,
                other => return Err(unknown("correction", other)),
            };
        }
        if let Some(n) = self.top_n {
            config.top_n = n;
        }
        Ok(config)
    }
}

fn unknown(field: &str, value: &str) -> HaplomapError {
    HaplomapError::InvalidInput(format!("unknown {field} value '{value}'"))
}

// ── Output types ─────────────────────────────────────────────────────────

/// Serializable mirror of [`LocationEstimate`] plus its map shading.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsLocationEstimate {
    pub location_key: String,
    pub country: String,
    pub province: String,
    pub marker_count: u64,
    pub total_count: u64,
    pub raw_frequency: f64,
    pub shrunk_frequency: f64,
    #[serde(rename = "lowerCI")]
    pub lower_ci: f64,
    #[serde(rename = "upperCI")]
    pub upper_ci: f64,
    pub p_value: f64,
    pub q_value: f64,
    pub is_significant: bool,
    pub uncertainty: f64,
    pub baseline_missing: bool,
    pub color: &'static str,
    pub opacity: f64,
}

impl From<&LocationEstimate> for JsLocationEstimate {
    fn from(e: &LocationEstimate) -> Self {
        let shading = e.shading();
        Self {
            location_key: e.location_key.clone(),
            country: e.country.clone(),
            province: e.province.clone(),
            marker_count: e.marker_count,
            total_count: e.total_count,
            raw_frequency: e.raw_frequency,
            shrunk_frequency: e.shrunk_frequency,
            lower_ci: e.lower_ci,
            upper_ci: e.upper_ci,
            p_value: e.p_value,
            q_value: e.q_value,
            is_significant: e.is_significant,
            uncertainty: e.uncertainty,
            baseline_missing: e.baseline_missing,
            color: shading.color,
            opacity: shading.opacity,
        }
    }
}

/// Serializable mirror of [`GlobalPrior`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsGlobalPrior {
    pub locations: usize,
    pub mean: f64,
    pub variance: f64,
    pub safe_mean: f64,
    pub safe_variance: f64,
    pub alpha: f64,
    pub beta: f64,
}

impl From<GlobalPrior> for JsGlobalPrior {
    fn from(p: GlobalPrior) -> Self {
        Self {
            locations: p.locations,
            mean: p.mean,
            variance: p.variance,
            safe_mean: p.safe_mean,
            safe_variance: p.safe_variance,
            alpha: p.alpha,
            beta: p.beta,
        }
    }
}

/// Serializable mirror of [`HeatmapSummary`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsHeatmapSummary {
    pub locations: usize,
    pub significant: usize,
    pub baseline_missing: usize,
    pub mean_uncertainty: f64,
    pub global_mean: Option<f64>,
}

impl From<HeatmapSummary> for JsHeatmapSummary {
    fn from(s: HeatmapSummary) -> Self {
        Self {
            locations: s.locations,
            significant: s.significant,
            baseline_missing: s.baseline_missing,
            mean_uncertainty: s.mean_uncertainty,
            global_mean: s.global_mean,
        }
    }
}

/// Everything the map view needs for one filter state.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsHeatmap {
    pub prior: Option<JsGlobalPrior>,
    pub estimates: Vec<JsLocationEstimate>,
    /// Highest shrunk frequencies, highest first.
    pub top: Vec<JsLocationEstimate>,
    pub summary: JsHeatmapSummary,
}

impl JsHeatmap {
    fn new(heatmap: &Heatmap, top_n: usize) -> Self {
        Self {
            prior: heatmap.prior.map(JsGlobalPrior::from),
            estimates: heatmap.estimates.iter().map(JsLocationEstimate::from).collect(),
            top: heatmap.top(top_n).into_iter().map(JsLocationEstimate::from).collect(),
            summary: heatmap.summary_stats().into(),
        }
    }
}

/// One legend row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsLegendEntry {
    pub label: &'static str,
    pub color: &'static str,
    pub lower_bound: f64,
}

/// Fill colour and opacity for one region.
#[derive(Debug, Serialize)]
pub struct JsShading {
    pub color: &'static str,
    pub opacity: f64,
}

impl From<Shading> for JsShading {
    fn from(s: Shading) -> Self {
        Self {
            color: s.color,
            opacity: s.opacity,
        }
    }
}

// ── JSON boundary functions ──────────────────────────────────────────────

fn parse_observations(json: &str, what: &str) -> Result<Vec<LocationObservation>> {
    serde_json::from_str::<Vec<JsLocationObservation>>(json)
        .map_err(|e| HaplomapError::Parse(format!("invalid {what} observations JSON: {e}")))?
        .into_iter()
        .map(JsLocationObservation::into_observation)
        .collect()
}

fn parse_config(json: &str) -> Result<EstimatorConfig> {
    if json.trim().is_empty() {
        return Ok(EstimatorConfig::default());
    }
    serde_json::from_str::<JsEstimatorConfig>(json)
        .map_err(|e| HaplomapError::Parse(format!("invalid config JSON: {e}")))?
        .into_config()
}

fn run(marker_json: &str, baseline_json: &str, config_json: &str) -> Result<JsHeatmap> {
    let config = parse_config(config_json)?;
    let marker = parse_observations(marker_json, "marker")?;
    let baseline = parse_observations(baseline_json, "baseline")?;
    let top_n = config.top_n;
    let heatmap = HeatmapEstimator::new(config)?.estimate(&marker, &baseline);
    Ok(JsHeatmap::new(&heatmap, top_n))
}

/// Estimate the heatmap from marker and baseline observation arrays.
///
/// Output: JSON [`JsHeatmap`]. An empty filter result is `ok` with no
/// estimates and a `null` prior.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn estimate_heatmap(marker_json: &str, baseline_json: &str) -> String {
    wasm_result(run(marker_json, baseline_json, ""))
}

/// [`estimate_heatmap`] with a JSON [`JsEstimatorConfig`] of overrides.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn estimate_heatmap_with_config(
    marker_json: &str,
    baseline_json: &str,
    config_json: &str,
) -> String {
    wasm_result(run(marker_json, baseline_json, config_json))
}

/// The `n` highest-frequency locations only.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn top_locations(marker_json: &str, baseline_json: &str, n: usize) -> String {
    let marker = match parse_observations(marker_json, "marker") {
        Ok(m) => m,
        Err(e) => return wasm_err(e),
    };
    let baseline = match parse_observations(baseline_json, "baseline") {
        Ok(b) => b,
        Err(e) => return wasm_err(e),
    };
    let heatmap = HeatmapEstimator::default().estimate(&marker, &baseline);
    let top: Vec<JsLocationEstimate> = heatmap
        .top(n)
        .into_iter()
        .map(JsLocationEstimate::from)
        .collect();
    wasm_ok(&top)
}

/// Legend rows, darkest first.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn legend() -> String {
    let rows: Vec<JsLegendEntry> = ColorBucket::ALL
        .iter()
        .map(|b| JsLegendEntry {
            label: b.label(),
            color: b.hex(),
            lower_bound: b.lower_bound(),
        })
        .collect();
    wasm_ok(&rows)
}

/// Shading for a single frequency and interval width.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn shade(frequency: f64, uncertainty: f64) -> String {
    wasm_ok(&JsShading::from(Shading::new(frequency, uncertainty)))
}
