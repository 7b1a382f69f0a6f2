//! Per-location sample counts and the marker/baseline join.
//!
//! The samples service is queried twice for one heatmap: once filtered to the
//! selected haplogroup (marker) and once unfiltered (baseline). [`aggregate`]
//! joins the two by location key and turns them into binomial observations.

use std::collections::HashMap;

use haplomap_core::Located;
use log::warn;

use crate::config::MissingBaseline;

/// Sample count for one geographic unit, as returned by the samples service.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocationObservation {
    /// Unique key for the unit; [`LocationObservation::new`] derives it as
    /// `"<province>, <country>"`.
    pub location_key: String,
    pub country: String,
    pub province: String,
    pub sample_count: u64,
}

impl LocationObservation {
    /// Observation keyed by province and country.
    pub fn new(country: impl Into<String>, province: impl Into<String>, sample_count: u64) -> Self {
        let country = country.into();
        let province = province.into();
        Self {
            location_key: location_key(&country, &province),
            country,
            province,
            sample_count,
        }
    }

    /// Observation with an explicit key.
    pub fn with_key(
        location_key: impl Into<String>,
        country: impl Into<String>,
        province: impl Into<String>,
        sample_count: u64,
    ) -> Self {
        Self {
            location_key: location_key.into(),
            country: country.into(),
            province: province.into(),
            sample_count,
        }
    }
}

impl Located for LocationObservation {
    fn key(&self) -> &str {
        &self.location_key
    }

    fn region(&self) -> Option<&str> {
        (!self.province.is_empty()).then_some(self.province.as_str())
    }
}

/// The key used by [`LocationObservation::new`].
pub fn location_key(country: &str, province: &str) -> String {
    format!("{province}, {country}")
}

/// Joined marker/baseline counts for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyObservation {
    pub location_key: String,
    pub country: String,
    pub province: String,
    /// Samples carrying the marker (binomial successes).
    pub marker_count: u64,
    /// All baseline samples at the location (binomial trials).
    pub total_count: u64,
    /// `marker_count / total_count`.
    pub raw_frequency: f64,
    /// The baseline had no entry and the marker count stood in as the total.
    pub baseline_missing: bool,
}

/// Join marker-scoped and baseline observations by location key.
///
/// - Output order follows the first appearance of each key in `marker`.
/// - Repeated keys within one collection are merged by summing their counts,
///   saturating at `u64::MAX`.
/// - A marker location absent from the baseline is handled per `policy`.
/// - Locations whose resolved total is 0 are dropped.
/// - A marker count above its total is clamped to the total.
///
/// Either collection being empty yields an empty result.
pub fn aggregate(
    marker: &[LocationObservation],
    baseline: &[LocationObservation],
    policy: MissingBaseline,
) -> Vec<FrequencyObservation> {
    if marker.is_empty() || baseline.is_empty() {
        return Vec::new();
    }

    let mut totals: HashMap<&str, u64> = HashMap::with_capacity(baseline.len());
    for obs in baseline {
        let total = totals.entry(obs.location_key.as_str()).or_insert(0);
        *total = total.saturating_add(obs.sample_count);
    }

    let mut out = Vec::with_capacity(marker.len());
    for (obs, marker_count) in merge_duplicates(marker) {
        let (total_count, baseline_missing) = match totals.get(obs.location_key.as_str()) {
            Some(&total) => (total, false),
            None => match policy {
                MissingBaseline::UseMarkerCount => {
                    if marker_count > 0 {
                        warn!(
                            "no baseline count for '{}', using marker count {} as total",
                            obs.location_key, marker_count
                        );
                    }
                    (marker_count, true)
                }
                MissingBaseline::Exclude => continue,
            },
        };
        if total_count == 0 {
            continue;
        }

        let marker_count = if marker_count > total_count {
            warn!(
                "marker count {} exceeds total {} for '{}', clamping",
                marker_count, total_count, obs.location_key
            );
            total_count
        } else {
            marker_count
        };

        out.push(FrequencyObservation {
            location_key: obs.location_key.clone(),
            country: obs.country.clone(),
            province: obs.province.clone(),
            marker_count,
            total_count,
            raw_frequency: marker_count as f64 / total_count as f64,
            baseline_missing,
        });
    }
    out
}

/// First occurrence of each key with the summed count, in first-seen order.
fn merge_duplicates(observations: &[LocationObservation]) -> Vec<(&LocationObservation, u64)> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(observations.len());
    let mut merged: Vec<(&LocationObservation, u64)> = Vec::with_capacity(observations.len());
    for obs in observations {
        match index.get(obs.location_key.as_str()) {
            Some(&i) => merged[i].1 = merged[i].1.saturating_add(obs.sample_count),
            None => {
                index.insert(obs.location_key.as_str(), merged.len());
                merged.push((obs, obs.sample_count));
            }
        }
    }
    merged
}
