//! Frequency estimation for the haplogroup heatmap.
//!
//! Turns per-province sample counts for one haplogroup (the marker) and for
//! the unfiltered population (the baseline) into stabilised frequencies with
//! confidence intervals and significance flags:
//!
//! - **Aggregation** — [`aggregate`] joins marker and baseline counts
//! - **Prior** — [`GlobalPrior`], a method-of-moments [`Beta`] fit
//! - **Shrinkage** — [`Beta::posterior_mean`], the Empirical-Bayes estimate
//! - **Intervals** — [`interval::wilson`] score intervals
//! - **Significance** — [`testing::binomial_z_test`] and [`correction`]
//! - **Display** — [`ColorBucket`], [`Shading`], [`top_locations`]
//!
//! ```
//! use haplomap_stats::{estimate, LocationObservation};
//!
//! let marker = [
//!     LocationObservation::new("Iraq", "Basra", 8),
//!     LocationObservation::new("Iraq", "Najaf", 2),
//! ];
//! let baseline = [
//!     LocationObservation::new("Iraq", "Basra", 10),
//!     LocationObservation::new("Iraq", "Najaf", 10),
//! ];
//! let estimates = estimate(&marker, &baseline);
//! assert!(estimates[0].shrunk_frequency < 0.8);
//! assert!(estimates[1].shrunk_frequency > 0.2);
//! ```

pub mod aggregate;
pub mod bayesian;
pub mod config;
pub mod correction;
pub mod descriptive;
pub mod distribution;
pub mod estimate;
pub mod interval;
pub mod palette;
pub mod prior;
pub mod rank;
pub mod testing;

pub use aggregate::{aggregate, location_key, FrequencyObservation, LocationObservation};
pub use bayesian::Beta;
pub use config::{EstimatorConfig, MissingBaseline};
pub use correction::CorrectionMethod;
pub use distribution::{Distribution, NormalCdf};
pub use estimate::{
    estimate, estimate_location, Heatmap, HeatmapEstimator, HeatmapSummary, LocationEstimate,
};
pub use interval::ProportionInterval;
pub use palette::{opacity, ColorBucket, Shading};
pub use prior::GlobalPrior;
pub use rank::top_locations;
pub use testing::TestResult;
