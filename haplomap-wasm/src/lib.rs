//! WASM bindings for the haplomap heatmap estimator.
//!
//! The map view calls into this crate once per filter change. Every public
//! function accepts simple types (`&str`, `f64`, `usize`) and returns a JSON
//! `String`:
//!
//! - Success: `{"ok": <value>}`
//! - Failure: `{"error": "<message>"}`
//!
//! `#[wasm_bindgen]` exports are enabled with the `wasm` feature; without it
//! the same functions are plain Rust and testable natively.
//!
//! # Example
//!
//! ```
//! let marker = r#"[{"locationKey": "Basra, Iraq", "sampleCount": 4}]"#;
//! let baseline = r#"[{"locationKey": "Basra, Iraq", "sampleCount": 10}]"#;
//! let json = haplomap_wasm::estimate_heatmap(marker, baseline);
//! let v: serde_json::Value = serde_json::from_str(&json).unwrap();
//! assert_eq!(v["ok"]["estimates"][0]["rawFrequency"], 0.4);
//! ```

pub mod error;
pub mod heatmap;

/// Crate version (set from Cargo.toml at compile time).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use heatmap::{
    estimate_heatmap, estimate_heatmap_with_config, legend, shade, top_locations,
    JsEstimatorConfig, JsGlobalPrior, JsHeatmap, JsHeatmapSummary, JsLegendEntry,
    JsLocationEstimate, JsLocationObservation, JsShading,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn reexports_accessible() {
        let _ = estimate_heatmap("[]", "[]");
        let _ = estimate_heatmap_with_config("[]", "[]", "{}");
        let _ = top_locations("[]", "[]", 5);
        let _ = legend();
        let _ = shade(0.5, 0.1);
    }
}
