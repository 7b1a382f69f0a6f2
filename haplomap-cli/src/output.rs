//! Rendering a heatmap pass as a table, JSON, or CSV.

use std::io::Write;

use clap::ValueEnum;
use haplomap_core::{HaplomapError, Result, Summarizable};
use haplomap_stats::{ColorBucket, GlobalPrior, Heatmap, HeatmapSummary, LocationEstimate};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Serialize)]
struct Report<'a> {
    prior: Option<&'a GlobalPrior>,
    summary: HeatmapSummary,
    top: Vec<&'a LocationEstimate>,
    estimates: &'a [LocationEstimate],
}

#[derive(Serialize)]
struct CsvRow<'a> {
    location_key: &'a str,
    country: &'a str,
    province: &'a str,
    marker_count: u64,
    total_count: u64,
    raw_frequency: f64,
    shrunk_frequency: f64,
    lower_ci: f64,
    upper_ci: f64,
    p_value: f64,
    q_value: f64,
    is_significant: bool,
    uncertainty: f64,
    baseline_missing: bool,
    color: &'static str,
    opacity: f64,
}

impl<'a> From<&'a LocationEstimate> for CsvRow<'a> {
    fn from(e: &'a LocationEstimate) -> Self {
        let shading = e.shading();
        Self {
            location_key: &e.location_key,
            country: &e.country,
            province: &e.province,
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

/// Write `heatmap` to `out`. `top` limits the ranking section; 0 omits it.
pub fn write_heatmap<W: Write>(
    heatmap: &Heatmap,
    format: OutputFormat,
    top: usize,
    out: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Table => write_table(heatmap, top, out),
        OutputFormat::Json => write_json(heatmap, top, out),
        OutputFormat::Csv => write_csv(heatmap, out),
    }
}

fn write_json<W: Write>(heatmap: &Heatmap, top: usize, out: &mut W) -> Result<()> {
    let report = Report {
        prior: heatmap.prior.as_ref(),
        summary: heatmap.summary_stats(),
        top: heatmap.top(top),
        estimates: &heatmap.estimates,
    };
    serde_json::to_writer_pretty(&mut *out, &report)
        .map_err(|e| HaplomapError::Other(format!("JSON output: {e}")))?;
    writeln!(out)?;
    Ok(())
}

fn write_csv<W: Write>(heatmap: &Heatmap, out: &mut W) -> Result<()> {
    let mut writer = ::csv::Writer::from_writer(out);
    for e in &heatmap.estimates {
        writer
            .serialize(CsvRow::from(e))
            .map_err(|e| HaplomapError::Other(format!("CSV output: {e}")))?;
    }
    writer.flush()?;
    Ok(())
}

fn pct(x: f64) -> String {
    format!("{:.1}%", x * 100.0)
}

fn write_table<W: Write>(heatmap: &Heatmap, top: usize, out: &mut W) -> Result<()> {
    let summary = heatmap.summary_stats();
    if heatmap.is_empty() {
        writeln!(out, "{}", summary.summary())?;
        return Ok(());
    }
    if let Some(prior) = &heatmap.prior {
        writeln!(out, "prior: {}", prior.summary())?;
    }

    let width = heatmap
        .estimates
        .iter()
        .map(|e| e.location_key.chars().count())
        .max()
        .unwrap_or(0)
        .max("location".len());

    writeln!(
        out,
        "{:<width$}  {:>11}  {:>7}  {:>7}  {:>17}  {:>8}  {:>8}  {:>3}",
        "location", "count", "raw", "adj", "95% CI", "p", "q", "sig",
    )?;
    for e in &heatmap.estimates {
        writeln!(
            out,
            "{:<width$}  {:>11}  {:>7}  {:>7}  {:>17}  {:>8.4}  {:>8.4}  {:>3}{}",
            e.location_key,
            format!("{}/{}", e.marker_count, e.total_count),
            pct(e.raw_frequency),
            pct(e.shrunk_frequency),
            format!("[{}, {}]", pct(e.lower_ci), pct(e.upper_ci)),
            e.p_value,
            e.q_value,
            if e.is_significant { "*" } else { "" },
            if e.baseline_missing { "  (no baseline)" } else { "" },
        )?;
    }
    writeln!(out, "{}", summary.summary())?;

    if top > 0 {
        writeln!(out)?;
        writeln!(out, "highest frequency:")?;
        for (rank, e) in heatmap.top(top).into_iter().enumerate() {
            writeln!(
                out,
                "{:>2}. {} {} (n={})",
                rank + 1,
                e.location_key,
                pct(e.shrunk_frequency),
                e.total_count
            )?;
        }
    }
    Ok(())
}

/// Write the colour legend, darkest bucket first.
pub fn write_legend<W: Write>(out: &mut W) -> Result<()> {
    for bucket in ColorBucket::ALL {
        writeln!(
            out,
            "{}  {:<7} >= {}",
            bucket.hex(),
            bucket.label(),
            pct(bucket.lower_bound())
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use haplomap_stats::{HeatmapEstimator, LocationObservation};

    fn heatmap() -> Heatmap {
        let obs = |key: &str, n| LocationObservation::with_key(key, "Iraq", key, n);
        HeatmapEstimator::default().estimate(
            &[obs("Basra", 8), obs("Najaf", 2), obs("Erbil", 5)],
            &[obs("Basra", 10), obs("Najaf", 10)],
        )
    }

    fn render(format: OutputFormat, top: usize) -> String {
        let mut buf = Vec::new();
        write_heatmap(&heatmap(), format, top, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn table_lists_every_location() {
        let text = render(OutputFormat::Table, 2);
        assert!(text.starts_with("prior: n=3"));
        for key in ["Basra", "Najaf", "Erbil"] {
            assert!(text.contains(key));
        }
        assert!(text.contains("(no baseline)"));
        assert!(text.contains("highest frequency:"));
        assert!(text.contains(" 1. Erbil"));
    }

    #[test]
    fn table_without_ranking() {
        assert!(!render(OutputFormat::Table, 0).contains("highest frequency"));
    }

    #[test]
    fn empty_table() {
        let mut buf = Vec::new();
        let empty = HeatmapEstimator::default().estimate(&[], &[]);
        write_heatmap(&empty, OutputFormat::Table, 5, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "no locations\n");
    }

    #[test]
    fn json_report_shape() {
        let v: serde_json::Value = serde_json::from_str(&render(OutputFormat::Json, 1)).unwrap();
        assert_eq!(v["estimates"].as_array().unwrap().len(), 3);
        assert_eq!(v["top"].as_array().unwrap().len(), 1);
        assert_eq!(v["summary"]["locations"], 3);
        assert_eq!(v["summary"]["baseline_missing"], 1);
        assert!(v["prior"]["alpha"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn csv_has_header_and_rows() {
        let text = render(OutputFormat::Csv, 5);
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("location_key,country,province,marker_count"));
        assert!(header.ends_with("color,opacity"));
        assert_eq!(lines.count(), 3);
    }

    #[test]
    fn legend_six_rows() {
        let mut buf = Vec::new();
        write_legend(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 6);
        assert!(text.starts_with("#800026"));
    }
}
