//! Loading observation exports and estimator configuration from disk.

use std::fs::{self, File};
use std::path::Path;

use ::csv::ReaderBuilder;
use haplomap_core::{HaplomapError, Result};
use haplomap_stats::{EstimatorConfig, LocationObservation};
use log::debug;
use serde::Deserialize;

/// One row of an observation export, CSV or JSON.
///
/// JSON exports straight from the samples service use camelCase names, so
/// both spellings are accepted.
#[derive(Debug, Deserialize)]
struct ObservationRow {
    #[serde(default, alias = "locationKey")]
    location_key: Option<String>,
    #[serde(default)]
    country: String,
    #[serde(default)]
    province: String,
    #[serde(alias = "sampleCount", alias = "count")]
    sample_count: u64,
}

impl ObservationRow {
    fn into_observation(self, path: &Path, row: usize) -> Result<LocationObservation> {
        match self.location_key {
            Some(key) if !key.trim().is_empty() => Ok(LocationObservation::with_key(
                key.trim(),
                self.country,
                self.province,
                self.sample_count,
            )),
            _ if !self.province.is_empty() || !self.country.is_empty() => Ok(
                LocationObservation::new(self.country, self.province, self.sample_count),
            ),
            _ => Err(HaplomapError::InvalidInput(format!(
                "{}: row {row} has no location_key, province or country",
                path.display()
            ))),
        }
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        HaplomapError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Load observations from a `.json` array or a headed CSV file.
///
/// CSV columns: `location_key` (optional), `country`, `province`,
/// `sample_count`. A missing key is derived from province and country.
pub fn load_observations(path: impl AsRef<Path>) -> Result<Vec<LocationObservation>> {
    let path = path.as_ref();
    let rows: Vec<ObservationRow> = if is_json(path) {
        serde_json::from_reader(open(path)?)
            .map_err(|e| HaplomapError::Parse(format!("{}: {e}", path.display())))?
    } else {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(::csv::Trim::All)
            .from_reader(open(path)?);
        reader
            .deserialize::<ObservationRow>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| HaplomapError::Parse(format!("{}: {e}", path.display())))?
    };

    let observations = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| row.into_observation(path, i + 1))
        .collect::<Result<Vec<_>>>()?;
    debug!("loaded {} observations from {}", observations.len(), path.display());
    Ok(observations)
}

/// Load an [`EstimatorConfig`] from TOML and validate it.
///
/// Keys left out keep their defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<EstimatorConfig> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| {
        HaplomapError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    let config: EstimatorConfig = toml::from_str(&text)
        .map_err(|e| HaplomapError::Parse(format!("{}: {e}", path.display())))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use haplomap_stats::{MissingBaseline, NormalCdf};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_tmp(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(suffix).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn csv_with_and_without_keys() {
        let file = write_tmp(
            ".csv",
            "location_key,country,province,sample_count\n\
             ,Iraq,Basra,8\n\
             Najaf (IQ),Iraq,Najaf,2\n",
        );
        let obs = load_observations(file.path()).unwrap();
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0].location_key, "Basra, Iraq");
        assert_eq!(obs[0].sample_count, 8);
        assert_eq!(obs[1].location_key, "Najaf (IQ)");
    }

    #[test]
    fn csv_without_key_column() {
        let file = write_tmp(".csv", "country,province,sample_count\nIraq,Basra,3\n");
        let obs = load_observations(file.path()).unwrap();
        assert_eq!(obs[0].location_key, "Basra, Iraq");
    }

    #[test]
    fn json_camel_case() {
        let file = write_tmp(
            ".json",
            r#"[{"locationKey": "A", "country": "Iraq", "province": "A", "sampleCount": 5}]"#,
        );
        let obs = load_observations(file.path()).unwrap();
        assert_eq!(obs, vec![LocationObservation::with_key("A", "Iraq", "A", 5)]);
    }

    #[test]
    fn negative_count_is_parse_error() {
        let file = write_tmp(".csv", "location_key,sample_count\nA,-3\n");
        let err = load_observations(file.path()).unwrap_err();
        assert!(matches!(err, HaplomapError::Parse(_)));
    }

    #[test]
    fn unnamed_row_rejected() {
        let file = write_tmp(".csv", "location_key,country,province,sample_count\n,,,4\n");
        let err = load_observations(file.path()).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_observations("/nonexistent/haplomap.csv").unwrap_err();
        assert!(matches!(err, HaplomapError::Io(_)));
        assert!(err.to_string().contains("/nonexistent/haplomap.csv"));
    }

    #[test]
    fn partial_toml_config() {
        let file = write_tmp(
            ".toml",
            "z = 2.5758\nmissing_baseline = \"exclude\"\nnormal_cdf = \"erf\"\n",
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.z, 2.5758);
        assert_eq!(config.missing_baseline, MissingBaseline::Exclude);
        assert_eq!(config.normal_cdf, NormalCdf::Erf);
        assert_eq!(config.top_n, 5);
    }

    #[test]
    fn invalid_toml_config_rejected() {
        let file = write_tmp(".toml", "significance_level = 1.5\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, HaplomapError::InvalidInput(_)));
    }
}
