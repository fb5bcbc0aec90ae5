//! CSV and JSON writers for feature tables and trend comparisons.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chronotrend_extract::{FeatureTable, TrendComparison};
use chronotrend_trend::{TrendError, TrendResult};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::domain::ExperimentName;
use crate::IoError;

/// Writes extraction artifacts into one output directory.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_features.csv`,
/// `{experiment}_features.json` and `{experiment}_compare.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Path of the feature table CSV.
    #[must_use]
    pub fn features_csv_path(&self) -> PathBuf {
        self.artifact_path("features.csv")
    }

    /// Path of the feature table JSON.
    #[must_use]
    pub fn features_json_path(&self) -> PathBuf {
        self.artifact_path("features.json")
    }

    /// Path of the trend comparison JSON.
    #[must_use]
    pub fn compare_json_path(&self) -> PathBuf {
        self.artifact_path("compare.json")
    }

    /// Write a feature table to `{experiment}_features.csv` and
    /// `{experiment}_features.json`.
    ///
    /// Undefined cells are written as empty CSV fields and JSON `null`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::CsvWrite`] | The CSV file cannot be created or written |
    /// | [`IoError::Serialize`] | The JSON artifact cannot be serialized |
    /// | [`IoError::WriteFile`] | The JSON file cannot be written |
    #[instrument(skip_all, fields(n_groups = table.n_groups(), n_columns = table.n_columns()))]
    pub fn write_features(&self, table: &FeatureTable) -> Result<(), IoError> {
        let csv_path = self.features_csv_path();
        write_table_csv(&csv_path, table).map_err(|source| IoError::CsvWrite {
            path: csv_path.clone(),
            source,
        })?;
        info!(path = %csv_path.display(), "feature table written");

        let rows: BTreeMap<&str, BTreeMap<&str, Option<f64>>> = table
            .group_ids()
            .iter()
            .zip(table.rows())
            .map(|(id, row)| {
                let cells = table
                    .columns()
                    .iter()
                    .map(String::as_str)
                    .zip(row.iter().copied())
                    .collect();
                (id.as_str(), cells)
            })
            .collect();

        let artifact = FeaturesArtifact {
            experiment: self.experiment.as_str(),
            n_groups: table.n_groups(),
            n_undefined: table.n_undefined(),
            columns: table.columns(),
            rows,
        };
        self.write_json(&self.features_json_path(), &artifact)
    }

    /// Write trend comparisons to `{experiment}_compare.json`.
    ///
    /// A fit that is undefined is written as `null` with its error message
    /// alongside.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Serialize`] | The JSON artifact cannot be serialized |
    /// | [`IoError::WriteFile`] | The JSON file cannot be written |
    #[instrument(skip_all, fields(n_series = comparisons.len()))]
    pub fn write_comparison(&self, comparisons: &[TrendComparison]) -> Result<(), IoError> {
        let entries: Vec<ComparisonEntry> = comparisons
            .iter()
            .map(|c| ComparisonEntry {
                group: c.group.as_str(),
                signal: c.signal.as_str(),
                n_samples: c.n_samples,
                timewise: FitEntry::from(&c.timewise),
                ordinal: FitEntry::from(&c.ordinal),
                slope_delta: c.slope_delta(),
            })
            .collect();

        let artifact = CompareArtifact {
            experiment: self.experiment.as_str(),
            n_series: comparisons.len(),
            series: entries,
        };
        self.write_json(&self.compare_json_path(), &artifact)
    }

    fn artifact_path(&self, suffix: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{suffix}", self.experiment.as_str()))
    }

    fn write_json<T: Serialize>(&self, path: &Path, artifact: &T) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(artifact).map_err(|e| IoError::Serialize {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, &json).map_err(|e| IoError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        info!(path = %path.display(), "artifact written");
        Ok(())
    }
}

/// Write `table` as CSV with an `id` column first; undefined cells are empty.
fn write_table_csv(path: &Path, table: &FeatureTable) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = Vec::with_capacity(table.n_columns() + 1);
    header.push("id");
    header.extend(table.columns().iter().map(String::as_str));
    wtr.write_record(&header)?;

    for (id, row) in table.group_ids().iter().zip(table.rows()) {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(id.as_str().to_string());
        record.extend(row.iter().map(|cell| match cell {
            Some(v) => v.to_string(),
            None => String::new(),
        }));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct FeaturesArtifact<'a> {
    experiment: &'a str,
    n_groups: usize,
    n_undefined: usize,
    columns: &'a [String],
    rows: BTreeMap<&'a str, BTreeMap<&'a str, Option<f64>>>,
}

#[derive(Serialize)]
struct CompareArtifact<'a> {
    experiment: &'a str,
    n_series: usize,
    series: Vec<ComparisonEntry<'a>>,
}

#[derive(Serialize)]
struct ComparisonEntry<'a> {
    group: &'a str,
    signal: &'a str,
    n_samples: usize,
    timewise: FitEntry,
    ordinal: FitEntry,
    slope_delta: Option<f64>,
}

#[derive(Serialize)]
struct FitEntry {
    result: Option<TrendResult>,
    error: Option<String>,
}

impl From<&Result<TrendResult, TrendError>> for FitEntry {
    fn from(fit: &Result<TrendResult, TrendError>) -> Self {
        match fit {
            Ok(r) => Self {
                result: Some(*r),
                error: None,
            },
            Err(e) => Self {
                result: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use chronotrend_extract::{
        Calculator, ExtractionConfig, GroupId, SignalName, SignalSeries, compare_trends,
    };
    use chronotrend_trend::{Sample, TimeUnit};
    use tempfile::TempDir;

    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn test_series() -> Vec<SignalSeries> {
        let series = |group: &str, samples: Vec<Sample>| {
            SignalSeries::from_unsorted(
                GroupId::new(group).unwrap(),
                SignalName::new("temperature").unwrap(),
                samples,
            )
            .unwrap()
        };
        vec![
            series("a", vec![Sample::new(at(10, 4), 1.0), Sample::new(at(10, 50), 2.0)]),
            series("b", vec![Sample::new(at(9, 0), 4.0)]),
        ]
    }

    fn writer(dir: &TempDir) -> ResultWriter {
        let experiment = ExperimentName::new("test_run".into()).unwrap();
        ResultWriter::new(dir.path(), experiment).unwrap()
    }

    #[test]
    fn creates_nested_output_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("out").join("run");
        let experiment = ExperimentName::new("x".into()).unwrap();
        ResultWriter::new(&nested, experiment).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn write_features_csv_and_json() {
        let dir = TempDir::new().unwrap();
        let writer = writer(&dir);
        let table = ExtractionConfig::new(vec![Calculator::Length, Calculator::LinearTrendTimewise])
            .unwrap()
            .fit(&test_series())
            .unwrap();
        writer.write_features(&table).unwrap();

        let csv = fs::read_to_string(dir.path().join("test_run_features.csv")).unwrap();
        let mut lines = csv.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("id,"));
        assert!(header.contains("temperature__length"));
        let row_b = lines.find(|l| l.starts_with("b,")).unwrap();
        // Length is defined, the five trend cells are empty.
        assert_eq!(row_b, "b,1,,,,,");

        let json: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("test_run_features.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(json["experiment"], "test_run");
        assert_eq!(json["n_groups"], 2);
        assert_eq!(json["n_undefined"], 5);
        assert_eq!(json["columns"].as_array().unwrap().len(), 6);
        let slope = r#"temperature__linear_trend_timewise__attr_"slope""#;
        assert!(json["rows"]["b"][slope].is_null());
        let a_slope = json["rows"]["a"][slope].as_f64().unwrap();
        assert!((a_slope - 1.304348).abs() < 1e-6);
        assert_eq!(json["rows"]["b"]["temperature__length"], 1.0);
    }

    #[test]
    fn write_comparison_json() {
        let dir = TempDir::new().unwrap();
        let writer = writer(&dir);
        let comparisons = compare_trends(&test_series(), TimeUnit::Hours);
        writer.write_comparison(&comparisons).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(writer.compare_json_path()).unwrap())
                .unwrap();
        assert_eq!(json["n_series"], 2);
        let a = &json["series"][0];
        assert_eq!(a["group"], "a");
        assert_eq!(a["ordinal"]["result"]["slope"], 1.0);
        assert!(a["timewise"]["error"].is_null());
        assert!(a["slope_delta"].as_f64().unwrap() > 0.0);

        let b = &json["series"][1];
        assert!(b["timewise"]["result"].is_null());
        assert!(b["timewise"]["error"].as_str().unwrap().contains("at least 2"));
        assert!(b["slope_delta"].is_null());
    }

    #[test]
    fn artifact_paths_use_experiment_prefix() {
        let dir = TempDir::new().unwrap();
        let writer = writer(&dir);
        assert_eq!(writer.features_csv_path(), dir.path().join("test_run_features.csv"));
        assert_eq!(writer.features_json_path(), dir.path().join("test_run_features.json"));
        assert_eq!(writer.compare_json_path(), dir.path().join("test_run_compare.json"));
    }
}
