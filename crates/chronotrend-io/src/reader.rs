//! CSV sample reader for long and wide tables, with full input validation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chronotrend_extract::{ExtractError, GroupId, SignalName, SignalSeries};
use chronotrend_trend::Sample;
use tracing::{debug, info, instrument};

use crate::domain::SampleDataset;
use crate::timestamp::parse_timestamp;
use crate::IoError;

/// Column names used to locate the id, time, kind and value columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    /// Group identifier column.
    pub id: String,
    /// Timestamp column.
    pub time: String,
    /// Signal name column (long layout only).
    pub kind: String,
    /// Value column (long layout only).
    pub value: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            id: "id".into(),
            time: "time".into(),
            kind: "kind".into(),
            value: "value".into(),
        }
    }
}

/// Shape of the input table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableLayout {
    /// One row per sample: `id,time,kind,value`.
    #[default]
    Long,
    /// One row per (id, time): `id,time,<signal>,<signal>,…`. Empty cells mean
    /// the signal was not measured at that instant and are skipped.
    Wide,
}

/// Resolved header positions for one file.
enum Columns {
    Long { id: usize, time: usize, kind: usize, value: usize },
    Wide { id: usize, time: usize, signals: Vec<(usize, String)> },
}

/// Reads time-stamped samples from a CSV file.
///
/// Expected CSV format (long layout, the default):
/// - Header row required; column order is free
/// - `id,time,kind,value`
/// - One row per sample
///
/// Timestamps may be naive date-times (`2019-03-01 10:04:00`), RFC 3339 with
/// an offset, bare dates, or Unix epoch seconds.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumn`] | A configured column is absent from the header |
/// | [`IoError::NoSignalColumns`] | Wide table has only id and time |
/// | [`IoError::EmptyDataset`] | Zero samples after the header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::EmptyIdentifier`] | Empty id or kind cell |
/// | [`IoError::InvalidTimestamp`] | Time cell matches no accepted format |
/// | [`IoError::NonFiniteValue`] | Value is NaN, Inf, or unparseable |
pub struct SampleReader {
    path: PathBuf,
    columns: ColumnNames,
    layout: TableLayout,
}

impl SampleReader {
    /// Create a new reader for the given CSV file path, using the long layout
    /// and default column names.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            columns: ColumnNames::default(),
            layout: TableLayout::Long,
        }
    }

    /// Override the column names.
    #[must_use]
    pub fn with_columns(mut self, columns: ColumnNames) -> Self {
        self.columns = columns;
        self
    }

    /// Set the table layout.
    #[must_use]
    pub fn with_layout(mut self, layout: TableLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Read and validate the CSV file, returning a [`SampleDataset`].
    #[instrument(skip(self), fields(path = %self.path.display(), layout = ?self.layout))]
    pub fn read(&self) -> Result<SampleDataset, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so that our own InconsistentRowLength check fires
        // instead of a low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.csv_error(e))?.clone();
        let expected_cols = header.len();
        let columns = self.resolve_columns(&header)?;
        debug!(expected_cols, "read CSV header");

        let mut grouped: Vec<(GroupId, SignalName, Vec<Sample>)> = Vec::new();
        let mut index: HashMap<(String, String), usize> = HashMap::new();
        let mut n_samples = 0usize;

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.csv_error(e))?;
            if record.len() != expected_cols {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            let cell = |i: usize| record.get(i).unwrap_or("");
            let (id_col, time_col) = match &columns {
                Columns::Long { id, time, .. } | Columns::Wide { id, time, .. } => (*id, *time),
            };
            let id = self.identifier(cell(id_col), row_index, &self.columns.id)?;
            let raw_time = cell(time_col);
            let timestamp =
                parse_timestamp(raw_time).ok_or_else(|| IoError::InvalidTimestamp {
                    path: self.path.clone(),
                    row_index,
                    raw: raw_time.to_string(),
                })?;

            let mut push = |signal: &str, value: f64| -> Result<(), IoError> {
                let key = (id.to_string(), signal.to_string());
                let slot = match index.get(&key) {
                    Some(&slot) => slot,
                    None => {
                        let group = GroupId::new(id).map_err(|e| self.series_error(e))?;
                        let name = SignalName::new(signal).map_err(|e| self.series_error(e))?;
                        grouped.push((group, name, Vec::new()));
                        index.insert(key, grouped.len() - 1);
                        grouped.len() - 1
                    }
                };
                grouped[slot].2.push(Sample::new(timestamp, value));
                n_samples += 1;
                Ok(())
            };

            match &columns {
                Columns::Long { kind, value, .. } => {
                    let signal = self.identifier(cell(*kind), row_index, &self.columns.kind)?;
                    let v = self.value(cell(*value), row_index, &self.columns.value)?;
                    push(signal, v)?;
                }
                Columns::Wide { signals, .. } => {
                    for (col, name) in signals {
                        let raw = cell(*col);
                        if raw.is_empty() {
                            continue;
                        }
                        let v = self.value(raw, row_index, name)?;
                        push(name, v)?;
                    }
                }
            }
        }

        if n_samples == 0 {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let series = grouped
            .into_iter()
            .map(|(group, signal, samples)| SignalSeries::from_unsorted(group, signal, samples))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.series_error(e))?;

        let dataset = SampleDataset { series, n_samples };
        info!(
            n_samples,
            n_series = dataset.series.len(),
            n_groups = dataset.n_groups(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    fn resolve_columns(&self, header: &csv::StringRecord) -> Result<Columns, IoError> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| IoError::MissingColumn {
                    path: self.path.clone(),
                    column: name.to_string(),
                })
        };
        let id = find(&self.columns.id)?;
        let time = find(&self.columns.time)?;
        match self.layout {
            TableLayout::Long => Ok(Columns::Long {
                id,
                time,
                kind: find(&self.columns.kind)?,
                value: find(&self.columns.value)?,
            }),
            TableLayout::Wide => {
                let signals: Vec<(usize, String)> = header
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| i != id && i != time)
                    .map(|(i, h)| (i, h.to_string()))
                    .collect();
                if signals.is_empty() || signals.iter().any(|(_, h)| h.is_empty()) {
                    return Err(IoError::NoSignalColumns {
                        path: self.path.clone(),
                    });
                }
                Ok(Columns::Wide { id, time, signals })
            }
        }
    }

    fn identifier<'r>(
        &self,
        raw: &'r str,
        row_index: usize,
        column: &str,
    ) -> Result<&'r str, IoError> {
        if raw.is_empty() {
            return Err(IoError::EmptyIdentifier {
                path: self.path.clone(),
                row_index,
                column: column.to_string(),
            });
        }
        Ok(raw)
    }

    fn value(&self, raw: &str, row_index: usize, column: &str) -> Result<f64, IoError> {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| IoError::NonFiniteValue {
                path: self.path.clone(),
                row_index,
                column: column.to_string(),
                raw: raw.to_string(),
            })
    }

    fn series_error(&self, source: ExtractError) -> IoError {
        IoError::Series {
            path: self.path.clone(),
            source,
        }
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}
