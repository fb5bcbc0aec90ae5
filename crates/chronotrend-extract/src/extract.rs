//! Per-group, per-signal feature extraction.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chronotrend_trend::TimeUnit;
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::calculator::Calculator;
use crate::domain::{GroupId, SignalSeries};
use crate::error::ExtractError;
use crate::table::FeatureTable;

/// Configuration for feature extraction.
///
/// Construct via [`ExtractionConfig::new`], then chain `with_*` methods to override defaults.
///
/// # Defaults
///
/// | Parameter   | Default           |
/// |-------------|-------------------|
/// | `time_unit` | `TimeUnit::Hours` |
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    calculators: Vec<Calculator>,
    time_unit: TimeUnit,
}

impl ExtractionConfig {
    /// Create a configuration running `calculators` on every series.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ExtractError::NoCalculators`] | `calculators` is empty |
    /// | [`ExtractError::DuplicateCalculator`] | a calculator appears twice |
    pub fn new(calculators: Vec<Calculator>) -> Result<Self, ExtractError> {
        if calculators.is_empty() {
            return Err(ExtractError::NoCalculators);
        }
        let mut seen = HashSet::new();
        for &c in &calculators {
            if !seen.insert(c) {
                return Err(ExtractError::DuplicateCalculator { name: c.name() });
            }
        }
        Ok(Self {
            calculators,
            time_unit: TimeUnit::Hours,
        })
    }

    /// Set the elapsed-time unit used by time-index calculators.
    #[must_use]
    pub fn with_time_unit(mut self, time_unit: TimeUnit) -> Self {
        self.time_unit = time_unit;
        self
    }

    /// Return the selected calculators.
    #[must_use]
    pub fn calculators(&self) -> &[Calculator] {
        &self.calculators
    }

    /// Return the elapsed-time unit.
    #[must_use]
    pub fn time_unit(&self) -> TimeUnit {
        self.time_unit
    }

    /// Compute every selected feature for every series and pivot into a table.
    ///
    /// Series are processed in parallel. Each calculator receives the view its
    /// [`IndexRequirement`](crate::IndexRequirement) asks for. Degenerate trend
    /// input produces undefined cells rather than an error.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ExtractError::DuplicateSeries`] | the same (group, signal) appears twice |
    /// | [`ExtractError::Compute`] | a calculator fails for a non-degenerate reason |
    #[instrument(skip_all, fields(n_series = series.len(), n_calculators = self.calculators.len()))]
    pub fn fit(&self, series: &[SignalSeries]) -> Result<FeatureTable, ExtractError> {
        let mut pairs = HashSet::with_capacity(series.len());
        for s in series {
            if !pairs.insert((&s.group, &s.signal)) {
                return Err(ExtractError::DuplicateSeries {
                    group: s.group.to_string(),
                    signal: s.signal.to_string(),
                });
            }
        }

        let per_series: Vec<Vec<(String, Option<f64>)>> = series
            .par_iter()
            .map(|s| self.compute_series(s))
            .collect::<Result<_, _>>()?;

        let group_index: BTreeMap<&GroupId, usize> = series
            .iter()
            .map(|s| &s.group)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .enumerate()
            .map(|(i, g)| (g, i))
            .collect();
        let columns: BTreeSet<&str> = per_series
            .iter()
            .flatten()
            .map(|(name, _)| name.as_str())
            .collect();
        let col_index: BTreeMap<&str, usize> =
            columns.iter().enumerate().map(|(i, &c)| (c, i)).collect();

        let mut rows = vec![vec![None; col_index.len()]; group_index.len()];
        for (s, cells) in series.iter().zip(&per_series) {
            let row = group_index[&s.group];
            for (name, value) in cells {
                rows[row][col_index[name.as_str()]] = *value;
            }
        }
        let group_ids: Vec<GroupId> = group_index.into_keys().cloned().collect();
        let columns: Vec<String> = columns.into_iter().map(str::to_string).collect();

        let table = FeatureTable::new(group_ids, columns, rows);
        let n_undefined = table.n_undefined();
        if n_undefined > 0 {
            warn!(n_undefined, "some features are undefined (degenerate or missing series)");
        }
        info!(
            n_groups = table.n_groups(),
            n_columns = table.n_columns(),
            "features extracted"
        );
        Ok(table)
    }

    /// Run every calculator on one series and label the cells with column names.
    fn compute_series(&self, s: &SignalSeries) -> Result<Vec<(String, Option<f64>)>, ExtractError> {
        let mut cells = Vec::new();
        for &calculator in &self.calculators {
            let view = calculator
                .index_requirement()
                .view(&s.series, self.time_unit);
            let output = calculator
                .compute(view)
                .map_err(|source| ExtractError::Compute {
                    group: s.group.to_string(),
                    signal: s.signal.to_string(),
                    calculator: calculator.name(),
                    source,
                })?;
            if output.is_undefined() {
                debug!(group = %s.group, signal = %s.signal, %calculator, ?output, "undefined feature");
            }
            let names = calculator.column_names(s.signal.as_str());
            cells.extend(names.into_iter().zip(output.cells(calculator)));
        }
        Ok(cells)
    }
}
