//! Side-by-side time-aware and ordinal trends for each series.

use chronotrend_trend::{TimeTrend, TimeUnit, TrendError, TrendResult, compute_index_trend};
use rayon::prelude::*;
use tracing::{info, instrument};

use crate::domain::{GroupId, SignalName, SignalSeries};

/// Both trend fits of one (group, signal) series.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendComparison {
    /// Group identifier.
    pub group: GroupId,
    /// Signal name.
    pub signal: SignalName,
    /// Number of samples in the series.
    pub n_samples: usize,
    /// Trend against elapsed real time.
    pub timewise: Result<TrendResult, TrendError>,
    /// Trend against sample position.
    pub ordinal: Result<TrendResult, TrendError>,
}

impl TrendComparison {
    /// Difference `timewise.slope - ordinal.slope`, when both are defined.
    #[must_use]
    pub fn slope_delta(&self) -> Option<f64> {
        match (&self.timewise, &self.ordinal) {
            (Ok(t), Ok(o)) => Some(t.slope - o.slope),
            _ => None,
        }
    }
}

/// Fit both estimators on every series, preserving input order.
#[instrument(skip_all, fields(n_series = series.len()))]
pub fn compare_trends(series: &[SignalSeries], unit: TimeUnit) -> Vec<TrendComparison> {
    let estimator = TimeTrend::new().with_unit(unit);
    let comparisons: Vec<TrendComparison> = series
        .par_iter()
        .map(|s| TrendComparison {
            group: s.group.clone(),
            signal: s.signal.clone(),
            n_samples: s.series.len(),
            timewise: estimator.fit(&s.series),
            ordinal: compute_index_trend(s.series.values()),
        })
        .collect();
    let n_diverging = comparisons
        .iter()
        .filter(|c| c.slope_delta().is_some_and(|d| d != 0.0))
        .count();
    info!(n_diverging, "trend comparison complete");
    comparisons
}
