//! Feature calculators and the static descriptor of the input each one consumes.

use std::fmt;
use std::str::FromStr;

use chronotrend_trend::{TimeTrend, TimeUnit, TimedSeries, TrendAttr, TrendResult, compute_index_trend};

use crate::error::{ComputeError, ExtractError, UndefinedReason};

/// What part of a series a calculator needs.
///
/// The orchestrator reads this descriptor to decide which [`SeriesView`] to
/// build, so calculators never inspect the series layout themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexRequirement {
    /// Bare values; order and timestamps are ignored.
    ValueOnly,
    /// Values together with their ordinal position `0, 1, 2, …`.
    PositionIndex,
    /// Values together with their real time instants.
    TimeIndex,
}

impl IndexRequirement {
    /// Build the view of `series` matching this requirement.
    #[must_use]
    pub fn view(self, series: &TimedSeries, unit: TimeUnit) -> SeriesView<'_> {
        match self {
            Self::ValueOnly => SeriesView::Values(series.values()),
            Self::PositionIndex => SeriesView::Positioned(series.values()),
            Self::TimeIndex => SeriesView::Timed { series, unit },
        }
    }
}

/// Borrowed view of one series, shaped by an [`IndexRequirement`].
#[derive(Debug, Clone, Copy)]
pub enum SeriesView<'a> {
    /// Bare values.
    Values(&'a [f64]),
    /// Values whose position in the slice is the x axis.
    Positioned(&'a [f64]),
    /// Full time-stamped series with the unit for elapsed time.
    Timed {
        /// The time-ordered series.
        series: &'a TimedSeries,
        /// Unit of the elapsed-time axis.
        unit: TimeUnit,
    },
}

impl SeriesView<'_> {
    /// Return the requirement this view satisfies.
    #[must_use]
    pub fn requirement(&self) -> IndexRequirement {
        match self {
            Self::Values(_) => IndexRequirement::ValueOnly,
            Self::Positioned(_) => IndexRequirement::PositionIndex,
            Self::Timed { .. } => IndexRequirement::TimeIndex,
        }
    }
}

/// Raw output of one calculator on one series.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureOutput {
    /// A single scalar feature.
    Value(f64),
    /// The five fields of a linear trend fit.
    Trend(TrendResult),
    /// The feature has no value for this series.
    Undefined(UndefinedReason),
}

impl FeatureOutput {
    /// Flatten into cells aligned with [`Calculator::column_names`].
    ///
    /// Undefined outputs become `None` cells, never `0.0`.
    #[must_use]
    pub fn cells(&self, calculator: Calculator) -> Vec<Option<f64>> {
        match self {
            Self::Value(v) => vec![Some(*v)],
            Self::Trend(r) => TrendAttr::ALL.iter().map(|&a| Some(r.get(a))).collect(),
            Self::Undefined(_) => vec![None; calculator.n_outputs()],
        }
    }

    /// Return true if the output is undefined.
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined(_))
    }
}

/// A feature calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Calculator {
    /// Number of samples.
    Length,
    /// Arithmetic mean of the values.
    Mean,
    /// Linear trend against sample position.
    LinearTrend,
    /// Linear trend against elapsed real time.
    LinearTrendTimewise,
}

impl Calculator {
    /// Every calculator, in registry order.
    pub const ALL: [Calculator; 4] = [
        Self::Length,
        Self::Mean,
        Self::LinearTrend,
        Self::LinearTrendTimewise,
    ];

    /// Name used in feature column names and on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Length => "length",
            Self::Mean => "mean",
            Self::LinearTrend => "linear_trend",
            Self::LinearTrendTimewise => "linear_trend_timewise",
        }
    }

    /// Input this calculator consumes.
    #[must_use]
    pub fn index_requirement(self) -> IndexRequirement {
        match self {
            Self::Length | Self::Mean => IndexRequirement::ValueOnly,
            Self::LinearTrend => IndexRequirement::PositionIndex,
            Self::LinearTrendTimewise => IndexRequirement::TimeIndex,
        }
    }

    /// Number of feature columns produced per signal.
    #[must_use]
    pub fn n_outputs(self) -> usize {
        match self {
            Self::Length | Self::Mean => 1,
            Self::LinearTrend | Self::LinearTrendTimewise => TrendAttr::ALL.len(),
        }
    }

    /// Feature column names for `signal`, aligned with [`FeatureOutput::cells`].
    ///
    /// Scalar calculators produce `<signal>__<name>`; trend calculators produce
    /// one `<signal>__<name>__attr_"<field>"` column per [`TrendAttr`].
    #[must_use]
    pub fn column_names(self, signal: &str) -> Vec<String> {
        match self {
            Self::Length | Self::Mean => vec![format!("{signal}__{}", self.name())],
            Self::LinearTrend | Self::LinearTrendTimewise => TrendAttr::ALL
                .iter()
                .map(|attr| format!("{signal}__{}__attr_\"{attr}\"", self.name()))
                .collect(),
        }
    }

    /// Run the calculator on `view`.
    ///
    /// An empty series for `Mean`, or degenerate trend input, yields
    /// [`FeatureOutput::Undefined`].
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ComputeError::IndexMismatch`] | `view` does not satisfy [`index_requirement`](Self::index_requirement) |
    /// | [`ComputeError::Trend`] | trend estimation fails for a non-degenerate reason |
    pub fn compute(self, view: SeriesView<'_>) -> Result<FeatureOutput, ComputeError> {
        let trend = match (self, view) {
            (Self::Length, SeriesView::Values(values)) => {
                return Ok(FeatureOutput::Value(values.len() as f64));
            }
            (Self::Mean, SeriesView::Values(values)) => {
                if values.is_empty() {
                    return Ok(FeatureOutput::Undefined(UndefinedReason::EmptySeries));
                }
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                return Ok(FeatureOutput::Value(mean));
            }
            (Self::LinearTrend, SeriesView::Positioned(values)) => compute_index_trend(values),
            (Self::LinearTrendTimewise, SeriesView::Timed { series, unit }) => {
                TimeTrend::new().with_unit(unit).fit(series)
            }
            (calculator, view) => {
                return Err(ComputeError::IndexMismatch {
                    calculator: calculator.name(),
                    required: calculator.index_requirement(),
                    provided: view.requirement(),
                });
            }
        };

        match trend {
            Ok(result) => Ok(FeatureOutput::Trend(result)),
            Err(e) if e.is_degenerate() => {
                Ok(FeatureOutput::Undefined(UndefinedReason::Degenerate(e)))
            }
            Err(e) => Err(ComputeError::Trend(e)),
        }
    }
}

impl fmt::Display for Calculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Calculator {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| ExtractError::UnknownCalculator {
                name: s.to_string(),
                known: Self::ALL.map(Calculator::name).join(", "),
            })
    }
}
