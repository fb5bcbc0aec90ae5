//! Time-stamped sample types with validation guarantees.

use chrono::NaiveDateTime;

use crate::error::TrendError;

/// One observation: a point in time and the value measured there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Instant of the observation, interpreted as UTC.
    pub timestamp: NaiveDateTime,
    /// Observed value.
    pub value: f64,
}

impl Sample {
    /// Create a new sample.
    #[must_use]
    pub fn new(timestamp: NaiveDateTime, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Unit in which elapsed time is expressed on the regression x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeUnit {
    /// Elapsed seconds.
    Seconds,
    /// Elapsed minutes.
    Minutes,
    /// Elapsed hours (default).
    #[default]
    Hours,
    /// Elapsed days of 24 hours.
    Days,
}

impl TimeUnit {
    /// Number of seconds in one unit.
    #[must_use]
    pub fn seconds(self) -> f64 {
        match self {
            Self::Seconds => 1.0,
            Self::Minutes => 60.0,
            Self::Hours => 3_600.0,
            Self::Days => 86_400.0,
        }
    }
}

/// Seconds elapsed from `from` to `to`, with nanosecond resolution.
pub(crate) fn elapsed_seconds(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    let delta = to - from;
    // Nanoseconds overflow past ~292 years, microseconds past ~292k years.
    if let Some(ns) = delta.num_nanoseconds() {
        ns as f64 / 1e9
    } else if let Some(us) = delta.num_microseconds() {
        us as f64 / 1e6
    } else {
        delta.num_seconds() as f64
    }
}

/// Owned, validated sequence of time-stamped samples.
///
/// Guarantees: timestamps and values have equal length, every value is finite,
/// and timestamps are non-decreasing. Equal consecutive timestamps are allowed.
/// The series may be empty or hold a single sample; trend estimators report
/// such input as degenerate rather than rejecting it here.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedSeries {
    timestamps: Vec<NaiveDateTime>,
    values: Vec<f64>,
}

impl TimedSeries {
    /// Create a series from parallel timestamp and value vectors.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TrendError::LengthMismatch`] | `timestamps.len() != values.len()` |
    /// | [`TrendError::NonFiniteValue`] | Any value is NaN or infinite |
    /// | [`TrendError::NonMonotonic`] | A timestamp precedes its predecessor |
    pub fn new(timestamps: Vec<NaiveDateTime>, values: Vec<f64>) -> Result<Self, TrendError> {
        if timestamps.len() != values.len() {
            return Err(TrendError::LengthMismatch {
                timestamps: timestamps.len(),
                values: values.len(),
            });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(TrendError::NonFiniteValue { index });
        }
        if let Some(index) = timestamps.windows(2).position(|w| w[1] < w[0]) {
            return Err(TrendError::NonMonotonic { index: index + 1 });
        }
        Ok(Self { timestamps, values })
    }

    /// Create a series from samples already ordered by timestamp.
    ///
    /// # Errors
    ///
    /// Same conditions as [`TimedSeries::new`], except length mismatch cannot occur.
    pub fn from_samples(samples: &[Sample]) -> Result<Self, TrendError> {
        let (timestamps, values) = samples.iter().map(|s| (s.timestamp, s.value)).unzip();
        Self::new(timestamps, values)
    }

    /// Create a series from samples in arbitrary order, sorting them by timestamp.
    ///
    /// The sort is stable, so samples sharing a timestamp keep their input order.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TrendError::NonFiniteValue`] | Any value is NaN or infinite (index refers to sorted order) |
    pub fn from_unsorted(mut samples: Vec<Sample>) -> Result<Self, TrendError> {
        samples.sort_by_key(|s| s.timestamp);
        Self::from_samples(&samples)
    }

    /// Return the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Return true if the series has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Return the timestamps in ascending order.
    #[must_use]
    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    /// Return the observed values, aligned with [`timestamps`](Self::timestamps).
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Return the first timestamp, or `None` for an empty series.
    #[must_use]
    pub fn start(&self) -> Option<NaiveDateTime> {
        self.timestamps.first().copied()
    }

    /// Elapsed time of each sample since the first one, in `unit`.
    ///
    /// Returns an empty vector for an empty series. The first entry is always `0.0`.
    #[must_use]
    pub fn elapsed(&self, unit: TimeUnit) -> Vec<f64> {
        let Some(t0) = self.start() else {
            return Vec::new();
        };
        let per_unit = unit.seconds();
        self.timestamps
            .iter()
            .map(|&t| elapsed_seconds(t0, t) / per_unit)
            .collect()
    }

    /// Iterate over the samples in order.
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.timestamps
            .iter()
            .zip(&self.values)
            .map(|(&timestamp, &value)| Sample { timestamp, value })
    }
}
