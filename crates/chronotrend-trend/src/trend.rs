//! Time-aware and ordinal linear trend estimators.

use tracing::instrument;

use crate::error::TrendError;
use crate::ols;
use crate::result::TrendResult;
use crate::series::{Sample, TimeUnit, TimedSeries};

/// Linear trend of value against elapsed real time.
///
/// The x axis is the time since the first sample, expressed in [`TimeUnit`]
/// (hours by default). Unevenly spaced samples therefore weigh by the real
/// gaps between them instead of by their position in the sequence.
///
/// Immutable and `Copy`; one instance can be shared across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeTrend {
    unit: TimeUnit,
}

impl TimeTrend {
    /// Create an estimator measuring elapsed time in hours.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the unit of the x axis. Changing the unit by a factor `k` scales the
    /// slope by `1 / k` and leaves `rvalue` and `pvalue` unchanged.
    #[must_use]
    pub fn with_unit(mut self, unit: TimeUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Return the unit of the x axis.
    #[must_use]
    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// Fit the trend of `series`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TrendError::TooFewSamples`] | `series` has fewer than two samples |
    /// | [`TrendError::ZeroTimeVariance`] | every sample shares one timestamp |
    /// | [`TrendError::Distribution`] | Student-t construction fails |
    #[instrument(level = "trace", skip_all, fields(n = series.len(), unit = ?self.unit))]
    pub fn fit(&self, series: &TimedSeries) -> Result<TrendResult, TrendError> {
        let x = series.elapsed(self.unit);
        ols::fit(&x, series.values())
    }
}

/// Fit a linear trend over samples ordered by timestamp, with elapsed hours on the x axis.
///
/// Ordering is a precondition; it is checked rather than repaired.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`TrendError::NonMonotonic`] | a timestamp precedes its predecessor |
/// | [`TrendError::NonFiniteValue`] | a value is NaN or infinite |
/// | [`TrendError::TooFewSamples`] | fewer than two samples |
/// | [`TrendError::ZeroTimeVariance`] | every sample shares one timestamp |
pub fn compute_time_trend(samples: &[Sample]) -> Result<TrendResult, TrendError> {
    let series = TimedSeries::from_samples(samples)?;
    TimeTrend::new().fit(&series)
}

/// Fit a linear trend over `values` using the sample position `0, 1, 2, …` as x.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`TrendError::NonFiniteValue`] | a value is NaN or infinite |
/// | [`TrendError::TooFewSamples`] | fewer than two values |
#[instrument(level = "trace", skip_all, fields(n = values.len()))]
pub fn compute_index_trend(values: &[f64]) -> Result<TrendResult, TrendError> {
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(TrendError::NonFiniteValue { index });
    }
    let x: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
    ols::fit(&x, values)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 3, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn two_samples_46_minutes_apart() {
        let samples = [Sample::new(at(1, 10, 4), 1.0), Sample::new(at(1, 10, 50), 2.0)];
        let r = compute_time_trend(&samples).unwrap();
        assert!((r.slope - 60.0 / 46.0).abs() < 1e-9, "slope {}", r.slope);
        assert!((r.slope - 1.304348).abs() < 1e-6);
        assert!((r.intercept - 1.0).abs() < 1e-12);
        assert!((r.rvalue - 1.0).abs() < 1e-12);
        assert_eq!(r.pvalue, 0.0);
        assert_eq!(r.stderr, 0.0);
    }

    #[test]
    fn ordinal_variant_on_same_points() {
        let r = compute_index_trend(&[1.0, 2.0]).unwrap();
        assert_eq!(r.slope, 1.0);
        assert_eq!(r.intercept, 1.0);
    }

    #[test]
    fn single_sample_is_degenerate() {
        let err = compute_time_trend(&[Sample::new(at(1, 10, 0), 3.0)]).unwrap_err();
        assert!(err.is_degenerate());
        assert!(matches!(err, TrendError::TooFewSamples { n: 1 }));
    }

    #[test]
    fn empty_is_degenerate() {
        let err = compute_time_trend(&[]).unwrap_err();
        assert!(matches!(err, TrendError::TooFewSamples { n: 0 }));
        assert!(compute_index_trend(&[]).unwrap_err().is_degenerate());
    }

    #[test]
    fn shared_timestamp_is_degenerate() {
        let t = at(1, 10, 0);
        let samples = [Sample::new(t, 1.0), Sample::new(t, 2.0), Sample::new(t, 7.0)];
        let err = compute_time_trend(&samples).unwrap_err();
        assert!(matches!(err, TrendError::ZeroTimeVariance { n: 3 }));
    }

    #[test]
    fn sub_microsecond_spacing_is_not_degenerate() {
        let t0 = at(1, 10, 0);
        let samples = [
            Sample::new(t0, 1.0),
            Sample::new(t0 + chrono::TimeDelta::nanoseconds(400), 2.0),
            Sample::new(t0 + chrono::TimeDelta::nanoseconds(800), 3.0),
        ];
        let series = TimedSeries::from_samples(&samples).unwrap();
        let r = TimeTrend::new().with_unit(TimeUnit::Seconds).fit(&series).unwrap();
        assert!((r.slope / 2.5e6 - 1.0).abs() < 1e-9, "slope {}", r.slope);
        assert!((r.rvalue - 1.0).abs() < 1e-9);
        assert!(compute_time_trend(&samples).is_ok());
    }

    #[test]
    fn unsorted_input_is_rejected() {
        let samples = [Sample::new(at(2, 0, 0), 1.0), Sample::new(at(1, 0, 0), 2.0)];
        let err = compute_time_trend(&samples).unwrap_err();
        assert!(matches!(err, TrendError::NonMonotonic { index: 1 }));
        assert!(!err.is_degenerate());
    }

    #[test]
    fn index_trend_rejects_infinity() {
        let err = compute_index_trend(&[1.0, f64::INFINITY]).unwrap_err();
        assert!(matches!(err, TrendError::NonFiniteValue { index: 1 }));
    }

    #[test]
    fn unit_changes_slope_only() {
        let samples = [
            Sample::new(at(1, 0, 0), 1.0),
            Sample::new(at(1, 3, 0), 4.0),
            Sample::new(at(1, 4, 30), 3.0),
            Sample::new(at(2, 1, 0), 9.0),
        ];
        let series = TimedSeries::from_samples(&samples).unwrap();
        let hours = TimeTrend::new().fit(&series).unwrap();
        let minutes = TimeTrend::new().with_unit(TimeUnit::Minutes).fit(&series).unwrap();
        assert!((hours.slope / 60.0 - minutes.slope).abs() < 1e-12);
        assert!((hours.rvalue - minutes.rvalue).abs() < 1e-12);
        assert!((hours.pvalue - minutes.pvalue).abs() < 1e-12);
        assert!((hours.intercept - minutes.intercept).abs() < 1e-9);
    }

    #[test]
    fn default_unit_is_hours() {
        assert_eq!(TimeTrend::new().unit(), TimeUnit::Hours);
    }
}
