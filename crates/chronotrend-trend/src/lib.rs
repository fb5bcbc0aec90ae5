//! Linear trend estimators over time-stamped and ordinal samples.
//!
//! Pure math library with no I/O. Fits an ordinary least-squares line of value
//! against either elapsed real time since the first sample ([`TimeTrend`],
//! [`compute_time_trend`]) or sample position ([`compute_index_trend`]), and
//! reports slope, intercept, Pearson r, the two-sided slope p-value, and the
//! slope standard error. Both estimators share one regression core and differ
//! only in how the x axis is built.

mod error;
mod ols;
mod result;
mod series;
mod trend;

pub use error::TrendError;
pub use result::{TrendAttr, TrendResult};
pub use series::{Sample, TimeUnit, TimedSeries};
pub use trend::{TimeTrend, compute_index_trend, compute_time_trend};
