//! Per-group, per-signal feature extraction over time-stamped samples.
//!
//! Each [`Calculator`] declares a static [`IndexRequirement`]: bare values,
//! values with ordinal positions, or values with real time instants. The
//! orchestrator ([`ExtractionConfig::fit`]) builds the matching [`SeriesView`]
//! for every (group, signal) series, runs the calculators in parallel, and
//! pivots the results into a [`FeatureTable`] with columns named
//! `<signal>__<calculator>__attr_"<field>"`.

mod calculator;
mod compare;
mod domain;
mod error;
mod extract;
mod table;

pub use calculator::{Calculator, FeatureOutput, IndexRequirement, SeriesView};
pub use compare::{TrendComparison, compare_trends};
pub use domain::{GroupId, SignalName, SignalSeries};
pub use error::{ComputeError, ExtractError, UndefinedReason};
pub use extract::ExtractionConfig;
pub use table::FeatureTable;
