//! Error types for feature calculators and extraction.

use chronotrend_trend::TrendError;

use crate::calculator::IndexRequirement;

/// Errors from running a single calculator over one series.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComputeError {
    /// Returned when a calculator receives a series view it does not declare.
    #[error("calculator {calculator} requires {required:?} input, got {provided:?}")]
    IndexMismatch {
        /// Name of the calculator.
        calculator: &'static str,
        /// Index requirement declared by the calculator.
        required: IndexRequirement,
        /// Index requirement of the view actually supplied.
        provided: IndexRequirement,
    },

    /// Wraps a non-degenerate trend estimation failure.
    #[error("trend estimation failed: {0}")]
    Trend(#[from] TrendError),
}

/// Why a calculator produced no value for a series.
///
/// Not a failure: extraction records these as undefined cells and continues.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UndefinedReason {
    /// The series has no samples, so no scalar statistic exists.
    #[error("series is empty")]
    EmptySeries,

    /// The trend is mathematically undefined (too few samples or zero
    /// variance on the x axis).
    #[error(transparent)]
    Degenerate(TrendError),
}

/// Errors from extraction configuration and per-group feature computation.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Returned when no calculators are configured.
    #[error("at least one calculator must be selected")]
    NoCalculators,

    /// Returned when the same calculator is selected twice.
    #[error("calculator {name} selected more than once")]
    DuplicateCalculator {
        /// Name of the repeated calculator.
        name: &'static str,
    },

    /// Returned when a calculator name does not match any known calculator.
    #[error("unknown calculator \"{name}\" (expected one of: {known})")]
    UnknownCalculator {
        /// The name that failed to parse.
        name: String,
        /// Comma-separated list of valid names.
        known: String,
    },

    /// Returned when a group or signal identifier is empty.
    #[error("{what} identifier must be non-empty")]
    EmptyIdentifier {
        /// Which identifier was empty ("group" or "signal").
        what: &'static str,
    },

    /// Returned when the same (group, signal) pair is supplied twice.
    #[error("duplicate series for group {group}, signal {signal}")]
    DuplicateSeries {
        /// Group identifier.
        group: String,
        /// Signal name.
        signal: String,
    },

    /// Returned when a series' samples fail validation.
    #[error("invalid samples for group {group}, signal {signal}: {source}")]
    InvalidSeries {
        /// Group identifier.
        group: String,
        /// Signal name.
        signal: String,
        /// Underlying validation error.
        source: TrendError,
    },

    /// Wraps a calculator failure together with the series it happened on.
    #[error("calculator {calculator} failed for group {group}, signal {signal}: {source}")]
    Compute {
        /// Group identifier.
        group: String,
        /// Signal name.
        signal: String,
        /// Calculator name.
        calculator: &'static str,
        /// Underlying calculator error.
        source: ComputeError,
    },
}
