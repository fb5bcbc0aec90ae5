//! Error types for trend estimation and series validation.

/// Errors from series validation and linear trend estimation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrendError {
    /// Returned when a series has fewer than two samples, so no line is defined.
    #[error("need at least 2 samples to fit a trend, got {n}")]
    TooFewSamples {
        /// Number of samples provided.
        n: usize,
    },

    /// Returned when every sample shares the same position on the x axis.
    #[error("all {n} samples share one timestamp; slope is undefined")]
    ZeroTimeVariance {
        /// Number of samples provided.
        n: usize,
    },

    /// Returned when a timestamp precedes the timestamp before it.
    #[error("timestamps must be non-decreasing; sample {index} precedes its predecessor")]
    NonMonotonic {
        /// Position of the first out-of-order sample.
        index: usize,
    },

    /// Returned when a value is NaN, infinity, or negative infinity.
    #[error("series contains non-finite value at index {index}")]
    NonFiniteValue {
        /// Position of the first non-finite value found.
        index: usize,
    },

    /// Returned when timestamps and values are supplied with different lengths.
    #[error("got {timestamps} timestamps but {values} values")]
    LengthMismatch {
        /// Number of timestamps supplied.
        timestamps: usize,
        /// Number of values supplied.
        values: usize,
    },

    /// Returned when the Student-t distribution for the significance test cannot be built.
    #[error("t-distribution error: {reason}")]
    Distribution {
        /// Message from the distribution constructor.
        reason: String,
    },
}

impl TrendError {
    /// Return true when the trend is mathematically undefined for the input
    /// (too few samples or zero variance on the x axis).
    ///
    /// Degenerate input is not a caller bug; orchestrators typically record it as
    /// a missing feature rather than aborting.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::TooFewSamples { .. } | Self::ZeroTimeVariance { .. })
    }
}
