//! Identifiers and the per-(group, signal) series consumed by extraction.

use std::fmt;

use chronotrend_trend::{Sample, TimedSeries};

use crate::error::ExtractError;

/// Identifier of a group (device, subject, …) whose samples form one output row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(String);

impl GroupId {
    /// Create a group identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::EmptyIdentifier`] if `id` is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ExtractError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ExtractError::EmptyIdentifier { what: "group" });
        }
        Ok(Self(id))
    }

    /// Return the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a measured quantity (e.g. `temperature`) within a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalName(String);

impl SignalName {
    /// Create a signal name.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::EmptyIdentifier`] if `name` is empty.
    pub fn new(name: impl Into<String>) -> Result<Self, ExtractError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ExtractError::EmptyIdentifier { what: "signal" });
        }
        Ok(Self(name))
    }

    /// Return the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Samples of one signal within one group, sorted by timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSeries {
    /// Group the samples belong to.
    pub group: GroupId,
    /// Signal the samples measure.
    pub signal: SignalName,
    /// Validated, time-ordered samples.
    pub series: TimedSeries,
}

impl SignalSeries {
    /// Build a series from samples in any order. Samples are sorted by
    /// timestamp; ties keep their input order.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidSeries`] if any value is non-finite.
    pub fn from_unsorted(
        group: GroupId,
        signal: SignalName,
        samples: Vec<Sample>,
    ) -> Result<Self, ExtractError> {
        let series = TimedSeries::from_unsorted(samples).map_err(|source| {
            ExtractError::InvalidSeries {
                group: group.to_string(),
                signal: signal.to_string(),
                source,
            }
        })?;
        Ok(Self { group, signal, series })
    }
}
