//! Domain types for chronotrend-io.

use chronotrend_extract::SignalSeries;

use crate::IoError;

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Samples read from one CSV file, grouped per (group, signal).
///
/// Produced by [`SampleReader`](crate::SampleReader). Series appear in the
/// order their (group, signal) pair first occurs in the file; samples inside
/// each series are sorted by timestamp.
#[derive(Debug)]
pub struct SampleDataset {
    /// One entry per (group, signal) pair.
    pub series: Vec<SignalSeries>,
    /// Number of samples read, across all series.
    pub n_samples: usize,
}

impl SampleDataset {
    /// Return the number of distinct groups.
    #[must_use]
    pub fn n_groups(&self) -> usize {
        let mut groups: Vec<&str> = self.series.iter().map(|s| s.group.as_str()).collect();
        groups.sort_unstable();
        groups.dedup();
        groups.len()
    }
}
