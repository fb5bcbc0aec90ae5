//! File I/O, validation, and serialization for the chronotrend pipeline.
//!
//! [`SampleReader`] turns a long or wide CSV table into validated
//! [`SignalSeries`](chronotrend_extract::SignalSeries); [`ResultWriter`]
//! persists feature tables and trend comparisons as CSV and JSON.

mod domain;
mod error;
mod reader;
mod timestamp;
mod writer;

pub use domain::{ExperimentName, SampleDataset};
pub use error::IoError;
pub use reader::{ColumnNames, SampleReader, TableLayout};
pub use writer::ResultWriter;
