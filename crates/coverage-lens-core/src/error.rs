//! Error types for the core pipeline.

use serde::Serialize;
use thiserror::Error;

/// A `Published Date` (or reference date) that could not be resolved to a
/// calendar date.
///
/// `row` is the 1-based data-row number when the failure came from an
/// ingested row, and `None` for configuration values.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("invalid date '{raw}'{}", row_suffix(.row))]
pub struct DateParseError {
    pub raw: String,
    pub row: Option<usize>,
}

fn row_suffix(row: &Option<usize>) -> String {
    row.map(|r| format!(" at row {}", r)).unwrap_or_default()
}

impl DateParseError {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            row: None,
        }
    }

    /// Attach the row identity of the offending record.
    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }
}

/// Errors surfaced by the core crate.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    DateParse(#[from] DateParseError),

    /// The dataset identifier has no configured reference date.
    #[error("unknown dataset: '{0}'")]
    UnknownDataset(String),

    /// A view parameter (phase or display mode) could not be parsed.
    #[error("invalid {param}: '{value}'")]
    InvalidViewParam { param: &'static str, value: String },
}
