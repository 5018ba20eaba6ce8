//! Error types for loading and cleaning screener tables.

use crate::table::TableStage;
use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading or cleaning a screener table.
#[derive(Debug, Error)]
pub enum DataError {
    /// A required column is absent from the table.
    #[error("'{column}' column not found in '{dataset}' data set")]
    MissingColumn {
        /// Name of the missing column
        column: String,
        /// Path or name of the data set that was searched
        dataset: String,
    },

    /// The input could not be parsed as delimited tabular data.
    #[error("'{dataset}' is not a readable tabular file: {source}")]
    Unreadable {
        /// Path or name of the data set
        dataset: String,
        /// Underlying reader error
        #[source]
        source: PolarsError,
    },

    /// A present cell could not be converted to its expected numeric form.
    #[error("cannot parse '{value}' in column '{column}' at row {row}: {reason}")]
    Parse {
        /// Column holding the cell
        column: String,
        /// 1-based data row number
        row: usize,
        /// Raw cell contents
        value: String,
        /// Why the cell was rejected
        reason: CellError,
    },

    /// The input file could not be opened.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The loader was configured with a delimiter that is not a single byte.
    #[error("invalid delimiter {0:?}: must be a single ASCII character")]
    InvalidDelimiter(char),

    /// A stage ran on a table that has not reached its required stage.
    #[error("table is {actual}, but this step requires a {expected} table")]
    Stage {
        /// Stage the step requires
        expected: TableStage,
        /// Stage the table is in
        actual: TableStage,
    },

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

impl DataError {
    /// Returns `true` when the error describes a schema problem: a missing
    /// column or an input that cannot be read as a table at all.
    pub const fn is_schema(&self) -> bool {
        matches!(self, Self::MissingColumn { .. } | Self::Unreadable { .. })
    }
}

/// Reasons a single cell is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CellError {
    /// The cell is empty.
    #[error("empty value")]
    Empty,

    /// A magnitude string does not end in K, M, B or T.
    #[error("missing magnitude suffix (expected one of K, M, B, T)")]
    MissingSuffix,

    /// The numeric part is not a finite number.
    #[error("'{0}' is not a number")]
    NotANumber(String),

    /// The value is negative where only non-negative values are allowed.
    #[error("negative value {0}")]
    Negative(f64),

    /// The value falls outside the accepted range.
    #[error("value {value} outside [{min}, {max})")]
    OutOfRange {
        /// Offending value
        value: f64,
        /// Inclusive lower bound
        min: f64,
        /// Exclusive upper bound
        max: f64,
    },
}
