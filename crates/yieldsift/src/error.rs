//! The unified error type of a pipeline run.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use yieldsift_data::DataError;
use yieldsift_output::ExportError;
use yieldsift_portfolio::PortfolioError;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Any failure of a pipeline run.
#[derive(Debug, Error)]
pub enum Error {
    /// Loading or cleaning failed.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Weighting or guide construction failed.
    #[error(transparent)]
    Portfolio(#[from] PortfolioError),

    /// Writing the reports failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// The configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The configuration file could not be read.
    #[error("cannot read configuration {}: {source}", path.display())]
    ConfigFile {
        /// Configuration file path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for [`crate::PipelineConfig`].
    #[error("malformed configuration {}: {source}", path.display())]
    ConfigFormat {
        /// Configuration file path
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required column is missing or the input is not a table.
    Schema,
    /// A cell could not be converted.
    Parse,
    /// A weight denominator was zero.
    Division,
    /// A destination is open elsewhere; closing it and retrying may succeed.
    ResourceBusy,
    /// Other filesystem failures.
    Io,
    /// Invalid configuration or arguments.
    Config,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    /// Whether retrying after user action can succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ResourceBusy)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Schema => "schema error",
            Self::Parse => "parse error",
            Self::Division => "division error",
            Self::ResourceBusy => "resource busy",
            Self::Io => "io error",
            Self::Config => "configuration error",
            Self::Internal => "internal error",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Classify the error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Data(err) => data_kind(err),
            Self::Portfolio(err) => portfolio_kind(err),
            Self::Export(err) => match err {
                ExportError::ResourceBusy { .. } => ErrorKind::ResourceBusy,
                ExportError::Io { .. } => ErrorKind::Io,
                ExportError::Guide(err) => portfolio_kind(err),
                _ => ErrorKind::Internal,
            },
            Self::Config(_) | Self::ConfigFile { .. } | Self::ConfigFormat { .. } => {
                ErrorKind::Config
            }
        }
    }
}

const fn data_kind(err: &DataError) -> ErrorKind {
    match err {
        DataError::MissingColumn { .. } | DataError::Unreadable { .. } => ErrorKind::Schema,
        DataError::Parse { .. } => ErrorKind::Parse,
        DataError::Io { .. } => ErrorKind::Io,
        DataError::InvalidDelimiter(_) => ErrorKind::Config,
        DataError::Stage { .. } | DataError::Polars(_) => ErrorKind::Internal,
    }
}

const fn portfolio_kind(err: &PortfolioError) -> ErrorKind {
    match err {
        PortfolioError::Division { .. } => ErrorKind::Division,
        PortfolioError::InvalidThreshold(_) => ErrorKind::Config,
        PortfolioError::Data(err) => data_kind(err),
        PortfolioError::Polars(_) => ErrorKind::Internal,
    }
}
