//! Error types for weighting and guide construction.

use polars::prelude::PolarsError;
use thiserror::Error;
use yieldsift_data::DataError;

/// Result type for portfolio operations.
pub type Result<T> = std::result::Result<T, PortfolioError>;

/// Errors that can occur while weighting a table or building a guide.
#[derive(Debug, Error)]
pub enum PortfolioError {
    /// A weight denominator is zero, so weights are undefined.
    #[error("cannot compute weights: {context}")]
    Division {
        /// Which denominator was zero
        context: String,
    },

    /// The yield threshold is not a positive finite fraction.
    #[error("invalid yield threshold {0}: must be a positive finite fraction")]
    InvalidThreshold(f64),

    /// A stage precondition failed: missing column or wrong stage.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}
