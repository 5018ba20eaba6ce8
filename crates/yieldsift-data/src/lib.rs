#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/yieldsift/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod clean;
pub mod columns;
pub mod error;
pub mod loader;
pub mod magnitude;
pub mod normalize;
pub mod table;

pub use clean::clean_table;
pub use error::{CellError, DataError, Result};
pub use loader::{LoaderConfig, TableLoader};
pub use magnitude::{MagnitudeSuffix, parse_magnitude, parse_magnitude_column};
pub use normalize::{
    normalize_percentage_column, normalize_yield_column, parse_currency, parse_currency_column,
    parse_dividend_yield, parse_percentage,
};
pub use table::{ScreenerTable, TableStage, TableSummary};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
