#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/yieldsift/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod guide;
pub mod weights;

pub use error::{PortfolioError, Result};
pub use guide::{
    DEFAULT_YIELD_THRESHOLD, GUIDE_COLUMNS, Guide, GuideBuilder, GuideHolding, blended_yield,
    optimal_holdings,
};
pub use weights::{apply_market_cap_weights, total_market_cap};
