//! Column names recognized in screener exports.
//!
//! Headers match the screener export verbatim. Derived columns added by the
//! pipeline are named the same way so that reports read naturally.

/// Ticker symbol, the row key.
pub const SYMBOL: &str = "Symbol";

/// Company name.
pub const COMPANY_NAME: &str = "Company Name";

/// Market capitalization, exported as a suffixed currency string (`$1.23B`).
pub const MARKET_CAPITALIZATION: &str = "Market Capitalization";

/// Dividend yield, exported in percentage points.
pub const DIVIDEND_YIELD: &str = "Dividend Yield";

/// 52 week price performance, exported in percentage points.
pub const PRICE_PERFORMANCE_52W: &str = "Price Performance (52 Weeks)";

/// Last security price.
pub const SECURITY_PRICE: &str = "Security Price";

/// Share of total market capitalization (derived).
pub const WEIGHTED_MARKET_CAPITALIZATION: &str = "Weighted Market Capitalization";

/// Share of the guide subset's weight (derived, guide only).
pub const OPTIMAL_HOLDING_PERCENT: &str = "Optimal Holding %";

/// Columns that must be present for the pipeline to run.
pub const REQUIRED: &[&str] = &[MARKET_CAPITALIZATION, DIVIDEND_YIELD, SYMBOL, COMPANY_NAME];

/// Columns dropped on load by default.
pub const DEFAULT_EXCLUDED: &[&str] = &["S&P 500 (R)", "Security Type"];

/// Columns holding fractions that are displayed as percentages.
pub const PERCENT_COLUMNS: &[&str] = &[
    DIVIDEND_YIELD,
    PRICE_PERFORMANCE_52W,
    WEIGHTED_MARKET_CAPITALIZATION,
    OPTIMAL_HOLDING_PERCENT,
];
