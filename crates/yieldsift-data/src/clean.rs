//! Cleaning stage: turn a loaded text table into typed numeric columns.

use crate::columns;
use crate::error::{DataError, Result};
use crate::magnitude::parse_magnitude_column;
use crate::normalize::{normalize_percentage_column, normalize_yield_column, parse_currency_column};
use crate::table::{ScreenerTable, TableStage};
use tracing::debug;

/// Parse and normalize every recognized numeric column.
///
/// Afterwards `Market Capitalization` holds currency units, `Dividend Yield`
/// holds non-null fractions in `[0, 1)`, and the optional
/// `Price Performance (52 Weeks)` and `Security Price` columns, when present,
/// hold nullable numbers. The table advances to [`TableStage::Cleaned`].
///
/// # Errors
///
/// Fails with [`DataError::Stage`] unless the table is freshly loaded, with
/// [`DataError::MissingColumn`] when a required column is absent (checked
/// before any cell is converted) and with [`DataError::Parse`] on the first
/// rejected cell.
pub fn clean_table(table: &mut ScreenerTable) -> Result<()> {
    // numeric columns cannot be parsed twice
    if table.stage() != TableStage::Loaded {
        return Err(DataError::Stage {
            expected: TableStage::Loaded,
            actual: table.stage(),
        });
    }

    for column in columns::REQUIRED {
        table.require_column(column)?;
    }

    parse_magnitude_column(table, columns::MARKET_CAPITALIZATION)?;
    normalize_yield_column(table, columns::DIVIDEND_YIELD)?;

    if table.has_column(columns::PRICE_PERFORMANCE_52W) {
        normalize_percentage_column(table, columns::PRICE_PERFORMANCE_52W)?;
    }
    if table.has_column(columns::SECURITY_PRICE) {
        parse_currency_column(table, columns::SECURITY_PRICE)?;
    }

    table.set_stage(TableStage::Cleaned);
    debug!(
        dataset = table.origin(),
        rows = table.height(),
        "cleaned screener table"
    );
    Ok(())
}
