//! Market Capitalization Weights
//!
//! Each security's weight is its share of the table's total market
//! capitalization:
//!
//! w_i = cap_i / Σ cap
//!
//! The weighted table is then ordered by dividend yield, lowest first, with
//! ties kept in their original order. Both the full report and the guide
//! rely on that ordering.

use crate::error::{PortfolioError, Result};
use polars::prelude::*;
use tracing::debug;
use yieldsift_data::{ScreenerTable, TableStage, columns};

/// Sum of the market capitalization column, nulls counted as zero.
pub fn total_market_cap(table: &ScreenerTable) -> Result<f64> {
    Ok(table
        .numbers(columns::MARKET_CAPITALIZATION)?
        .into_iter()
        .flatten()
        .sum())
}

/// Add `Weighted Market Capitalization` and sort by dividend yield.
///
/// Requires a [`TableStage::Cleaned`] table with numeric
/// `Market Capitalization` and `Dividend Yield` columns and advances it to
/// [`TableStage::Weighted`].
///
/// # Errors
///
/// Returns [`PortfolioError::Division`] when the total market cap is zero
/// (including an empty table), and [`PortfolioError::Data`] when the table
/// is not cleaned or lacks a required column.
pub fn apply_market_cap_weights(table: &mut ScreenerTable) -> Result<()> {
    table.require_stage(TableStage::Cleaned)?;
    table.require_column(columns::DIVIDEND_YIELD)?;

    let total = total_market_cap(table)?;
    if total <= 0.0 || !total.is_finite() {
        return Err(PortfolioError::Division {
            context: format!(
                "total market capitalization of '{}' is {}",
                table.origin(),
                total
            ),
        });
    }

    let weighted = table
        .frame()
        .clone()
        .lazy()
        .with_column(
            (col(columns::MARKET_CAPITALIZATION) / lit(total))
                .alias(columns::WEIGHTED_MARKET_CAPITALIZATION),
        )
        .sort(
            [columns::DIVIDEND_YIELD],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .collect()?;

    table.advance(weighted, TableStage::Weighted);
    debug!(
        rows = table.height(),
        total_market_cap = total,
        "applied market cap weights"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use yieldsift_data::DataError;

    fn cleaned(symbols: &[&str], caps: &[f64], yields: &[f64]) -> ScreenerTable {
        let frame = df!(
            columns::SYMBOL => symbols.to_vec(),
            columns::MARKET_CAPITALIZATION => caps.to_vec(),
            columns::DIVIDEND_YIELD => yields.to_vec()
        )
        .unwrap();
        ScreenerTable::with_stage(frame, "screener.csv", TableStage::Cleaned)
    }

    #[test]
    fn test_weights_sum_to_one() {
        let mut table = cleaned(&["AAA", "BBB", "CCC"], &[10e9, 30e9, 60e9], &[0.0, 0.01, 0.02]);
        apply_market_cap_weights(&mut table).unwrap();

        assert_eq!(table.stage(), TableStage::Weighted);
        let weights: Vec<f64> = table
            .numbers(columns::WEIGHTED_MARKET_CAPITALIZATION)
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_relative_eq!(weights[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(weights[1], 0.3, epsilon = 1e-12);
        assert_relative_eq!(weights[2], 0.6, epsilon = 1e-12);
        assert_relative_eq!(weights.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sorted_by_yield_ascending() {
        let mut table = cleaned(&["AAA", "BBB", "CCC"], &[1e9, 2e9, 3e9], &[0.02, 0.0, 0.01]);
        apply_market_cap_weights(&mut table).unwrap();

        assert_eq!(table.symbols().unwrap(), vec!["BBB", "CCC", "AAA"]);
        assert_eq!(
            table.numbers(columns::DIVIDEND_YIELD).unwrap(),
            vec![Some(0.0), Some(0.01), Some(0.02)]
        );
        // weights travel with their rows
        let weights = table
            .numbers(columns::WEIGHTED_MARKET_CAPITALIZATION)
            .unwrap();
        assert_relative_eq!(weights[0].unwrap(), 2.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(weights[2].unwrap(), 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut table = cleaned(
            &["AAA", "BBB", "CCC", "DDD"],
            &[1e9, 1e9, 1e9, 1e9],
            &[0.01, 0.0, 0.01, 0.0],
        );
        apply_market_cap_weights(&mut table).unwrap();
        assert_eq!(table.symbols().unwrap(), vec!["BBB", "DDD", "AAA", "CCC"]);
    }

    #[test]
    fn test_zero_total_market_cap() {
        let mut table = cleaned(&["AAA", "BBB"], &[0.0, 0.0], &[0.0, 0.01]);
        let err = apply_market_cap_weights(&mut table).unwrap_err();
        assert!(matches!(err, PortfolioError::Division { .. }));
        assert_eq!(table.stage(), TableStage::Cleaned);
    }

    #[test]
    fn test_requires_cleaned_table() {
        let frame = cleaned(&["AAA"], &[1e9], &[0.0]).into_frame();
        let mut table = ScreenerTable::new(frame, "screener.csv");
        assert!(matches!(
            apply_market_cap_weights(&mut table),
            Err(PortfolioError::Data(DataError::Stage { .. }))
        ));
    }

    #[test]
    fn test_requires_dividend_yield() {
        let frame = df!(
            columns::SYMBOL => ["AAA"],
            columns::MARKET_CAPITALIZATION => [1e9]
        )
        .unwrap();
        let mut table = ScreenerTable::with_stage(frame, "screener.csv", TableStage::Cleaned);
        assert!(matches!(
            apply_market_cap_weights(&mut table),
            Err(PortfolioError::Data(DataError::MissingColumn { .. }))
        ));
    }
}
