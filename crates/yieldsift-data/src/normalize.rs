//! Percentage and currency normalization.
//!
//! Screeners export yields and performance in percentage points, either as a
//! bare number (`4.5`) or with a percent sign (`4.5%`). Everything is stored
//! as a fraction (`0.045`); percentages only come back at display time.

use crate::error::{CellError, DataError, Result};
use crate::table::ScreenerTable;

/// Cell contents screeners use for "no value".
const PLACEHOLDERS: &[&str] = &["--", "-", "n/a", "na", "nan", "null"];

fn is_missing(text: &str) -> bool {
    text.is_empty() || PLACEHOLDERS.iter().any(|p| text.eq_ignore_ascii_case(p))
}

fn parse_number(text: &str) -> std::result::Result<f64, CellError> {
    let cleaned = text.replace(',', "");
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CellError::NotANumber(text.to_string()))
}

/// Parse a percentage-point cell into a fraction.
///
/// Returns `Ok(None)` for empty or placeholder cells.
///
/// # Errors
///
/// Returns [`CellError::NotANumber`] when the cell holds anything else that
/// is not a number.
pub fn parse_percentage(raw: &str) -> std::result::Result<Option<f64>, CellError> {
    let trimmed = raw.trim();
    if is_missing(trimmed) {
        return Ok(None);
    }
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    parse_number(number).map(|points| Some(points / 100.0))
}

/// Parse a dividend yield cell into a fraction in `[0, 1)`.
///
/// Missing cells normalize to `0.0`.
///
/// # Errors
///
/// Rejects cells that are not numbers, are negative, or are 100% or more.
pub fn parse_dividend_yield(raw: &str) -> std::result::Result<f64, CellError> {
    let value = parse_percentage(raw)?.unwrap_or(0.0);
    if value < 0.0 {
        return Err(CellError::Negative(value));
    }
    if value >= 1.0 {
        return Err(CellError::OutOfRange {
            value,
            min: 0.0,
            max: 1.0,
        });
    }
    Ok(value)
}

/// Parse a plain currency cell such as `$1,234.56`.
///
/// Returns `Ok(None)` for empty or placeholder cells.
///
/// # Errors
///
/// Returns [`CellError::NotANumber`] for anything else that is not a number.
pub fn parse_currency(raw: &str) -> std::result::Result<Option<f64>, CellError> {
    let trimmed = raw.trim();
    if is_missing(trimmed) {
        return Ok(None);
    }
    let number = trimmed.strip_prefix('$').unwrap_or(trimmed).trim_start();
    parse_number(number).map(Some)
}

/// Rewrite a column cell by cell, attaching row/column context to failures.
fn rewrite_column<F>(table: &mut ScreenerTable, column: &str, parse: F) -> Result<()>
where
    F: Fn(&str) -> std::result::Result<Option<f64>, CellError>,
{
    let cells = table.text_cells(column)?;
    let mut values = Vec::with_capacity(cells.len());

    for (index, cell) in cells.into_iter().enumerate() {
        let raw = cell.unwrap_or_default();
        let value = parse(&raw).map_err(|reason| DataError::Parse {
            column: column.to_string(),
            row: index + 1,
            value: raw.clone(),
            reason,
        })?;
        values.push(value);
    }

    table.set_numbers(column, values)
}

/// Normalize the dividend yield column to fractions, missing cells to `0.0`.
///
/// # Errors
///
/// Fails with [`DataError::MissingColumn`] when the column does not exist,
/// and with [`DataError::Parse`] on the first rejected cell.
pub fn normalize_yield_column(table: &mut ScreenerTable, column: &str) -> Result<()> {
    rewrite_column(table, column, |raw| parse_dividend_yield(raw).map(Some))
}

/// Normalize an optional percentage-point column to fractions. Missing cells
/// stay null and negative values are kept.
///
/// # Errors
///
/// Fails with [`DataError::MissingColumn`] when the column does not exist,
/// and with [`DataError::Parse`] on the first cell that is not a number.
pub fn normalize_percentage_column(table: &mut ScreenerTable, column: &str) -> Result<()> {
    rewrite_column(table, column, parse_percentage)
}

/// Parse an optional currency column. Missing cells stay null.
///
/// # Errors
///
/// Fails with [`DataError::MissingColumn`] when the column does not exist,
/// and with [`DataError::Parse`] on the first cell that is not a number.
pub fn parse_currency_column(table: &mut ScreenerTable, column: &str) -> Result<()> {
    rewrite_column(table, column, parse_currency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableStage;
    use approx::assert_relative_eq;
    use polars::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("4.5", Some(0.045))]
    #[case("4.5%", Some(0.045))]
    #[case(" 0.25 % ", Some(0.0025))]
    #[case("-12.5%", Some(-0.125))]
    #[case("1,250%", Some(12.5))]
    #[case("", None)]
    #[case("--", None)]
    #[case("N/A", None)]
    fn test_parse_percentage(#[case] raw: &str, #[case] expected: Option<f64>) {
        let parsed = parse_percentage(raw).unwrap();
        match (parsed, expected) {
            (Some(actual), Some(expected)) => assert_relative_eq!(actual, expected),
            (actual, expected) => assert_eq!(actual, expected),
        }
    }

    #[test]
    fn test_parse_percentage_rejects_text() {
        assert_eq!(
            parse_percentage("high").unwrap_err(),
            CellError::NotANumber("high".to_string())
        );
    }

    #[rstest]
    #[case("4.5", 0.045)]
    #[case("0", 0.0)]
    #[case("", 0.0)]
    #[case("--", 0.0)]
    #[case("99.99", 0.9999)]
    fn test_parse_dividend_yield(#[case] raw: &str, #[case] expected: f64) {
        assert_relative_eq!(parse_dividend_yield(raw).unwrap(), expected);
    }

    #[test]
    fn test_parse_dividend_yield_bounds() {
        assert!(matches!(
            parse_dividend_yield("-0.5"),
            Err(CellError::Negative(_))
        ));
        assert!(matches!(
            parse_dividend_yield("100"),
            Err(CellError::OutOfRange { .. })
        ));
    }

    #[rstest]
    #[case("$123.45", Some(123.45))]
    #[case("1,024.10", Some(1024.10))]
    #[case("", None)]
    #[case("--", None)]
    fn test_parse_currency(#[case] raw: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_currency(raw).unwrap(), expected);
    }

    #[test]
    fn test_normalize_yield_column_fills_missing() {
        let frame = df!(
            "Symbol" => ["AAA", "BBB", "CCC"],
            "Dividend Yield" => [Some("4.5"), None, Some("0.00")]
        )
        .unwrap();
        let mut table = ScreenerTable::with_stage(frame, "screener.csv", TableStage::Loaded);

        normalize_yield_column(&mut table, "Dividend Yield").unwrap();

        let yields = table.numbers("Dividend Yield").unwrap();
        assert_relative_eq!(yields[0].unwrap(), 0.045);
        assert_eq!(yields[1], Some(0.0));
        assert_eq!(yields[2], Some(0.0));
    }

    #[test]
    fn test_normalize_yield_column_accepts_numeric_cells() {
        let frame = df!(
            "Symbol" => ["AAA", "BBB"],
            "Dividend Yield" => [Some(4.5), None]
        )
        .unwrap();
        let mut table = ScreenerTable::with_stage(frame, "screener.csv", TableStage::Loaded);

        normalize_yield_column(&mut table, "Dividend Yield").unwrap();

        let yields = table.numbers("Dividend Yield").unwrap();
        assert_relative_eq!(yields[0].unwrap(), 0.045);
        assert_eq!(yields[1], Some(0.0));
    }

    #[test]
    fn test_normalize_yield_column_missing() {
        let frame = df!("Symbol" => ["AAA"]).unwrap();
        let mut table = ScreenerTable::new(frame, "screener.csv");
        let err = normalize_yield_column(&mut table, "Dividend Yield").unwrap_err();
        assert!(err.is_schema());
        assert!(err.to_string().contains("'Dividend Yield'"));
        assert!(err.to_string().contains("screener.csv"));
    }

    #[test]
    fn test_percentage_column_keeps_nulls() {
        let frame = df!(
            "Price Performance (52 Weeks)" => [Some("12.5%"), None, Some("-3")]
        )
        .unwrap();
        let mut table = ScreenerTable::new(frame, "screener.csv");

        normalize_percentage_column(&mut table, "Price Performance (52 Weeks)").unwrap();

        let perf = table.numbers("Price Performance (52 Weeks)").unwrap();
        assert_relative_eq!(perf[0].unwrap(), 0.125);
        assert_eq!(perf[1], None);
        assert_relative_eq!(perf[2].unwrap(), -0.03);
    }

    #[test]
    fn test_currency_column_reports_bad_cell() {
        let frame = df!("Security Price" => ["$10.00", "ten"]).unwrap();
        let mut table = ScreenerTable::new(frame, "screener.csv");

        let err = parse_currency_column(&mut table, "Security Price").unwrap_err();
        assert!(matches!(err, DataError::Parse { row: 2, .. }));
    }
}
