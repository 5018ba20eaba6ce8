//! Display formatting for report columns.
//!
//! Values are stored as fractions and plain currency units; formatting turns
//! them into `12.34%`, `$1,500,000,000` and `$123.45` only when a report is
//! rendered.

use polars::prelude::AnyValue;
use yieldsift_data::columns;

/// How a column's numbers are rendered in text reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFormat {
    /// Fraction shown as a percentage with two decimals (`0.00%`).
    Percent,
    /// Whole-dollar currency with thousands separators.
    WholeCurrency,
    /// Cents-precision currency with thousands separators.
    CentsCurrency,
    /// Left as is.
    Plain,
}

impl ColumnFormat {
    /// Format designated for a column name.
    pub fn for_column(name: &str) -> Self {
        if columns::PERCENT_COLUMNS.contains(&name) {
            Self::Percent
        } else if name == columns::MARKET_CAPITALIZATION {
            Self::WholeCurrency
        } else if name == columns::SECURITY_PRICE {
            Self::CentsCurrency
        } else {
            Self::Plain
        }
    }

    /// Render a number in this format.
    pub fn render(&self, value: f64) -> String {
        match self {
            Self::Percent => format_percent(value),
            Self::WholeCurrency => format_currency(value, 0),
            Self::CentsCurrency => format_currency(value, 2),
            Self::Plain => value.to_string(),
        }
    }

    /// Render a table cell; nulls become empty strings and text is kept.
    pub fn render_cell(&self, value: &AnyValue<'_>) -> String {
        match value {
            AnyValue::Null => String::new(),
            AnyValue::String(text) => (*text).to_string(),
            AnyValue::StringOwned(text) => text.to_string(),
            other => match (self, other.extract::<f64>()) {
                (Self::Plain, _) | (_, None) => other.to_string(),
                (format, Some(number)) => format.render(number),
            },
        }
    }
}

/// Render a fraction as a percentage with two decimals.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Render a currency amount with `decimals` decimal places and thousands
/// separators.
pub fn format_currency(amount: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, amount.abs());
    let (whole, fraction) = match fixed.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (fixed.as_str(), None),
    };

    let mut rendered = String::with_capacity(fixed.len() + whole.len() / 3 + 2);
    if amount < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        rendered.push('-');
    }
    rendered.push('$');
    rendered.push_str(&group_thousands(whole));
    if let Some(fraction) = fraction {
        rendered.push('.');
        rendered.push_str(fraction);
    }
    rendered
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, "0.00%")]
    #[case(0.0025, "0.25%")]
    #[case(0.045, "4.50%")]
    #[case(1.0, "100.00%")]
    #[case(-0.0475, "-4.75%")]
    fn test_format_percent(#[case] fraction: f64, #[case] expected: &str) {
        assert_eq!(format_percent(fraction), expected);
    }

    #[rstest]
    #[case(1.5e9, 0, "$1,500,000,000")]
    #[case(850.0, 0, "$850")]
    #[case(1000.0, 0, "$1,000")]
    #[case(123.456, 2, "$123.46")]
    #[case(1234567.891, 2, "$1,234,567.89")]
    #[case(0.0, 2, "$0.00")]
    #[case(-42.5, 2, "-$42.50")]
    #[case(-0.001, 2, "$0.00")]
    fn test_format_currency(#[case] amount: f64, #[case] decimals: usize, #[case] expected: &str) {
        assert_eq!(format_currency(amount, decimals), expected);
    }

    #[test]
    fn test_designated_formats() {
        assert_eq!(ColumnFormat::for_column("Dividend Yield"), ColumnFormat::Percent);
        assert_eq!(ColumnFormat::for_column("Optimal Holding %"), ColumnFormat::Percent);
        assert_eq!(
            ColumnFormat::for_column("Market Capitalization"),
            ColumnFormat::WholeCurrency
        );
        assert_eq!(ColumnFormat::for_column("Security Price"), ColumnFormat::CentsCurrency);
        assert_eq!(ColumnFormat::for_column("Symbol"), ColumnFormat::Plain);
    }

    #[test]
    fn test_render_cell() {
        assert_eq!(ColumnFormat::Percent.render_cell(&AnyValue::Null), "");
        assert_eq!(ColumnFormat::Percent.render_cell(&AnyValue::Float64(0.3)), "30.00%");
        assert_eq!(
            ColumnFormat::WholeCurrency.render_cell(&AnyValue::Float64(2.5e8)),
            "$250,000,000"
        );
        assert_eq!(ColumnFormat::Plain.render_cell(&AnyValue::String("AAPL")), "AAPL");
    }
}
