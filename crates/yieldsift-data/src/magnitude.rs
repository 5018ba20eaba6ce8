//! Suffixed currency magnitudes such as `$1.23B`.
//!
//! Screener exports abbreviate market capitalization with a trailing
//! magnitude letter. [`parse_magnitude`] expands one cell and
//! [`parse_magnitude_column`] rewrites a whole column in place, attaching row
//! and column context to any failure.

use crate::error::{CellError, DataError, Result};
use crate::table::ScreenerTable;

/// Magnitude letters and their multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MagnitudeSuffix {
    /// `K`, thousands
    Thousand,
    /// `M`, millions
    Million,
    /// `B`, billions
    Billion,
    /// `T`, trillions
    Trillion,
}

impl MagnitudeSuffix {
    /// All suffixes, smallest first.
    pub const ALL: [Self; 4] = [Self::Thousand, Self::Million, Self::Billion, Self::Trillion];

    /// Look up a suffix letter. Letters are case-sensitive.
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'K' => Some(Self::Thousand),
            'M' => Some(Self::Million),
            'B' => Some(Self::Billion),
            'T' => Some(Self::Trillion),
            _ => None,
        }
    }

    /// The suffix letter.
    pub const fn symbol(&self) -> char {
        match self {
            Self::Thousand => 'K',
            Self::Million => 'M',
            Self::Billion => 'B',
            Self::Trillion => 'T',
        }
    }

    /// Value of one unit of this magnitude.
    pub const fn multiplier(&self) -> f64 {
        match self {
            Self::Thousand => 1e3,
            Self::Million => 1e6,
            Self::Billion => 1e9,
            Self::Trillion => 1e12,
        }
    }
}

/// Parse a currency-with-suffix string into a plain number.
///
/// Accepts an optional leading `$`, thousands separators in the mantissa and
/// surrounding whitespace. The final character must be one of
/// [`MagnitudeSuffix`]'s letters.
///
/// # Errors
///
/// Returns a [`CellError`] when the value is empty, lacks a suffix, has a
/// mantissa that is not a finite number, is negative, or overflows once the
/// suffix is applied.
pub fn parse_magnitude(raw: &str) -> std::result::Result<f64, CellError> {
    let trimmed = raw.trim();
    let body = trimmed.strip_prefix('$').unwrap_or(trimmed).trim_start();
    let Some(last) = body.chars().last() else {
        return Err(CellError::Empty);
    };
    let suffix = MagnitudeSuffix::from_char(last).ok_or(CellError::MissingSuffix)?;

    let mantissa_text = body[..body.len() - last.len_utf8()].trim().replace(',', "");
    let mantissa: f64 = mantissa_text
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| CellError::NotANumber(mantissa_text.clone()))?;

    if mantissa < 0.0 {
        return Err(CellError::Negative(mantissa));
    }

    let value = mantissa * suffix.multiplier();
    if !value.is_finite() {
        return Err(CellError::OutOfRange {
            value,
            min: 0.0,
            max: f64::MAX,
        });
    }
    Ok(value)
}

/// Replace a text column of magnitude strings with parsed `f64` values.
///
/// # Errors
///
/// Fails with [`DataError::MissingColumn`] when the column is absent, and with
/// [`DataError::Parse`] on the first cell that is empty or malformed.
pub fn parse_magnitude_column(table: &mut ScreenerTable, column: &str) -> Result<()> {
    let cells = table.text_cells(column)?;
    let mut values = Vec::with_capacity(cells.len());

    for (index, cell) in cells.into_iter().enumerate() {
        let raw = cell.unwrap_or_default();
        let value = parse_magnitude(&raw).map_err(|reason| DataError::Parse {
            column: column.to_string(),
            row: index + 1,
            value: raw.clone(),
            reason,
        })?;
        values.push(Some(value));
    }

    table.set_numbers(column, values)
}
