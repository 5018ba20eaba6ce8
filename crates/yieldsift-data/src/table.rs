//! The in-memory screener table and its pipeline stage.
//!
//! A [`ScreenerTable`] owns a polars [`DataFrame`] together with the name of
//! the data set it came from and the [`TableStage`] it has reached. Every
//! pipeline step checks the stage and the columns it needs before touching
//! the frame, and advances the stage when it is done.

use crate::columns;
use crate::error::{DataError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How far a table has progressed through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TableStage {
    /// Raw text cells, excluded columns dropped.
    Loaded,
    /// Numeric columns parsed and normalized.
    Cleaned,
    /// Weight column added and rows sorted by dividend yield.
    Weighted,
}

impl fmt::Display for TableStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Loaded => "loaded",
            Self::Cleaned => "cleaned",
            Self::Weighted => "weighted",
        };
        f.write_str(name)
    }
}

/// Screener data owned by a single pipeline run.
#[derive(Debug, Clone)]
pub struct ScreenerTable {
    frame: DataFrame,
    origin: String,
    stage: TableStage,
}

impl ScreenerTable {
    /// Wrap a freshly loaded frame.
    pub fn new(frame: DataFrame, origin: impl Into<String>) -> Self {
        Self::with_stage(frame, origin, TableStage::Loaded)
    }

    /// Wrap a frame that is already at `stage`.
    ///
    /// The caller vouches for the frame's columns; later steps still check
    /// for the columns they need.
    pub fn with_stage(frame: DataFrame, origin: impl Into<String>, stage: TableStage) -> Self {
        Self {
            frame,
            origin: origin.into(),
            stage,
        }
    }

    /// The underlying frame.
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Consume the table, returning the frame.
    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Path or name of the data set the table was loaded from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Current pipeline stage.
    pub const fn stage(&self) -> TableStage {
        self.stage
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Whether a column with this exact name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.frame.get_column_index(name).is_some()
    }

    /// Look up a column, failing with [`DataError::MissingColumn`] when absent.
    pub fn require_column(&self, name: &str) -> Result<&Column> {
        self.frame
            .column(name)
            .map_err(|_| DataError::MissingColumn {
                column: name.to_string(),
                dataset: self.origin.clone(),
            })
    }

    /// Fail unless the table has reached at least `expected`.
    pub fn require_stage(&self, expected: TableStage) -> Result<()> {
        if self.stage < expected {
            return Err(DataError::Stage {
                expected,
                actual: self.stage,
            });
        }
        Ok(())
    }

    /// Replace the frame and record the stage it now satisfies.
    pub fn advance(&mut self, frame: DataFrame, stage: TableStage) {
        self.frame = frame;
        self.stage = stage;
    }

    /// Record that the frame, modified in place, now satisfies `stage`.
    pub const fn set_stage(&mut self, stage: TableStage) {
        self.stage = stage;
    }

    /// Cells of a column rendered as text, `None` for nulls.
    pub fn text_cells(&self, name: &str) -> Result<Vec<Option<String>>> {
        let column = self.require_column(name)?;
        let text = column.as_materialized_series().cast(&DataType::String)?;
        Ok(text
            .str()?
            .into_iter()
            .map(|cell| cell.map(str::to_owned))
            .collect())
    }

    /// Cells of a numeric column as `f64`, `None` for nulls.
    pub fn numbers(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let column = self.require_column(name)?;
        let values = column.as_materialized_series().cast(&DataType::Float64)?;
        Ok(values.f64()?.into_iter().collect())
    }

    /// Insert or replace a `Float64` column.
    pub fn set_numbers(&mut self, name: &str, values: Vec<Option<f64>>) -> Result<()> {
        self.frame.with_column(Series::new(name.into(), values))?;
        Ok(())
    }

    /// Symbols in row order.
    pub fn symbols(&self) -> Result<Vec<String>> {
        Ok(self
            .text_cells(columns::SYMBOL)?
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect())
    }

    /// Aggregate figures for a cleaned table.
    pub fn summary(&self) -> Result<TableSummary> {
        self.require_stage(TableStage::Cleaned)?;
        let caps = self.numbers(columns::MARKET_CAPITALIZATION)?;
        let yields = self.numbers(columns::DIVIDEND_YIELD)?;

        let total_market_cap: f64 = caps.iter().flatten().sum();
        let cap_weighted_yield: f64 = caps
            .iter()
            .zip(&yields)
            .map(|(cap, y)| cap.unwrap_or(0.0) * y.unwrap_or(0.0))
            .sum();

        Ok(TableSummary {
            rows: self.height(),
            total_market_cap,
            weighted_average_yield: (total_market_cap > 0.0)
                .then(|| cap_weighted_yield / total_market_cap),
        })
    }
}

/// Aggregate figures describing a cleaned table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    /// Number of securities.
    pub rows: usize,
    /// Sum of market capitalization across all rows.
    pub total_market_cap: f64,
    /// Market-cap weighted dividend yield of the whole table, as a fraction.
    /// `None` when the total market cap is zero.
    pub weighted_average_yield: Option<f64>,
}
