//! Low Dividend Yield Guide
//!
//! Selects the securities whose dividend yield is strictly below a threshold
//! and re-proportions their market-cap weights so the subset sums to one:
//!
//! h_i = w_i / Σ_{j in subset} w_j
//!
//! The guide's blended yield is Σ h_i * y_i over the subset. Holdings keep
//! the ascending-yield order of the weighted table.

use crate::error::{PortfolioError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use yieldsift_data::{ScreenerTable, TableStage, columns};

/// Columns of the guide, in report order. Optional columns that the source
/// table lacks are left out.
pub const GUIDE_COLUMNS: &[&str] = &[
    columns::SYMBOL,
    columns::COMPANY_NAME,
    columns::OPTIMAL_HOLDING_PERCENT,
    columns::DIVIDEND_YIELD,
    columns::PRICE_PERFORMANCE_52W,
    columns::WEIGHTED_MARKET_CAPITALIZATION,
    columns::MARKET_CAPITALIZATION,
    columns::SECURITY_PRICE,
];

/// Threshold used when none is configured: every yield is below 100%, so the
/// guide spans the whole table.
pub const DEFAULT_YIELD_THRESHOLD: f64 = 1.0;

/// One row of the guide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideHolding {
    /// Security symbol.
    pub symbol: String,

    /// Company name, when the export carries one.
    pub company_name: Option<String>,

    /// Share of the guide subset (0.0 to 1.0).
    pub optimal_holding: f64,

    /// Dividend yield as a fraction.
    pub dividend_yield: f64,

    /// 52 week price performance as a fraction.
    pub price_performance_52w: Option<f64>,

    /// Share of the full table's market cap.
    pub weighted_market_cap: f64,

    /// Market capitalization in currency units.
    pub market_cap: f64,

    /// Last security price.
    pub security_price: Option<f64>,
}

/// The filtered, renormalized low-yield subset of a weighted table.
#[derive(Debug, Clone)]
pub struct Guide {
    frame: DataFrame,
    origin: String,
    yield_threshold: f64,
    average_dividend_yield: Option<f64>,
}

impl Guide {
    /// The projected guide frame.
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Threshold the guide was built with, as a fraction.
    pub const fn yield_threshold(&self) -> f64 {
        self.yield_threshold
    }

    /// Holding-weighted dividend yield of the subset, as a fraction.
    /// `None` when no security qualified.
    pub const fn average_dividend_yield(&self) -> Option<f64> {
        self.average_dividend_yield
    }

    /// Number of holdings.
    pub fn len(&self) -> usize {
        self.frame.height()
    }

    /// Whether no security qualified.
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Sum of optimal holdings (1.0 for a non-empty guide, 0.0 otherwise).
    pub fn total_holding(&self) -> Result<f64> {
        Ok(self.view().numbers(columns::OPTIMAL_HOLDING_PERCENT)?.into_iter().flatten().sum())
    }

    /// Typed rows of the guide in report order.
    pub fn holdings(&self) -> Result<Vec<GuideHolding>> {
        let view = self.view();
        let height = view.height();

        let optional_numbers = |name: &str| -> Result<Vec<Option<f64>>> {
            if view.has_column(name) {
                Ok(view.numbers(name)?)
            } else {
                Ok(vec![None; height])
            }
        };

        let symbols = view.text_cells(columns::SYMBOL)?;
        let names = if view.has_column(columns::COMPANY_NAME) {
            view.text_cells(columns::COMPANY_NAME)?
        } else {
            vec![None; height]
        };
        let optimal = view.numbers(columns::OPTIMAL_HOLDING_PERCENT)?;
        let yields = view.numbers(columns::DIVIDEND_YIELD)?;
        let performance = optional_numbers(columns::PRICE_PERFORMANCE_52W)?;
        let weights = view.numbers(columns::WEIGHTED_MARKET_CAPITALIZATION)?;
        let caps = view.numbers(columns::MARKET_CAPITALIZATION)?;
        let prices = optional_numbers(columns::SECURITY_PRICE)?;

        Ok((0..height)
            .map(|i| GuideHolding {
                symbol: symbols[i].clone().unwrap_or_default(),
                company_name: names[i].clone(),
                optimal_holding: optimal[i].unwrap_or(0.0),
                dividend_yield: yields[i].unwrap_or(0.0),
                price_performance_52w: performance[i],
                weighted_market_cap: weights[i].unwrap_or(0.0),
                market_cap: caps[i].unwrap_or(0.0),
                security_price: prices[i],
            })
            .collect())
    }

    fn view(&self) -> ScreenerTable {
        ScreenerTable::with_stage(self.frame.clone(), self.origin.clone(), TableStage::Weighted)
    }
}

/// Builds a [`Guide`] from a weighted table.
#[derive(Debug, Clone, Copy)]
pub struct GuideBuilder {
    yield_threshold: f64,
}

impl GuideBuilder {
    /// Create a builder selecting yields strictly below `yield_threshold`
    /// (a fraction, so `0.005` means "under 0.5%").
    ///
    /// # Errors
    ///
    /// Returns [`PortfolioError::InvalidThreshold`] unless the threshold is
    /// finite and positive.
    pub fn new(yield_threshold: f64) -> Result<Self> {
        if !yield_threshold.is_finite() || yield_threshold <= 0.0 {
            return Err(PortfolioError::InvalidThreshold(yield_threshold));
        }
        Ok(Self { yield_threshold })
    }

    /// Get the yield threshold.
    pub const fn yield_threshold(&self) -> f64 {
        self.yield_threshold
    }

    /// Build the guide.
    ///
    /// An empty selection is not an error: the guide has no holdings and no
    /// average yield.
    ///
    /// # Errors
    ///
    /// Returns [`PortfolioError::Division`] when the selected rows carry zero
    /// total weight, and [`PortfolioError::Data`] when the table has not been
    /// weighted.
    pub fn build(&self, table: &ScreenerTable) -> Result<Guide> {
        table.require_stage(TableStage::Weighted)?;
        for column in [
            columns::SYMBOL,
            columns::MARKET_CAPITALIZATION,
            columns::DIVIDEND_YIELD,
            columns::WEIGHTED_MARKET_CAPITALIZATION,
        ] {
            table.require_column(column)?;
        }

        let mut selected = ScreenerTable::with_stage(
            self.select(table)?,
            table.origin(),
            TableStage::Weighted,
        );
        let weights: Vec<f64> = selected
            .numbers(columns::WEIGHTED_MARKET_CAPITALIZATION)?
            .into_iter()
            .map(|w| w.unwrap_or(0.0))
            .collect();

        let (optimal, average_dividend_yield) = if weights.is_empty() {
            warn!(
                yield_threshold = self.yield_threshold,
                "no security has a dividend yield below the threshold"
            );
            (Vec::new(), None)
        } else {
            let optimal = optimal_holdings(&weights)?;
            let yields: Vec<f64> = selected
                .numbers(columns::DIVIDEND_YIELD)?
                .into_iter()
                .map(|y| y.unwrap_or(0.0))
                .collect();
            let average = blended_yield(&optimal, &yields);
            (optimal, Some(average))
        };

        selected.set_numbers(
            columns::OPTIMAL_HOLDING_PERCENT,
            optimal.into_iter().map(Some).collect(),
        )?;
        let frame = project(selected)?;

        info!(
            holdings = frame.height(),
            of = table.height(),
            yield_threshold = self.yield_threshold,
            average_dividend_yield = ?average_dividend_yield,
            "built low yield guide"
        );

        Ok(Guide {
            frame,
            origin: table.origin().to_string(),
            yield_threshold: self.yield_threshold,
            average_dividend_yield,
        })
    }

    /// Rows with a dividend yield strictly below the threshold.
    fn select(&self, table: &ScreenerTable) -> Result<DataFrame> {
        Ok(table
            .frame()
            .clone()
            .lazy()
            .filter(col(columns::DIVIDEND_YIELD).lt(lit(self.yield_threshold)))
            .collect()?)
    }
}

impl Default for GuideBuilder {
    fn default() -> Self {
        Self {
            yield_threshold: DEFAULT_YIELD_THRESHOLD,
        }
    }
}

/// Renormalize subset weights so they sum to one.
///
/// # Errors
///
/// Returns [`PortfolioError::Division`] when the weights sum to zero.
pub fn optimal_holdings(weights: &[f64]) -> Result<Vec<f64>> {
    let subset_total: f64 = weights.iter().sum();
    if subset_total <= 0.0 || !subset_total.is_finite() {
        return Err(PortfolioError::Division {
            context: format!(
                "selected securities carry a total weight of {subset_total}"
            ),
        });
    }
    Ok(weights.iter().map(|w| w / subset_total).collect())
}

/// Holding-weighted average of `yields`.
pub fn blended_yield(holdings: &[f64], yields: &[f64]) -> f64 {
    holdings.iter().zip(yields).map(|(h, y)| h * y).sum()
}

fn project(table: ScreenerTable) -> Result<DataFrame> {
    let selection: Vec<Expr> = GUIDE_COLUMNS
        .iter()
        .filter(|name| table.has_column(name))
        .map(|name| col(*name))
        .collect();
    Ok(table.into_frame().lazy().select(selection).collect()?)
}
