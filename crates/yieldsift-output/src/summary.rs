//! Plain-text summaries for terminal output.

use crate::export::ExportError;
use crate::format::{format_currency, format_percent};
use yieldsift_data::TableSummary;
use yieldsift_portfolio::Guide;

const WIDTH: usize = 80;
const NAME_WIDTH: usize = 28;

/// Render the guide's holdings as a fixed-width table.
///
/// # Errors
///
/// Returns an error if the guide's columns cannot be read back.
pub fn guide_to_ascii_table(guide: &Guide) -> Result<String, ExportError> {
    let mut output = String::new();

    output.push_str(&format!(
        "\nLow Dividend Yield Guide (yield < {})\n",
        format_percent(guide.yield_threshold())
    ));
    output.push_str(&"=".repeat(WIDTH));
    output.push('\n');

    output.push_str(&format!(
        "{:<8} {:<28} {:>10} {:>10} {:>20}\n",
        "Symbol", "Company", "Holding", "Yield", "Market Cap"
    ));
    output.push_str(&"-".repeat(WIDTH));
    output.push('\n');

    for holding in guide.holdings()? {
        let name = holding.company_name.as_deref().unwrap_or("");
        output.push_str(&format!(
            "{:<8} {:<28} {:>10} {:>10} {:>20}\n",
            holding.symbol,
            truncate(name, NAME_WIDTH),
            format_percent(holding.optimal_holding),
            format_percent(holding.dividend_yield),
            format_currency(holding.market_cap, 0)
        ));
    }

    output.push_str(&"-".repeat(WIDTH));
    output.push('\n');
    output.push_str(&format!("{:<37} {:>10}\n", "Holdings", guide.len()));
    output.push_str(&format!(
        "{:<37} {:>10}\n",
        "Average Dividend Yield",
        guide
            .average_dividend_yield()
            .map_or_else(|| "n/a".to_string(), format_percent)
    ));
    output.push_str(&"=".repeat(WIDTH));
    output.push('\n');

    Ok(output)
}

/// Render aggregate figures for a cleaned table.
pub fn table_summary_to_ascii(summary: &TableSummary, source: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("\nScreener Summary: {}\n", source));
    output.push_str(&"=".repeat(WIDTH));
    output.push('\n');
    output.push_str(&format!("{:<30} {:>20}\n", "Securities", summary.rows));
    output.push_str(&format!(
        "{:<30} {:>20}\n",
        "Total Market Cap",
        format_currency(summary.total_market_cap, 0)
    ));
    output.push_str(&format!(
        "{:<30} {:>20}\n",
        "Cap-Weighted Dividend Yield",
        summary
            .weighted_average_yield
            .map_or_else(|| "n/a".to_string(), format_percent)
    ));
    output.push_str(&"=".repeat(WIDTH));
    output.push('\n');

    output
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(width - 3).collect();
        short.push_str("...");
        short
    }
}
