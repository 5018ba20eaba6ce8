//! Demonstration of the export functionality in yieldsift-output.

use polars::prelude::*;
use yieldsift_data::{ScreenerTable, TableStage, columns};
use yieldsift_output::{ExportFormat, Exporter, FullReport, GuideReport, guide_to_ascii_table};
use yieldsift_portfolio::GuideBuilder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== yieldsift Export Demo ===\n");

    let frame = df!(
        columns::SYMBOL => ["BRK.B", "AMZN", "MSFT", "XOM"],
        columns::COMPANY_NAME => ["Berkshire Hathaway Inc", "Amazon.com, Inc", "Microsoft Corp", "Exxon Mobil Corp"],
        columns::MARKET_CAPITALIZATION => [880e9, 1.85e12, 3.1e12, 415.3e9],
        columns::DIVIDEND_YIELD => [0.0, 0.0, 0.0072, 0.0362],
        columns::SECURITY_PRICE => [Some(408.1), Some(178.25), None, Some(104.5)]
    )?;
    let mut table = ScreenerTable::with_stage(frame, "demo", TableStage::Cleaned);
    yieldsift_portfolio::apply_market_cap_weights(&mut table)?;

    // 1. Full report
    println!("1. Full Report (CSV)\n");
    println!("{}", FullReport::new(&table).export_to_string(ExportFormat::Csv)?);

    // 2. Guide below 0.5%
    let guide = GuideBuilder::new(0.005)?.build(&table)?;
    println!("2. Guide Report (CSV)\n");
    println!("{}", GuideReport::new(&guide, "demo").export_to_string(ExportFormat::Csv)?);

    println!("3. Guide Report (Pretty JSON)\n");
    println!(
        "{}\n",
        GuideReport::new(&guide, "demo").export_to_string(ExportFormat::PrettyJson)?
    );

    print!("{}", guide_to_ascii_table(&guide)?);
    Ok(())
}
