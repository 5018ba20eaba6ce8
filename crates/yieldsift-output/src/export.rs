//! Export functionality for screener reports.
//!
//! This module renders the full weighted table and the low yield guide as
//! CSV (with display formatting) or JSON (raw fractions and currency units).

use crate::format::{ColumnFormat, format_percent};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use yieldsift_data::ScreenerTable;
use yieldsift_portfolio::{Guide, GuideHolding, PortfolioError};

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The destination is locked or write-protected, typically because
    /// another program has it open.
    #[error("{} is in use or write-protected; close it and retry", path.display())]
    ResourceBusy {
        /// Destination that could not be written
        path: PathBuf,
    },

    /// IO error at a specific path.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rendered output was not valid UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    /// The guide could not be read back as holdings.
    #[error(transparent)]
    Guide(#[from] PortfolioError),
}

impl ExportError {
    /// Classify an IO failure at `path`, separating "file is busy" from other
    /// IO errors.
    pub fn from_io(path: &Path, source: std::io::Error) -> Self {
        use std::io::ErrorKind;

        // 32 and 33 are the Windows sharing and lock violations
        let busy = matches!(
            source.kind(),
            ErrorKind::PermissionDenied | ErrorKind::ResourceBusy
        ) || matches!(source.raw_os_error(), Some(32 | 33)) && cfg!(windows);

        if busy {
            Self::ResourceBusy {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// Comma-separated values with formatted columns.
    #[default]
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty" => Ok(Self::PrettyJson),
            other => Err(format!(
                "unknown format '{other}' (expected csv, json or pretty-json)"
            )),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format. The file is replaced
    /// atomically, so readers never observe a partial write.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        crate::writer::write_atomic(path, content.as_bytes())
    }
}

/// The full cleaned and weighted table.
#[derive(Debug, Clone, Copy)]
pub struct FullReport<'a> {
    table: &'a ScreenerTable,
}

impl<'a> FullReport<'a> {
    /// Create a full report over a table.
    pub const fn new(table: &'a ScreenerTable) -> Self {
        Self { table }
    }
}

impl Exporter for FullReport<'_> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        let frame = self.table.frame();
        match format {
            ExportFormat::Csv => frame_to_csv(frame),
            ExportFormat::Json => Ok(serde_json::to_string(&frame_to_json(frame)?)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(&frame_to_json(frame)?)?),
        }
    }
}

/// The low yield guide with its summary figures.
#[derive(Debug, Clone, Copy)]
pub struct GuideReport<'a> {
    guide: &'a Guide,
    source: &'a str,
    generated_at: DateTime<Utc>,
}

impl<'a> GuideReport<'a> {
    /// Create a guide report stamped with the current time.
    pub fn new(guide: &'a Guide, source: &'a str) -> Self {
        Self::at(guide, source, Utc::now())
    }

    /// Create a guide report with an explicit generation time.
    pub const fn at(guide: &'a Guide, source: &'a str, generated_at: DateTime<Utc>) -> Self {
        Self {
            guide,
            source,
            generated_at,
        }
    }

    fn header(&self) -> String {
        let average = self
            .guide
            .average_dividend_yield()
            .map_or_else(|| "n/a".to_string(), format_percent);

        let mut output = String::new();
        output.push_str("# Low Dividend Yield Guide\n");
        output.push_str(&format!("# Generated: {}\n", self.generated_at.to_rfc3339()));
        output.push_str(&format!("# Source: {}\n", self.source));
        output.push_str(&format!(
            "# Yield Threshold: {}\n",
            format_percent(self.guide.yield_threshold())
        ));
        output.push_str(&format!("# Holdings: {}\n", self.guide.len()));
        output.push_str(&format!("# Average Dividend Yield: {}\n", average));
        output
    }

    fn to_export(&self) -> Result<GuideExport, ExportError> {
        Ok(GuideExport {
            generated_at: self.generated_at,
            source: self.source.to_string(),
            yield_threshold: self.guide.yield_threshold(),
            average_dividend_yield: self.guide.average_dividend_yield(),
            total_holding: self.guide.total_holding()?,
            holdings: self.guide.holdings()?,
        })
    }
}

impl Exporter for GuideReport<'_> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut output = self.header();
                output.push_str(&frame_to_csv(self.guide.frame())?);
                Ok(output)
            }
            ExportFormat::Json => Ok(serde_json::to_string(&self.to_export()?)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(&self.to_export()?)?),
        }
    }
}

/// JSON shape of the guide report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuideExport {
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,

    /// Data set the guide was derived from.
    pub source: String,

    /// Yield threshold as a fraction.
    pub yield_threshold: f64,

    /// Holding-weighted dividend yield as a fraction, absent for an empty guide.
    pub average_dividend_yield: Option<f64>,

    /// Sum of optimal holdings (should be close to 1.0).
    pub total_holding: f64,

    /// Holdings in ascending yield order.
    pub holdings: Vec<GuideHolding>,
}

/// Render a frame as CSV, formatting designated columns.
fn frame_to_csv(frame: &DataFrame) -> Result<String, ExportError> {
    let columns = frame.get_columns();
    let formats: Vec<ColumnFormat> = columns
        .iter()
        .map(|c| ColumnFormat::for_column(c.name().as_str()))
        .collect();

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(columns.iter().map(|c| c.name().as_str()))?;

    for row in 0..frame.height() {
        let mut record = Vec::with_capacity(columns.len());
        for (column, format) in columns.iter().zip(&formats) {
            let value = column.as_materialized_series().get(row)?;
            record.push(format.render_cell(&value));
        }
        wtr.write_record(&record)?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Render a frame as an array of row objects keyed by column name.
fn frame_to_json(frame: &DataFrame) -> Result<serde_json::Value, ExportError> {
    let columns = frame.get_columns();
    let mut rows = Vec::with_capacity(frame.height());

    for row in 0..frame.height() {
        let mut object = serde_json::Map::with_capacity(columns.len());
        for column in columns {
            let value = column.as_materialized_series().get(row)?;
            object.insert(column.name().to_string(), any_value_to_json(&value));
        }
        rows.push(serde_json::Value::Object(object));
    }

    Ok(serde_json::Value::Array(rows))
}

fn any_value_to_json(value: &AnyValue<'_>) -> serde_json::Value {
    match value {
        AnyValue::Null => serde_json::Value::Null,
        AnyValue::Boolean(b) => serde_json::Value::Bool(*b),
        AnyValue::String(text) => serde_json::Value::String((*text).to_string()),
        AnyValue::StringOwned(text) => serde_json::Value::String(text.to_string()),
        other => other
            .extract::<f64>()
            .map_or_else(|| serde_json::Value::String(other.to_string()), serde_json::Value::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use yieldsift_data::{TableStage, columns};
    use yieldsift_portfolio::GuideBuilder;

    fn weighted_table() -> ScreenerTable {
        let frame = df!(
            columns::SYMBOL => ["AAA", "BBB", "CCC"],
            columns::COMPANY_NAME => ["Alpha, Inc", "Beta Corp", "Gamma Co"],
            columns::MARKET_CAPITALIZATION => [10e9, 30e9, 60e9],
            columns::DIVIDEND_YIELD => [0.0, 0.01, 0.02],
            columns::SECURITY_PRICE => [Some(12.5), None, Some(1234.0)],
            columns::WEIGHTED_MARKET_CAPITALIZATION => [0.1, 0.3, 0.6]
        )
        .unwrap();
        ScreenerTable::with_stage(frame, "screener.csv", TableStage::Weighted)
    }

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_full_report_csv() {
        let table = weighted_table();
        let csv = FullReport::new(&table).export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "Symbol,Company Name,Market Capitalization,Dividend Yield,Security Price,Weighted Market Capitalization"
        );
        assert_eq!(
            lines[1],
            "AAA,\"Alpha, Inc\",\"$10,000,000,000\",0.00%,$12.50,10.00%"
        );
        assert_eq!(lines[2], "BBB,Beta Corp,\"$30,000,000,000\",1.00%,,30.00%");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_full_report_json_keeps_raw_numbers() {
        let table = weighted_table();
        let json = FullReport::new(&table).export_to_string(ExportFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        let rows = parsed.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["Symbol"], "AAA");
        assert_eq!(rows[1]["Dividend Yield"], 0.01);
        assert_eq!(rows[1]["Security Price"], serde_json::Value::Null);
        assert_eq!(rows[2]["Market Capitalization"], 60e9);
    }

    #[test]
    fn test_guide_report_csv() {
        let table = weighted_table();
        let guide = GuideBuilder::new(0.015).unwrap().build(&table).unwrap();
        let csv = GuideReport::at(&guide, "screener.csv", stamp())
            .export_to_string(ExportFormat::Csv)
            .unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "# Low Dividend Yield Guide");
        assert_eq!(lines[1], "# Generated: 2024-01-02T03:04:05+00:00");
        assert_eq!(lines[2], "# Source: screener.csv");
        assert_eq!(lines[3], "# Yield Threshold: 1.50%");
        assert_eq!(lines[4], "# Holdings: 2");
        assert_eq!(lines[5], "# Average Dividend Yield: 0.75%");
        assert_eq!(
            lines[6],
            "Symbol,Company Name,Optimal Holding %,Dividend Yield,Weighted Market Capitalization,Market Capitalization,Security Price"
        );
        assert_eq!(
            lines[7],
            "AAA,\"Alpha, Inc\",25.00%,0.00%,10.00%,\"$10,000,000,000\",$12.50"
        );
        assert_eq!(lines[8], "BBB,Beta Corp,75.00%,1.00%,30.00%,\"$30,000,000,000\",");
        assert_eq!(lines.len(), 9);
    }

    fn yielding_table() -> ScreenerTable {
        let frame = df!(
            columns::SYMBOL => ["BBB", "CCC"],
            columns::COMPANY_NAME => ["Beta Corp", "Gamma Co"],
            columns::MARKET_CAPITALIZATION => [30e9, 60e9],
            columns::DIVIDEND_YIELD => [0.01, 0.02],
            columns::WEIGHTED_MARKET_CAPITALIZATION => [1.0 / 3.0, 2.0 / 3.0]
        )
        .unwrap();
        ScreenerTable::with_stage(frame, "screener.csv", TableStage::Weighted)
    }

    #[test]
    fn test_empty_guide_report() {
        let table = yielding_table();
        let guide = GuideBuilder::new(0.005).unwrap().build(&table).unwrap();
        assert!(guide.is_empty());

        let csv = GuideReport::at(&guide, "screener.csv", stamp())
            .export_to_string(ExportFormat::Csv)
            .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[3], "# Yield Threshold: 0.50%");
        assert_eq!(lines[4], "# Holdings: 0");
        assert_eq!(lines[5], "# Average Dividend Yield: n/a");
        // header row only
        assert!(lines[6].starts_with("Symbol,Company Name,Optimal Holding %"));
        assert_eq!(lines.len(), 7);

        let json = GuideReport::at(&guide, "screener.csv", stamp())
            .export_to_string(ExportFormat::Json)
            .unwrap();
        let raw: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(raw["average_dividend_yield"], serde_json::Value::Null);
        let parsed: GuideExport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.average_dividend_yield, None);
        assert!(parsed.holdings.is_empty());
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("screener_full.json");
        std::fs::write(&path, "stale").unwrap();

        let table = weighted_table();
        FullReport::new(&table)
            .export_to_file(&path, ExportFormat::Json)
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            FullReport::new(&table).export_to_string(ExportFormat::Json).unwrap()
        );
        let rows: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(rows.as_array().unwrap().len(), 3);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_guide_report_pretty_json() {
        let table = weighted_table();
        let guide = GuideBuilder::default().build(&table).unwrap();
        let json = GuideReport::at(&guide, "screener.csv", stamp())
            .export_to_string(ExportFormat::PrettyJson)
            .unwrap();
        assert!(json.contains("  ")); // Indentation indicates pretty format

        let parsed: GuideExport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.holdings.len(), 3);
        assert_eq!(parsed.generated_at, stamp());
        assert!((parsed.total_holding - 1.0).abs() < 1e-9);
        assert_eq!(parsed.holdings[2].symbol, "CCC");
        assert_eq!(parsed.holdings[1].security_price, None);
    }

    #[test]
    fn test_export_format_extension() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::Json.extension(), "json");
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }

    #[test]
    fn test_export_format_from_str() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("pretty-json".parse::<ExportFormat>().unwrap(), ExportFormat::PrettyJson);
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_busy_classification() {
        use std::io::{Error, ErrorKind};

        let path = Path::new("guide.csv");
        assert!(matches!(
            ExportError::from_io(path, Error::from(ErrorKind::PermissionDenied)),
            ExportError::ResourceBusy { .. }
        ));
        assert!(matches!(
            ExportError::from_io(path, Error::from(ErrorKind::NotFound)),
            ExportError::Io { .. }
        ));

        let busy = ExportError::from_io(path, Error::from(ErrorKind::PermissionDenied));
        assert_eq!(
            busy.to_string(),
            "guide.csv is in use or write-protected; close it and retry"
        );
    }
}
