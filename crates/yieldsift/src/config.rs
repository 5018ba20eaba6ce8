//! Pipeline configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use yieldsift_data::{LoaderConfig, TableLoader};
use yieldsift_output::{
    DEFAULT_FULL_REPORT_NAME, DEFAULT_GUIDE_REPORT_NAME, ExportFormat, ReportWriter,
};
use yieldsift_portfolio::{DEFAULT_YIELD_THRESHOLD, GuideBuilder};

/// Everything a pipeline run needs, passed explicitly to [`crate::Pipeline`].
///
/// Deserializes from JSON; every field is optional and falls back to its
/// default.
///
/// ```json
/// {
///   "input_path": "screener.csv",
///   "output_directory": "reports",
///   "yield_threshold": 0.005,
///   "format": "pretty-json",
///   "loader": { "delimiter": ";" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Screener export to read.
    pub input_path: PathBuf,

    /// Directory the reports are written to (default: `.`)
    pub output_directory: PathBuf,

    /// Guide membership requires a dividend yield strictly below this
    /// fraction (default: `1.0`, so every security qualifies)
    pub yield_threshold: f64,

    /// Report format (default: CSV)
    pub format: ExportFormat,

    /// File stem of the full report (default: `screener_full`)
    pub full_report_name: String,

    /// File stem of the guide report (default: `screener_guide`)
    pub guide_report_name: String,

    /// Input parsing options.
    pub loader: LoaderConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::new(),
            output_directory: PathBuf::from("."),
            yield_threshold: DEFAULT_YIELD_THRESHOLD,
            format: ExportFormat::default(),
            full_report_name: DEFAULT_FULL_REPORT_NAME.to_string(),
            guide_report_name: DEFAULT_GUIDE_REPORT_NAME.to_string(),
            loader: LoaderConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Default configuration reading `input_path`.
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            ..Self::default()
        }
    }

    /// Read a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigFile`] when the file cannot be read and
    /// [`Error::ConfigFormat`] when it is not a valid configuration.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| Error::ConfigFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check the configuration before any file is touched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a missing input path or unusable report
    /// names, and [`Error::Portfolio`] for an invalid threshold.
    pub fn validate(&self) -> Result<()> {
        if self.input_path.as_os_str().is_empty() {
            return Err(Error::Config("no input file given".to_string()));
        }
        GuideBuilder::new(self.yield_threshold)?;

        for name in [&self.full_report_name, &self.guide_report_name] {
            if name.is_empty() || name.contains(['/', '\\']) {
                return Err(Error::Config(format!(
                    "report name '{name}' must be a non-empty file stem"
                )));
            }
        }
        if self.full_report_name == self.guide_report_name {
            return Err(Error::Config(format!(
                "full and guide reports would both be written to '{}'",
                self.full_report_name
            )));
        }
        Ok(())
    }

    /// Loader for the input file.
    pub fn table_loader(&self) -> TableLoader {
        TableLoader::new(self.loader.clone())
    }

    /// Writer for both reports.
    pub fn report_writer(&self) -> ReportWriter {
        ReportWriter::new(&self.output_directory)
            .with_format(self.format)
            .with_report_names(&self.full_report_name, &self.guide_report_name)
    }
}
