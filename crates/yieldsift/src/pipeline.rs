//! The end-to-end workflow: load, clean, weight, build the guide, write.

use crate::config::PipelineConfig;
use crate::error::Result;
use tracing::info;
use yieldsift_data::{ScreenerTable, TableSummary, clean_table};
use yieldsift_output::WrittenReports;
use yieldsift_portfolio::{Guide, GuideBuilder, apply_market_cap_weights};

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Figures for the whole cleaned table.
    pub summary: TableSummary,
    /// The low yield guide.
    pub guide: Guide,
    /// Where the reports were written.
    pub reports: WrittenReports,
}

/// A validated pipeline, ready to run.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Validate `config` and create a pipeline.
    ///
    /// # Errors
    ///
    /// Returns the error of [`PipelineConfig::validate`].
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load and clean the input file.
    ///
    /// # Errors
    ///
    /// Fails on unreadable input, missing required columns, or unparsable
    /// cells.
    pub fn load(&self) -> Result<ScreenerTable> {
        let mut table = self.config.table_loader().load(&self.config.input_path)?;
        clean_table(&mut table)?;
        Ok(table)
    }

    /// Summarize the input without writing anything.
    ///
    /// # Errors
    ///
    /// See [`Pipeline::load`].
    pub fn inspect(&self) -> Result<TableSummary> {
        Ok(self.load()?.summary()?)
    }

    /// Run every stage and write both reports.
    ///
    /// Nothing is written unless every earlier stage succeeded, and the two
    /// reports are committed together.
    ///
    /// # Errors
    ///
    /// Returns the first stage failure; see [`crate::ErrorKind`] for the
    /// classification.
    pub fn run(&self) -> Result<PipelineOutcome> {
        let mut table = self.load()?;
        let summary = table.summary()?;

        apply_market_cap_weights(&mut table)?;
        let guide = GuideBuilder::new(self.config.yield_threshold)?.build(&table)?;
        let reports = self.config.report_writer().write(&table, &guide)?;

        info!(
            input = %self.config.input_path.display(),
            rows = summary.rows,
            holdings = guide.len(),
            "pipeline complete"
        );
        Ok(PipelineOutcome {
            summary,
            guide,
            reports,
        })
    }
}
