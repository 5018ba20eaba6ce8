//! Loading screener exports from delimited text files.

use crate::columns;
use crate::error::{DataError, Result};
use crate::table::ScreenerTable;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Configuration for [`TableLoader`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Columns dropped after loading when present (default: `S&P 500 (R)`,
    /// `Security Type`)
    pub excluded_columns: Vec<String>,

    /// Field delimiter (default: `,`)
    pub delimiter: char,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            excluded_columns: columns::DEFAULT_EXCLUDED
                .iter()
                .map(|c| (*c).to_string())
                .collect(),
            delimiter: ',',
        }
    }
}

/// Reads a screener export into a [`ScreenerTable`].
///
/// Every cell is read as text; numeric conversion is left to the cleaning
/// stage so that failures can name the offending row.
#[derive(Debug, Clone, Default)]
pub struct TableLoader {
    config: LoaderConfig,
}

impl TableLoader {
    /// Create a loader with the given configuration.
    pub const fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Get the loader configuration.
    pub const fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load `path`, trim header whitespace and drop excluded columns.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Io`] when the file cannot be opened,
    /// [`DataError::Unreadable`] when it is not delimited tabular data, and
    /// [`DataError::InvalidDelimiter`] for a multi-byte delimiter.
    pub fn load(&self, path: &Path) -> Result<ScreenerTable> {
        let separator = u8::try_from(self.config.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or(DataError::InvalidDelimiter(self.config.delimiter))?;

        std::fs::metadata(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let dataset = path.display().to_string();
        let mut frame = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .with_parse_options(CsvParseOptions::default().with_separator(separator))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .and_then(|reader| reader.finish())
            .map_err(|source| DataError::Unreadable {
                dataset: dataset.clone(),
                source,
            })?;

        trim_headers(&mut frame)?;

        for column in &self.config.excluded_columns {
            if frame.get_column_index(column).is_some() {
                frame = frame.drop(column)?;
                debug!(column = %column, "dropped excluded column");
            }
        }

        info!(
            dataset = %dataset,
            rows = frame.height(),
            columns = frame.width(),
            "loaded screener export"
        );
        Ok(ScreenerTable::new(frame, dataset))
    }
}

fn trim_headers(frame: &mut DataFrame) -> Result<()> {
    let names: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|name| name.as_str().to_string())
        .collect();
    if names.iter().all(|name| name.trim() == name) {
        return Ok(());
    }
    frame.set_column_names(names.iter().map(|name| name.trim()))?;
    Ok(())
}
