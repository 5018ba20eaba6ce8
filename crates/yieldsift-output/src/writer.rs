//! Transactional report writing.
//!
//! Both reports are rendered in memory and staged as temporary files in the
//! output directory before either destination is touched. Destinations are
//! probed for write access, then the staged files are moved into place. If
//! the second move fails, the first destination is restored, so a run leaves
//! either both new reports or the previous files.

use crate::export::{ExportError, ExportFormat, Exporter, FullReport, GuideReport};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use yieldsift_data::{ScreenerTable, TableStage};
use yieldsift_portfolio::{Guide, PortfolioError};

/// Default file stem of the full report.
pub const DEFAULT_FULL_REPORT_NAME: &str = "screener_full";

/// Default file stem of the guide report.
pub const DEFAULT_GUIDE_REPORT_NAME: &str = "screener_guide";

/// Paths of the reports a [`ReportWriter`] produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenReports {
    /// The full weighted table.
    pub full_report: PathBuf,
    /// The low yield guide.
    pub guide_report: PathBuf,
}

/// Writes the full report and the guide as one unit.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_directory: PathBuf,
    format: ExportFormat,
    full_report_name: String,
    guide_report_name: String,
}

impl ReportWriter {
    /// Create a writer targeting `output_directory` with CSV output and the
    /// default report names.
    pub fn new(output_directory: impl Into<PathBuf>) -> Self {
        Self {
            output_directory: output_directory.into(),
            format: ExportFormat::default(),
            full_report_name: DEFAULT_FULL_REPORT_NAME.to_string(),
            guide_report_name: DEFAULT_GUIDE_REPORT_NAME.to_string(),
        }
    }

    /// Set the output format.
    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the file stems of both reports; the extension follows the format.
    pub fn with_report_names(mut self, full: impl Into<String>, guide: impl Into<String>) -> Self {
        self.full_report_name = full.into();
        self.guide_report_name = guide.into();
        self
    }

    /// Output format.
    pub const fn format(&self) -> ExportFormat {
        self.format
    }

    /// Destination of the full report.
    pub fn full_report_path(&self) -> PathBuf {
        self.destination(&self.full_report_name)
    }

    /// Destination of the guide report.
    pub fn guide_report_path(&self) -> PathBuf {
        self.destination(&self.guide_report_name)
    }

    fn destination(&self, stem: &str) -> PathBuf {
        self.output_directory
            .join(format!("{stem}.{}", self.format.extension()))
    }

    /// Write both reports.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::ResourceBusy`] when a destination is open in
    /// another program or write-protected. Nothing is changed on disk in that
    /// case.
    pub fn write(&self, table: &ScreenerTable, guide: &Guide) -> Result<WrittenReports, ExportError> {
        table
            .require_stage(TableStage::Weighted)
            .map_err(PortfolioError::from)?;

        let full = FullReport::new(table).export_to_string(self.format)?;
        let guide = GuideReport::new(guide, table.origin()).export_to_string(self.format)?;

        fs::create_dir_all(&self.output_directory).map_err(|source| ExportError::Io {
            path: self.output_directory.clone(),
            source,
        })?;

        let reports = WrittenReports {
            full_report: self.full_report_path(),
            guide_report: self.guide_report_path(),
        };

        let staged = vec![
            stage(&reports.full_report, full.as_bytes())?,
            stage(&reports.guide_report, guide.as_bytes())?,
        ];
        for report in &staged {
            probe(&report.destination)?;
        }
        commit(staged)?;

        info!(
            full_report = %reports.full_report.display(),
            guide_report = %reports.guide_report.display(),
            format = self.format.extension(),
            "wrote reports"
        );
        Ok(reports)
    }
}

/// Atomically replace `path` with `content`.
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> Result<(), ExportError> {
    let staged = stage(path, content)?;
    probe(&staged.destination)?;
    commit(vec![staged])
}

/// Rendered content waiting in a temporary file next to its destination.
#[derive(Debug)]
struct StagedReport {
    destination: PathBuf,
    file: NamedTempFile,
}

fn parent_directory(path: &Path) -> &Path {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn stage(destination: &Path, content: &[u8]) -> Result<StagedReport, ExportError> {
    let directory = parent_directory(destination);
    let mut file = NamedTempFile::new_in(directory).map_err(|source| ExportError::Io {
        path: directory.to_path_buf(),
        source,
    })?;

    let written = file.write_all(content).and_then(|()| file.as_file().sync_all());
    if let Err(source) = written {
        return Err(ExportError::Io {
            path: file.path().to_path_buf(),
            source,
        });
    }

    debug!(destination = %destination.display(), bytes = content.len(), "staged report");
    Ok(StagedReport {
        destination: destination.to_path_buf(),
        file,
    })
}

/// Check that an existing destination can be opened for writing.
fn probe(destination: &Path) -> Result<(), ExportError> {
    match OpenOptions::new().write(true).open(destination) {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(ExportError::from_io(destination, err)),
    }
}

/// Move staged files into place, undoing earlier moves if a later one fails.
fn commit(staged: Vec<StagedReport>) -> Result<(), ExportError> {
    let mut committed: Vec<(PathBuf, Option<Vec<u8>>)> = Vec::with_capacity(staged.len());

    for report in staged {
        let previous = match fs::read(&report.destination) {
            Ok(bytes) => Some(bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                rollback(&committed);
                return Err(ExportError::from_io(&report.destination, err));
            }
        };

        match report.file.persist(&report.destination) {
            Ok(_) => committed.push((report.destination, previous)),
            Err(err) => {
                rollback(&committed);
                return Err(ExportError::from_io(&report.destination, err.error));
            }
        }
    }
    Ok(())
}

fn rollback(committed: &[(PathBuf, Option<Vec<u8>>)]) {
    for (path, previous) in committed.iter().rev() {
        let restored = match previous {
            Some(bytes) => fs::write(path, bytes),
            None => fs::remove_file(path),
        };
        match restored {
            Ok(()) => warn!(path = %path.display(), "rolled back report"),
            Err(err) => warn!(path = %path.display(), error = %err, "could not roll back report"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn staged_in(dir: &Path, destination: PathBuf, content: &str) -> StagedReport {
        let mut file = NamedTempFile::new_in(dir).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        StagedReport { destination, file }
    }

    #[test]
    fn test_commit_restores_previous_report() {
        let dir = TempDir::new().unwrap();
        let full = dir.path().join("screener_full.csv");
        fs::write(&full, "previous").unwrap();

        // the second move fails because its directory does not exist
        let unreachable = dir.path().join("missing").join("screener_guide.csv");
        let staged = vec![
            staged_in(dir.path(), full.clone(), "new full"),
            staged_in(dir.path(), unreachable.clone(), "new guide"),
        ];

        let err = commit(staged).unwrap_err();
        assert!(matches!(err, ExportError::Io { ref path, .. } if *path == unreachable));
        assert_eq!(fs::read_to_string(&full).unwrap(), "previous");
    }

    #[test]
    fn test_commit_removes_new_report() {
        let dir = TempDir::new().unwrap();
        let full = dir.path().join("screener_full.csv");
        let unreachable = dir.path().join("missing").join("screener_guide.csv");
        let staged = vec![
            staged_in(dir.path(), full.clone(), "new full"),
            staged_in(dir.path(), unreachable, "new guide"),
        ];

        assert!(commit(staged).is_err());
        assert!(!full.exists());
        // staged temporaries are cleaned up on drop
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_probe_missing_destination() {
        let dir = TempDir::new().unwrap();
        assert!(probe(&dir.path().join("absent.csv")).is_ok());
    }

    #[test]
    fn test_report_paths_follow_format() {
        let writer = ReportWriter::new("out")
            .with_format(ExportFormat::PrettyJson)
            .with_report_names("all", "low");
        assert_eq!(writer.full_report_path(), Path::new("out").join("all.json"));
        assert_eq!(writer.guide_report_path(), Path::new("out").join("low.json"));
        assert_eq!(
            ReportWriter::new(".").guide_report_path(),
            Path::new(".").join("screener_guide.csv")
        );
    }
}
