#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/yieldsift/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod format;
pub mod summary;
pub mod writer;

pub use export::{ExportError, ExportFormat, Exporter, FullReport, GuideExport, GuideReport};
pub use format::{ColumnFormat, format_currency, format_percent};
pub use summary::{guide_to_ascii_table, table_summary_to_ascii};
pub use writer::{
    DEFAULT_FULL_REPORT_NAME, DEFAULT_GUIDE_REPORT_NAME, ReportWriter, WrittenReports,
};
