//! Modelos de resultados, resúmenes por directorio y reportes por severidad.

pub mod builder;
pub mod export;
pub mod model;

pub use builder::{Report, ReportedConcern, build_report};
pub use export::{ExportFormat, export_report, report_to_json};
pub use model::{
    Analysis, Concern, ConcernKind, DirectoryStripSummary, DirectorySummary, FormatMetadata,
    ScanCounters, ScanResult, Severity, StripCounters, StripResult,
};
