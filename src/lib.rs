//! metascrub: auditoría y eliminación de metadata sensible en imágenes, PDFs
//! y videos antes de publicarlos.
//!
//! El punto de entrada es [`MetadataEngine`], que recibe la configuración y
//! las capacidades externas una sola vez y expone análisis, limpieza,
//! recorrido de directorios y simulación.

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod hook;
pub mod report;
pub mod stripper;
pub mod tools;
pub mod walker;

#[cfg(test)]
mod test_support;

pub use config::EngineConfig;
pub use engine::MetadataEngine;
pub use error::{Error, Result};
pub use format::{FileCategory, FormatClassifier};
pub use hook::{HookOutcome, run_hook};
pub use report::{
    Concern, ConcernKind, DirectoryStripSummary, DirectorySummary, Report, ScanResult, Severity,
    StripResult, build_report,
};
pub use walker::{PlannedFile, StripPlan};
