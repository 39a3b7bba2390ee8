//! Agrupa los hallazgos de un recorrido por severidad.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::model::{Concern, DirectorySummary, ScanCounters, ScanResult, Severity};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedConcern {
    pub file_path: PathBuf,
    #[serde(flatten)]
    pub concern: Concern,
}

/// Vista de solo lectura sobre un `DirectorySummary`; se recalcula cuando se necesita.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub summary: ScanCounters,
    pub high_concerns: Vec<ReportedConcern>,
    pub medium_concerns: Vec<ReportedConcern>,
    pub low_concerns: Vec<ReportedConcern>,
    pub files_with_metadata: Vec<ScanResult>,
}

impl Report {
    pub fn bucket(&self, severity: Severity) -> &[ReportedConcern] {
        match severity {
            Severity::High => &self.high_concerns,
            Severity::Medium => &self.medium_concerns,
            Severity::Low => &self.low_concerns,
        }
    }

    pub fn total_concerns(&self) -> usize {
        self.high_concerns.len() + self.medium_concerns.len() + self.low_concerns.len()
    }

    pub fn is_clean(&self) -> bool {
        self.files_with_metadata.is_empty()
    }
}

pub fn build_report(summary: &DirectorySummary) -> Report {
    let mut report = Report {
        summary: summary.counters,
        high_concerns: Vec::new(),
        medium_concerns: Vec::new(),
        low_concerns: Vec::new(),
        files_with_metadata: Vec::new(),
    };

    for result in summary.files_with_metadata() {
        for concern in &result.concerns {
            let reported = ReportedConcern {
                file_path: result.file_path.clone(),
                concern: concern.clone(),
            };
            match concern.severity {
                Severity::High => report.high_concerns.push(reported),
                Severity::Medium => report.medium_concerns.push(reported),
                Severity::Low => report.low_concerns.push(reported),
            }
        }
        report.files_with_metadata.push(result.clone());
    }

    report
}
