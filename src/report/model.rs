//! Modelos compartidos para reportar metadata de manera consistente.

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use std::path::{Path, PathBuf};

use crate::format::FileCategory;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::High => "ALTA",
            Severity::Medium => "MEDIA",
            Severity::Low => "BAJA",
        }
    }
}

/// Etiqueta estable del tipo de hallazgo.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcernKind {
    GpsLocation,
    LocationInfo,
    CameraSerial,
    AuthorInfo,
    Copyright,
    SoftwareInfo,
    CameraInfo,
    LensInfo,
    Description,
    UserComment,
    HostComputer,
    Keywords,
    Title,
    Comment,
    Album,
    Genre,
    DateInfo,
    CapabilityMissing,
}

impl ConcernKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConcernKind::GpsLocation => "gps_location",
            ConcernKind::LocationInfo => "location_info",
            ConcernKind::CameraSerial => "camera_serial",
            ConcernKind::AuthorInfo => "author_info",
            ConcernKind::Copyright => "copyright",
            ConcernKind::SoftwareInfo => "software_info",
            ConcernKind::CameraInfo => "camera_info",
            ConcernKind::LensInfo => "lens_info",
            ConcernKind::Description => "description",
            ConcernKind::UserComment => "user_comment",
            ConcernKind::HostComputer => "host_computer",
            ConcernKind::Keywords => "keywords",
            ConcernKind::Title => "title",
            ConcernKind::Comment => "comment",
            ConcernKind::Album => "album",
            ConcernKind::Genre => "genre",
            ConcernKind::DateInfo => "date_info",
            ConcernKind::CapabilityMissing => "capability_missing",
        }
    }
}

/// Un dato embebido considerado sensible para la privacidad.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Concern {
    pub severity: Severity,
    pub kind: ConcernKind,
    pub field: String,
    pub value: String,
    pub description: String,
}

impl Concern {
    pub fn new(
        severity: Severity,
        kind: ConcernKind,
        field: impl Into<String>,
        value: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            kind,
            field: field.into(),
            value: value.into(),
            description: description.into(),
        }
    }

    pub fn high(
        kind: ConcernKind,
        field: impl Into<String>,
        value: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(Severity::High, kind, field, value, description)
    }

    pub fn medium(
        kind: ConcernKind,
        field: impl Into<String>,
        value: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(Severity::Medium, kind, field, value, description)
    }

    pub fn low(
        kind: ConcernKind,
        field: impl Into<String>,
        value: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(Severity::Low, kind, field, value, description)
    }
}

/// Datos propios de cada formato que acompañan al análisis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum FormatMetadata {
    Image {
        width: u32,
        height: u32,
        format: String,
        mime: Option<String>,
    },
    Pdf {
        pages: usize,
        version: String,
        has_title: bool,
        has_author: bool,
        has_subject: bool,
        has_keywords: bool,
        has_creator: bool,
        has_producer: bool,
        has_xmp_metadata: bool,
    },
    Video {
        format_name: Option<String>,
        duration_seconds: Option<f64>,
        size_bytes: Option<u64>,
        bit_rate: Option<u64>,
    },
}

/// Resultado intermedio de un analizador antes de asociarlo a una ruta.
#[derive(Clone, Debug, Default)]
pub struct Analysis {
    pub concerns: Vec<Concern>,
    pub format_metadata: Option<FormatMetadata>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub file_path: PathBuf,
    pub file_category: FileCategory,
    pub has_metadata: bool,
    pub concerns: Vec<Concern>,
    pub format_metadata: Option<FormatMetadata>,
    pub error: Option<String>,
}

impl ScanResult {
    pub fn from_analysis(path: &Path, category: FileCategory, analysis: Analysis) -> Self {
        Self {
            file_path: path.to_path_buf(),
            file_category: category,
            has_metadata: !analysis.concerns.is_empty(),
            concerns: analysis.concerns,
            format_metadata: analysis.format_metadata,
            error: None,
        }
    }

    pub fn failed(path: &Path, category: FileCategory, error: impl Into<String>) -> Self {
        Self {
            file_path: path.to_path_buf(),
            file_category: category,
            has_metadata: false,
            concerns: Vec::new(),
            format_metadata: None,
            error: Some(error.into()),
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.concerns
            .iter()
            .filter(|concern| concern.severity == severity)
            .count()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StripResult {
    pub file_path: PathBuf,
    pub file_category: FileCategory,
    pub original_size: u64,
    pub success: bool,
    pub error: Option<String>,
    pub backup_path: Option<PathBuf>,
}

impl StripResult {
    pub fn succeeded(
        path: &Path,
        category: FileCategory,
        original_size: u64,
        backup_path: Option<PathBuf>,
    ) -> Self {
        Self {
            file_path: path.to_path_buf(),
            file_category: category,
            original_size,
            success: true,
            error: None,
            backup_path,
        }
    }

    pub fn failed(
        path: &Path,
        category: FileCategory,
        original_size: u64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            file_path: path.to_path_buf(),
            file_category: category,
            original_size,
            success: false,
            error: Some(error.into()),
            backup_path: None,
        }
    }
}

/// Contadores acumulables de un recorrido de análisis.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanCounters {
    pub total_files: usize,
    pub scanned_files: usize,
    pub files_with_metadata: usize,
    pub high_concerns: usize,
    pub medium_concerns: usize,
    pub low_concerns: usize,
    pub errors: usize,
}

impl AddAssign for ScanCounters {
    fn add_assign(&mut self, other: Self) {
        self.total_files += other.total_files;
        self.scanned_files += other.scanned_files;
        self.files_with_metadata += other.files_with_metadata;
        self.high_concerns += other.high_concerns;
        self.medium_concerns += other.medium_concerns;
        self.low_concerns += other.low_concerns;
        self.errors += other.errors;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorySummary {
    pub path: PathBuf,
    #[serde(flatten)]
    pub counters: ScanCounters,
    pub results: Vec<ScanResult>,
}

impl DirectorySummary {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            ..Self::default()
        }
    }

    /// Suma un archivo analizado (con o sin error) a los totales.
    pub fn record(&mut self, result: ScanResult) {
        self.counters.total_files += 1;
        if result.error.is_some() {
            self.counters.errors += 1;
        } else {
            self.counters.scanned_files += 1;
        }
        if result.has_metadata {
            self.counters.files_with_metadata += 1;
        }
        self.counters.high_concerns += result.count(Severity::High);
        self.counters.medium_concerns += result.count(Severity::Medium);
        self.counters.low_concerns += result.count(Severity::Low);
        self.results.push(result);
    }

    /// Archivo con extensión no soportada: solo cuenta en el total.
    pub fn record_skipped(&mut self) {
        self.counters.total_files += 1;
    }

    pub fn record_error(&mut self) {
        self.counters.errors += 1;
    }

    /// Incorpora el resumen de un subdirectorio campo a campo.
    pub fn merge(&mut self, child: DirectorySummary) {
        self.counters += child.counters;
        self.results.extend(child.results);
    }

    pub fn files_with_metadata(&self) -> impl Iterator<Item = &ScanResult> {
        self.results.iter().filter(|result| result.has_metadata)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StripCounters {
    pub total_files: usize,
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl AddAssign for StripCounters {
    fn add_assign(&mut self, other: Self) {
        self.total_files += other.total_files;
        self.processed += other.processed;
        self.skipped += other.skipped;
        self.errors += other.errors;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryStripSummary {
    pub path: PathBuf,
    #[serde(flatten)]
    pub counters: StripCounters,
    pub results: Vec<StripResult>,
}

impl DirectoryStripSummary {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, result: StripResult) {
        self.counters.total_files += 1;
        if result.success {
            self.counters.processed += 1;
        } else {
            self.counters.errors += 1;
        }
        self.results.push(result);
    }

    pub fn record_skipped(&mut self) {
        self.counters.total_files += 1;
        self.counters.skipped += 1;
    }

    pub fn record_error(&mut self) {
        self.counters.errors += 1;
    }

    pub fn merge(&mut self, child: DirectoryStripSummary) {
        self.counters += child.counters;
        self.results.extend(child.results);
    }

    pub fn result_for(&self, path: &Path) -> Option<&StripResult> {
        self.results.iter().find(|result| result.file_path == path)
    }
}
