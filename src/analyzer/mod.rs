//! Analizadores de metadata por categoría de archivo.
//!
//! Cada categoría soportada tiene un analizador que lee el archivo, extrae
//! los campos embebidos y los clasifica en preocupaciones con severidad.

mod image;
mod iptc;
mod pdf;
mod video;
pub mod xmp;


use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::report::{Analysis, Concern, ConcernKind};

pub use image::ImageAnalyzer;
pub use pdf::PdfAnalyzer;
pub use video::VideoAnalyzer;

pub trait Analyzer {
    fn analyze(&self, path: &Path) -> Result<Analysis>;
}

/// Preocupación sintética para una capacidad ausente (códec o herramienta).
pub fn capability_missing(capability: &str) -> Concern {
    Concern::high(
        ConcernKind::CapabilityMissing,
        "capability",
        capability,
        format!(
            "No se pudo inspeccionar la metadata porque {capability} no está disponible; el archivo puede conservar datos sensibles"
        ),
    )
}

/// Convierte la ausencia de una capacidad en un análisis degradado.
pub fn degraded_analysis(error: &Error) -> Option<Analysis> {
    error.missing_capability().map(|tool| Analysis {
        concerns: vec![capability_missing(tool)],
        format_metadata: None,
    })
}

pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|err| Error::io(path, err))
}
