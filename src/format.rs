//! Clasificación de archivos por extensión.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::config::EngineConfig;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Image,
    Pdf,
    Video,
    Unsupported,
}

impl FileCategory {
    pub fn label(self) -> &'static str {
        match self {
            FileCategory::Image => "imagen",
            FileCategory::Pdf => "PDF",
            FileCategory::Video => "video",
            FileCategory::Unsupported => "no soportado",
        }
    }
}

/// Clasificador puro: depende solo de la configuración y del nombre del archivo.
#[derive(Clone, Debug)]
pub struct FormatClassifier {
    images: HashSet<String>,
    pdfs: HashSet<String>,
    videos: HashSet<String>,
}

impl FormatClassifier {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            images: config.image_extensions.iter().cloned().collect(),
            pdfs: config.pdf_extensions.iter().cloned().collect(),
            videos: config.video_extensions.iter().cloned().collect(),
        }
    }

    pub fn category(&self, path: &Path) -> FileCategory {
        let Some(ext) = extension_of(path) else {
            return FileCategory::Unsupported;
        };

        if self.images.contains(&ext) {
            FileCategory::Image
        } else if self.pdfs.contains(&ext) {
            FileCategory::Pdf
        } else if self.videos.contains(&ext) {
            FileCategory::Video
        } else {
            FileCategory::Unsupported
        }
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        self.category(path) != FileCategory::Unsupported
    }
}

/// Extensión en minúsculas, sin punto.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .filter(|e| !e.is_empty())
}
