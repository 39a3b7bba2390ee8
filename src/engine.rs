//! Motor único de análisis y limpieza con capacidades inyectadas.

use std::fs;
use std::path::{Path, PathBuf};

use crate::analyzer::{self, Analyzer, ImageAnalyzer, PdfAnalyzer, VideoAnalyzer};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::format::{FileCategory, FormatClassifier, extension_of};
use crate::report::{ScanResult, StripResult};
use crate::stripper::{ImageStripper, PdfStripper, Stripper, VideoStripper, files};
use crate::tools::Capabilities;

pub struct MetadataEngine {
    config: EngineConfig,
    classifier: FormatClassifier,
    capabilities: Capabilities,
}

impl MetadataEngine {
    /// Construye el motor detectando las herramientas externas disponibles.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_capabilities(config, Capabilities::detect())
    }

    pub fn with_capabilities(config: EngineConfig, capabilities: Capabilities) -> Self {
        let classifier = FormatClassifier::new(&config);
        Self {
            config,
            classifier,
            capabilities,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn classifier(&self) -> &FormatClassifier {
        &self.classifier
    }

    pub fn category(&self, path: &Path) -> FileCategory {
        self.classifier.category(path)
    }

    fn analyzer(&self, category: FileCategory) -> Option<Box<dyn Analyzer + '_>> {
        match category {
            FileCategory::Image => Some(Box::new(ImageAnalyzer::new(self.capabilities.codec.as_ref()))),
            FileCategory::Pdf => Some(Box::new(PdfAnalyzer::new(&self.config.producer_signature))),
            FileCategory::Video => Some(Box::new(VideoAnalyzer::new(
                self.capabilities.transcoder.as_ref(),
            ))),
            FileCategory::Unsupported => None,
        }
    }

    fn stripper(&self, category: FileCategory) -> Option<Box<dyn Stripper + '_>> {
        match category {
            FileCategory::Image => Some(Box::new(ImageStripper::new(
                self.capabilities.codec.as_ref(),
                self.capabilities.metadata_tool.as_ref(),
            ))),
            FileCategory::Pdf => Some(Box::new(PdfStripper::new(&self.config.producer_signature))),
            FileCategory::Video => Some(Box::new(VideoStripper::new(
                self.capabilities.transcoder.as_ref(),
            ))),
            FileCategory::Unsupported => None,
        }
    }

    /// Analiza un archivo soportado.
    ///
    /// Solo un formato no soportado devuelve `Err`; cualquier otro fallo queda
    /// registrado en el `error` del resultado para no detener un recorrido.
    pub fn analyze(&self, path: &Path) -> Result<ScanResult> {
        let category = self.category(path);
        let analyzer = self.analyzer(category).ok_or_else(|| Error::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;

        let result = match analyzer.analyze(path) {
            Ok(analysis) => ScanResult::from_analysis(path, category, analysis),
            Err(err) => match analyzer::degraded_analysis(&err) {
                Some(analysis) => {
                    tracing::warn!(path = %path.display(), error = %err, "Análisis en modo degradado");
                    ScanResult::from_analysis(path, category, analysis)
                }
                None => {
                    tracing::warn!(path = %path.display(), error = %err, "No se pudo analizar el archivo");
                    ScanResult::failed(path, category, err.to_string())
                }
            },
        };

        tracing::debug!(
            path = %path.display(),
            concerns = result.concerns.len(),
            "Archivo analizado"
        );
        Ok(result)
    }

    /// Limpia un archivo en sitio, con copia `.backup` previa si está configurada.
    pub fn strip(&self, path: &Path) -> Result<StripResult> {
        let category = self.category(path);
        if category == FileCategory::Unsupported {
            return Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }

        let original_size = fs::metadata(path).map(|meta| meta.len()).unwrap_or(0);
        let result = match self.strip_in_place(path, category) {
            Ok(backup) => {
                tracing::info!(path = %path.display(), "Metadata eliminada");
                StripResult::succeeded(path, category, original_size, backup)
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "No se pudo limpiar el archivo");
                StripResult::failed(path, category, original_size, err.to_string())
            }
        };
        Ok(result)
    }

    fn strip_in_place(&self, path: &Path, category: FileCategory) -> Result<Option<PathBuf>> {
        let bytes = analyzer::read_file(path)?;
        let backup = if self.config.backup {
            Some(files::write_backup(path)?)
        } else {
            None
        };

        let extension = extension_of(path).unwrap_or_default();
        let cleaned = self.strip_category(category, &bytes, &extension)?;
        files::replace_atomically(path, &cleaned)?;
        Ok(backup)
    }

    fn strip_category(&self, category: FileCategory, bytes: &[u8], extension: &str) -> Result<Vec<u8>> {
        let stripper = self.stripper(category).ok_or_else(|| Error::UnsupportedFormat {
            path: format!("*.{extension}").into(),
        })?;
        stripper.strip(bytes, extension)
    }

    /// Limpia un contenido en memoria; `name` solo se usa para clasificarlo.
    pub fn strip_bytes(&self, name: &str, bytes: &[u8]) -> Result<Vec<u8>> {
        let path = Path::new(name);
        let category = self.category(path);
        if category == FileCategory::Unsupported {
            return Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
        let extension = extension_of(path).unwrap_or_default();
        self.strip_category(category, bytes, &extension)
    }

    /// Limpia un recurso descargado; si falla, devuelve el contenido original.
    pub fn sanitize_or_original(&self, name: &str, bytes: &[u8]) -> Vec<u8> {
        match self.strip_bytes(name, bytes) {
            Ok(cleaned) => cleaned,
            Err(err) => {
                tracing::warn!(name, error = %err, "No se pudo limpiar el recurso; se publica el original");
                bytes.to_vec()
            }
        }
    }
}
