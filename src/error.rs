//! Taxonomía de errores del motor de análisis y limpieza.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errores que pueden ocurrir al analizar o limpiar un archivo.
#[derive(Debug, Error)]
pub enum Error {
    /// La extensión no pertenece a ninguna categoría configurada.
    #[error("Formato no soportado: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// La ruta no existe.
    #[error("Ruta no encontrada: {path}")]
    NotFound { path: PathBuf },

    /// Error de E/S con contexto de ruta.
    #[error("Error de E/S en {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// El códec de imágenes no pudo decodificar o codificar el contenido.
    #[error("Error del códec de imágenes: {message}")]
    Codec { message: String },

    /// Error al leer o serializar un PDF.
    #[error("Error procesando PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    /// El PDF limpio no se pudo serializar.
    #[error("No se pudo guardar el PDF: {message}")]
    PdfWrite { message: String },

    /// Error al leer un bloque EXIF.
    #[error("Error leyendo EXIF: {0}")]
    Exif(#[from] exif::Error),

    /// La herramienta externa no está instalada o no se encontró en PATH.
    #[error("Herramienta no disponible: {tool}")]
    ToolUnavailable { tool: String },

    /// La herramienta externa terminó con error.
    #[error("{tool} falló: {message}")]
    ExternalTool { tool: String, message: String },

    /// La salida de la herramienta de sondeo no se pudo interpretar.
    #[error("No se pudo interpretar el sondeo multimedia: {message}")]
    Probe { message: String },

    /// La limpieza primaria y la de respaldo dejaron metadata residual.
    #[error("Metadata residual tras la limpieza ({primary}); el respaldo también falló ({fallback})")]
    Verification { primary: String, fallback: String },

    /// Error del sistema de control de versiones.
    #[error("Error de control de versiones: {message}")]
    Vcs { message: String },

    /// El gancho de pre-commit no pudo dejar limpio un archivo preparado.
    #[error("No se pudo limpiar {path} antes del commit: {message}")]
    Hook { path: PathBuf, message: String },

    /// No se pudo generar o exportar el reporte.
    #[error("Error generando el reporte: {message}")]
    Report { message: String },
}

impl Error {
    /// Crea un error de E/S conservando la ruta afectada.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    pub fn codec(message: impl std::fmt::Display) -> Self {
        Self::Codec {
            message: message.to_string(),
        }
    }

    /// Nombre de la capacidad externa ausente, si ese es el origen del error.
    pub fn missing_capability(&self) -> Option<&str> {
        match self {
            Self::ToolUnavailable { tool } => Some(tool),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_maps_not_found() {
        let err = Error::io(
            "/no/existe",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn verification_error_names_both_causes() {
        let err = Error::Verification {
            primary: "XMP presente".to_string(),
            fallback: "exiftool falló".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("XMP presente"));
        assert!(message.contains("exiftool falló"));
    }

    #[test]
    fn only_tool_unavailable_counts_as_missing_capability() {
        let missing = Error::ToolUnavailable {
            tool: "ffprobe".to_string(),
        };
        assert_eq!(missing.missing_capability(), Some("ffprobe"));
        assert_eq!(Error::codec("decode").missing_capability(), None);
    }
}
