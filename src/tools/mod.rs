//! Capacidades externas que el motor invoca y cuyos resultados verifica.
//!
//! Cada capacidad es un trait estrecho para poder sustituirla por una
//! implementación falsa en pruebas sin lanzar subprocesos reales.

mod codec;
mod exiftool;
mod ffmpeg;
mod git;

use image::ImageFormat;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::error::{Error, Result};

pub use codec::ImageCrateCodec;
pub use exiftool::Exiftool;
pub use ffmpeg::Ffmpeg;
pub use git::Git;

/// Códec de imágenes usado para la limpieza primaria por recodificación.
pub trait ImageCodec: Send + Sync {
    /// Devuelve el formato si el códec puede decodificar y recodificar la extensión.
    fn supports(&self, extension: &str) -> Option<ImageFormat>;

    /// Decodifica y vuelve a codificar la imagen descartando toda la metadata.
    fn reencode(&self, bytes: &[u8], format: ImageFormat) -> Result<Vec<u8>>;
}

/// Información de contenedor obtenida al sondear un video.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MediaProbe {
    pub format_name: Option<String>,
    pub duration_seconds: Option<f64>,
    pub size_bytes: Option<u64>,
    pub bit_rate: Option<u64>,
    pub tags: BTreeMap<String, String>,
}

/// Herramienta de remuxado: sondea etiquetas y copia flujos sin metadata.
pub trait ExternalTranscoder: Send + Sync {
    fn probe(&self, input: &Path) -> Result<MediaProbe>;

    /// Copia todos los flujos de `input` a `output` sin recodificar y sin metadata.
    fn remux(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Editor de metadata usado como pasada de respaldo sobre imágenes.
pub trait ExternalMetadataTool: Send + Sync {
    /// Elimina todas las etiquetas del archivo, modificándolo en sitio.
    fn remove_all(&self, path: &Path) -> Result<()>;
}

/// Área de preparación del control de versiones.
pub trait VersionControl {
    fn staged_files(&self) -> Result<Vec<PathBuf>>;

    fn stage(&self, paths: &[PathBuf]) -> Result<()>;
}

/// Conjunto de capacidades inyectado en el motor.
pub struct Capabilities {
    pub codec: Box<dyn ImageCodec>,
    pub transcoder: Box<dyn ExternalTranscoder>,
    pub metadata_tool: Box<dyn ExternalMetadataTool>,
}

impl Capabilities {
    /// Usa el códec integrado y busca `ffmpeg`, `ffprobe` y `exiftool` en PATH.
    pub fn detect() -> Self {
        Self {
            codec: Box::new(ImageCrateCodec),
            transcoder: Box::new(Ffmpeg::discover()),
            metadata_tool: Box::new(Exiftool::discover()),
        }
    }
}

/// Ejecuta una herramienta y convierte un código de salida no nulo en error.
pub(crate) fn run_tool(tool: &str, command: &mut Command) -> Result<Output> {
    tracing::debug!(tool, command = ?command, "Ejecutando herramienta externa");
    let output = command.output().map_err(|err| Error::ExternalTool {
        tool: tool.to_string(),
        message: format!("no se pudo ejecutar: {err}"),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::ExternalTool {
            tool: tool.to_string(),
            message: format!("{} ({})", stderr.trim(), output.status),
        });
    }

    Ok(output)
}

pub(crate) fn require(tool: &str, path: Option<&PathBuf>) -> Result<PathBuf> {
    path.cloned().ok_or_else(|| Error::ToolUnavailable {
        tool: tool.to_string(),
    })
}
