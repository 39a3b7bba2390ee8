//! Limpieza de imágenes por recodificación con verificación y respaldo externo.

use std::fs;

use super::Stripper;
use super::files::scratch_file;
use crate::analyzer::{ImageAnalyzer, xmp};
use crate::error::{Error, Result};
use crate::tools::{ExternalMetadataTool, ImageCodec};

pub struct ImageStripper<'a> {
    codec: &'a dyn ImageCodec,
    metadata_tool: &'a dyn ExternalMetadataTool,
}

impl<'a> ImageStripper<'a> {
    pub fn new(codec: &'a dyn ImageCodec, metadata_tool: &'a dyn ExternalMetadataTool) -> Self {
        Self {
            codec,
            metadata_tool,
        }
    }

    /// Describe la metadata que sigue presente en `bytes`, o `None` si está limpia.
    fn residual(&self, bytes: &[u8], extension: &str) -> Result<Option<String>> {
        if xmp::has_packet(bytes) {
            return Ok(Some("paquete XMP presente".to_string()));
        }
        let analysis = ImageAnalyzer::new(self.codec).analyze_bytes(bytes, extension)?;
        if analysis.concerns.is_empty() {
            return Ok(None);
        }
        let fields: Vec<&str> = analysis
            .concerns
            .iter()
            .map(|concern| concern.field.as_str())
            .collect();
        Ok(Some(format!("campos residuales: {}", fields.join(", "))))
    }

    /// Segunda pasada con la herramienta externa sobre un temporal.
    fn fallback(&self, bytes: &[u8], extension: &str) -> Result<Vec<u8>> {
        let temp = scratch_file(extension, Some(bytes))?;
        self.metadata_tool.remove_all(temp.path())?;
        let cleaned = fs::read(temp.path()).map_err(|err| Error::io(temp.path(), err))?;

        if let Some(residual) = self.residual(&cleaned, extension)? {
            return Err(Error::ExternalTool {
                tool: "exiftool".to_string(),
                message: format!("la metadata persiste ({residual})"),
            });
        }
        Ok(cleaned)
    }
}

impl Stripper for ImageStripper<'_> {
    fn strip(&self, bytes: &[u8], extension: &str) -> Result<Vec<u8>> {
        let format = self
            .codec
            .supports(extension)
            .ok_or_else(|| Error::ToolUnavailable {
                tool: format!("códec de imágenes para .{extension}"),
            })?;

        let primary = self.codec.reencode(bytes, format)?;
        let Some(residual) = self.residual(&primary, extension)? else {
            return Ok(primary);
        };

        tracing::info!(extension, residual = %residual, "La recodificación dejó metadata; usando limpieza de respaldo");
        self.fallback(&primary, extension)
            .map_err(|err| Error::Verification {
                primary: residual,
                fallback: err.to_string(),
            })
    }
}
