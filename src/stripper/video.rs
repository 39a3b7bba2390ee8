//! Limpieza de video mediante remuxado externo sin recodificar.

use std::fs;

use super::Stripper;
use super::files::scratch_file;
use crate::error::{Error, Result};
use crate::tools::ExternalTranscoder;

pub struct VideoStripper<'a> {
    transcoder: &'a dyn ExternalTranscoder,
}

impl<'a> VideoStripper<'a> {
    pub fn new(transcoder: &'a dyn ExternalTranscoder) -> Self {
        Self { transcoder }
    }
}

impl Stripper for VideoStripper<'_> {
    /// El remuxador trabaja sobre rutas: entrada y salida son temporales que
    /// se eliminan al salir de la función, también en caso de error.
    fn strip(&self, bytes: &[u8], extension: &str) -> Result<Vec<u8>> {
        let input = scratch_file(extension, Some(bytes))?;
        let output = scratch_file(extension, None)?;

        self.transcoder.remux(input.path(), output.path())?;

        let cleaned = fs::read(output.path()).map_err(|err| Error::io(output.path(), err))?;
        if cleaned.is_empty() {
            return Err(Error::ExternalTool {
                tool: "ffmpeg".to_string(),
                message: "el remuxado produjo un archivo vacío".to_string(),
            });
        }
        Ok(cleaned)
    }
}
