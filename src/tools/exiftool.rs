//! Herramienta `exiftool` para la limpieza de respaldo de imágenes.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::{ExternalMetadataTool, require, run_tool};
use crate::error::Result;

/// Pasada de respaldo con `exiftool -all=`.
#[derive(Clone, Debug, Default)]
pub struct Exiftool {
    binary: Option<PathBuf>,
}

impl Exiftool {
    pub fn discover() -> Self {
        let binary = which::which("exiftool").ok();
        if binary.is_none() {
            tracing::info!("exiftool no encontrado en PATH; no habrá limpieza de respaldo para imágenes");
        }
        Self { binary }
    }

    pub fn with_path(binary: Option<PathBuf>) -> Self {
        Self { binary }
    }
}

impl ExternalMetadataTool for Exiftool {
    fn remove_all(&self, path: &Path) -> Result<()> {
        let binary = require("exiftool", self.binary.as_ref())?;
        run_tool(
            "exiftool",
            Command::new(binary)
                .args(["-all=", "-overwrite_original", "-q"])
                .arg(path),
        )?;
        Ok(())
    }
}
