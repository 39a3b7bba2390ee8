//! Sondeo y remuxado de video mediante `ffprobe` y `ffmpeg`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{ExternalTranscoder, MediaProbe, require, run_tool};
use crate::error::{Error, Result};

#[derive(Clone, Debug, Default)]
pub struct Ffmpeg {
    ffmpeg: Option<PathBuf>,
    ffprobe: Option<PathBuf>,
}

impl Ffmpeg {
    pub fn discover() -> Self {
        let ffmpeg = which::which("ffmpeg").ok();
        let ffprobe = which::which("ffprobe").ok();
        if ffmpeg.is_none() {
            tracing::info!("ffmpeg no encontrado en PATH; la limpieza de video no estará disponible");
        }
        if ffprobe.is_none() {
            tracing::info!("ffprobe no encontrado en PATH; el análisis de video no estará disponible");
        }
        Self { ffmpeg, ffprobe }
    }

    pub fn with_paths(ffmpeg: Option<PathBuf>, ffprobe: Option<PathBuf>) -> Self {
        Self { ffmpeg, ffprobe }
    }
}

impl ExternalTranscoder for Ffmpeg {
    fn probe(&self, input: &Path) -> Result<MediaProbe> {
        let ffprobe = require("ffprobe", self.ffprobe.as_ref())?;
        let output = run_tool(
            "ffprobe",
            Command::new(ffprobe)
                .args(["-v", "quiet", "-print_format", "json", "-show_format"])
                .arg(input),
        )?;
        parse_probe_output(&output.stdout)
    }

    fn remux(&self, input: &Path, output: &Path) -> Result<()> {
        let ffmpeg = require("ffmpeg", self.ffmpeg.as_ref())?;
        run_tool(
            "ffmpeg",
            Command::new(ffmpeg)
                .args(["-v", "error", "-y", "-i"])
                .arg(input)
                .args(["-map", "0", "-map_metadata", "-1", "-map_chapters", "-1", "-c", "copy"])
                .arg(output),
        )?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct ProbeDocument {
    format: Option<ProbeFormat>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    format_name: Option<String>,
    duration: Option<String>,
    size: Option<String>,
    bit_rate: Option<String>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

/// Interpreta la salida JSON de `ffprobe -show_format`.
pub(crate) fn parse_probe_output(stdout: &[u8]) -> Result<MediaProbe> {
    let document: ProbeDocument = serde_json::from_slice(stdout).map_err(|err| Error::Probe {
        message: err.to_string(),
    })?;
    let format = document.format.ok_or_else(|| Error::Probe {
        message: "la salida no contiene la sección `format`".to_string(),
    })?;

    Ok(MediaProbe {
        format_name: format.format_name,
        duration_seconds: format.duration.and_then(|value| value.parse().ok()),
        size_bytes: format.size.and_then(|value| value.parse().ok()),
        bit_rate: format.bit_rate.and_then(|value| value.parse().ok()),
        tags: format.tags,
    })
}
