//! Análisis de etiquetas de contenedor de video a partir del sondeo.

use std::collections::BTreeMap;
use std::path::Path;

use super::Analyzer;
use crate::error::Result;
use crate::report::{Analysis, Concern, ConcernKind, FormatMetadata, Severity};
use crate::tools::ExternalTranscoder;

struct VideoTagSpec {
    keys: &'static [&'static str],
    severity: Severity,
    kind: ConcernKind,
    description: &'static str,
}

// `encoder` queda fuera: el propio remuxado lo vuelve a escribir.
const VIDEO_TAGS: &[VideoTagSpec] = &[
    VideoTagSpec {
        keys: &["artist", "author"],
        severity: Severity::High,
        kind: ConcernKind::AuthorInfo,
        description: "Autor o artista registrado en el contenedor",
    },
    VideoTagSpec {
        keys: &["comment", "description"],
        severity: Severity::High,
        kind: ConcernKind::Comment,
        description: "Comentario libre incrustado en el video",
    },
    VideoTagSpec {
        keys: &[
            "location",
            "location-eng",
            "com.apple.quicktime.location.iso6709",
        ],
        severity: Severity::High,
        kind: ConcernKind::GpsLocation,
        description: "Ubicación ISO 6709 donde se grabó el video",
    },
    VideoTagSpec {
        keys: &["copyright"],
        severity: Severity::High,
        kind: ConcernKind::Copyright,
        description: "Aviso de copyright del video",
    },
    VideoTagSpec {
        keys: &["title"],
        severity: Severity::Medium,
        kind: ConcernKind::Title,
        description: "Título del video",
    },
    VideoTagSpec {
        keys: &["album"],
        severity: Severity::Medium,
        kind: ConcernKind::Album,
        description: "Álbum asociado al video",
    },
    VideoTagSpec {
        keys: &["genre"],
        severity: Severity::Low,
        kind: ConcernKind::Genre,
        description: "Género del contenido",
    },
    VideoTagSpec {
        keys: &["creation_time", "date"],
        severity: Severity::Low,
        kind: ConcernKind::DateInfo,
        description: "Fecha de grabación",
    },
];

pub struct VideoAnalyzer<'a> {
    transcoder: &'a dyn ExternalTranscoder,
}

impl<'a> VideoAnalyzer<'a> {
    pub fn new(transcoder: &'a dyn ExternalTranscoder) -> Self {
        Self { transcoder }
    }
}

impl Analyzer for VideoAnalyzer<'_> {
    fn analyze(&self, path: &Path) -> Result<Analysis> {
        let probe = self.transcoder.probe(path)?;
        Ok(Analysis {
            concerns: tag_concerns(&probe.tags),
            format_metadata: Some(FormatMetadata::Video {
                format_name: probe.format_name,
                duration_seconds: probe.duration_seconds,
                size_bytes: probe.size_bytes,
                bit_rate: probe.bit_rate,
            }),
        })
    }
}

/// Clasifica las etiquetas del contenedor sin distinguir mayúsculas.
fn tag_concerns(tags: &BTreeMap<String, String>) -> Vec<Concern> {
    let mut concerns = Vec::new();
    for spec in VIDEO_TAGS {
        for (key, value) in tags {
            let normalized = key.to_lowercase();
            if !spec.keys.contains(&normalized.as_str()) {
                continue;
            }
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            concerns.push(Concern::new(
                spec.severity,
                spec.kind,
                key.clone(),
                value,
                spec.description,
            ));
        }
    }
    concerns
}
