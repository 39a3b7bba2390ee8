//! Análisis del diccionario Info de un PDF.

use lopdf::{Dictionary, Document, Object};
use std::path::Path;

use super::{Analyzer, read_file};
use crate::error::Result;
use crate::report::{Analysis, Concern, ConcernKind, FormatMetadata, Severity};

struct PdfFieldSpec {
    key: &'static str,
    severity: Severity,
    kind: ConcernKind,
    description: &'static str,
}

const PDF_FIELDS: &[PdfFieldSpec] = &[
    PdfFieldSpec {
        key: "Title",
        severity: Severity::Medium,
        kind: ConcernKind::Title,
        description: "Título del documento",
    },
    PdfFieldSpec {
        key: "Author",
        severity: Severity::High,
        kind: ConcernKind::AuthorInfo,
        description: "Autor del documento; puede revelar la identidad de quien lo creó",
    },
    PdfFieldSpec {
        key: "Subject",
        severity: Severity::Medium,
        kind: ConcernKind::Description,
        description: "Asunto del documento",
    },
    PdfFieldSpec {
        key: "Keywords",
        severity: Severity::Medium,
        kind: ConcernKind::Keywords,
        description: "Palabras clave del documento",
    },
    PdfFieldSpec {
        key: "Creator",
        severity: Severity::Medium,
        kind: ConcernKind::SoftwareInfo,
        description: "Aplicación que creó el documento original",
    },
    PdfFieldSpec {
        key: "Producer",
        severity: Severity::Medium,
        kind: ConcernKind::SoftwareInfo,
        description: "Software que generó el PDF",
    },
];

/// Analizador de PDFs; `signature` es el `Producer` que este motor escribe al limpiar.
pub struct PdfAnalyzer<'a> {
    signature: &'a str,
}

impl<'a> PdfAnalyzer<'a> {
    pub fn new(signature: &'a str) -> Self {
        Self { signature }
    }

    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<Analysis> {
        let doc = Document::load_mem(bytes)?;
        let info = info_dictionary(&doc);

        let mut concerns = Vec::new();
        let present = |key: &str| info_value(&doc, info, key);
        for spec in PDF_FIELDS {
            let Some(value) = present(spec.key) else {
                continue;
            };
            if spec.key == "Producer" && value == self.signature {
                continue;
            }
            concerns.push(Concern::new(
                spec.severity,
                spec.kind,
                spec.key,
                value,
                spec.description,
            ));
        }

        let format_metadata = FormatMetadata::Pdf {
            pages: doc.get_pages().len(),
            version: doc.version.clone(),
            has_title: present("Title").is_some(),
            has_author: present("Author").is_some(),
            has_subject: present("Subject").is_some(),
            has_keywords: present("Keywords").is_some(),
            has_creator: present("Creator").is_some(),
            has_producer: present("Producer").is_some(),
            has_xmp_metadata: catalog(&doc).is_some_and(|catalog| catalog.has(b"Metadata")),
        };

        Ok(Analysis {
            concerns,
            format_metadata: Some(format_metadata),
        })
    }
}

impl Analyzer for PdfAnalyzer<'_> {
    fn analyze(&self, path: &Path) -> Result<Analysis> {
        let bytes = read_file(path)?;
        self.analyze_bytes(&bytes)
    }
}

fn info_value(doc: &Document, info: Option<&Dictionary>, key: &str) -> Option<String> {
    let obj = info?.get(key.as_bytes()).ok()?;
    object_to_string(doc, obj).filter(|value| !value.is_empty())
}

fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    let info = doc.trailer.get(b"Info").ok()?;
    deref_dictionary(doc, info)
}

fn catalog(doc: &Document) -> Option<&Dictionary> {
    let root = doc.trailer.get(b"Root").ok()?;
    deref_dictionary(doc, root)
}

fn deref_dictionary<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Reference(reference) => doc.get_dictionary(*reference).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn object_to_string(doc: &Document, obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(decode_text_string(bytes).trim().to_string()),
        Object::Name(name) => Some(String::from_utf8_lossy(name).trim().to_string()),
        Object::Reference(reference) => doc
            .get_object(*reference)
            .ok()
            .and_then(|inner| object_to_string(doc, inner)),
        _ => None,
    }
}

/// Las cadenas de texto PDF usan UTF-16BE cuando empiezan con BOM.
fn decode_text_string(bytes: &[u8]) -> String {
    match bytes.strip_prefix(&[0xFE, 0xFF]) {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        None => String::from_utf8_lossy(bytes).into_owned(),
    }
}
