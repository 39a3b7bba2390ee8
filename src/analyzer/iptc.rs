//! Lectura de IPTC-IIM desde el segmento APP13 (Photoshop 3.0) de un JPEG.

use crate::report::{Concern, ConcernKind, Severity};

const APP13: u8 = 0xED;
const PHOTOSHOP_SIGNATURE: &[u8] = b"Photoshop 3.0\0";
const RESOURCE_SIGNATURE: &[u8] = b"8BIM";
const IPTC_RESOURCE_ID: u16 = 0x0404;
const APPLICATION_RECORD: u8 = 2;

struct IptcDataset {
    number: u8,
    label: &'static str,
    severity: Severity,
    kind: ConcernKind,
    description: &'static str,
}

const IPTC_DATASETS: &[IptcDataset] = &[
    IptcDataset {
        number: 80,
        label: "By-line",
        severity: Severity::High,
        kind: ConcernKind::AuthorInfo,
        description: "IPTC identifica al autor de la imagen",
    },
    IptcDataset {
        number: 116,
        label: "CopyrightNotice",
        severity: Severity::High,
        kind: ConcernKind::Copyright,
        description: "IPTC contiene un aviso de copyright",
    },
    IptcDataset {
        number: 120,
        label: "Caption-Abstract",
        severity: Severity::Medium,
        kind: ConcernKind::Description,
        description: "IPTC incluye una descripción de la imagen",
    },
    IptcDataset {
        number: 25,
        label: "Keywords",
        severity: Severity::Medium,
        kind: ConcernKind::Keywords,
        description: "IPTC incluye palabras clave",
    },
    IptcDataset {
        number: 5,
        label: "ObjectName",
        severity: Severity::Medium,
        kind: ConcernKind::Title,
        description: "IPTC incluye un título",
    },
    IptcDataset {
        number: 90,
        label: "City",
        severity: Severity::Medium,
        kind: ConcernKind::LocationInfo,
        description: "IPTC indica la ciudad",
    },
    IptcDataset {
        number: 95,
        label: "Province-State",
        severity: Severity::Medium,
        kind: ConcernKind::LocationInfo,
        description: "IPTC indica la provincia o estado",
    },
    IptcDataset {
        number: 101,
        label: "Country-PrimaryLocationName",
        severity: Severity::Medium,
        kind: ConcernKind::LocationInfo,
        description: "IPTC indica el país",
    },
    IptcDataset {
        number: 55,
        label: "DateCreated",
        severity: Severity::Low,
        kind: ConcernKind::DateInfo,
        description: "IPTC registra la fecha de creación",
    },
];

/// Agrega las preocupaciones IPTC de un JPEG; otros formatos no aportan nada.
pub fn collect_concerns(bytes: &[u8], concerns: &mut Vec<Concern>) {
    let records = jpeg_segments(bytes)
        .filter(|(marker, _)| *marker == APP13)
        .filter_map(|(_, payload)| payload.strip_prefix(PHOTOSHOP_SIGNATURE))
        .flat_map(iptc_blocks)
        .flat_map(parse_records)
        .collect::<Vec<_>>();

    for dataset in IPTC_DATASETS {
        let values: Vec<String> = records
            .iter()
            .filter(|(number, _)| *number == dataset.number)
            .map(|(_, value)| value.clone())
            .collect();
        if values.is_empty() {
            continue;
        }
        concerns.push(Concern::new(
            dataset.severity,
            dataset.kind,
            dataset.label,
            values.join(", "),
            dataset.description,
        ));
    }
}

/// Recorre los segmentos de cabecera de un JPEG hasta el inicio de la imagen (SOS).
pub(crate) fn jpeg_segments(bytes: &[u8]) -> impl Iterator<Item = (u8, &[u8])> {
    let mut offset = if bytes.starts_with(&[0xFF, 0xD8]) {
        2
    } else {
        bytes.len()
    };

    std::iter::from_fn(move || {
        while offset + 4 <= bytes.len() {
            if bytes[offset] != 0xFF {
                return None;
            }
            let marker = bytes[offset + 1];
            match marker {
                0xFF => {
                    offset += 1;
                    continue;
                }
                0x01 | 0xD0..=0xD7 => {
                    offset += 2;
                    continue;
                }
                0xD9 | 0xDA => return None,
                _ => {}
            }

            let length = u16::from_be_bytes([bytes[offset + 2], bytes[offset + 3]]) as usize;
            let start = offset + 4;
            let end = offset + 2 + length;
            if length < 2 || end > bytes.len() {
                return None;
            }
            offset = end;
            return Some((marker, &bytes[start..end]));
        }
        None
    })
}

/// Extrae los bloques IPTC (recurso 0x0404) de los recursos de imagen de Photoshop.
fn iptc_blocks(mut data: &[u8]) -> Vec<&[u8]> {
    let mut blocks = Vec::new();
    while data.len() >= 4 && data.starts_with(RESOURCE_SIGNATURE) {
        if data.len() < 7 {
            break;
        }
        let id = u16::from_be_bytes([data[4], data[5]]);

        // Nombre en Pascal string, rellenado a longitud par.
        let name_len = data[6] as usize;
        let mut cursor = 6 + 1 + name_len;
        if (1 + name_len) % 2 == 1 {
            cursor += 1;
        }
        if cursor + 4 > data.len() {
            break;
        }
        let size = u32::from_be_bytes([
            data[cursor],
            data[cursor + 1],
            data[cursor + 2],
            data[cursor + 3],
        ]) as usize;
        cursor += 4;
        if cursor + size > data.len() {
            break;
        }
        if id == IPTC_RESOURCE_ID {
            blocks.push(&data[cursor..cursor + size]);
        }
        cursor += size + size % 2;
        data = data.get(cursor..).unwrap_or_default();
    }
    blocks
}

fn parse_records(mut data: &[u8]) -> Vec<(u8, String)> {
    let mut records = Vec::new();
    while data.len() >= 5 && data[0] == 0x1C {
        let record = data[1];
        let dataset = data[2];
        let size = u16::from_be_bytes([data[3], data[4]]);
        // Los tamaños extendidos no aparecen en los campos de texto que interesan.
        if size & 0x8000 != 0 {
            break;
        }
        let size = size as usize;
        if 5 + size > data.len() {
            break;
        }
        if record == APPLICATION_RECORD {
            let value = String::from_utf8_lossy(&data[5..5 + size]).trim().to_string();
            if !value.is_empty() {
                records.push((dataset, value));
            }
        }
        data = &data[5 + size..];
    }
    records
}
