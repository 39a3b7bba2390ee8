//! Análisis de imágenes: EXIF, IPTC, texto PNG y XMP.

use exif::{Context, In, Tag, Value};
use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;

use super::{Analyzer, capability_missing, iptc, read_file, xmp};
use crate::error::{Error, Result};
use crate::format::extension_of;
use crate::report::{Analysis, Concern, ConcernKind, FormatMetadata, Severity};
use crate::tools::ImageCodec;

const HOST_COMPUTER: Tag = Tag(Context::Tiff, 0x013c);
const XP_KEYWORDS: Tag = Tag(Context::Tiff, 0x9c9e);
const XP_AUTHOR: Tag = Tag(Context::Tiff, 0x9c9d);

struct ExifFieldSpec {
    tag: Tag,
    label: &'static str,
    severity: Severity,
    kind: ConcernKind,
    description: &'static str,
}

const EXIF_FIELDS: &[ExifFieldSpec] = &[
    ExifFieldSpec {
        tag: Tag::BodySerialNumber,
        label: "BodySerialNumber",
        severity: Severity::High,
        kind: ConcernKind::CameraSerial,
        description: "Número de serie de la cámara; permite vincular fotos al mismo dispositivo",
    },
    ExifFieldSpec {
        tag: Tag::LensSerialNumber,
        label: "LensSerialNumber",
        severity: Severity::High,
        kind: ConcernKind::CameraSerial,
        description: "Número de serie del lente",
    },
    ExifFieldSpec {
        tag: Tag::Artist,
        label: "Artist",
        severity: Severity::High,
        kind: ConcernKind::AuthorInfo,
        description: "Nombre del autor incrustado en la imagen",
    },
    ExifFieldSpec {
        tag: XP_AUTHOR,
        label: "XPAuthor",
        severity: Severity::High,
        kind: ConcernKind::AuthorInfo,
        description: "Autor registrado por Windows",
    },
    ExifFieldSpec {
        tag: Tag::CameraOwnerName,
        label: "CameraOwnerName",
        severity: Severity::High,
        kind: ConcernKind::AuthorInfo,
        description: "Nombre del propietario de la cámara",
    },
    ExifFieldSpec {
        tag: Tag::Copyright,
        label: "Copyright",
        severity: Severity::High,
        kind: ConcernKind::Copyright,
        description: "Aviso de copyright con el nombre del titular",
    },
    ExifFieldSpec {
        tag: Tag::Software,
        label: "Software",
        severity: Severity::Medium,
        kind: ConcernKind::SoftwareInfo,
        description: "Software usado para procesar la imagen",
    },
    ExifFieldSpec {
        tag: Tag::Make,
        label: "Make",
        severity: Severity::Medium,
        kind: ConcernKind::CameraInfo,
        description: "Fabricante de la cámara",
    },
    ExifFieldSpec {
        tag: Tag::Model,
        label: "Model",
        severity: Severity::Medium,
        kind: ConcernKind::CameraInfo,
        description: "Modelo de la cámara",
    },
    ExifFieldSpec {
        tag: Tag::LensModel,
        label: "LensModel",
        severity: Severity::Medium,
        kind: ConcernKind::LensInfo,
        description: "Modelo del lente",
    },
    ExifFieldSpec {
        tag: Tag::ImageDescription,
        label: "ImageDescription",
        severity: Severity::Medium,
        kind: ConcernKind::Description,
        description: "Descripción de la imagen",
    },
    ExifFieldSpec {
        tag: Tag::UserComment,
        label: "UserComment",
        severity: Severity::Medium,
        kind: ConcernKind::UserComment,
        description: "Comentario del usuario",
    },
    ExifFieldSpec {
        tag: HOST_COMPUTER,
        label: "HostComputer",
        severity: Severity::Medium,
        kind: ConcernKind::HostComputer,
        description: "Nombre del equipo donde se procesó la imagen",
    },
    ExifFieldSpec {
        tag: XP_KEYWORDS,
        label: "XPKeywords",
        severity: Severity::Medium,
        kind: ConcernKind::Keywords,
        description: "Palabras clave registradas por Windows",
    },
    ExifFieldSpec {
        tag: Tag::DateTime,
        label: "DateTime",
        severity: Severity::Low,
        kind: ConcernKind::DateInfo,
        description: "Fecha de modificación",
    },
    ExifFieldSpec {
        tag: Tag::DateTimeOriginal,
        label: "DateTimeOriginal",
        severity: Severity::Low,
        kind: ConcernKind::DateInfo,
        description: "Fecha en que se tomó la foto",
    },
    ExifFieldSpec {
        tag: Tag::DateTimeDigitized,
        label: "DateTimeDigitized",
        severity: Severity::Low,
        kind: ConcernKind::DateInfo,
        description: "Fecha de digitalización",
    },
];

struct PngTextSpec {
    keyword: &'static str,
    severity: Severity,
    kind: ConcernKind,
    description: &'static str,
}

const PNG_TEXT_FIELDS: &[PngTextSpec] = &[
    PngTextSpec {
        keyword: "Author",
        severity: Severity::High,
        kind: ConcernKind::AuthorInfo,
        description: "Autor declarado en un chunk de texto PNG",
    },
    PngTextSpec {
        keyword: "Copyright",
        severity: Severity::High,
        kind: ConcernKind::Copyright,
        description: "Copyright declarado en un chunk de texto PNG",
    },
    PngTextSpec {
        keyword: "Software",
        severity: Severity::Medium,
        kind: ConcernKind::SoftwareInfo,
        description: "Software que generó el PNG",
    },
    PngTextSpec {
        keyword: "Title",
        severity: Severity::Medium,
        kind: ConcernKind::Title,
        description: "Título del PNG",
    },
    PngTextSpec {
        keyword: "Description",
        severity: Severity::Medium,
        kind: ConcernKind::Description,
        description: "Descripción del PNG",
    },
    PngTextSpec {
        keyword: "Comment",
        severity: Severity::Medium,
        kind: ConcernKind::Comment,
        description: "Comentario incrustado en el PNG",
    },
    PngTextSpec {
        keyword: "Creation Time",
        severity: Severity::Low,
        kind: ConcernKind::DateInfo,
        description: "Fecha de creación del PNG",
    },
];

const PNG_XMP_KEYWORD: &str = "XML:com.adobe.xmp";

pub struct ImageAnalyzer<'a> {
    codec: &'a dyn ImageCodec,
}

impl<'a> ImageAnalyzer<'a> {
    pub fn new(codec: &'a dyn ImageCodec) -> Self {
        Self { codec }
    }

    /// Analiza una imagen ya cargada en memoria; `extension` decide el códec.
    pub fn analyze_bytes(&self, bytes: &[u8], extension: &str) -> Result<Analysis> {
        let Some(format) = self.codec.supports(extension) else {
            return Ok(Analysis {
                concerns: vec![capability_missing(&format!("el códec de imágenes para .{extension}"))],
                format_metadata: None,
            });
        };

        let (width, height, detected) = read_dimensions(bytes, format)?;

        let mut concerns = Vec::new();
        if let Some(exif) = read_exif(bytes)? {
            exif_concerns(&exif, &mut concerns);
        }
        if detected == ImageFormat::Jpeg {
            iptc::collect_concerns(bytes, &mut concerns);
        }

        let mut xmp_packet = None;
        if detected == ImageFormat::Png {
            xmp_packet = png_text_concerns(bytes, &mut concerns);
        }
        if let Some(packet) = xmp_packet.or_else(|| xmp::find_packet(bytes)) {
            xmp::collect_concerns(&packet, &mut concerns);
        }

        Ok(Analysis {
            concerns,
            format_metadata: Some(FormatMetadata::Image {
                width,
                height,
                format: format!("{detected:?}").to_uppercase(),
                mime: infer::get(bytes).map(|kind| kind.mime_type().to_string()),
            }),
        })
    }
}

impl Analyzer for ImageAnalyzer<'_> {
    fn analyze(&self, path: &Path) -> Result<Analysis> {
        let bytes = read_file(path)?;
        let extension = extension_of(path).unwrap_or_default();
        self.analyze_bytes(&bytes, &extension)
    }
}

fn read_dimensions(bytes: &[u8], expected: ImageFormat) -> Result<(u32, u32, ImageFormat)> {
    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| Error::codec(format!("No se pudo leer la imagen: {e}")))?;
    let detected = reader.format().unwrap_or(expected);
    reader.set_format(detected);
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| Error::codec(format!("Imagen dañada o ilegible: {e}")))?;
    Ok((width, height, detected))
}

/// Lee el bloque EXIF; su ausencia no es un error.
fn read_exif(bytes: &[u8]) -> Result<Option<exif::Exif>> {
    match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => Ok(Some(exif)),
        Err(exif::Error::NotFound(_))
        | Err(exif::Error::BlankValue(_))
        | Err(exif::Error::InvalidFormat(_)) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn exif_concerns(exif: &exif::Exif, concerns: &mut Vec<Concern>) {
    gps_concerns(exif, concerns);

    for spec in EXIF_FIELDS {
        let Some(field) = exif.get_field(spec.tag, In::PRIMARY) else {
            continue;
        };
        let Some(value) = field_text(field) else {
            continue;
        };
        concerns.push(Concern::new(
            spec.severity,
            spec.kind,
            spec.label,
            value,
            spec.description,
        ));
    }
}

fn gps_concerns(exif: &exif::Exif, concerns: &mut Vec<Concern>) {
    let latitude = gps_coordinate(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, "S");
    let longitude = gps_coordinate(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, "W");

    let position = match (latitude, longitude) {
        (Some(lat), Some(lon)) => Some(("GPSPosition", format!("{lat:.6}, {lon:.6}"))),
        (Some(lat), None) => Some(("GPSLatitude", format!("{lat:.6}"))),
        (None, Some(lon)) => Some(("GPSLongitude", format!("{lon:.6}"))),
        (None, None) => None,
    };
    if let Some((label, value)) = position {
        concerns.push(Concern::high(
            ConcernKind::GpsLocation,
            label,
            value,
            "Coordenadas GPS que revelan dónde se tomó la imagen",
        ));
    }

    if let Some(field) = exif.get_field(Tag::GPSAltitude, In::PRIMARY)
        && let Value::Rational(parts) = &field.value
        && let Some(altitude) = parts.first().map(|part| part.to_f64())
        && altitude.is_finite()
    {
        let below_sea_level = exif
            .get_field(Tag::GPSAltitudeRef, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            == Some(1);
        let altitude = if below_sea_level { -altitude } else { altitude };
        concerns.push(Concern::high(
            ConcernKind::GpsLocation,
            "GPSAltitude",
            format!("{altitude:.1} m"),
            "Altitud GPS del lugar de captura",
        ));
    }
}

/// Coordenada en grados decimales, negativa si la referencia es S u W.
fn gps_coordinate(exif: &exif::Exif, tag: Tag, ref_tag: Tag, negative_ref: &str) -> Option<f64> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let Value::Rational(parts) = &field.value else {
        return None;
    };
    let component = |index: usize| parts.get(index).map(|part| part.to_f64()).unwrap_or(0.0);
    let mut value = parts.first()?.to_f64() + component(1) / 60.0 + component(2) / 3600.0;

    let negative = exif
        .get_field(ref_tag, In::PRIMARY)
        .and_then(field_text)
        .is_some_and(|reference| reference.eq_ignore_ascii_case(negative_ref));
    if negative {
        value = -value;
    }
    value.is_finite().then_some(value)
}

fn field_text(field: &exif::Field) -> Option<String> {
    let text = match &field.value {
        // `display_value` entrecomilla los ASCII; se decodifican a mano.
        Value::Ascii(parts) => parts
            .iter()
            .map(|part| trim_text(&String::from_utf8_lossy(part)))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Byte(raw) => decode_utf16le(raw),
        Value::Undefined(raw, _) => decode_user_comment(raw),
        _ => field.display_value().to_string(),
    };
    let text = trim_text(&text);
    (!text.is_empty()).then_some(text)
}

fn decode_utf16le(raw: &[u8]) -> String {
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// UserComment lleva 8 bytes de juego de caracteres antes del texto.
fn decode_user_comment(raw: &[u8]) -> String {
    if raw.len() < 8 {
        return String::from_utf8_lossy(raw).into_owned();
    }
    let (header, body) = raw.split_at(8);
    if header.starts_with(b"UNICODE") {
        decode_utf16le(body)
    } else {
        String::from_utf8_lossy(body).into_owned()
    }
}

fn trim_text(value: &str) -> String {
    value
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}

/// Registra los chunks de texto PNG y devuelve el paquete XMP si viene en uno.
fn png_text_concerns(bytes: &[u8], concerns: &mut Vec<Concern>) -> Option<String> {
    let mut xmp_packet = None;
    for (keyword, text) in png_text_chunks(bytes) {
        if keyword == PNG_XMP_KEYWORD {
            xmp_packet = Some(text);
            continue;
        }
        let Some(spec) = PNG_TEXT_FIELDS
            .iter()
            .find(|spec| spec.keyword.eq_ignore_ascii_case(&keyword))
        else {
            continue;
        };
        let value = trim_text(&text);
        if value.is_empty() {
            continue;
        }
        concerns.push(Concern::new(
            spec.severity,
            spec.kind,
            keyword,
            value,
            spec.description,
        ));
    }
    xmp_packet
}

fn png_text_chunks(bytes: &[u8]) -> Vec<(String, String)> {
    let decoder = png::Decoder::new(Cursor::new(bytes));
    let Ok(mut reader) = decoder.read_info() else {
        return Vec::new();
    };
    // Los chunks de texto posteriores a IDAT solo aparecen tras leer hasta IEND.
    if let Err(err) = reader.finish() {
        tracing::debug!(error = %err, "PNG truncado; se usan los chunks leídos hasta el error");
    }
    let info = reader.info();

    let mut chunks = Vec::new();
    for chunk in &info.uncompressed_latin1_text {
        chunks.push((chunk.keyword.clone(), chunk.text.clone()));
    }
    for chunk in &info.compressed_latin1_text {
        if let Ok(text) = chunk.get_text() {
            chunks.push((chunk.keyword.clone(), text));
        }
    }
    for chunk in &info.utf8_text {
        if let Ok(text) = chunk.get_text() {
            chunks.push((chunk.keyword.clone(), text));
        }
    }
    chunks
}
