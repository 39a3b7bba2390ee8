//! Extracción de campos XMP por patrones sobre el paquete crudo.
//!
//! Los paquetes XMP embebidos mezclan la forma de elemento
//! (`<dc:title>x</dc:title>`), la forma anidada con `rdf:Alt/Bag/Seq`
//! y la forma abreviada de atributo (`xmp:CreatorTool="x"`). Los patrones
//! cubren las tres sin construir el árbol RDF completo; esta capa puede
//! sustituirse por un parser XML sin tocar a quienes la llaman.

use regex::Regex;
use std::sync::LazyLock;

use crate::report::{Concern, ConcernKind, Severity};

const MAX_XMP_VALUE_LEN: usize = 2048;

struct XmpFieldSpec {
    property: &'static str,
    severity: Severity,
    kind: ConcernKind,
    description: &'static str,
}

const XMP_FIELDS: &[XmpFieldSpec] = &[
    XmpFieldSpec {
        property: "dc:creator",
        severity: Severity::High,
        kind: ConcernKind::AuthorInfo,
        description: "El XMP identifica al autor del archivo",
    },
    XmpFieldSpec {
        property: "dc:rights",
        severity: Severity::High,
        kind: ConcernKind::Copyright,
        description: "El XMP contiene un aviso de derechos con nombre del titular",
    },
    XmpFieldSpec {
        property: "exif:GPSLatitude",
        severity: Severity::High,
        kind: ConcernKind::GpsLocation,
        description: "El XMP contiene la latitud donde se tomó la imagen",
    },
    XmpFieldSpec {
        property: "exif:GPSLongitude",
        severity: Severity::High,
        kind: ConcernKind::GpsLocation,
        description: "El XMP contiene la longitud donde se tomó la imagen",
    },
    XmpFieldSpec {
        property: "dc:title",
        severity: Severity::Medium,
        kind: ConcernKind::Title,
        description: "El XMP incluye un título",
    },
    XmpFieldSpec {
        property: "dc:description",
        severity: Severity::Medium,
        kind: ConcernKind::Description,
        description: "El XMP incluye una descripción",
    },
    XmpFieldSpec {
        property: "dc:subject",
        severity: Severity::Medium,
        kind: ConcernKind::Keywords,
        description: "El XMP incluye palabras clave",
    },
    XmpFieldSpec {
        property: "xmp:CreatorTool",
        severity: Severity::Medium,
        kind: ConcernKind::SoftwareInfo,
        description: "El XMP revela la herramienta usada para crear o editar el archivo",
    },
    XmpFieldSpec {
        property: "photoshop:City",
        severity: Severity::Medium,
        kind: ConcernKind::LocationInfo,
        description: "El XMP indica la ciudad asociada al contenido",
    },
    XmpFieldSpec {
        property: "photoshop:Country",
        severity: Severity::Medium,
        kind: ConcernKind::LocationInfo,
        description: "El XMP indica el país asociado al contenido",
    },
    XmpFieldSpec {
        property: "xmp:CreateDate",
        severity: Severity::Low,
        kind: ConcernKind::DateInfo,
        description: "El XMP registra la fecha de creación",
    },
    XmpFieldSpec {
        property: "xmp:ModifyDate",
        severity: Severity::Low,
        kind: ConcernKind::DateInfo,
        description: "El XMP registra la fecha de modificación",
    },
];

struct XmpPattern {
    spec: &'static XmpFieldSpec,
    element: Regex,
    attribute: Regex,
}

static PATTERNS: LazyLock<Vec<XmpPattern>> = LazyLock::new(|| {
    XMP_FIELDS
        .iter()
        .map(|spec| {
            let name = regex::escape(spec.property);
            XmpPattern {
                spec,
                element: Regex::new(&format!(r"(?s)<{name}(?:\s[^>]*)?>(.*?)</{name}>"))
                    .expect("patrón XMP de elemento válido"),
                attribute: Regex::new(&format!(r#"[\s<]{name}\s*=\s*(?:"([^"]*)"|'([^']*)')"#))
                    .expect("patrón XMP de atributo válido"),
            }
        })
        .collect()
});

static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<rdf:li(?:\s[^>]*)?>(.*?)</rdf:li>").expect("patrón rdf:li válido"));

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("patrón de etiqueta válido"));

/// Localiza el paquete XMP dentro de los bytes crudos de un archivo.
pub fn find_packet(bytes: &[u8]) -> Option<String> {
    slice_between(bytes, b"<x:xmpmeta", b"</x:xmpmeta>")
        .or_else(|| slice_between(bytes, b"<rdf:RDF", b"</rdf:RDF>"))
        .map(|packet| String::from_utf8_lossy(packet).into_owned())
}

pub fn has_packet(bytes: &[u8]) -> bool {
    find_packet(bytes).is_some()
}

/// Agrega las preocupaciones del paquete XMP a las ya detectadas.
///
/// `dc:creator` se omite si otra capa ya marcó al autor, y se descarta
/// cualquier hallazgo cuyo tipo y valor repitan uno anterior.
pub fn collect_concerns(packet: &str, concerns: &mut Vec<Concern>) {
    let author_flagged = concerns
        .iter()
        .any(|concern| concern.kind == ConcernKind::AuthorInfo);

    for pattern in PATTERNS.iter() {
        let spec = pattern.spec;
        if spec.kind == ConcernKind::AuthorInfo && author_flagged {
            continue;
        }

        let Some(value) = extract_value(packet, pattern) else {
            continue;
        };

        let duplicate = concerns
            .iter()
            .any(|concern| concern.kind == spec.kind && concern.value == value);
        if duplicate {
            continue;
        }

        concerns.push(Concern::new(
            spec.severity,
            spec.kind,
            spec.property,
            value,
            spec.description,
        ));
    }
}

fn extract_value(packet: &str, pattern: &XmpPattern) -> Option<String> {
    let mut values: Vec<String> = Vec::new();

    for captures in pattern.element.captures_iter(packet) {
        let inner = &captures[1];
        if inner.contains("<rdf:li") {
            values.extend(LIST_ITEM.captures_iter(inner).map(|item| clean_text(&item[1])));
        } else {
            values.push(clean_text(inner));
        }
    }

    for captures in pattern.attribute.captures_iter(packet) {
        if let Some(value) = captures.get(1).or_else(|| captures.get(2)) {
            values.push(clean_text(value.as_str()));
        }
    }

    let mut unique: Vec<String> = Vec::new();
    for value in values {
        if value.is_empty() || value.len() > MAX_XMP_VALUE_LEN || unique.contains(&value) {
            continue;
        }
        unique.push(value);
    }

    (!unique.is_empty()).then(|| unique.join(", "))
}

fn clean_text(raw: &str) -> String {
    let text = TAG.replace_all(raw, "");
    unescape_entities(text.trim())
}

fn unescape_entities(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn slice_between<'a>(bytes: &'a [u8], start_tag: &[u8], end_tag: &[u8]) -> Option<&'a [u8]> {
    let start = find_bytes(bytes, start_tag)?;
    let end = find_bytes(&bytes[start..], end_tag)?;
    Some(&bytes[start..start + end + end_tag.len()])
}

pub(crate) fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NESTED: &str = r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/">
 <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about="" xmp:CreatorTool="Adobe Photoshop 25.0"
     xmp:CreateDate="2024-03-01T10:00:00">
   <dc:creator><rdf:Seq><rdf:li>Jane Doe</rdf:li></rdf:Seq></dc:creator>
   <dc:title><rdf:Alt><rdf:li xml:lang="x-default">Atardecer</rdf:li></rdf:Alt></dc:title>
   <dc:subject><rdf:Bag><rdf:li>playa</rdf:li><rdf:li>viaje</rdf:li></rdf:Bag></dc:subject>
   <dc:rights>&#169; Jane &amp; Co</dc:rights>
  </rdf:Description>
 </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#;

    fn find<'a>(concerns: &'a [Concern], property: &str) -> Option<&'a Concern> {
        concerns.iter().find(|concern| concern.field == property)
    }

    #[test]
    fn extracts_nested_attribute_and_flat_forms() {
        let mut concerns = Vec::new();
        collect_concerns(NESTED, &mut concerns);

        let creator = find(&concerns, "dc:creator").map(|c| c.value.as_str());
        assert_eq!(creator, Some("Jane Doe"));
        let title = find(&concerns, "dc:title").map(|c| c.value.as_str());
        assert_eq!(title, Some("Atardecer"));
        let subject = find(&concerns, "dc:subject").map(|c| c.value.as_str());
        assert_eq!(subject, Some("playa, viaje"));
        let tool = find(&concerns, "xmp:CreatorTool").map(|c| c.value.as_str());
        assert_eq!(tool, Some("Adobe Photoshop 25.0"));
        let rights = find(&concerns, "dc:rights").map(|c| c.value.as_str());
        assert_eq!(rights, Some("&#169; Jane & Co"));
        assert!(find(&concerns, "xmp:CreateDate").is_some_and(|c| c.severity == Severity::Low));
    }

    #[test]
    fn flat_element_form_is_supported() {
        let packet = "<rdf:RDF><rdf:Description><dc:title>Informe</dc:title></rdf:Description></rdf:RDF>";
        let mut concerns = Vec::new();
        collect_concerns(packet, &mut concerns);
        assert_eq!(concerns.len(), 1);
        assert_eq!(concerns[0].kind, ConcernKind::Title);
        assert_eq!(concerns[0].value, "Informe");
    }

    #[test]
    fn creator_is_skipped_when_author_already_flagged() {
        let mut concerns = vec![Concern::high(
            ConcernKind::AuthorInfo,
            "Artist",
            "Otra Persona",
            "autor",
        )];
        collect_concerns(NESTED, &mut concerns);
        let authors = concerns
            .iter()
            .filter(|concern| concern.kind == ConcernKind::AuthorInfo)
            .count();
        assert_eq!(authors, 1);
    }

    #[test]
    fn duplicates_by_kind_and_value_are_dropped() {
        let mut concerns = vec![Concern::medium(
            ConcernKind::SoftwareInfo,
            "Software",
            "Adobe Photoshop 25.0",
            "software",
        )];
        collect_concerns(NESTED, &mut concerns);
        let software = concerns
            .iter()
            .filter(|concern| concern.kind == ConcernKind::SoftwareInfo)
            .count();
        assert_eq!(software, 1);
    }

    #[test]
    fn finds_packet_in_binary_data() {
        let mut bytes = vec![0xFF, 0xD8, 0x00, 0x13];
        bytes.extend_from_slice(NESTED.as_bytes());
        bytes.extend_from_slice(&[0xFF, 0xD9]);

        let packet = find_packet(&bytes);
        assert!(packet.as_deref().is_some_and(|p| p.starts_with("<x:xmpmeta")));
        assert!(packet.as_deref().is_some_and(|p| p.ends_with("</x:xmpmeta>")));
        assert!(!has_packet(&[0xFF, 0xD8, 0xFF, 0xD9]));
    }
}
