use crate::report::FormatMetadata;

const MAX_VALUE_CHARS: usize = 60;

pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["bytes", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit_index = 0;

    while value >= 1024.0 && unit_index < UNITS.len() - 1 {
        value /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{bytes} bytes")
    } else {
        format!("{value:.2} {}", UNITS[unit_index])
    }
}

/// Recorta valores largos (descripciones, XMP) para que la tabla siga legible.
pub fn truncate_value(value: &str) -> String {
    let single_line = value.replace(['\n', '\r'], " ");
    if single_line.chars().count() <= MAX_VALUE_CHARS {
        return single_line;
    }
    let cut: String = single_line.chars().take(MAX_VALUE_CHARS - 1).collect();
    format!("{cut}…")
}

pub fn describe_format(metadata: &FormatMetadata) -> String {
    match metadata {
        FormatMetadata::Image {
            width,
            height,
            format,
            ..
        } => format!("{format} {width}×{height}"),
        FormatMetadata::Pdf { pages, version, .. } => {
            let noun = if *pages == 1 { "página" } else { "páginas" };
            format!("PDF {version}, {pages} {noun}")
        }
        FormatMetadata::Video {
            format_name,
            duration_seconds,
            size_bytes,
            ..
        } => {
            let mut parts = vec![format_name.clone().unwrap_or_else(|| "video".to_string())];
            if let Some(seconds) = duration_seconds {
                parts.push(format!("{seconds:.1} s"));
            }
            if let Some(size) = size_bytes {
                parts.push(format_size(*size));
            }
            parts.join(", ")
        }
    }
}
