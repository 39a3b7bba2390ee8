//! Limpieza del diccionario Info y del XMP de catálogo en PDFs.

use chrono::{DateTime, Local};
use lopdf::{Dictionary, Document, Object};

use super::Stripper;
use crate::error::{Error, Result};

pub struct PdfStripper<'a> {
    signature: &'a str,
}

impl<'a> PdfStripper<'a> {
    pub fn new(signature: &'a str) -> Self {
        Self { signature }
    }

    /// Info nuevo: solo la firma del motor y las fechas reiniciadas.
    fn clean_info(&self, now: &DateTime<Local>) -> Dictionary {
        let date = pdf_date(now);
        let mut info = Dictionary::new();
        info.set("Producer", Object::string_literal(self.signature));
        info.set("CreationDate", Object::string_literal(date.as_str()));
        info.set("ModDate", Object::string_literal(date.as_str()));
        info
    }
}

impl Stripper for PdfStripper<'_> {
    fn strip(&self, bytes: &[u8], _extension: &str) -> Result<Vec<u8>> {
        let mut doc = Document::load_mem(bytes)?;
        let info = self.clean_info(&Local::now());

        let info_id = doc.trailer.get(b"Info").and_then(Object::as_reference).ok();
        match info_id {
            Some(id) => {
                doc.objects.insert(id, Object::Dictionary(info));
            }
            None => {
                let id = doc.add_object(info);
                doc.trailer.set("Info", id);
            }
        }

        let root_id = doc.trailer.get(b"Root").and_then(Object::as_reference).ok();
        if let Some(root_id) = root_id
            && let Ok(catalog) = doc.get_object_mut(root_id).and_then(Object::as_dict_mut)
        {
            catalog.remove(b"Metadata");
        }
        doc.prune_objects();

        let mut output = Vec::new();
        doc.save_to(&mut output).map_err(|err| Error::PdfWrite {
            message: err.to_string(),
        })?;
        Ok(output)
    }
}

/// Fecha en formato PDF: `D:AAAAMMDDHHmmSS+HH'mm'`.
fn pdf_date(now: &DateTime<Local>) -> String {
    let offset = now.format("%z").to_string();
    let (hours, minutes) = offset.split_at(offset.len().saturating_sub(2));
    format!("D:{}{hours}'{minutes}'", now.format("%Y%m%d%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn pdf_date_uses_apostrophe_offset() {
        let now = Local
            .with_ymd_and_hms(2024, 3, 1, 9, 30, 5)
            .single()
            .expect("fecha válida");
        let date = pdf_date(&now);
        assert!(date.starts_with("D:20240301093005"));
        assert!(date.ends_with('\''));
        assert_eq!(date.matches('\'').count(), 2);
    }
}
