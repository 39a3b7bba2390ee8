//! Configuración explícita del motor; se entrega una vez al construirlo.

use serde::{Deserialize, Serialize};

pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "tiff", "bmp"];
pub const DEFAULT_PDF_EXTENSIONS: &[&str] = &["pdf"];
pub const DEFAULT_VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "wmv", "flv", "webm", "mkv"];

/// Firma que el motor deja en el campo `Producer` de los PDFs que limpia.
pub const DEFAULT_PRODUCER_SIGNATURE: &str = "metascrub";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    pub image_extensions: Vec<String>,
    pub pdf_extensions: Vec<String>,
    pub video_extensions: Vec<String>,
    pub producer_signature: String,
    /// Copia `<nombre>.backup` antes de modificar cada archivo.
    pub backup: bool,
    pub follow_symlinks: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            image_extensions: to_owned_list(DEFAULT_IMAGE_EXTENSIONS),
            pdf_extensions: to_owned_list(DEFAULT_PDF_EXTENSIONS),
            video_extensions: to_owned_list(DEFAULT_VIDEO_EXTENSIONS),
            producer_signature: DEFAULT_PRODUCER_SIGNATURE.to_string(),
            backup: false,
            follow_symlinks: false,
        }
    }
}

impl EngineConfig {
    pub fn with_image_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.image_extensions = normalize_extensions(extensions);
        self
    }

    pub fn with_pdf_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.pdf_extensions = normalize_extensions(extensions);
        self
    }

    pub fn with_video_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.video_extensions = normalize_extensions(extensions);
        self
    }

    pub fn with_producer_signature(mut self, signature: impl Into<String>) -> Self {
        self.producer_signature = signature.into();
        self
    }

    pub fn with_backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Convierte una lista separada por comas (`"jpg, .PNG"`) en extensiones normalizadas.
    pub fn parse_extension_list(input: &str) -> Vec<String> {
        normalize_extensions(input.split(','))
    }
}

fn normalize_extensions<I, S>(extensions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for ext in extensions {
        let ext = ext.as_ref().trim().trim_start_matches('.').to_lowercase();
        if !ext.is_empty() && !normalized.contains(&ext) {
            normalized.push(ext);
        }
    }
    normalized
}

fn to_owned_list(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_extension_list_normalizes_entries() {
        let parsed = EngineConfig::parse_extension_list(" jpg, .PNG,,heic ,jpg");
        assert_eq!(parsed, vec!["jpg", "png", "heic"]);
    }

    #[test]
    fn overrides_replace_only_their_category() {
        let config = EngineConfig::default().with_video_extensions(["m4v"]);
        assert_eq!(config.video_extensions, vec!["m4v"]);
        assert_eq!(config.pdf_extensions, vec!["pdf"]);
        assert!(config.image_extensions.contains(&"webp".to_string()));
    }
}
