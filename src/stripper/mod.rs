//! Limpiadores de metadata por categoría.
//!
//! Todos transforman bytes en bytes; la escritura sobre disco (respaldo y
//! reemplazo atómico) la hace el motor con [`files`].

pub mod files;
mod image;
mod pdf;
mod video;

#[cfg(test)]
mod tests;

use crate::error::Result;

pub use image::ImageStripper;
pub use pdf::PdfStripper;
pub use video::VideoStripper;

pub trait Stripper {
    /// Devuelve una copia de `bytes` sin metadata. `extension` va en minúsculas y sin punto.
    fn strip(&self, bytes: &[u8], extension: &str) -> Result<Vec<u8>>;
}
