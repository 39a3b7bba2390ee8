//! Recodificación de imágenes con el crate `image`.

use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::metadata::{LoopCount, Orientation};
use image::{AnimationDecoder, DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use std::io::Cursor;

use super::ImageCodec;
use crate::error::{Error, Result};

const JPEG_QUALITY: u8 = 92;

/// Códec integrado; los codificadores de `image` no escriben EXIF, IPTC ni XMP.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageCrateCodec;

impl ImageCodec for ImageCrateCodec {
    fn supports(&self, extension: &str) -> Option<ImageFormat> {
        ImageFormat::from_extension(extension)
            .filter(|format| format.reading_enabled() && format.writing_enabled())
    }

    fn reencode(&self, bytes: &[u8], format: ImageFormat) -> Result<Vec<u8>> {
        match format {
            ImageFormat::Gif => return reencode_gif(bytes),
            ImageFormat::Png | ImageFormat::WebP if is_animated(bytes, format)? => {
                return Err(Error::codec(format!(
                    "La animación {format:?} no puede recodificarse sin perder cuadros"
                )));
            }
            _ => {}
        }

        let img = decode_oriented(bytes, format)?;
        let mut buffer = Vec::new();
        match format {
            ImageFormat::Jpeg => {
                let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
                let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
                rgb.write_with_encoder(encoder)
                    .map_err(|e| Error::codec(format!("No se pudo codificar JPEG: {e}")))?;
            }
            _ => {
                img.write_to(&mut Cursor::new(&mut buffer), format)
                    .map_err(|e| Error::codec(format!("No se pudo guardar la imagen limpia: {e}")))?;
            }
        }

        Ok(buffer)
    }
}

fn decode_error(err: image::ImageError) -> Error {
    Error::codec(format!("No se pudo decodificar la imagen: {err}"))
}

/// Decodifica y aplica la orientación EXIF a los píxeles, ya que la etiqueta
/// desaparece al recodificar.
fn decode_oriented(bytes: &[u8], format: ImageFormat) -> Result<DynamicImage> {
    let mut decoder = ImageReader::with_format(Cursor::new(bytes), format)
        .into_decoder()
        .map_err(decode_error)?;
    let orientation = decoder.orientation().unwrap_or_else(|err| {
        tracing::debug!(error = %err, "Orientación ilegible; se conserva la original");
        Orientation::NoTransforms
    });
    let mut img = DynamicImage::from_decoder(decoder).map_err(decode_error)?;
    img.apply_orientation(orientation);
    Ok(img)
}

fn is_animated(bytes: &[u8], format: ImageFormat) -> Result<bool> {
    match format {
        ImageFormat::Png => PngDecoder::new(Cursor::new(bytes))
            .and_then(|decoder| decoder.is_apng())
            .map_err(decode_error),
        ImageFormat::WebP => WebPDecoder::new(Cursor::new(bytes))
            .map(|decoder| decoder.has_animation())
            .map_err(decode_error),
        _ => Ok(false),
    }
}

/// Recodifica un GIF cuadro a cuadro para conservar la animación y sus repeticiones.
fn reencode_gif(bytes: &[u8]) -> Result<Vec<u8>> {
    let decoder = GifDecoder::new(Cursor::new(bytes)).map_err(decode_error)?;
    let repeat = match decoder.loop_count() {
        LoopCount::Infinite => Repeat::Infinite,
        LoopCount::Finite(count) => Repeat::Finite(u16::try_from(count.get()).unwrap_or(u16::MAX)),
    };
    let frames = decoder.into_frames().collect_frames().map_err(decode_error)?;

    let encode_error = |e: image::ImageError| Error::codec(format!("No se pudo codificar GIF: {e}"));
    let mut buffer = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut buffer);
        encoder.set_repeat(repeat).map_err(encode_error)?;
        encoder.encode_frames(frames).map_err(encode_error)?;
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestResult, animated_gif, animated_png, jpeg_with_orientation};

    #[test]
    fn supports_default_image_extensions() {
        let codec = ImageCrateCodec;
        for ext in ["jpg", "jpeg", "png", "gif", "webp", "tiff", "bmp"] {
            assert!(codec.supports(ext).is_some(), "{ext} debería estar disponible");
        }
        assert!(codec.supports("heic").is_none());
    }

    #[test]
    fn reencode_roundtrips_pixels() -> Result<()> {
        let img = DynamicImage::new_rgb8(3, 2);
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(Error::codec)?;

        let output = ImageCrateCodec.reencode(&png, ImageFormat::Png)?;
        let decoded = image::load_from_memory(&output).map_err(Error::codec)?;
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
        Ok(())
    }

    #[test]
    fn jpeg_orientation_is_applied_to_pixels() -> TestResult {
        let rotated = jpeg_with_orientation(6);
        let output = ImageCrateCodec.reencode(&rotated, ImageFormat::Jpeg)?;

        let decoded = image::load_from_memory(&output)?;
        assert_eq!((decoded.width(), decoded.height()), (6, 8));
        assert!(exif::Reader::new().read_from_container(&mut Cursor::new(&output)).is_err());
        Ok(())
    }

    #[test]
    fn gif_keeps_every_frame() -> TestResult {
        let gif = animated_gif(&[[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]]);
        let output = ImageCrateCodec.reencode(&gif, ImageFormat::Gif)?;

        let frames = GifDecoder::new(Cursor::new(&output))?
            .into_frames()
            .collect_frames()?;
        assert_eq!(frames.len(), 3);
        Ok(())
    }

    #[test]
    fn animated_png_is_refused_instead_of_flattened() {
        let result = ImageCrateCodec.reencode(&animated_png(), ImageFormat::Png);
        assert!(matches!(result, Err(Error::Codec { .. })));
    }
}
