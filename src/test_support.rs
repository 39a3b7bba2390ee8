//! Fixtures generadas en código y dobles de las capacidades externas.

use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use lopdf::{Document, Object, dictionary};
use std::cell::RefCell;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::tools::{
    Capabilities, ExternalMetadataTool, ExternalTranscoder, ImageCodec, ImageCrateCodec,
    MediaProbe, VersionControl,
};

pub type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

pub const SAMPLE_XMP: &str = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"><rdf:Description rdf:about="" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:creator><rdf:Seq><rdf:li>Jane Doe</rdf:li></rdf:Seq></dc:creator></rdf:Description></rdf:RDF></x:xmpmeta>"#;

fn sample_pixels() -> RgbImage {
    RgbImage::from_fn(8, 6, |x, y| Rgb([(x * 30) as u8, (y * 40) as u8, 128]))
}

pub fn plain_jpeg() -> Vec<u8> {
    encode(ImageFormat::Jpeg)
}

pub fn plain_png() -> Vec<u8> {
    encode(ImageFormat::Png)
}

fn encode(format: ImageFormat) -> Vec<u8> {
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(sample_pixels())
        .write_to(&mut Cursor::new(&mut buffer), format)
        .expect("codificar fixture");
    buffer
}

/// Inserta un segmento justo después del SOI de un JPEG.
pub fn jpeg_with_segment(jpeg: &[u8], marker: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, marker]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Carga útil APP13 con un recurso 8BIM 0x0404 que contiene los datasets IPTC dados.
pub fn iptc_segment(datasets: &[(u8, &str)]) -> Vec<u8> {
    let mut iim = Vec::new();
    for (number, value) in datasets {
        iim.extend_from_slice(&[0x1C, 2, *number]);
        iim.extend_from_slice(&(value.len() as u16).to_be_bytes());
        iim.extend_from_slice(value.as_bytes());
    }

    let mut payload = b"Photoshop 3.0\0".to_vec();
    payload.extend_from_slice(b"8BIM");
    payload.extend_from_slice(&0x0404u16.to_be_bytes());
    payload.extend_from_slice(&[0, 0]);
    payload.extend_from_slice(&(iim.len() as u32).to_be_bytes());
    payload.extend_from_slice(&iim);
    if iim.len() % 2 == 1 {
        payload.push(0);
    }
    payload
}

fn rationals(values: &[(u32, u32)]) -> Value {
    Value::Rational(
        values
            .iter()
            .map(|&(num, denom)| Rational { num, denom })
            .collect(),
    )
}

fn ascii(text: &str) -> Value {
    Value::Ascii(vec![text.as_bytes().to_vec()])
}

/// JPEG con EXIF: GPS 40.7, -74.0 y, opcionalmente, `Artist`.
pub fn jpeg_with_gps(artist: Option<&str>) -> Vec<u8> {
    let mut fields = vec![
        Field {
            tag: Tag::Orientation,
            ifd_num: In::PRIMARY,
            value: Value::Short(vec![1]),
        },
        Field {
            tag: Tag::GPSLatitudeRef,
            ifd_num: In::PRIMARY,
            value: ascii("N"),
        },
        Field {
            tag: Tag::GPSLatitude,
            ifd_num: In::PRIMARY,
            value: rationals(&[(40, 1), (42, 1), (0, 1)]),
        },
        Field {
            tag: Tag::GPSLongitudeRef,
            ifd_num: In::PRIMARY,
            value: ascii("W"),
        },
        Field {
            tag: Tag::GPSLongitude,
            ifd_num: In::PRIMARY,
            value: rationals(&[(74, 1), (0, 1), (0, 1)]),
        },
    ];
    if let Some(artist) = artist {
        fields.push(Field {
            tag: Tag::Artist,
            ifd_num: In::PRIMARY,
            value: ascii(artist),
        });
    }

    jpeg_with_exif(&fields)
}

/// JPEG de 8×6 cuyo EXIF solo declara la orientación indicada.
pub fn jpeg_with_orientation(orientation: u16) -> Vec<u8> {
    jpeg_with_exif(&[Field {
        tag: Tag::Orientation,
        ifd_num: In::PRIMARY,
        value: Value::Short(vec![orientation]),
    }])
}

fn jpeg_with_exif(fields: &[Field]) -> Vec<u8> {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).expect("escribir EXIF");

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&tiff.into_inner());
    jpeg_with_segment(&plain_jpeg(), 0xE1, &payload)
}

/// GIF animado con un cuadro de color liso por cada color dado.
pub fn animated_gif(colors: &[[u8; 4]]) -> Vec<u8> {
    let frames = colors.iter().map(|color| {
        Frame::from_parts(
            RgbaImage::from_pixel(4, 4, Rgba(*color)),
            0,
            0,
            Delay::from_numer_denom_ms(100, 1),
        )
    });
    let mut buffer = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut buffer);
        encoder.set_repeat(Repeat::Infinite).expect("repetición GIF");
        encoder.encode_frames(frames).expect("cuadros GIF");
    }
    buffer
}

/// PNG animado (APNG) con dos cuadros.
pub fn animated_png() -> Vec<u8> {
    let pixels = sample_pixels();
    let mut buffer = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buffer, pixels.width(), pixels.height());
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_animated(2, 0).expect("declarar animación");
        let mut writer = encoder.write_header().expect("cabecera PNG");
        for _ in 0..2 {
            writer
                .write_image_data(pixels.as_raw())
                .expect("cuadro PNG");
        }
        writer.finish().expect("cerrar PNG");
    }
    buffer
}

/// PNG con el paquete XMP de ejemplo en un chunk iTXt sin comprimir.
pub fn png_with_xmp() -> Vec<u8> {
    png_with_text(&[("XML:com.adobe.xmp", SAMPLE_XMP)])
}

pub fn png_with_text(chunks: &[(&str, &str)]) -> Vec<u8> {
    let pixels = sample_pixels();
    let mut buffer = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buffer, pixels.width(), pixels.height());
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        for (keyword, text) in chunks {
            encoder
                .add_itxt_chunk(keyword.to_string(), text.to_string())
                .expect("agregar iTXt");
        }
        let mut writer = encoder.write_header().expect("cabecera PNG");
        writer
            .write_image_data(pixels.as_raw())
            .expect("datos PNG");
        writer.finish().expect("cerrar PNG");
    }
    buffer
}

/// PNG con un chunk tEXt escrito después de los datos de imagen.
pub fn png_with_trailing_text(keyword: &str, text: &str) -> Vec<u8> {
    let pixels = sample_pixels();
    let mut buffer = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buffer, pixels.width(), pixels.height());
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().expect("cabecera PNG");
        writer
            .write_image_data(pixels.as_raw())
            .expect("datos PNG");
        writer
            .write_text_chunk(&png::text_metadata::TEXtChunk::new(keyword, text))
            .expect("agregar tEXt");
        writer.finish().expect("cerrar PNG");
    }
    buffer
}

/// PDF de una página con las entradas Info indicadas.
pub fn pdf_with_info(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0_i64.into(), 0_i64.into(), 595_i64.into(), 842_i64.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1_i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut info = lopdf::Dictionary::new();
    for (key, value) in entries {
        info.set(key.as_bytes().to_vec(), Object::string_literal(*value));
    }
    let info_id = doc.add_object(info);
    doc.trailer.set("Info", info_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).expect("guardar PDF");
    out
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("crear directorio");
    }
    fs::write(&path, bytes).expect("escribir fixture");
    path
}

/// Códec que no elimina nada: simula un codificador que conserva el XMP.
pub struct LeakyCodec;

impl ImageCodec for LeakyCodec {
    fn supports(&self, extension: &str) -> Option<ImageFormat> {
        ImageCrateCodec.supports(extension)
    }

    fn reencode(&self, bytes: &[u8], _format: ImageFormat) -> Result<Vec<u8>> {
        Ok(bytes.to_vec())
    }
}

/// Códec sin soporte para ningún formato (modo degradado).
pub struct UnavailableCodec;

impl ImageCodec for UnavailableCodec {
    fn supports(&self, _extension: &str) -> Option<ImageFormat> {
        None
    }

    fn reencode(&self, _bytes: &[u8], _format: ImageFormat) -> Result<Vec<u8>> {
        Err(Error::codec("sin códec"))
    }
}

pub type CallLog = Arc<Mutex<Vec<PathBuf>>>;

pub fn recorded(log: &CallLog) -> Vec<PathBuf> {
    log.lock().map(|calls| calls.clone()).unwrap_or_default()
}

/// Herramienta de respaldo falsa: recodifica el archivo y anota la ruta recibida.
#[derive(Default)]
pub struct RecordingMetadataTool {
    pub calls: CallLog,
    pub fail: bool,
}

impl RecordingMetadataTool {
    pub fn failing() -> Self {
        Self {
            calls: CallLog::default(),
            fail: true,
        }
    }
}

impl ExternalMetadataTool for RecordingMetadataTool {
    fn remove_all(&self, path: &Path) -> Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(path.to_path_buf());
        }
        if self.fail {
            return Err(Error::ExternalTool {
                tool: "exiftool".to_string(),
                message: "fallo simulado".to_string(),
            });
        }
        let bytes = fs::read(path).map_err(|err| Error::io(path, err))?;
        let format = image::guess_format(&bytes).map_err(Error::codec)?;
        let clean = ImageCrateCodec.reencode(&bytes, format)?;
        fs::write(path, clean).map_err(|err| Error::io(path, err))
    }
}

/// Transcodificador falso: devuelve etiquetas fijas y remuxa copiando sin cambios.
#[derive(Default)]
pub struct FakeTranscoder {
    pub tags: Vec<(String, String)>,
    pub inputs: CallLog,
}

impl FakeTranscoder {
    pub fn with_tags(tags: &[(&str, &str)]) -> Self {
        Self {
            tags: tags
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            inputs: CallLog::default(),
        }
    }
}

impl ExternalTranscoder for FakeTranscoder {
    fn probe(&self, input: &Path) -> Result<MediaProbe> {
        let size = fs::metadata(input).map_err(|err| Error::io(input, err))?.len();
        Ok(MediaProbe {
            format_name: Some("mov,mp4,m4a,3gp,3g2,mj2".to_string()),
            duration_seconds: Some(3.5),
            size_bytes: Some(size),
            bit_rate: Some(128_000),
            tags: self.tags.iter().cloned().collect(),
        })
    }

    fn remux(&self, input: &Path, output: &Path) -> Result<()> {
        if let Ok(mut inputs) = self.inputs.lock() {
            inputs.push(input.to_path_buf());
        }
        fs::copy(input, output).map_err(|err| Error::io(input, err))?;
        Ok(())
    }
}

/// Control de versiones en memoria.
#[derive(Default)]
pub struct FakeVcs {
    pub staged: Vec<PathBuf>,
    pub restaged: RefCell<Vec<PathBuf>>,
}

impl VersionControl for FakeVcs {
    fn staged_files(&self) -> Result<Vec<PathBuf>> {
        Ok(self.staged.clone())
    }

    fn stage(&self, paths: &[PathBuf]) -> Result<()> {
        self.restaged.borrow_mut().extend_from_slice(paths);
        Ok(())
    }
}

pub fn fake_capabilities() -> Capabilities {
    Capabilities {
        codec: Box::new(ImageCrateCodec),
        transcoder: Box::new(FakeTranscoder::default()),
        metadata_tool: Box::new(RecordingMetadataTool::default()),
    }
}
