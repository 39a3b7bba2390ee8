use super::*;
use crate::analyzer::{ImageAnalyzer, PdfAnalyzer, xmp};
use crate::error::Error;
use crate::report::FormatMetadata;
use crate::test_support::{
    FakeTranscoder, LeakyCodec, RecordingMetadataTool, TestResult, animated_gif, jpeg_with_gps,
    pdf_with_info, png_with_trailing_text, png_with_xmp, recorded,
};
use crate::tools::ImageCrateCodec;
use ::image::AnimationDecoder;
use ::image::codecs::gif::GifDecoder;
use std::io::Cursor;

#[test]
fn reencoding_removes_exif_from_jpeg() -> TestResult {
    let tool = RecordingMetadataTool::default();
    let stripper = ImageStripper::new(&ImageCrateCodec, &tool);

    let cleaned = stripper.strip(&jpeg_with_gps(Some("Jane Doe")), "jpg")?;

    let analysis = ImageAnalyzer::new(&ImageCrateCodec).analyze_bytes(&cleaned, "jpg")?;
    assert!(analysis.concerns.is_empty(), "{:?}", analysis.concerns);
    assert!(recorded(&tool.calls).is_empty(), "no debe usarse el respaldo");
    Ok(())
}

#[test]
fn stripping_twice_stays_clean() -> TestResult {
    let tool = RecordingMetadataTool::default();
    let stripper = ImageStripper::new(&ImageCrateCodec, &tool);

    let once = stripper.strip(&png_with_xmp(), "png")?;
    let twice = stripper.strip(&once, "png")?;

    let analysis = ImageAnalyzer::new(&ImageCrateCodec).analyze_bytes(&twice, "png")?;
    assert!(analysis.concerns.is_empty());
    assert!(!xmp::has_packet(&twice));
    Ok(())
}

#[test]
fn trailing_png_text_is_removed() -> TestResult {
    let tool = RecordingMetadataTool::default();
    let stripper = ImageStripper::new(&ImageCrateCodec, &tool);

    let cleaned = stripper.strip(&png_with_trailing_text("Author", "Jane Doe"), "png")?;

    let analysis = ImageAnalyzer::new(&ImageCrateCodec).analyze_bytes(&cleaned, "png")?;
    assert!(analysis.concerns.is_empty(), "{:?}", analysis.concerns);
    Ok(())
}

#[test]
fn animated_gif_survives_stripping() -> TestResult {
    let tool = RecordingMetadataTool::default();
    let stripper = ImageStripper::new(&ImageCrateCodec, &tool);
    let gif = animated_gif(&[[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]]);

    let cleaned = stripper.strip(&gif, "gif")?;

    let frames = GifDecoder::new(Cursor::new(&cleaned))?
        .into_frames()
        .collect_frames()?;
    assert_eq!(frames.len(), 3);
    Ok(())
}

#[test]
fn residual_xmp_triggers_fallback_and_cleans_temp_file() -> TestResult {
    let tool = RecordingMetadataTool::default();
    let stripper = ImageStripper::new(&LeakyCodec, &tool);

    let cleaned = stripper.strip(&png_with_xmp(), "png")?;

    assert!(!xmp::has_packet(&cleaned));
    let calls = recorded(&tool.calls);
    assert_eq!(calls.len(), 1);
    assert!(calls[0].to_string_lossy().ends_with(".png"));
    assert!(!calls[0].exists(), "el temporal debe eliminarse");
    Ok(())
}

#[test]
fn failed_fallback_reports_both_causes() -> TestResult {
    let tool = RecordingMetadataTool::failing();
    let stripper = ImageStripper::new(&LeakyCodec, &tool);

    let err = match stripper.strip(&png_with_xmp(), "png") {
        Err(err) => err,
        Ok(_) => return Err("se esperaba un error de verificación".into()),
    };

    match &err {
        Error::Verification { primary, fallback } => {
            assert!(primary.contains("XMP"));
            assert!(fallback.contains("fallo simulado"));
        }
        other => return Err(format!("error inesperado: {other}").into()),
    }
    let calls = recorded(&tool.calls);
    assert_eq!(calls.len(), 1);
    assert!(!calls[0].exists(), "el temporal debe eliminarse también al fallar");
    Ok(())
}

#[test]
fn pdf_strip_clears_info_and_signs_producer() -> TestResult {
    let pdf = pdf_with_info(&[
        ("Author", "Jane Doe"),
        ("Title", "Informe interno"),
        ("Producer", "Microsoft Word"),
    ]);

    let cleaned = PdfStripper::new("metascrub").strip(&pdf, "pdf")?;
    let analysis = PdfAnalyzer::new("metascrub").analyze_bytes(&cleaned)?;

    assert!(analysis.concerns.is_empty(), "{:?}", analysis.concerns);
    match analysis.format_metadata {
        Some(FormatMetadata::Pdf {
            pages,
            has_author,
            has_title,
            has_producer,
            has_xmp_metadata,
            ..
        }) => {
            assert_eq!(pages, 1);
            assert!(!has_author);
            assert!(!has_title);
            assert!(has_producer);
            assert!(!has_xmp_metadata);
        }
        other => return Err(format!("metadata inesperada: {other:?}").into()),
    }
    Ok(())
}

#[test]
fn pdf_strip_is_idempotent() -> TestResult {
    let stripper = PdfStripper::new("metascrub");
    let once = stripper.strip(&pdf_with_info(&[("Keywords", "secreto")]), "pdf")?;
    let twice = stripper.strip(&once, "pdf")?;
    let analysis = PdfAnalyzer::new("metascrub").analyze_bytes(&twice)?;
    assert!(analysis.concerns.is_empty());
    Ok(())
}

#[test]
fn video_strip_uses_temporary_files() -> TestResult {
    let transcoder = FakeTranscoder::default();
    let stripper = VideoStripper::new(&transcoder);

    let cleaned = stripper.strip(b"contenedor de video", "mp4")?;

    assert_eq!(cleaned, b"contenedor de video");
    let inputs = recorded(&transcoder.inputs);
    assert_eq!(inputs.len(), 1);
    assert!(inputs[0].to_string_lossy().ends_with(".mp4"));
    assert!(!inputs[0].exists());
    Ok(())
}

#[test]
fn unsupported_image_extension_is_a_missing_capability() {
    let tool = RecordingMetadataTool::default();
    let stripper = ImageStripper::new(&ImageCrateCodec, &tool);
    let result = stripper.strip(b"datos", "heic");
    assert!(matches!(result, Err(ref err) if err.missing_capability().is_some()));
}
