use crate::error::{PipelineError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, ImageReader};
use std::io::Cursor;

pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Makes sure the upload is a JPEG. Bytes that already are JPEG pass through
/// untouched; anything else the `image` crate can decode is re-encoded at
/// `quality`.
pub fn to_jpeg(bytes: &[u8], quality: u8) -> Result<Vec<u8>> {
    if bytes.is_empty() {
        return Err(PipelineError::ImageEncodingFailed(
            "no image data".to_string(),
        ));
    }

    if matches!(image::guess_format(bytes), Ok(ImageFormat::Jpeg)) {
        return Ok(bytes.to_vec());
    }

    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PipelineError::ImageEncodingFailed(format!("Failed to read image: {}", e)))?
        .decode()
        .map_err(|e| PipelineError::ImageEncodingFailed(format!("Failed to decode image: {}", e)))?;

    // JPEG has no alpha channel
    let rgb = img.to_rgb8();

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| PipelineError::ImageEncodingFailed(format!("Failed to encode JPEG: {}", e)))?;

    tracing::debug!(
        input_bytes = bytes.len(),
        output_bytes = out.len(),
        quality,
        "Re-encoded image as JPEG"
    );

    Ok(out)
}

#[cfg(test)]
pub(crate) fn sample_png() -> Vec<u8> {
    let img = image::RgbaImage::from_fn(4, 3, |x, y| image::Rgba([x as u8 * 60, y as u8 * 80, 128, 200]));
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            to_jpeg(&[], DEFAULT_JPEG_QUALITY),
            Err(PipelineError::ImageEncodingFailed(_))
        ));
    }

    #[test]
    fn garbage_input_is_rejected() {
        let err = to_jpeg(b"definitely not an image", DEFAULT_JPEG_QUALITY).unwrap_err();
        assert!(matches!(err, PipelineError::ImageEncodingFailed(_)));
    }

    #[test]
    fn jpeg_passes_through_unchanged() {
        let jpeg = to_jpeg(&sample_png(), DEFAULT_JPEG_QUALITY).unwrap();
        let again = to_jpeg(&jpeg, 10).unwrap();
        assert_eq!(again, jpeg);
    }

    #[test]
    fn png_is_reencoded_as_jpeg() {
        let jpeg = to_jpeg(&sample_png(), DEFAULT_JPEG_QUALITY).unwrap();
        assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
    }
}
