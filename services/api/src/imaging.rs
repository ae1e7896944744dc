//! services/api/src/imaging.rs
//!
//! Decoding of uploaded room photos and conversion to the JPEG payloads and
//! data URLs the rest of the service works with.

use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum ImagingError {
    #[error("Failed to read file: {0}")]
    Decode(String),
    #[error("Failed to encode image to JPEG: {0}")]
    Encode(String),
}

/// Decodes any supported raster upload and re-encodes it as JPEG.
pub fn normalize_upload(raw: &[u8]) -> Result<Bytes, ImagingError> {
    let img = image::load_from_memory(raw).map_err(|e| ImagingError::Decode(e.to_string()))?;
    info!("Decoded upload: {}x{}", img.width(), img.height());

    let jpeg = encode_to_jpeg(&img)?;
    info!("Encoded upload to JPEG: {} bytes", jpeg.len());
    Ok(Bytes::from(jpeg))
}

fn encode_to_jpeg(img: &DynamicImage) -> Result<Vec<u8>, ImagingError> {
    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buffer = Cursor::new(Vec::new());
    rgb.write_to(&mut buffer, ImageFormat::Jpeg)
        .map_err(|e| ImagingError::Encode(e.to_string()))?;
    Ok(buffer.into_inner())
}

/// Renders a JPEG payload as a `data:` URL an `<img>` element can show directly.
pub fn jpeg_data_url(jpeg: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(8, 6, Rgba([200, 120, 40, 128]));
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn png_upload_becomes_jpeg() {
        let jpeg = normalize_upload(&png_bytes()).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
    }

    #[test]
    fn garbage_upload_is_a_decode_error() {
        let err = normalize_upload(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ImagingError::Decode(_)));
        assert!(err.to_string().starts_with("Failed to read file"));
    }

    #[test]
    fn data_url_has_jpeg_prefix() {
        assert_eq!(jpeg_data_url(b"abc"), "data:image/jpeg;base64,YWJj");
    }
}
