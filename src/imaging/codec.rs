//! Decode, resize, and encode over in-memory buffers.
//!
//! Every function is deterministic given its inputs — fixed resampling
//! filter, fixed encoder settings, no randomness, no clock — which is what
//! makes re-processing an unchanged source a byte-identical no-op.

use super::params::{OutputFormat, Quality};
use image::DynamicImage;
use image::imageops::FilterType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
}

/// Decode an image from raw bytes, guessing the format from its content.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, CodecError> {
    image::load_from_memory(bytes).map_err(|e| CodecError::Decode(e.to_string()))
}

/// Resize to exact dimensions with Lanczos3.
pub fn resize(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    img.resize_exact(width, height, FilterType::Lanczos3)
}

/// Encode to the configured output format at the given quality.
pub fn encode(
    img: &DynamicImage,
    format: OutputFormat,
    quality: Quality,
) -> Result<Vec<u8>, CodecError> {
    match format {
        OutputFormat::Webp => encode_webp(img, quality),
        OutputFormat::Jpeg => encode_jpeg(img, quality),
    }
}

/// Lossy WebP through libwebp. The `image` crate's own WebP encoder is
/// lossless-only, so quality-controlled encoding goes through the `webp`
/// crate instead.
fn encode_webp(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, CodecError> {
    let rgba = img.to_rgba8();
    let encoder = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height());
    let memory = encoder
        .encode_simple(false, quality.value() as f32)
        .map_err(|e| CodecError::Encode(format!("webp: {e:?}")))?;
    Ok(memory.to_vec())
}

fn encode_jpeg(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, CodecError> {
    use image::ImageEncoder;

    // JPEG has no alpha channel.
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality.value() as u8);
    encoder
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| CodecError::Encode(format!("jpeg: {e}")))?;
    Ok(buf)
}
