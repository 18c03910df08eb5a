//! In-memory encoding with format dispatch.
//!
//! JPEG honors the quality parameter (clamped to 1-100); PNG is
//! lossless and ignores it. Both codecs come from the `image` crate and
//! write into a fully-buffered `Vec<u8>` so persistence is a single
//! bulk write.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

use crate::decode::DecodedImage;
use crate::OutputFormat;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The codec itself failed
    #[error("{format:?} encoding failed: {message}")]
    EncodingFailed {
        format: OutputFormat,
        message: String,
    },
}

/// Encode an image to an in-memory byte buffer.
///
/// # Arguments
///
/// * `image` - RGB pixel buffer with its dimensions
/// * `format` - Target codec
/// * `quality` - Lossy quality (1-100, clamped); ignored for PNG
///
/// # Errors
///
/// Returns `EncodeError::InvalidDimensions` or
/// `EncodeError::InvalidPixelData` for malformed input, and
/// `EncodeError::EncodingFailed` if the codec reports an error.
pub fn encode_image(
    image: &DecodedImage,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    if image.width == 0 || image.height == 0 {
        return Err(EncodeError::InvalidDimensions {
            width: image.width,
            height: image.height,
        });
    }

    let expected_len = (image.width as usize) * (image.height as usize) * 3;
    if image.pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: image.pixels.len(),
        });
    }

    let quality = quality.clamp(1, 100);

    let mut buffer = Cursor::new(Vec::new());
    let result = match format {
        OutputFormat::Jpeg => JpegEncoder::new_with_quality(&mut buffer, quality).write_image(
            &image.pixels,
            image.width,
            image.height,
            ExtendedColorType::Rgb8,
        ),
        OutputFormat::Png => PngEncoder::new(&mut buffer).write_image(
            &image.pixels,
            image.width,
            image.height,
            ExtendedColorType::Rgb8,
        ),
    };

    result.map_err(|e| EncodeError::EncodingFailed {
        format,
        message: e.to_string(),
    })?;

    Ok(buffer.into_inner())
}


// ============================================================================
// Property-Based Tests
// ============================================================================
