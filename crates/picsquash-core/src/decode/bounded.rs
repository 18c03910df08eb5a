//! Bounded decoding: probe dimensions, pick an integer downsampling
//! divisor, decode, then rotate into the displayed orientation.
//!
//! The divisor is decided from the header dimensions before any pixel
//! allocation, and applied immediately after decode so the transient
//! full-resolution buffer is dropped before rotation and encoding. The
//! integer floor means the output can land somewhat below the exact
//! bound; the bound is a ceiling, not a fit target.

use std::path::Path;

use image::imageops;
use image::ImageReader;

use super::{DecodeError, DecodedImage};
use crate::orient::{resolve_rotation, Rotation};

/// Probe the declared pixel dimensions of `path` without decoding pixel
/// data.
///
/// # Errors
///
/// Returns `DecodeError::IoError` if the file cannot be opened and
/// `DecodeError::CorruptedFile` if the header cannot be parsed.
/// Dimensions of zero are reported as `DecodeError::ZeroDimensions`.
pub fn probe_dimensions(path: &Path) -> Result<(u32, u32), DecodeError> {
    let reader = ImageReader::open(path)
        .map_err(|e| DecodeError::IoError(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| DecodeError::IoError(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if width == 0 || height == 0 {
        return Err(DecodeError::ZeroDimensions);
    }
    Ok((width, height))
}

/// Integer downsampling divisor that fits `(width, height)` inside the
/// caller bounds.
///
/// A bound of 0 leaves that axis unbounded. Returns 1 when the image
/// already fits - the decoder never upscales.
pub fn sample_divisor(width: u32, height: u32, max_width: u32, max_height: u32) -> u32 {
    let width_scale = if max_width == 0 {
        1.0
    } else {
        max_width as f64 / width as f64
    };
    let height_scale = if max_height == 0 {
        1.0
    } else {
        max_height as f64 / height as f64
    };

    let scale = width_scale.min(height_scale);
    if scale < 1.0 {
        ((1.0 / scale).floor() as u32).max(1)
    } else {
        1
    }
}

/// Decode `path` at a resolution bounded by `max_width`/`max_height`
/// and rotate the pixels into their displayed orientation.
///
/// The bounds are expressed in the displayed orientation: when the EXIF
/// rotation is 90 or 270 degrees, the declared axes are swapped before
/// the scale computation.
///
/// Memory caveat: the `image` crate decodes at native resolution - it
/// has no subsampled decode - so the full-resolution buffer does exist
/// transiently. The divisor is decided from the header before that
/// allocation and applied immediately after decode, so nothing past
/// this function (rotation, encoding, the budget search) ever sees more
/// than the bounded resolution.
///
/// # Errors
///
/// Any probe or pixel-decode failure is returned as a `DecodeError`;
/// callers treat this as "emit the original file unchanged."
pub fn decode_bounded(
    path: &Path,
    max_width: u32,
    max_height: u32,
) -> Result<DecodedImage, DecodeError> {
    let (declared_width, declared_height) = probe_dimensions(path)?;
    let rotation = resolve_rotation(path);

    // A 90/270 rotation swaps which stored axis each bound applies to.
    let (effective_width, effective_height) = if rotation.swaps_dimensions() {
        (declared_height, declared_width)
    } else {
        (declared_width, declared_height)
    };
    let divisor = sample_divisor(effective_width, effective_height, max_width, max_height);

    let decoded = ImageReader::open(path)
        .map_err(|e| DecodeError::IoError(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| DecodeError::IoError(e.to_string()))?
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let mut rgb = decoded.into_rgb8();
    if divisor > 1 {
        // Reduce right away so the full-resolution buffer is released
        // before rotation and encoding.
        let (w, h) = rgb.dimensions();
        rgb = imageops::thumbnail(&rgb, (w / divisor).max(1), (h / divisor).max(1));
    }

    let oriented = match rotation {
        Rotation::None => rgb,
        Rotation::Cw90 => imageops::rotate90(&rgb),
        Rotation::Cw180 => imageops::rotate180(&rgb),
        Rotation::Cw270 => imageops::rotate270(&rgb),
    };

    Ok(DecodedImage::from_rgb_image(oriented))
}
