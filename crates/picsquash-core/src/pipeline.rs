//! Top-level compression pipeline.
//!
//! Composes the bounded decoder and the budget search into a single
//! synchronous pass, then persists the result with one bulk write. The
//! public [`compress`] entry point never fails: every internal error is
//! absorbed and the untouched source path is returned instead, so the
//! caller always holds a path to a valid, existing file.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::decode::{decode_bounded, DecodeError};
use crate::encode::{encode_within_budget, EncodeError};
use crate::Config;

/// Errors absorbed by [`compress`] and surfaced by [`try_compress`].
#[derive(Debug, Error)]
pub enum CompressError {
    /// Probe or pixel decode failed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// An encode attempt failed.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The output directory could not be created.
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output file could not be written.
    #[error("Failed to write output file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Compress `source` into `output_dir/file_name`, reporting failures.
///
/// Decodes at a resolution bounded by the config, searches quality
/// downward against the byte budget, creates the output directory if
/// absent, and writes the final buffer with a single bulk `fs::write`.
/// The returned path is handed out only after the write succeeded, so a
/// partially written file is never referenced as a success.
///
/// # Errors
///
/// Any stage failure is returned as a [`CompressError`]; callers that
/// want the always-succeeds contract should use [`compress`] instead.
pub fn try_compress(
    source: &Path,
    output_dir: &Path,
    file_name: &str,
    config: &Config,
) -> Result<PathBuf, CompressError> {
    let image = decode_bounded(source, config.max_width, config.max_height)?;
    let candidate = encode_within_budget(&image, config)?;
    drop(image);

    fs::create_dir_all(output_dir).map_err(|err| CompressError::CreateDir {
        path: output_dir.to_path_buf(),
        source: err,
    })?;

    let output_path = output_dir.join(file_name);
    fs::write(&output_path, &candidate.bytes).map_err(|err| CompressError::Write {
        path: output_path.clone(),
        source: err,
    })?;

    tracing::debug!(
        source = %source.display(),
        output = %output_path.display(),
        bytes = candidate.bytes.len(),
        quality = candidate.quality,
        attempts = candidate.attempts,
        "compressed image"
    );

    Ok(output_path)
}

/// Compress `source` into `output_dir/file_name`, falling back to the
/// untouched source path on any internal failure.
///
/// This is the availability-first front door: the returned path always
/// names an existing file, and no error ever escapes. Absorbed errors
/// are logged at warn level.
pub fn compress(source: &Path, output_dir: &Path, file_name: &str, config: &Config) -> PathBuf {
    match try_compress(source, output_dir, file_name, config) {
        Ok(path) => path,
        Err(err) => {
            tracing::warn!(
                source = %source.display(),
                error = %err,
                "compression failed, returning original file"
            );
            source.to_path_buf()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodedImage;
    use crate::encode::encode_image;
    use crate::OutputFormat;

    fn create_test_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(((x * 255) / width.max(1)) as u8);
                pixels.push(((y * 255) / height.max(1)) as u8);
                pixels.push(128);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    /// Fresh working directory under the system temp dir, unique per test.
    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("picsquash-pipe-{}-{}", std::process::id(), name));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_source_jpeg(dir: &Path, width: u32, height: u32) -> PathBuf {
        let bytes = encode_image(&create_test_image(width, height), OutputFormat::Jpeg, 90).unwrap();
        let path = dir.join("source.jpg");
        fs::write(&path, bytes).unwrap();
        path
    }

    /// Build an EXIF APP1 segment carrying only the orientation tag,
    /// as a little-endian TIFF with a single IFD entry.
    fn exif_app1(orientation: u16) -> Vec<u8> {
        let mut tiff = Vec::new();
        tiff.extend_from_slice(&[0x49, 0x49, 0x2A, 0x00]); // II + 42
        tiff.extend_from_slice(&8u32.to_le_bytes()); // 0th IFD offset
        tiff.extend_from_slice(&1u16.to_le_bytes()); // entry count
        tiff.extend_from_slice(&0x0112u16.to_le_bytes()); // Orientation tag
        tiff.extend_from_slice(&3u16.to_le_bytes()); // type SHORT
        tiff.extend_from_slice(&1u32.to_le_bytes()); // count
        tiff.extend_from_slice(&orientation.to_le_bytes());
        tiff.extend_from_slice(&[0, 0]); // value padding
        tiff.extend_from_slice(&0u32.to_le_bytes()); // no next IFD

        let mut payload = b"Exif\0\0".to_vec();
        payload.extend_from_slice(&tiff);

        let mut app1 = vec![0xFF, 0xE1];
        app1.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        app1.extend_from_slice(&payload);
        app1
    }

    /// Write a source JPEG with the given EXIF orientation spliced in
    /// after SOI.
    fn write_oriented_source_jpeg(dir: &Path, width: u32, height: u32, orientation: u16) -> PathBuf {
        let jpeg =
            encode_image(&create_test_image(width, height), OutputFormat::Jpeg, 90).unwrap();

        let mut bytes = jpeg[..2].to_vec();
        bytes.extend_from_slice(&exif_app1(orientation));
        bytes.extend_from_slice(&jpeg[2..]);

        let path = dir.join("source-oriented.jpg");
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_compress_writes_output_file() {
        let dir = test_dir("basic");
        let source = write_source_jpeg(&dir, 64, 48);
        let out_dir = dir.join("out");

        let result = compress(&source, &out_dir, "small.jpg", &Config::default());

        assert_eq!(result, out_dir.join("small.jpg"));
        assert!(result.exists());

        // Unbounded config: native resolution survives.
        let written = image::open(&result).unwrap();
        assert_eq!((written.width(), written.height()), (64, 48));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_compress_creates_missing_output_dir() {
        let dir = test_dir("mkdirs");
        let source = write_source_jpeg(&dir, 32, 32);
        let out_dir = dir.join("a").join("b").join("c");

        let result = compress(&source, &out_dir, "out.jpg", &Config::default());

        assert!(result.starts_with(&out_dir));
        assert!(result.exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_compress_applies_dimension_bounds() {
        let dir = test_dir("bounds");
        let source = write_source_jpeg(&dir, 400, 300);
        let out_dir = dir.join("out");

        let mut config = Config::default();
        config.max_width = 100;
        config.max_height = 100;

        let result = compress(&source, &out_dir, "bounded.jpg", &config);
        let written = image::open(&result).unwrap();

        assert_eq!((written.width(), written.height()), (100, 75));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_compress_respects_byte_budget() {
        let dir = test_dir("budget");
        let source = write_source_jpeg(&dir, 256, 256);
        let out_dir = dir.join("out");

        let mut config = Config::default();
        config.min_quality = 1;
        config.max_bytes = 4 * 1024;

        let result = compress(&source, &out_dir, "squeezed.jpg", &config);
        let len = fs::metadata(&result).unwrap().len() as usize;

        assert!(result.exists());
        assert!(len <= config.max_bytes);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_compress_corrupt_source_returns_original() {
        let dir = test_dir("corrupt");
        let source = dir.join("broken.jpg");
        fs::write(&source, [0x00u8, 0x01, 0x02, 0x03]).unwrap();
        let out_dir = dir.join("out");

        let result = compress(&source, &out_dir, "never.jpg", &Config::default());

        assert_eq!(result, source);
        // The pipeline aborted before persistence: no output appears.
        assert!(!out_dir.join("never.jpg").exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_try_compress_corrupt_source_reports_decode_error() {
        let dir = test_dir("report");
        let source = dir.join("broken.jpg");
        fs::write(&source, [0x00u8, 0x01, 0x02, 0x03]).unwrap();

        let result = try_compress(&source, &dir.join("out"), "x.jpg", &Config::default());
        assert!(matches!(result, Err(CompressError::Decode(_))));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_compress_missing_source_returns_source_path() {
        let dir = test_dir("missing");
        let source = dir.join("does-not-exist.jpg");

        let result = compress(&source, &dir.join("out"), "x.jpg", &Config::default());
        assert_eq!(result, source);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_compress_idempotent_for_already_small_output() {
        // Compressing our own output again at default config succeeds
        // in a single attempt and keeps the resolution.
        let dir = test_dir("idempotent");
        let source = write_source_jpeg(&dir, 64, 64);
        let out_dir = dir.join("out");

        let first = compress(&source, &out_dir, "first.jpg", &Config::default());
        let second = compress(&first, &out_dir, "second.jpg", &Config::default());

        let a = image::open(&first).unwrap();
        let b = image::open(&second).unwrap();
        assert_eq!((a.width(), a.height()), (b.width(), b.height()));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_compress_oriented_bounded_and_budgeted() {
        // Full pass in one call: stored 400x200 with a 90-degree EXIF
        // rotation displays as 200x400, so the 100x100 bound scales
        // against the swapped axes (divisor 4), the decode yields
        // 100x50, and rotation lands the output at 50x100. The byte
        // budget then bounds the written file.
        let dir = test_dir("e2e");
        let source = write_oriented_source_jpeg(&dir, 400, 200, 6);
        let out_dir = dir.join("out");

        let mut config = Config::default();
        config.max_width = 100;
        config.max_height = 100;
        config.min_quality = 50;
        config.max_bytes = 4 * 1024;

        let result = compress(&source, &out_dir, "oriented.jpg", &config);
        assert_eq!(result, out_dir.join("oriented.jpg"));

        let written = image::open(&result).unwrap();
        assert_eq!((written.width(), written.height()), (50, 100));

        let len = fs::metadata(&result).unwrap().len() as usize;
        assert!(len <= config.max_bytes);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_compress_png_output() {
        let dir = test_dir("png");
        let source = write_source_jpeg(&dir, 32, 32);
        let out_dir = dir.join("out");

        let mut config = Config::default();
        config.format = OutputFormat::Png;

        let result = compress(&source, &out_dir, "out.png", &config);
        let bytes = fs::read(&result).unwrap();
        assert_eq!(&bytes[0..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);

        fs::remove_dir_all(&dir).ok();
    }
}
