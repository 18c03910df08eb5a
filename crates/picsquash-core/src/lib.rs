//! Picsquash Core - budget-driven image compression
//!
//! This crate compresses a still-image file down to a caller-specified
//! byte budget in three stages:
//!
//! 1. Resolve the EXIF orientation tag into a pixel rotation ([`orient`]).
//! 2. Decode at a bounded resolution so oversized sources never carry a
//!    full-resolution buffer through the pipeline ([`decode`]).
//! 3. Step the lossy quality down until the encoded bytes fit the budget
//!    or the quality floor is reached, then write the result ([`encode`],
//!    [`pipeline`]).
//!
//! The top-level entry point is [`pipeline::compress`], which never
//! fails: any internal error falls back to returning the untouched
//! source path.

pub mod decode;
pub mod encode;
pub mod orient;
pub mod pipeline;

pub use decode::{decode_bounded, DecodeError, DecodedImage};
pub use encode::{encode_image, encode_within_budget, Candidate, EncodeError, QUALITY_STEP};
pub use orient::{resolve_rotation, Rotation};
pub use pipeline::{compress, try_compress, CompressError};

/// Default byte budget: 5 MiB.
pub const DEFAULT_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Output codec for the compression pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum OutputFormat {
    /// Lossy JPEG; honors the quality parameter.
    #[default]
    Jpeg,
    /// Lossless PNG; the quality parameter is ignored.
    Png,
}

impl OutputFormat {
    /// Conventional file extension for the format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

/// Compression settings consumed by [`pipeline::compress`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Config {
    /// Maximum output width in the displayed orientation; 0 = unbounded.
    pub max_width: u32,
    /// Maximum output height in the displayed orientation; 0 = unbounded.
    pub max_height: u32,
    /// Quality floor in [1, 100]. The budget search never drops below it.
    pub min_quality: u8,
    /// Byte budget for the encoded output.
    pub max_bytes: usize,
    /// Target codec.
    pub format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_width: 0,
            max_height: 0,
            min_quality: 100,
            max_bytes: DEFAULT_MAX_BYTES,
            format: OutputFormat::Jpeg,
        }
    }
}

impl Config {
    /// Create a Config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Quality floor clamped to the valid [1, 100] range.
    pub(crate) fn quality_floor(&self) -> u8 {
        self.min_quality.clamp(1, 100)
    }
}
