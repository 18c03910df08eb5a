//! Bounded image decoding for picsquash.
//!
//! This module provides the memory-safety half of the pipeline:
//! - Probing declared dimensions from the file header only
//! - Choosing an integer downsampling divisor against the caller bounds
//! - Decoding and rotating into the displayed orientation
//!
//! The downsampling decision is made before any pixel allocation so a
//! very large source never carries its full-resolution buffer through
//! rotation and encoding.

mod bounded;
mod types;

pub use bounded::{decode_bounded, probe_dimensions, sample_divisor};
pub use types::{DecodeError, DecodedImage};
