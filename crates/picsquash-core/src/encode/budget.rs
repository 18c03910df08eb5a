//! Quality step-down search against the byte budget.
//!
//! A monotonic coarse search rather than a bisection: codec
//! quality-to-size is not smooth enough to bisect safely, and a handful
//! of fixed steps is sufficient in practice.

use super::{encode_image, EncodeError};
use crate::decode::DecodedImage;
use crate::Config;

/// Fixed quality decrement between encode attempts.
pub const QUALITY_STEP: u8 = 10;

/// Outcome of the budget search: the final encoded bytes plus where the
/// search settled.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Encoded output, fully buffered in memory.
    pub bytes: Vec<u8>,
    /// Quality of the final attempt.
    pub quality: u8,
    /// Number of encode attempts performed.
    pub attempts: u32,
}

impl Candidate {
    /// Whether the final encoding met the byte budget.
    pub fn fits(&self, max_bytes: usize) -> bool {
        self.bytes.len() <= max_bytes
    }
}

/// Encode `image` at decreasing quality until the output fits
/// `config.max_bytes` or the quality floor is reached.
///
/// Starts at quality 100 and steps down by [`QUALITY_STEP`], clamping to
/// the floor. Each attempt's buffer replaces the previous one, so at
/// most one candidate is held at a time. Quality strictly decreases per
/// iteration and is bounded below by the floor, so the search performs
/// at most `ceil((100 - floor) / 10) + 1` attempts.
///
/// The floor is a hard constraint that overrides the budget: the final
/// candidate is returned even when it is still over budget. Lossless
/// formats ignore the quality parameter; the loop still terminates at
/// the floor.
///
/// # Errors
///
/// Returns `EncodeError` if any individual encode attempt fails.
pub fn encode_within_budget(
    image: &DecodedImage,
    config: &Config,
) -> Result<Candidate, EncodeError> {
    let floor = config.quality_floor();

    let mut quality = 100u8;
    let mut bytes = encode_image(image, config.format, quality)?;
    let mut attempts = 1u32;

    while bytes.len() > config.max_bytes && quality > floor {
        quality = quality.saturating_sub(QUALITY_STEP).max(floor);
        bytes = encode_image(image, config.format, quality)?;
        attempts += 1;
    }

    tracing::debug!(
        quality,
        attempts,
        bytes = bytes.len(),
        budget = config.max_bytes,
        fits = bytes.len() <= config.max_bytes,
        "budget search finished"
    );

    Ok(Candidate {
        bytes,
        quality,
        attempts,
    })
}

/// Upper bound on encode attempts for a given quality floor.
#[cfg(test)]
fn max_attempts(floor: u8) -> u32 {
    (100 - floor as u32).div_ceil(QUALITY_STEP as u32) + 1
}
