//! Size-budget encoding for picsquash.
//!
//! This module provides functionality for:
//! - Encoding a pixel buffer to JPEG (lossy) or PNG (lossless) in memory
//! - Searching quality downward until the output fits a byte budget
//!
//! The search is bounded: quality steps down by a fixed amount per
//! attempt and never drops below the configured floor, so the number of
//! encode attempts is deterministic regardless of whether the budget is
//! reachable.

mod budget;
mod codec;

pub use budget::{encode_within_budget, Candidate, QUALITY_STEP};
pub use codec::{encode_image, EncodeError};
