//! EXIF orientation resolution.
//!
//! Maps a file's EXIF orientation tag to the pixel rotation needed for
//! correct display. Mirrored tag variants are not modeled and resolve to
//! no rotation.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use exif::{In, Reader, Tag};
use serde::{Deserialize, Serialize};

/// Rotation needed to display an image upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    /// No rotation needed.
    #[default]
    None,
    /// Rotate 90 degrees clockwise.
    Cw90,
    /// Rotate 180 degrees.
    Cw180,
    /// Rotate 270 degrees clockwise (90 CCW).
    Cw270,
}

impl Rotation {
    /// The rotation angle in degrees.
    pub fn degrees(self) -> u32 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 90,
            Rotation::Cw180 => 180,
            Rotation::Cw270 => 270,
        }
    }

    /// Returns true if applying this rotation swaps width and height.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Rotation::Cw90 | Rotation::Cw270)
    }
}

impl From<u32> for Rotation {
    /// Map a raw EXIF orientation value (1-8) to a rotation.
    ///
    /// Mirrored variants (2, 4, 5, 7) and out-of-range values resolve to
    /// `Rotation::None`.
    fn from(value: u32) -> Self {
        match value {
            3 => Rotation::Cw180,
            6 => Rotation::Cw90,
            8 => Rotation::Cw270,
            _ => Rotation::None,
        }
    }
}

/// Read the rotation for `path` from its EXIF orientation tag.
///
/// Never fails: an unreadable file, a missing EXIF container, or a
/// corrupt tag table all resolve to `Rotation::None` - absence of
/// orientation information means no rotation is needed.
pub fn resolve_rotation(path: &Path) -> Rotation {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "cannot open file for EXIF read");
            return Rotation::None;
        }
    };

    let mut reader = BufReader::new(file);
    match Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Rotation::from)
            .unwrap_or_default(),
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "no EXIF orientation available");
            Rotation::None
        }
    }
}
