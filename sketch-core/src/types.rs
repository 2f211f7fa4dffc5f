use serde::{Deserialize, Serialize};

/// Direction of the next cut through a rectangle.
///
/// A `Vertical` cut is a vertical line, so it divides the region's
/// width; a `Horizontal` cut divides its height. Every split hands the
/// flipped orientation to its children, which yields a k-d style
/// partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

impl Orientation {
    /// Returns the opposite orientation.
    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Self::Vertical => Self::Horizontal,
            Self::Horizontal => Self::Vertical,
        }
    }
}

/// Straight RGB colour used by the drawing surface.
pub type Color = [u8; 3];

pub const BLACK: Color = [0, 0, 0];
pub const WHITE: Color = [255, 255, 255];

/// Number of the branch generation (0 for branches seeded by a stroke).
pub type Generation = u32;
