use crate::types::Orientation;
use glam::Vec2;

/// Axis-aligned rectangle, `x`/`y` being the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// `true` when both sides are finite and strictly larger than `min`.
    ///
    /// NaN, infinite, zero and negative sizes all fail this test.
    pub fn exceeds(&self, min: f32) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > min
            && self.height > min
    }

    /// Central rectangle covering 3/4 of a canvas of the given size.
    pub fn inset_of(bounds: Vec2) -> Self {
        Self::new(
            bounds.x / 8.0,
            bounds.y / 8.0,
            bounds.x * 3.0 / 4.0,
            bounds.y * 3.0 / 4.0,
        )
    }
}

/// How a rectangle region is cut when it splits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RectStyle {
    /// A straight k-d cut across the width or height.
    Straight,
    /// Both diagonals are drawn; children sit on the main diagonal.
    Angled,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectRegion {
    pub rect: Rect,
    pub stroke: f32,
    pub orientation: Orientation,
    pub style: RectStyle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleRegion {
    pub center: Vec2,
    pub radius: f32,
    pub stroke: f32,
}

impl CircleRegion {
    pub fn exceeds(&self, min: f32) -> bool {
        self.center.is_finite() && self.radius.is_finite() && self.radius > min
    }
}

/// A candidate for further subdivision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Region {
    Rect(RectRegion),
    Circle(CircleRegion),
}

impl Region {
    /// Key used by the "largest first" ordering: area for rectangles,
    /// radius for circles.
    pub fn size_key(&self) -> f32 {
        match self {
            Self::Rect(r) => r.rect.area(),
            Self::Circle(c) => c.radius,
        }
    }

    pub fn stroke(&self) -> f32 {
        match self {
            Self::Rect(r) => r.stroke,
            Self::Circle(c) => c.stroke,
        }
    }
}

impl From<RectRegion> for Region {
    fn from(r: RectRegion) -> Self {
        Self::Rect(r)
    }
}

impl From<CircleRegion> for Region {
    fn from(c: CircleRegion) -> Self {
        Self::Circle(c)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineSegment {
    pub from: Vec2,
    pub to: Vec2,
}

impl LineSegment {
    pub const fn new(from: Vec2, to: Vec2) -> Self {
        Self { from, to }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.from.distance(self.to)
    }
}
