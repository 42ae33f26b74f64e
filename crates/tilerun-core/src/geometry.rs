use serde::{Deserialize, Serialize};

/// A 2D point or offset in world pixels. Y grows downward.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Axis-aligned bounds expressed by their four edges.
///
/// Invariant: `right >= left` and `bottom >= top`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Rect {
    /// Build bounds from a top-left corner and a size.
    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            top: y,
            right: x + width,
            bottom: y + height,
            left: x,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Shift the bounds horizontally.
    pub fn translate_x(self, dx: f32) -> Self {
        Self {
            left: self.left + dx,
            right: self.right + dx,
            ..self
        }
    }

    /// Inclusive overlap on the x axis (touching edges count).
    pub fn overlaps_x_inclusive(&self, other: &Rect) -> bool {
        self.left <= other.right && self.right >= other.left
    }

    /// Strict overlap on the y axis (touching edges do not count).
    pub fn overlaps_y_strict(&self, other: &Rect) -> bool {
        self.bottom > other.top && self.top < other.bottom
    }

    /// Strict overlap on both axes.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right
            && self.right > other.left
            && self.top < other.bottom
            && self.bottom > other.top
    }
}
