//! Geometry primitives shared by every layout component.
//!
//! All coordinates are CSS pixels in virtual-desktop space. Monitors tile this
//! space; a window's position is absolute, never relative to its monitor.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Point / Size
// ============================================================================

/// A position in desktop space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }

    /// Returns this point translated by `(dx, dy)`.
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self { Self::new(self.x + dx, self.y + dy) }

    #[must_use]
    pub const fn is_finite(self) -> bool { self.x.is_finite() && self.y.is_finite() }
}

/// A width/height pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self { Self { width, height } }

    /// Returns this size grown so that neither dimension is below `min`.
    ///
    /// NaN, infinite and negative dimensions collapse to the minimum.
    #[must_use]
    pub fn at_least(self, min: Self) -> Self {
        let clamp = |value: f64, floor: f64| {
            if value.is_finite() && value >= floor { value } else { floor }
        };
        Self::new(clamp(self.width, min.width), clamp(self.height, min.height))
    }
}

// ============================================================================
// Insets
// ============================================================================

/// Distances to shave off each side of a rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Insets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Insets {
    #[must_use]
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self { top, right, bottom, left }
    }

    /// Same inset on every side.
    #[must_use]
    pub const fn uniform(value: f64) -> Self { Self::new(value, value, value, value) }

    #[must_use]
    pub const fn zero() -> Self { Self::uniform(0.0) }
}

// ============================================================================
// Rect
// ============================================================================

/// A rectangle with position and size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Create a rectangle from an origin and a size.
    #[must_use]
    pub const fn from_parts(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Create a zero-sized rectangle at origin.
    #[must_use]
    pub const fn zero() -> Self { Self::new(0.0, 0.0, 0.0, 0.0) }

    #[must_use]
    pub const fn origin(&self) -> Point { Point::new(self.x, self.y) }

    #[must_use]
    pub const fn size(&self) -> Size { Size::new(self.width, self.height) }

    #[must_use]
    pub fn right(&self) -> f64 { self.x + self.width }

    #[must_use]
    pub fn bottom(&self) -> f64 { self.y + self.height }

    /// Check if this rectangle has valid dimensions.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Check if this rectangle contains a point.
    ///
    /// The right and bottom edges are exclusive so adjacent monitors never both
    /// claim the same point.
    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Check if this rectangle intersects with another.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Calculate the area of this rectangle.
    #[must_use]
    pub fn area(&self) -> f64 { self.width * self.height }

    /// Get the center point of this rectangle.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Distance from `point` to the closest point of this rectangle (0 inside).
    #[must_use]
    pub fn distance_to_point(&self, point: Point) -> f64 {
        let dx = (self.x - point.x).max(point.x - self.right()).max(0.0);
        let dy = (self.y - point.y).max(point.y - self.bottom()).max(0.0);
        dx.hypot(dy)
    }

    /// Returns the rectangle moved to `origin`, keeping its size.
    #[must_use]
    pub const fn with_origin(&self, origin: Point) -> Self {
        Self::new(origin.x, origin.y, self.width, self.height)
    }

    /// Returns the rectangle resized to `size`, keeping its origin.
    #[must_use]
    pub const fn with_size(&self, size: Size) -> Self {
        Self::new(self.x, self.y, size.width, size.height)
    }

    /// Returns the rectangle translated by `(dx, dy)`.
    #[must_use]
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Returns the rectangle shrunk by `insets`, never below zero size.
    #[must_use]
    pub fn inset(&self, insets: &Insets) -> Self {
        Self::new(
            self.x + insets.left,
            self.y + insets.top,
            (self.width - insets.left - insets.right).max(0.0),
            (self.height - insets.top - insets.bottom).max(0.0),
        )
    }

    /// Returns the rectangle shifted so that it lies inside `bounds` where it fits.
    ///
    /// A rectangle larger than `bounds` is aligned to the top-left corner.
    #[must_use]
    pub fn clamped_within(&self, bounds: &Self) -> Self {
        let x = self.x.min(bounds.right() - self.width).max(bounds.x);
        let y = self.y.min(bounds.bottom() - self.height).max(bounds.y);
        Self::new(x, y, self.width, self.height)
    }

    /// Returns the rectangle with degenerate values replaced.
    ///
    /// Bad sizes (NaN, infinite, negative, below `min`) become the minimum and
    /// non-finite coordinates take the matching coordinate of `fallback_origin`.
    #[must_use]
    pub fn sanitized(&self, min: Size, fallback_origin: Point) -> Self {
        let size = self.size().at_least(min);
        let x = if self.x.is_finite() { self.x } else { fallback_origin.x };
        let y = if self.y.is_finite() { self.y } else { fallback_origin.y };
        Self::new(x, y, size.width, size.height)
    }

    /// Check if two rectangles are approximately equal (within epsilon).
    #[must_use]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.width - other.width).abs() < epsilon
            && (self.height - other.height).abs() < epsilon
    }
}

// ============================================================================
// Resize Edges
// ============================================================================

/// The handle a resize drag was started from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeEdge {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl ResizeEdge {
    #[must_use]
    pub const fn moves_west(self) -> bool {
        matches!(self, Self::West | Self::NorthWest | Self::SouthWest)
    }

    #[must_use]
    pub const fn moves_east(self) -> bool {
        matches!(self, Self::East | Self::NorthEast | Self::SouthEast)
    }

    #[must_use]
    pub const fn moves_north(self) -> bool {
        matches!(self, Self::North | Self::NorthEast | Self::NorthWest)
    }

    #[must_use]
    pub const fn moves_south(self) -> bool {
        matches!(self, Self::South | Self::SouthEast | Self::SouthWest)
    }
}

/// Applies a pointer delta to `start` as if dragging the `edge` handle.
///
/// The edge opposite to the handle stays anchored, and the result never shrinks
/// below `min`.
#[must_use]
pub fn resize_rect(start: Rect, edge: ResizeEdge, dx: f64, dy: f64, min: Size) -> Rect {
    let mut rect = start;

    if edge.moves_east() {
        rect.width = (start.width + dx).max(min.width);
    }
    if edge.moves_south() {
        rect.height = (start.height + dy).max(min.height);
    }
    if edge.moves_west() {
        let width = (start.width - dx).max(min.width);
        rect.x = start.right() - width;
        rect.width = width;
    }
    if edge.moves_north() {
        let height = (start.height - dy).max(min.height);
        rect.y = start.bottom() - height;
        rect.height = height;
    }

    rect
}
