//! Geometry primitives: axis-aligned rectangles and 2D vectors.
//!
//! World space is in pixels with +y pointing down, so a rectangle's `y` is its
//! top edge and `y + h` its bottom edge.

use serde::{Deserialize, Serialize};

pub use glam::Vec2;

/// Axis-aligned bounding box stored as top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub w: f32,
    /// Height
    pub h: f32,
}

impl Rect {
    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Top-left corner.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Checks if this rectangle overlaps another.
    ///
    /// Edges that merely touch do not count: each rectangle's start must be
    /// strictly before the other's end on both axes.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Moves the rectangle by a displacement.
    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Returns the rectangle moved by a displacement.
    #[must_use]
    pub fn translated(&self, delta: Vec2) -> Self {
        let mut moved = *self;
        moved.translate(delta);
        moved
    }
}
