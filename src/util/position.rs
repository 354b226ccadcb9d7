use serde::{Deserialize, Serialize};

use crate::util::vec2::Vec2;

/// Absolute point in the aquarium.
///
/// Kept apart from [`Vec2`] so that "where something is" and
/// "which way / how far" never get mixed up in signatures.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Move this point in place by (dx, dy)
    #[inline]
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Copy of this point moved by `offset`
    #[inline]
    pub fn offset_by(&self, offset: Vec2) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y,
        }
    }

    #[inline]
    pub fn distance_to(&self, other: &Position) -> f64 {
        Vec2::between(self, other).length()
    }
}
