//! Field-space geometry
//!
//! All coordinates stored in a play are field-space: they are independent of
//! the display surface, which rescales them proportionally when it resizes.

use serde::{Deserialize, Serialize};

/// Default field width (16:10 aspect ratio)
pub const DEFAULT_FIELD_WIDTH: f32 = 800.0;

/// Default field height (16:10 aspect ratio)
pub const DEFAULT_FIELD_HEIGHT: f32 = 500.0;

/// A point on the field
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldPoint {
    pub x: f32,
    pub y: f32,
}

impl FieldPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Linear interpolation towards `other` by `t`
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Euclidean distance to `other`
    pub fn distance(self, other: Self) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Dimensions of the playing field
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldSize {
    pub width: f32,
    pub height: f32,
}

impl Default for FieldSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_FIELD_WIDTH,
            height: DEFAULT_FIELD_HEIGHT,
        }
    }
}

impl FieldSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Center of the field, used as the fallback coordinate for tokens
    /// that have no stored position.
    pub fn center(&self) -> FieldPoint {
        FieldPoint::new(self.width / 2.0, self.height / 2.0)
    }

    /// Radius of a player token.
    ///
    /// Grows slightly on small fields so tokens stay touchable.
    pub fn token_radius(&self) -> f32 {
        (self.width / 53.0).clamp(12.0, 15.0)
    }

    /// Clamp a point so a token centred on it stays fully on the field
    pub fn clamp_token(&self, point: FieldPoint) -> FieldPoint {
        let r = self.token_radius();
        FieldPoint {
            x: point.x.max(r).min(self.width - r),
            y: point.y.max(r).min(self.height - r),
        }
    }

    /// Per-axis factors that map coordinates on `self` onto `target`
    pub fn scale_to(&self, target: FieldSize) -> (f32, f32) {
        (target.width / self.width, target.height / self.height)
    }
}
