//! Core 2D value types shared by the builder and the backends.

use serde::{Deserialize, Serialize};

/// Tolerance used when comparing paper-frame coordinates.
pub const COINCIDENT_TOLERANCE: f64 = 1e-9;

/// A point in the paper frame (paper units, y grows downward on the sheet).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point2D {
    /// Create a new 2D point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Origin point (0, 0).
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Distance to another point.
    pub fn distance(&self, other: &Self) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Midpoint between two points.
    pub fn midpoint(&self, other: &Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Translate by `(dx, dy)`.
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// True when both coordinates agree within [`COINCIDENT_TOLERANCE`].
    pub fn coincides(&self, other: &Self) -> bool {
        (self.x - other.x).abs() <= COINCIDENT_TOLERANCE
            && (self.y - other.y).abs() <= COINCIDENT_TOLERANCE
    }
}

impl Default for Point2D {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl From<nalgebra::Point2<f64>> for Point2D {
    fn from(p: nalgebra::Point2<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<Point2D> for nalgebra::Point2<f64> {
    fn from(p: Point2D) -> Self {
        nalgebra::Point2::new(p.x, p.y)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned 2D bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox2D {
    /// Minimum X coordinate.
    pub min_x: f64,
    /// Minimum Y coordinate.
    pub min_y: f64,
    /// Maximum X coordinate.
    pub max_x: f64,
    /// Maximum Y coordinate.
    pub max_y: f64,
}

impl BoundingBox2D {
    /// Create an empty bounding box.
    pub fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// Expand the bounding box to include a point.
    pub fn include_point(&mut self, p: Point2D) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    /// Expand the bounding box to include another box.
    pub fn include_box(&mut self, other: &BoundingBox2D) {
        if other.is_valid() {
            self.include_point(Point2D::new(other.min_x, other.min_y));
            self.include_point(Point2D::new(other.max_x, other.max_y));
        }
    }

    /// Width of the bounding box.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Center of the bounding box.
    pub fn center(&self) -> Point2D {
        Point2D::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Check if the bounding box is valid (non-empty).
    pub fn is_valid(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }
}

impl Default for BoundingBox2D {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_grows() {
        let mut bb = BoundingBox2D::empty();
        assert!(!bb.is_valid());
        bb.include_point(Point2D::new(1.0, -2.0));
        bb.include_point(Point2D::new(-3.0, 4.0));
        assert!(bb.is_valid());
        assert_eq!(bb.width(), 4.0);
        assert_eq!(bb.height(), 6.0);
        assert_eq!(bb.center(), Point2D::new(-1.0, 1.0));
    }

    #[test]
    fn test_include_empty_box_is_noop() {
        let mut bb = BoundingBox2D::empty();
        bb.include_point(Point2D::ORIGIN);
        bb.include_box(&BoundingBox2D::empty());
        assert_eq!(bb.width(), 0.0);
    }

    #[test]
    fn test_coincides() {
        let a = Point2D::new(1.0, 1.0);
        assert!(a.coincides(&Point2D::new(1.0 + 1e-12, 1.0)));
        assert!(!a.coincides(&Point2D::new(1.001, 1.0)));
    }
}
