//! Skew kernel.
//!
//! A skewed bridge has its supports rotated by the skew angle relative to the
//! square to the bridge axis. Plan outlines are built square and then turned
//! about their axis point with [`rotate`]; widths across the axis grow by
//! `1 / cos(skew)`.

use gad_ir::Point2D;
use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};

use crate::MIN_SKEW_COSINE;

/// Rotate `point` about `center` by `angle` radians.
pub fn rotate(point: Point2D, center: Point2D, angle: f64) -> Point2D {
    let rot = Rotation2::new(angle);
    let v = rot * Vector2::new(point.x - center.x, point.y - center.y);
    Point2D::new(center.x + v.x, center.y + v.y)
}

/// Rotate every point of `points` about `center`.
pub fn rotate_all(points: &[Point2D], center: Point2D, angle: f64) -> Vec<Point2D> {
    points.iter().map(|p| rotate(*p, center, angle)).collect()
}

/// Precomputed trigonometry of a skew angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Skew {
    /// Angle in radians.
    pub angle: f64,
    /// `sin(angle)`.
    pub s: f64,
    /// `cos(angle)`.
    pub c: f64,
    /// `tan(angle)`, computed with a unit divisor when the cosine vanishes.
    pub tn: f64,
}

impl Skew {
    /// Skew from an angle in degrees.
    pub fn from_degrees(degrees: f64) -> Self {
        Self::from_radians(degrees.to_radians())
    }

    /// Skew from an angle in radians.
    pub fn from_radians(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let divisor = if c.abs() < MIN_SKEW_COSINE { 1.0 } else { c };
        Self {
            angle,
            s,
            c,
            tn: s / divisor,
        }
    }

    /// True when the cosine is too small for widths to be stretched safely.
    pub fn is_degenerate(&self) -> bool {
        self.c.abs() < MIN_SKEW_COSINE
    }

    /// Width measured along the bridge axis of a member `w` wide square to it.
    pub fn across(&self, w: f64) -> f64 {
        if self.is_degenerate() {
            w
        } else {
            w / self.c
        }
    }

    /// Plan length of a pier with stem length `pierst` and thickness `piertw`.
    pub fn pier_length(&self, pierst: f64, piertw: f64) -> f64 {
        self.across(pierst) + (piertw * self.tn).abs()
    }

    /// Shear of a trace endpoint `h` away from its axis point: `(h·s, h·(1−c))`.
    pub fn shear(&self, h: f64) -> (f64, f64) {
        (h * self.s, h * (1.0 - self.c))
    }
}
