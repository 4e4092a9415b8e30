//! World-to-paper projection.
//!
//! World coordinates are chainage (x, metres along the bridge) and level
//! (y, metres above datum). The paper frame has its origin at
//! `(left, datum)` and y grows downward on the sheet, so higher levels map to
//! smaller paper y. Backends with an upward y axis flip the sign themselves.
//!
//! Two maps share the frame: the elevation map (`hpos`/`vpos`) and the
//! section map (`h2pos`/`v2pos`), which is enlarged by `sc = scale1/scale2`.

use gad_ir::Point2D;
use serde::{Deserialize, Serialize};

/// Paper units per world unit, horizontally and vertically, by default.
pub const DEFAULT_UNITS_PER_WORLD: f64 = 1000.0;

/// Depth of the plan band centre below datum, in world units.
pub const PLAN_BAND_DEPTH: f64 = 30.0;

/// World ↔ paper transform for one drawing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    left: f64,
    datum: f64,
    scale1: f64,
    sc: f64,
    hhs: f64,
    vvs: f64,
    origin: Point2D,
}

impl Projection {
    /// Projection for a frame starting at chainage `left` and level `datum`,
    /// plotted at `1:scale1` with sections at `1:scale2`.
    pub fn new(left: f64, datum: f64, scale1: f64, scale2: f64) -> Self {
        Self {
            left,
            datum,
            scale1,
            sc: scale1 / scale2,
            hhs: DEFAULT_UNITS_PER_WORLD,
            vvs: DEFAULT_UNITS_PER_WORLD,
            origin: Point2D::ORIGIN,
        }
    }

    /// Override paper units per world unit.
    pub fn with_factors(mut self, hhs: f64, vvs: f64) -> Self {
        self.hhs = hhs;
        self.vvs = vvs;
        self
    }

    /// Move the paper position of `(left, datum)`.
    pub fn with_origin(mut self, origin: Point2D) -> Self {
        self.origin = origin;
        self
    }

    /// Section enlargement factor `scale1 / scale2`.
    pub fn section_ratio(&self) -> f64 {
        self.sc
    }

    /// Level of the datum line.
    pub fn datum(&self) -> f64 {
        self.datum
    }

    /// Chainage at the left edge of the frame.
    pub fn left(&self) -> f64 {
        self.left
    }

    /// Horizontal paper units per world unit.
    pub fn hhs(&self) -> f64 {
        self.hhs
    }

    // Elevation frame.

    /// Paper x of chainage `x`.
    pub fn hpos(&self, x: f64) -> f64 {
        self.origin.x + self.hhs * (x - self.left)
    }

    /// Paper y of level `y`.
    pub fn vpos(&self, y: f64) -> f64 {
        self.origin.y + self.vvs * (self.datum - y)
    }

    /// Paper point of world `(x, y)`.
    pub fn pt(&self, x: f64, y: f64) -> Point2D {
        Point2D::new(self.hpos(x), self.vpos(y))
    }

    /// Chainage of paper x.
    pub fn inv_hpos(&self, px: f64) -> f64 {
        self.left + (px - self.origin.x) / self.hhs
    }

    /// Level of paper y.
    pub fn inv_vpos(&self, py: f64) -> f64 {
        self.datum - (py - self.origin.y) / self.vvs
    }

    /// World `(x, y)` of a paper point.
    pub fn unproject(&self, p: Point2D) -> (f64, f64) {
        (self.inv_hpos(p.x), self.inv_vpos(p.y))
    }

    // Section frame.

    /// Paper x of chainage `x` in the section frame.
    pub fn h2pos(&self, x: f64) -> f64 {
        self.origin.x + self.sc * self.hhs * (x - self.left)
    }

    /// Paper y of level `y` in the section frame.
    pub fn v2pos(&self, y: f64) -> f64 {
        self.origin.y + self.sc * self.vvs * (self.datum - y)
    }

    /// Paper point of world `(x, y)` in the section frame.
    pub fn p2t(&self, x: f64, y: f64) -> Point2D {
        Point2D::new(self.h2pos(x), self.v2pos(y))
    }

    /// Chainage of paper x in the section frame.
    pub fn inv_h2pos(&self, px: f64) -> f64 {
        self.left + (px - self.origin.x) / (self.sc * self.hhs)
    }

    /// Level of paper y in the section frame.
    pub fn inv_v2pos(&self, py: f64) -> f64 {
        self.datum - (py - self.origin.y) / (self.sc * self.vvs)
    }

    /// World `(x, y)` of a paper point in the section frame.
    pub fn unproject_section(&self, p: Point2D) -> (f64, f64) {
        (self.inv_h2pos(p.x), self.inv_v2pos(p.y))
    }

    // Sheet helpers.

    /// Level at the centre of the plan band.
    pub fn plan_center_level(&self) -> f64 {
        self.datum - PLAN_BAND_DEPTH
    }

    /// Paper units per plotted millimetre at `1:scale1`.
    pub fn paper_scale(&self) -> f64 {
        self.scale1 * self.hhs / DEFAULT_UNITS_PER_WORLD
    }

    /// Paper length of `n` plotted millimetres.
    pub fn su(&self, n: f64) -> f64 {
        n * self.paper_scale()
    }

    /// Paper y `n` plotted millimetres below `y` on the sheet.
    pub fn below(&self, y: f64, n: f64) -> f64 {
        y + self.su(n)
    }

    /// Paper y `n` plotted millimetres above `y` on the sheet.
    pub fn above(&self, y: f64, n: f64) -> f64 {
        y - self.su(n)
    }

    /// Paper y of a band `n` plotted millimetres below the datum line.
    pub fn datum_band(&self, n: f64) -> f64 {
        self.below(self.vpos(self.datum), n)
    }

    /// Converts a counter-clockwise world angle to the paper frame.
    pub fn sheet_angle(&self, world_angle: f64) -> f64 {
        -world_angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn projection() -> Projection {
        Projection::new(-5.0, 100.0, 100.0, 50.0)
    }

    #[test]
    fn test_origin_maps_to_paper_origin() {
        let p = projection();
        let origin = p.pt(-5.0, 100.0);
        assert_eq!(origin, Point2D::ORIGIN);
    }

    #[test]
    fn test_higher_levels_are_higher_on_sheet() {
        let p = projection();
        assert!(p.vpos(110.0) < p.vpos(100.0));
        assert_abs_diff_eq!(p.vpos(101.0), -1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_round_trip_elevation() {
        let p = projection().with_origin(Point2D::new(250.0, -75.0));
        for &(x, y) in &[(-5.0, 100.0), (12.345, 98.7), (1e4, -3.2)] {
            let (bx, by) = p.unproject(p.pt(x, y));
            assert_abs_diff_eq!(bx, x, epsilon = 1e-6);
            assert_abs_diff_eq!(by, y, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_round_trip_section() {
        let p = projection().with_factors(500.0, 250.0);
        for &(x, y) in &[(0.0, 0.0), (7.25, 104.125), (-3.0, 250.0)] {
            let (bx, by) = p.unproject_section(p.p2t(x, y));
            assert_abs_diff_eq!(bx, x, epsilon = 1e-6);
            assert_abs_diff_eq!(by, y, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_section_is_enlarged() {
        let p = projection();
        assert_eq!(p.section_ratio(), 2.0);
        assert_abs_diff_eq!(p.h2pos(0.0), 2.0 * p.hpos(0.0), epsilon = 1e-9);
    }

    #[test]
    fn test_sheet_units_follow_factors() {
        assert_eq!(projection().paper_scale(), 100.0);
        let half = projection().with_factors(500.0, 500.0);
        assert_eq!(half.paper_scale(), 50.0);
        assert_eq!(half.su(4.0), 200.0);
    }

    #[test]
    fn test_bands_and_plan_centre() {
        let p = projection();
        assert_eq!(p.datum_band(20.0), 2000.0);
        assert_eq!(p.above(0.0, 2.5), -250.0);
        assert_eq!(p.plan_center_level(), 70.0);
    }
}
