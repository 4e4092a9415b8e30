//! Ground profile along the bridge.

use std::f64::consts::FRAC_PI_2;

use gad_ir::{HAlign, Layer, LineWeight, Point2D, Primitive};

use crate::grid::{CHAINAGE_TICK, D4, D8, D9, VALUE_TEXT};
use crate::{open, Result, Sheet};

/// Text height of chainages that fall between grid marks.
pub const OFF_GRID_TEXT: f64 = 1.8;

/// Whether `chainage` falls between the regular chainage marks.
pub fn is_off_grid(chainage: f64, left: f64, xincr: f64) -> bool {
    let r = (chainage - left) / xincr;
    (r - r.round()).abs() > 1e-6
}

/// Profile polyline, tie-lines to the datum, and the level/chainage texts.
pub fn ground_profile(sheet: &Sheet) -> Result<Vec<Primitive>> {
    let f = sheet.params.frame();
    let p = &sheet.proj;
    let samples = sheet.params.cross_section();
    let mut out = Vec::new();

    if samples.len() > 1 {
        out.push(open(
            "ground profile",
            samples.iter().map(|s| p.pt(s.chainage, s.level)).collect(),
            Layer::CrossSection,
            LineWeight::Thick,
        )?);
    }

    for s in samples {
        let x = p.hpos(s.chainage);
        if is_off_grid(s.chainage, f.left, f.xincr) {
            out.push(Primitive::line(
                Point2D::new(x, p.datum_band(D4)),
                Point2D::new(x, p.datum_band(D4 - CHAINAGE_TICK)),
                Layer::CrossSection,
                LineWeight::Thin,
            ));
            out.push(sheet.text(
                Point2D::new(x + p.su(OFF_GRID_TEXT / 2.0), p.datum_band(D8)),
                format!("{:.3}", s.chainage),
                OFF_GRID_TEXT,
                FRAC_PI_2,
                Layer::CrossSection,
                HAlign::Left,
            ));
        }
        out.push(sheet.text(
            Point2D::new(x + p.su(VALUE_TEXT / 2.0), p.datum_band(D9)),
            format!("{:.3}", s.level),
            VALUE_TEXT,
            FRAC_PI_2,
            Layer::CrossSection,
            HAlign::Left,
        ));
        let top = p.pt(s.chainage, s.level);
        let foot = p.pt(s.chainage, f.datum);
        if !top.coincides(&foot) {
            out.push(Primitive::line(
                top,
                foot,
                Layer::CrossSection,
                LineWeight::Thin,
            ));
        }
    }

    Ok(out)
}
