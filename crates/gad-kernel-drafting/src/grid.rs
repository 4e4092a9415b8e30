//! Layout grid: datum line, level scale and chainage scale.
//!
//! Band offsets are in plotted millimetres below the datum line.

use std::f64::consts::FRAC_PI_2;

use gad_ir::{HAlign, Layer, LineWeight, Point2D, Primitive};

use crate::Sheet;

/// Spacing of the two bands under the datum line.
pub const D1: f64 = 20.0;
/// Chainage tick band.
pub const D4: f64 = 2.0 * D1;
/// Start of the chainage text.
pub const D8: f64 = D4 - 4.0;
/// Start of the ground level text.
pub const D9: f64 = D1 - 4.0;
/// Chainage tick length.
pub const CHAINAGE_TICK: f64 = 2.0;
/// Half length of a level tick.
pub const LEVEL_TICK: f64 = 2.5;
/// Text height of level and chainage values.
pub const VALUE_TEXT: f64 = 2.0;
/// Text height of the band labels.
pub const LABEL_TEXT: f64 = 2.5;
/// Distance of the band labels left of the axis.
pub const LABEL_OFFSET: f64 = 25.0;

/// Tolerance when counting grid steps, so `10.0 / 2.0` yields 5 steps.
const STEP_EPS: f64 = 1e-9;

/// Number of whole `step`s in `span`.
pub(crate) fn steps(span: f64, step: f64) -> usize {
    let n = (span / step + STEP_EPS).floor();
    if n.is_finite() && n > 0.0 {
        n as usize
    } else {
        0
    }
}

/// Levels marked on the axis: `datum + i·yincr` up to `toprl`.
pub fn level_marks(datum: f64, toprl: f64, yincr: f64) -> Vec<f64> {
    (0..=steps(toprl - datum, yincr))
        .map(|i| datum + i as f64 * yincr)
        .collect()
}

/// Chainages marked on the scale: `left + a·xincr` for `a ≥ 1` up to `right`.
pub fn chainage_marks(left: f64, right: f64, xincr: f64) -> Vec<f64> {
    (1..=steps(right - left, xincr))
        .map(|a| left + a as f64 * xincr)
        .collect()
}

/// Datum line, bands, level axis and both scales.
pub fn layout_grid(sheet: &Sheet) -> Vec<Primitive> {
    let f = sheet.params.frame();
    let p = &sheet.proj;
    let x0 = p.hpos(f.left);
    let x1 = p.hpos(f.right);
    let mut out = Vec::new();

    let datum_y = p.vpos(f.datum);
    out.push(Primitive::line(
        Point2D::new(x0, datum_y),
        Point2D::new(x1, datum_y),
        Layer::Grid,
        LineWeight::Normal,
    ));
    for band in [D1, 2.0 * D1] {
        let y = p.datum_band(band);
        out.push(Primitive::line(
            Point2D::new(x0, y),
            Point2D::new(x1, y),
            Layer::Grid,
            LineWeight::Thin,
        ));
    }
    out.push(Primitive::line(
        Point2D::new(x0, p.datum_band(2.0 * D1)),
        p.pt(f.left, f.toprl),
        Layer::Grid,
        LineWeight::Normal,
    ));

    for (content, band) in [("BED LEVEL", 0.5 * D1), ("CHAINAGE", 1.5 * D1)] {
        out.push(sheet.text(
            Point2D::new(
                x0 - p.su(LABEL_OFFSET),
                p.below(p.datum_band(band), LABEL_TEXT / 2.0),
            ),
            content,
            LABEL_TEXT,
            0.0,
            Layer::Grid,
            HAlign::Left,
        ));
    }

    for lvl in level_marks(f.datum, f.toprl, f.yincr) {
        let y = p.vpos(lvl);
        out.push(Primitive::line(
            Point2D::new(x0 - p.su(LEVEL_TICK), y),
            Point2D::new(x0 + p.su(LEVEL_TICK), y),
            Layer::Grid,
            LineWeight::Thin,
        ));
        out.push(sheet.text(
            Point2D::new(x0 - p.su(LEVEL_TICK + 1.5), p.below(y, VALUE_TEXT / 2.0)),
            format!("{lvl:.3}"),
            VALUE_TEXT,
            0.0,
            Layer::Grid,
            HAlign::Right,
        ));
    }

    for ch in chainage_marks(f.left, f.right, f.xincr) {
        let x = p.hpos(ch);
        out.push(Primitive::line(
            Point2D::new(x, p.datum_band(D4)),
            Point2D::new(x, p.datum_band(D4 - CHAINAGE_TICK)),
            Layer::Grid,
            LineWeight::Thin,
        ));
        out.push(sheet.text(
            Point2D::new(x + p.su(VALUE_TEXT / 2.0), p.datum_band(D8)),
            format!("{ch:.3}"),
            VALUE_TEXT,
            FRAC_PI_2,
            Layer::Grid,
            HAlign::Left,
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn texts(prims: &[Primitive]) -> Vec<(String, f64)> {
        prims
            .iter()
            .filter_map(|p| match p {
                Primitive::Text {
                    content, rotation, ..
                } => Some((content.clone(), *rotation)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_level_marks_with_step_two() {
        assert_eq!(
            level_marks(100.0, 110.0, 2.0),
            vec![100.0, 102.0, 104.0, 106.0, 108.0, 110.0]
        );
    }

    #[test]
    fn test_chainage_marks_skip_left() {
        assert_eq!(chainage_marks(0.0, 20.0, 5.0), vec![5.0, 10.0, 15.0, 20.0]);
        assert!(chainage_marks(0.0, 4.0, 5.0).is_empty());
    }

    #[test]
    fn test_fractional_step_count() {
        assert_eq!(steps(0.3, 0.1), 3);
        assert_eq!(steps(-1.0, 1.0), 0);
    }

    #[test]
    fn test_grid_single_span() {
        let params = fixtures::single_span();
        let sheet = Sheet::for_params(&params);
        let prims = layout_grid(&sheet);
        assert!(prims.iter().all(|p| p.layer() == Layer::Grid));

        let texts = texts(&prims);
        let levels: Vec<_> = texts
            .iter()
            .filter(|(c, r)| *r == 0.0 && c.contains('.'))
            .collect();
        assert_eq!(levels.len(), 11);
        assert_eq!(levels[0].0, "100.000");
        let chainages: Vec<_> = texts.iter().filter(|(_, r)| *r == FRAC_PI_2).collect();
        assert_eq!(chainages.len(), 4);
        assert_eq!(chainages[3].0, "20.000");
        assert!(texts.iter().any(|(c, _)| c == "BED LEVEL"));
        assert!(texts.iter().any(|(c, _)| c == "CHAINAGE"));
    }

    #[test]
    fn test_grid_band_positions() {
        let params = fixtures::single_span();
        let sheet = Sheet::for_params(&params);
        let prims = layout_grid(&sheet);
        // datum at paper y 0, bands 2000 and 4000 units below at 1:100
        let ys: Vec<f64> = prims
            .iter()
            .take(3)
            .map(|p| match p {
                Primitive::Line { start, .. } => start.y,
                _ => f64::NAN,
            })
            .collect();
        assert_eq!(ys, vec![0.0, 2000.0, 4000.0]);
        match &prims[3] {
            Primitive::Line { start, end, .. } => {
                assert_eq!(start.y, 4000.0);
                assert_eq!(end.y, -10_000.0);
            }
            other => panic!("expected axis line, got {other:?}"),
        }
    }
}
