//! Expansion of a linear dimension into strokes and text, for backends
//! without a native dimension entity.

use gad_ir::{DimStyle, Point2D};

/// Strokes and label of one dimension, in paper units.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DimensionLayout {
    /// Extension lines, dimension line and ticks.
    pub lines: Vec<(Point2D, Point2D)>,
    /// Centre of the text baseline.
    pub text_at: Point2D,
    /// Measured value.
    pub text: String,
    /// Text rotation, counter-clockwise on the sheet.
    pub rotation: f64,
}

fn add(a: Point2D, d: (f64, f64), k: f64) -> Point2D {
    Point2D::new(a.x + d.0 * k, a.y + d.1 * k)
}

fn dot(a: Point2D, b: Point2D, d: (f64, f64)) -> f64 {
    (b.x - a.x) * d.0 + (b.y - a.y) * d.1
}

pub(crate) fn layout(
    base: Point2D,
    p1: Point2D,
    p2: Point2D,
    angle: f64,
    style: &DimStyle,
) -> DimensionLayout {
    let (s, c) = angle.sin_cos();
    // Along the dimension, and towards the sheet's "up" side of it.
    let along = (c, -s);
    let normal = (-s, -c);

    let foot = |p: Point2D| add(p, normal, dot(p, base, normal));
    let d1 = foot(p1);
    let d2 = foot(p2);

    let mut lines = Vec::with_capacity(5);
    for (p, d) in [(p1, d1), (p2, d2)] {
        let len = p.distance(&d);
        if len > style.ext_offset {
            let dir = ((d.x - p.x) / len, (d.y - p.y) / len);
            lines.push((add(p, dir, style.ext_offset), add(d, dir, style.ext_extension)));
        }
    }
    lines.push((d1, d2));

    let k = std::f64::consts::FRAC_1_SQRT_2 * style.arrow_size / 2.0;
    let tick = (along.0 + normal.0, along.1 + normal.1);
    for d in [d1, d2] {
        lines.push((add(d, tick, -k), add(d, tick, k)));
    }

    let measured = dot(p1, p2, along).abs() * style.linear_factor;
    DimensionLayout {
        lines,
        text_at: add(d1.midpoint(&d2), normal, style.text_height / 4.0),
        text: format!("{measured:.0}"),
        rotation: angle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use gad_ir::StyleRegistry;

    #[test]
    fn test_horizontal_dimension_above_points() {
        let style = StyleRegistry::for_scale(100.0).dim_style;
        let dim = layout(
            Point2D::new(7500.0, -1000.0),
            Point2D::new(0.0, 0.0),
            Point2D::new(15_000.0, 0.0),
            0.0,
            &style,
        );
        assert_eq!(dim.text, "15000");
        // two extension lines, the dimension line, two ticks
        assert_eq!(dim.lines.len(), 5);
        let (a, b) = dim.lines[2];
        assert_abs_diff_eq!(a.y, -1000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(b.x, 15_000.0, epsilon = 1e-9);
        // extension line starts clear of the measured point and overshoots
        let (start, end) = dim.lines[0];
        assert_abs_diff_eq!(start.y, -style.ext_offset, epsilon = 1e-9);
        assert_abs_diff_eq!(end.y, -1000.0 - style.ext_extension, epsilon = 1e-9);
        assert!(dim.text_at.y < -1000.0);
    }

    #[test]
    fn test_dimension_on_points_has_no_extension_lines() {
        let style = StyleRegistry::for_scale(100.0).dim_style;
        let dim = layout(
            Point2D::new(50.0, 0.0),
            Point2D::new(0.0, 0.0),
            Point2D::new(100.0, 0.0),
            0.0,
            &style,
        );
        assert_eq!(dim.lines.len(), 3);
    }
}
