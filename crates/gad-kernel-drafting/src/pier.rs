//! Pier elevation and skewed pier plan.
//!
//! Piers stand at `xc = abtl + i·span1` for `i = 1..nspan`. Widths along the
//! bridge are stretched by `1/cos(skew)` in elevation; the plan is drawn
//! square and rotated about `pt(xc, yc)`.

use std::f64::consts::PI;

use gad_ir::{HAlign, Layer, LineWeight, Point2D, Primitive};
use gad_kernel_math::skew::rotate;

use crate::{closed, ensure_positive, open, Result, Sheet};

/// Segments used for each semicircular nose in plan.
pub const NOSE_SEGMENTS: usize = 12;

/// Height of the `P<i>` label, in plotted millimetres.
pub const LABEL_TEXT: f64 = 2.5;

fn component(index: usize) -> String {
    format!("pier P{index}")
}

/// Chainage of pier `index` (1-based).
pub fn pier_chainage(sheet: &Sheet, index: usize) -> f64 {
    let spans = sheet.params.spans();
    spans.abtl + index as f64 * spans.span1
}

/// Cap, two battered shaft edges and the footing of pier `index`.
pub fn pier_elevation(sheet: &Sheet, index: usize) -> Result<Vec<Primitive>> {
    let params = sheet.params;
    let lv = params.levels();
    let pier = params.pier();
    let d = params.derived();
    let skew = params.skew();
    let p = &sheet.proj;
    let name = component(index);
    let xc = pier_chainage(sheet, index);

    ensure_positive(&name, "footing depth", pier.futd)?;
    let spread = skew.across(d.ofset);
    ensure_positive(&name, "shaft bottom width", d.piertwsq + 2.0 * spread)?;

    let mut out = Vec::with_capacity(4);
    let half_cap = d.capwsq / 2.0;
    out.push(closed(
        &name,
        vec![
            p.pt(xc - half_cap, lv.capt),
            p.pt(xc + half_cap, lv.capt),
            p.pt(xc + half_cap, lv.capb),
            p.pt(xc - half_cap, lv.capb),
        ],
        Layer::Pier,
        LineWeight::Normal,
    )?);

    // The shaft is two edges; the cap and footing close it.
    let half_top = d.piertwsq / 2.0;
    let foot = lv.futrl + pier.futd;
    for sign in [-1.0, 1.0] {
        out.push(Primitive::line(
            p.pt(xc + sign * half_top, lv.capb),
            p.pt(xc + sign * (half_top + spread), foot),
            Layer::Pier,
            LineWeight::Normal,
        ));
    }

    let half_footing = skew.across(pier.futw) / 2.0;
    out.push(closed(
        &name,
        vec![
            p.pt(xc - half_footing, lv.futrl),
            p.pt(xc + half_footing, lv.futrl),
            p.pt(xc + half_footing, lv.futrl - pier.futd),
            p.pt(xc - half_footing, lv.futrl - pier.futd),
        ],
        Layer::Foundation,
        LineWeight::Normal,
    )?);

    Ok(out)
}

/// Footing outline, shaft lines, noses and label of pier `index` in plan.
pub fn pier_plan(sheet: &Sheet, index: usize) -> Result<Vec<Primitive>> {
    let params = sheet.params;
    let pier = params.pier();
    let d = params.derived();
    let p = &sheet.proj;
    let name = component(index);
    let xc = pier_chainage(sheet, index);
    let yc = p.plan_center_level();
    let center = p.pt(xc, yc);
    let angle = p.sheet_angle(params.skew().angle);
    let place = |x: f64, y: f64| rotate(p.pt(x, y), center, angle);

    let mut out = Vec::new();

    let (hw, hl) = (pier.futw / 2.0, pier.futl / 2.0);
    out.push(closed(
        &name,
        vec![
            place(xc - hw, yc + hl),
            place(xc + hw, yc + hl),
            place(xc + hw, yc - hl),
            place(xc - hw, yc - hl),
        ],
        Layer::Foundation,
        LineWeight::Normal,
    )?);

    let inner = d.piertwsq / 2.0;
    let outer = inner + d.ofset;
    let half_len = d.pierstsq / 2.0;
    for offset in [-outer, -inner, inner, outer] {
        out.push(Primitive::line(
            place(xc + offset, yc - half_len),
            place(xc + offset, yc + half_len),
            Layer::Pier,
            LineWeight::Normal,
        ));
    }

    // Semicircular ends joining each pair of lines, bulging away from the centre.
    for end in [1.0, -1.0] {
        let ye = yc + end * half_len;
        for radius in [inner, outer] {
            if radius <= 0.0 {
                continue;
            }
            let points = (0..=NOSE_SEGMENTS)
                .map(|k| {
                    let t = end * PI * k as f64 / NOSE_SEGMENTS as f64;
                    place(xc + radius * t.cos(), ye + radius * t.sin())
                })
                .collect();
            out.push(open(&name, points, Layer::Pier, LineWeight::Normal)?);
        }
    }

    let top = place(xc, yc + hl.max(half_len + outer));
    out.push(sheet.text(
        Point2D::new(top.x, p.above(top.y, 3.0)),
        format!("P{index}"),
        LABEL_TEXT,
        0.0,
        Layer::Annotations,
        HAlign::Center,
    ));

    Ok(out)
}
