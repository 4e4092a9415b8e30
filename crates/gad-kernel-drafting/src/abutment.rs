//! Abutment elevation and plan, one routine for both ends.
//!
//! The left abutment faces +x (towards the bridge); the right abutment uses
//! the same stations with every x offset negated, measured from
//! `abtl + nspan·span1`.

use gad_ir::{HAlign, Layer, LineWeight, Point2D, Primitive};
use gad_kernel_math::skew::rotate;
use gad_params::{BridgeParameters, Side};

use crate::{closed, ensure_positive, Result, Sheet};

/// Height of the `A1`/`A2` label, in plotted millimetres.
pub const LABEL_TEXT: f64 = 2.5;

/// Chainages and levels that define one abutment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stations {
    /// Bearing face.
    pub x1: f64,
    /// Front of the cap.
    pub x3: f64,
    /// Foot of the front batter.
    pub x5: f64,
    /// Foot of the toe batter.
    pub x6: f64,
    /// Front edge of the footing.
    pub x7: f64,
    /// Back edge of the footing.
    pub x10: f64,
    /// Foot of the back batter.
    pub x12: f64,
    /// Back of the dirt wall.
    pub x14: f64,
    /// Underside of the abutment cap.
    pub capb: f64,
    /// Underside of the footing.
    pub y8: f64,
    /// Top of the dirt wall.
    pub wall_top: f64,
}

/// Stations of the abutment at `side`.
pub fn stations(params: &BridgeParameters, side: Side) -> Stations {
    let ab = params.abutment(side);
    let lv = params.levels();
    let deck = params.deck();
    let sg = side.sign();

    let x1 = params.abutment_chainage(side);
    let x3 = x1 + sg * ab.cap_width;
    let capb = lv.capt - ab.cap_depth;
    let x5 = x3 + sg * (capb - ab.front_batter_level) / ab.front_batter;
    let x6 = x5 + sg * (ab.front_batter_level - ab.toe_batter_level) / ab.toe_batter;
    let x7 = x6 + sg * ab.front_offset;
    let x14 = x1 - sg * ab.dwth;
    let x12 = x14 - sg * (capb - ab.back_batter_level) / ab.back_batter;
    let x10 = x12 - sg * ab.front_offset;
    Stations {
        x1,
        x3,
        x5,
        x6,
        x7,
        x10,
        x12,
        x14,
        capb,
        y8: ab.toe_batter_level - ab.footing_depth,
        wall_top: lv.rtl + deck.apthk - deck.slbtht,
    }
}

fn component(side: Side) -> String {
    format!("abutment {}", side.label())
}

/// Closed 14-vertex outline plus the two interior reference lines.
pub fn abutment_elevation(sheet: &Sheet, side: Side) -> Result<Vec<Primitive>> {
    let params = sheet.params;
    let ab = params.abutment(side);
    let lv = params.levels();
    let p = &sheet.proj;
    let st = stations(params, side);
    let name = component(side);

    ensure_positive(&name, "footing depth", ab.footing_depth)?;

    let outline = [
        (st.x1, st.wall_top),
        (st.x1, lv.capt),
        (st.x3, lv.capt),
        (st.x3, st.capb),
        (st.x5, ab.front_batter_level),
        (st.x6, ab.toe_batter_level),
        (st.x7, ab.toe_batter_level),
        (st.x7, st.y8),
        (st.x10, st.y8),
        (st.x10, ab.toe_batter_level),
        (st.x12, ab.toe_batter_level),
        (st.x12, ab.back_batter_level),
        (st.x14, st.capb),
        (st.x14, st.wall_top),
    ];
    let mut out = vec![closed(
        &name,
        outline.iter().map(|&(x, y)| p.pt(x, y)).collect(),
        Layer::Abutment,
        LineWeight::Normal,
    )?];

    out.push(Primitive::line(
        p.pt(st.x14, st.capb),
        p.pt(st.x3, st.capb),
        Layer::Structure,
        LineWeight::Thin,
    ));
    out.push(Primitive::line(
        p.pt(st.x10, ab.toe_batter_level),
        p.pt(st.x7, ab.toe_batter_level),
        Layer::Structure,
        LineWeight::Thin,
    ));

    Ok(out)
}

/// Skewed footing outline, wall traces and label of the abutment in plan.
pub fn abutment_plan(sheet: &Sheet, side: Side) -> Result<Vec<Primitive>> {
    let params = sheet.params;
    let p = &sheet.proj;
    let st = stations(params, side);
    let name = component(side);
    let yc = p.plan_center_level();
    let half = params.derived().abtlen / 2.0;
    let angle = p.sheet_angle(params.skew().angle);

    // Each trace turns about its own axis point, which shears its ends by
    // (h·s, h·(1−c)).
    let trace = |x: f64| -> (Point2D, Point2D) {
        let axis = p.pt(x, yc);
        (
            rotate(p.pt(x, yc + half), axis, angle),
            rotate(p.pt(x, yc - half), axis, angle),
        )
    };

    let mut out = Vec::new();

    let (back_top, back_bottom) = trace(st.x10);
    let (front_top, front_bottom) = trace(st.x7);
    out.push(closed(
        &name,
        vec![back_top, front_top, front_bottom, back_bottom],
        Layer::Foundation,
        LineWeight::Normal,
    )?);

    for x in [st.x12, st.x14, st.x1, st.x3, st.x5, st.x6] {
        let (a, b) = trace(x);
        out.push(Primitive::line(a, b, Layer::Abutment, LineWeight::Normal));
    }
    let (heel_top, heel_bottom) = trace(st.x12);
    let (toe_top, toe_bottom) = trace(st.x6);
    out.push(Primitive::line(
        heel_top,
        toe_top,
        Layer::Abutment,
        LineWeight::Normal,
    ));
    out.push(Primitive::line(
        heel_bottom,
        toe_bottom,
        Layer::Abutment,
        LineWeight::Normal,
    ));

    let (label_at, _) = trace(st.x1);
    out.push(sheet.text(
        Point2D::new(label_at.x, p.above(label_at.y, 3.0)),
        side.label(),
        LABEL_TEXT,
        0.0,
        Layer::Annotations,
        HAlign::Center,
    ));

    Ok(out)
}
