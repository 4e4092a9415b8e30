//! Deck bays, approach slabs and wearing course in elevation.

use gad_ir::{Layer, LineWeight, Point2D, Primitive};
use gad_params::Side;

use crate::{closed, Result, Sheet};

/// Inset of each bay outline from its supports, in paper units.
pub const BEARING_CLEARANCE: f64 = 25.0;

/// Overhang of the wearing course past the approach slabs, in world units.
pub const WEARING_COURSE_OVERHANG: f64 = 0.025;

fn rectangle(component: &str, a: Point2D, b: Point2D) -> Result<Primitive> {
    closed(
        component,
        vec![a, Point2D::new(b.x, a.y), b, Point2D::new(a.x, b.y)],
        Layer::Structure,
        LineWeight::Normal,
    )
}

/// One rectangle per span from `RTL` down to the soffit, inset horizontally
/// by the bearing clearance.
pub fn superstructure_bays(sheet: &Sheet) -> Result<Vec<Primitive>> {
    let spans = sheet.params.spans();
    let lv = sheet.params.levels();
    let p = &sheet.proj;
    (1..=spans.nspan)
        .map(|i| {
            let start = spans.abtl + (i - 1) as f64 * spans.span1;
            let end = start + spans.span1;
            rectangle(
                &format!("span {i}"),
                p.pt(start, lv.rtl).offset(BEARING_CLEARANCE, 0.0),
                p.pt(end, lv.sofl).offset(-BEARING_CLEARANCE, 0.0),
            )
        })
        .collect()
}

/// Approach slabs behind both abutments. Empty when `LASLAB` is zero.
pub fn approach_slabs(sheet: &Sheet) -> Result<Vec<Primitive>> {
    let params = sheet.params;
    let laslab = params.spans().laslab;
    if laslab <= 0.0 {
        return Ok(Vec::new());
    }
    let rtl = params.levels().rtl;
    let bottom = rtl - params.deck().apthk;
    let p = &sheet.proj;
    let left = params.abutment_chainage(Side::Left);
    let right = params.abutment_chainage(Side::Right);
    Ok(vec![
        rectangle(
            "left approach slab",
            p.pt(left - laslab, rtl),
            p.pt(left, bottom),
        )?,
        rectangle(
            "right approach slab",
            p.pt(right, rtl),
            p.pt(right + laslab, bottom),
        )?,
    ])
}

/// Wearing course over the deck and approach slabs. Empty when `WCTH` is zero.
pub fn wearing_course(sheet: &Sheet) -> Result<Vec<Primitive>> {
    let params = sheet.params;
    let wcth = params.deck().wcth;
    if wcth <= 0.0 {
        return Ok(Vec::new());
    }
    let spans = params.spans();
    let rtl = params.levels().rtl;
    let start = spans.abtl - spans.laslab - WEARING_COURSE_OVERHANG;
    let end = spans.abtl + spans.lbridge + spans.laslab + WEARING_COURSE_OVERHANG;
    let p = &sheet.proj;
    Ok(vec![rectangle(
        "wearing course",
        p.pt(start, rtl + wcth),
        p.pt(end, rtl),
    )?])
}
