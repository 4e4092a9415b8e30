//! Transverse sections, drawn in the section frame right of the elevation.
//!
//! Both sections measure across the carriageway from a world chainage
//! `anchor` chosen so that `h2pos(anchor)` sits [`SECTION_GAP`] plotted
//! millimetres right of the frame.

use gad_ir::{HAlign, Layer, LineWeight, Point2D, Primitive};

use crate::{closed, ensure_positive, Result, Sheet};

/// Gap between the elevation frame and section A-A, in plotted millimetres.
pub const SECTION_GAP: f64 = 40.0;
/// Gap between the two sections.
pub const SECTION_SPACING: f64 = 30.0;
/// Height of the section captions.
pub const CAPTION_TEXT: f64 = 3.5;
/// Distance of captions and dimensions from the drawn section.
const CLEARANCE: f64 = 8.0;

fn rectangle(
    component: &str,
    a: Point2D,
    b: Point2D,
    layer: Layer,
) -> Result<Primitive> {
    closed(
        component,
        vec![a, Point2D::new(b.x, a.y), b, Point2D::new(a.x, b.y)],
        layer,
        LineWeight::Normal,
    )
}

/// Section chainage placed `gap` plotted millimetres right of paper x `px`.
fn anchor_after(sheet: &Sheet, px: f64, gap: f64) -> f64 {
    let p = &sheet.proj;
    p.inv_h2pos(px + p.su(gap))
}

/// Section-frame chainage at which section A-A starts.
pub fn deck_anchor(sheet: &Sheet) -> f64 {
    anchor_after(sheet, sheet.proj.hpos(sheet.params.frame().right), SECTION_GAP)
}

/// Overall deck width, kerbs included.
pub fn deck_width(sheet: &Sheet) -> f64 {
    let deck = sheet.params.deck();
    deck.ccbr + 2.0 * deck.kerbw
}

/// Section-frame chainage at which section B-B starts.
pub fn pier_anchor(sheet: &Sheet) -> f64 {
    let p = &sheet.proj;
    anchor_after(
        sheet,
        p.h2pos(deck_anchor(sheet) + deck_width(sheet)),
        SECTION_SPACING,
    )
}

/// `SECTION A-A`: slab with cambered soffit, kerbs and carriageway dimension.
pub fn deck_section(sheet: &Sheet) -> Result<Vec<Primitive>> {
    let deck = sheet.params.deck();
    let rtl = sheet.params.levels().rtl;
    let p = &sheet.proj;
    let name = "section A-A";
    let width = deck_width(sheet);
    ensure_positive(name, "deck width", width)?;
    ensure_positive(name, "edge slab thickness", deck.slbthe)?;
    ensure_positive(name, "centre slab thickness", deck.slbthc)?;

    let x0 = deck_anchor(sheet);
    let x1 = x0 + width;
    let mut out = vec![closed(
        name,
        vec![
            p.p2t(x0, rtl),
            p.p2t(x1, rtl),
            p.p2t(x1, rtl - deck.slbthe),
            p.p2t(x0 + width / 2.0, rtl - deck.slbthc),
            p.p2t(x0, rtl - deck.slbthe),
        ],
        Layer::Structure,
        LineWeight::Normal,
    )?];

    if deck.kerbw > 0.0 && deck.kerbd > 0.0 {
        for start in [x0, x1 - deck.kerbw] {
            out.push(rectangle(
                name,
                p.p2t(start, rtl + deck.kerbd),
                p.p2t(start + deck.kerbw, rtl),
                Layer::Structure,
            )?);
        }
    }

    let top = p.above(p.v2pos(rtl + deck.kerbd.max(0.0)), CLEARANCE);
    out.push(sheet.dimension(
        p.p2t(x0 + deck.kerbw, rtl),
        p.p2t(x1 - deck.kerbw, rtl),
        top,
    ));

    let bottom = p.v2pos(rtl - deck.slbthe.max(deck.slbthc));
    out.push(sheet.text(
        Point2D::new(p.h2pos(x0 + width / 2.0), p.below(bottom, CLEARANCE)),
        "SECTION A-A",
        CAPTION_TEXT,
        0.0,
        Layer::Annotations,
        HAlign::Center,
    ));

    Ok(out)
}

/// `SECTION B-B (TYPICAL PIER)`: cap, shaft and footing across the bridge.
/// Empty for a single span.
pub fn pier_section(sheet: &Sheet) -> Result<Vec<Primitive>> {
    let params = sheet.params;
    if params.spans().nspan < 2 {
        return Ok(Vec::new());
    }
    let lv = params.levels();
    let pier = params.pier();
    let p = &sheet.proj;
    let name = "section B-B";
    ensure_positive(name, "pier length", pier.pierst)?;
    ensure_positive(name, "footing length", pier.futl)?;
    ensure_positive(name, "footing depth", pier.futd)?;

    let cap_len = deck_width(sheet).max(pier.pierst);
    let reach = cap_len.max(pier.futl);
    let xc = pier_anchor(sheet) + reach / 2.0;

    let mut out = Vec::with_capacity(5);
    out.push(rectangle(
        name,
        p.p2t(xc - cap_len / 2.0, lv.capt),
        p.p2t(xc + cap_len / 2.0, lv.capb),
        Layer::Pier,
    )?);
    if lv.capb > lv.futrl {
        out.push(rectangle(
            name,
            p.p2t(xc - pier.pierst / 2.0, lv.capb),
            p.p2t(xc + pier.pierst / 2.0, lv.futrl),
            Layer::Pier,
        )?);
    }
    let footing_bottom = lv.futrl - pier.futd;
    out.push(rectangle(
        name,
        p.p2t(xc - pier.futl / 2.0, lv.futrl),
        p.p2t(xc + pier.futl / 2.0, footing_bottom),
        Layer::Foundation,
    )?);

    let below = p.below(p.v2pos(footing_bottom), CLEARANCE);
    out.push(sheet.dimension(
        p.p2t(xc - pier.futl / 2.0, footing_bottom),
        p.p2t(xc + pier.futl / 2.0, footing_bottom),
        below,
    ));
    out.push(sheet.text(
        Point2D::new(p.h2pos(xc), p.below(below, CLEARANCE)),
        "SECTION B-B (TYPICAL PIER)",
        CAPTION_TEXT,
        0.0,
        Layer::Annotations,
        HAlign::Center,
    ));

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use approx::assert_abs_diff_eq;

    fn caption(prims: &[Primitive]) -> Option<&str> {
        prims.iter().find_map(|p| match p {
            Primitive::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }

    #[test]
    fn test_deck_section_right_of_frame() {
        let params = fixtures::three_span();
        let sheet = Sheet::for_params(&params);
        let prims = deck_section(&sheet).unwrap();
        let slab = prims[0].bounds();
        let frame_right = sheet.proj.hpos(50.0);
        assert_abs_diff_eq!(slab.min_x, frame_right + sheet.proj.su(SECTION_GAP), epsilon = 1e-6);
        // 8.5 m across at twice the elevation scale
        assert_abs_diff_eq!(slab.width(), 8.5 * 2.0 * 1000.0, epsilon = 1e-6);
        assert_eq!(caption(&prims), Some("SECTION A-A"));
    }

    #[test]
    fn test_cambered_soffit() {
        let params = fixtures::three_span();
        let sheet = Sheet::for_params(&params);
        let prims = deck_section(&sheet).unwrap();
        let points = match &prims[0] {
            Primitive::Polyline { points, .. } => points.clone(),
            other => panic!("expected slab, got {other:?}"),
        };
        assert_eq!(points.len(), 5);
        let p = &sheet.proj;
        assert_abs_diff_eq!(points[2].y, p.v2pos(105.0 - 0.75), epsilon = 1e-9);
        assert_abs_diff_eq!(points[3].y, p.v2pos(105.0 - 0.9), epsilon = 1e-9);
        assert!(points[3].y > points[2].y);
    }

    #[test]
    fn test_carriageway_dimension() {
        let params = fixtures::three_span();
        let sheet = Sheet::for_params(&params);
        let prims = deck_section(&sheet).unwrap();
        let dim = prims
            .iter()
            .find(|p| p.layer() == Layer::Dimensions)
            .unwrap();
        assert_abs_diff_eq!(dim.measurement().unwrap(), 7.5 * 2000.0, epsilon = 1e-6);
        // slab and two kerbs
        let outlines = prims
            .iter()
            .filter(|p| p.layer() == Layer::Structure)
            .count();
        assert_eq!(outlines, 3);
    }

    #[test]
    fn test_pier_section_only_for_multiple_spans() {
        let single = fixtures::single_span();
        assert!(pier_section(&Sheet::for_params(&single)).unwrap().is_empty());

        let params = fixtures::three_span();
        let sheet = Sheet::for_params(&params);
        let prims = pier_section(&sheet).unwrap();
        assert_eq!(prims.len(), 5);
        assert_eq!(caption(&prims), Some("SECTION B-B (TYPICAL PIER)"));

        let deck_right = deck_section(&sheet).unwrap()[0].bounds().max_x;
        assert!(prims[0].bounds().min_x > deck_right);

        let footing = prims[2].bounds();
        assert_eq!(prims[2].layer(), Layer::Foundation);
        assert_abs_diff_eq!(footing.width(), 12.0 * 2000.0, epsilon = 1e-6);
        let dim = prims[3].measurement().unwrap();
        assert_abs_diff_eq!(dim, 12.0 * 2000.0, epsilon = 1e-6);
    }
}
