//! Span dimensions, view captions and the title block.

use gad_ir::{BoundingBox2D, HAlign, Layer, LineWeight, Point2D, Primitive};
use gad_params::BridgeParameters;
use serde::{Deserialize, Serialize};

use crate::grid::D1;
use crate::{closed, Result, Sheet};

/// Distance of the span dimensions above the deck, in plotted millimetres.
pub const SPAN_DIM_OFFSET: f64 = 10.0;
/// Further distance of the overall-length dimension.
pub const OVERALL_DIM_OFFSET: f64 = 10.0;
/// Height of the `ELEVATION` and `PLAN` captions.
pub const CAPTION_TEXT: f64 = 4.0;
/// Height of the drawing title.
pub const TITLE_TEXT: f64 = 5.0;
/// Height of the information lines under the title.
pub const INFO_TEXT: f64 = 3.0;
/// Space between the drawing and the title block.
pub const TITLE_GAP: f64 = 15.0;
/// Inner padding of the title block frame.
const PADDING: f64 = 5.0;

/// Title and project lines printed in the title block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleText {
    /// Main title.
    pub title: String,
    /// Project information, one entry per line.
    pub lines: Vec<String>,
}

impl Default for TitleText {
    fn default() -> Self {
        Self {
            title: "GENERAL ARRANGEMENT DRAWING".into(),
            lines: vec!["BRIDGE DESIGN".into()],
        }
    }
}

/// One dimension per span between support centres, then the overall length.
pub fn span_dimensions(sheet: &Sheet) -> Vec<Primitive> {
    let params = sheet.params;
    let spans = params.spans();
    let p = &sheet.proj;
    let deck_top = params.levels().rtl + params.deck().wcth;
    let span_y = p.above(p.vpos(deck_top), SPAN_DIM_OFFSET);

    let mut out: Vec<Primitive> = (0..spans.nspan)
        .map(|i| {
            let a = spans.abtl + i as f64 * spans.span1;
            let b = a + spans.span1;
            sheet.dimension(p.pt(a, deck_top), p.pt(b, deck_top), span_y)
        })
        .collect();

    out.push(sheet.dimension(
        p.pt(spans.abtl, deck_top),
        p.pt(spans.abtl + spans.lbridge, deck_top),
        p.above(span_y, OVERALL_DIM_OFFSET),
    ));
    out
}

/// Furthest world distance any plan outline reaches from the plan centre line.
pub fn plan_reach(params: &BridgeParameters) -> f64 {
    let d = params.derived();
    let pier = params.pier();
    let skew = params.skew();
    let (s, c) = (skew.s.abs(), skew.c.abs());
    let abutment = d.abtlen / 2.0 * c;
    let footing = pier.futl / 2.0 * c + pier.futw / 2.0 * s;
    let shaft = d.pierstsq / 2.0 + d.piertwsq / 2.0 + d.ofset.abs();
    abutment.max(footing).max(shaft)
}

/// `ELEVATION` under the chainage scale and `PLAN` under the plan.
pub fn captions(sheet: &Sheet) -> Vec<Primitive> {
    let params = sheet.params;
    let f = params.frame();
    let p = &sheet.proj;
    let mid = p.hpos((f.left + f.right) / 2.0);
    let plan_bottom = p.vpos(p.plan_center_level() - plan_reach(params));

    [
        ("ELEVATION", p.datum_band(2.0 * D1 + 10.0)),
        ("PLAN", p.below(plan_bottom, 10.0)),
    ]
    .into_iter()
    .map(|(content, y)| {
        sheet.text(
            Point2D::new(mid, y),
            content,
            CAPTION_TEXT,
            0.0,
            Layer::Annotations,
            HAlign::Center,
        )
    })
    .collect()
}

/// Lines printed under the title: the configured lines, then scale, skew
/// and span arrangement.
pub fn info_lines(params: &BridgeParameters, title: &TitleText) -> Vec<String> {
    let f = params.frame();
    let spans = params.spans();
    let mut lines = title.lines.clone();
    lines.push(format!(
        "SCALE 1:{} (SECTIONS 1:{})",
        f.scale1, f.scale2
    ));
    lines.push(format!("SKEW {:.3} DEG", params.skew_degrees()));
    lines.push(format!(
        "{} SPAN(S) OF {:.3} M, OVERALL {:.3} M",
        spans.nspan, spans.span1, spans.lbridge
    ));
    lines
}

/// Centred title, information lines and a frame, placed under `drawn`.
pub fn title_block(sheet: &Sheet, title: &TitleText, drawn: &BoundingBox2D) -> Result<Vec<Primitive>> {
    let f = sheet.params.frame();
    let p = &sheet.proj;
    let (left, right) = if drawn.is_valid() {
        (drawn.min_x, drawn.max_x)
    } else {
        (p.hpos(f.left), p.hpos(f.right))
    };
    let top = if drawn.is_valid() {
        p.below(drawn.max_y, TITLE_GAP)
    } else {
        p.datum_band(2.0 * D1 + TITLE_GAP)
    };
    let mid = (left + right) / 2.0;

    let mut out = Vec::new();
    let mut y = p.below(top, PADDING + TITLE_TEXT);
    out.push(sheet.text(
        Point2D::new(mid, y),
        title.title.clone(),
        TITLE_TEXT,
        0.0,
        Layer::TitleBlock,
        HAlign::Center,
    ));
    for line in info_lines(sheet.params, title) {
        y = p.below(y, INFO_TEXT * 1.8);
        out.push(sheet.text(
            Point2D::new(mid, y),
            line,
            INFO_TEXT,
            0.0,
            Layer::TitleBlock,
            HAlign::Center,
        ));
    }
    let bottom = p.below(y, PADDING);
    out.push(closed(
        "title block",
        vec![
            Point2D::new(left, top),
            Point2D::new(right, top),
            Point2D::new(right, bottom),
            Point2D::new(left, bottom),
        ],
        Layer::TitleBlock,
        LineWeight::Thick,
    )?);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use approx::assert_abs_diff_eq;
    use gad_ir::stream_bounds;

    #[test]
    fn test_span_dimensions_three_span() {
        let params = fixtures::three_span();
        let sheet = Sheet::for_params(&params);
        let dims = span_dimensions(&sheet);
        assert_eq!(dims.len(), 4);
        for dim in &dims[..3] {
            assert_abs_diff_eq!(dim.measurement().unwrap(), 15_000.0, epsilon = 1e-6);
        }
        assert_abs_diff_eq!(dims[3].measurement().unwrap(), 45_000.0, epsilon = 1e-6);
        assert!(dims.iter().all(|d| d.layer() == Layer::Dimensions));
        // overall length sits above the span chain
        assert!(dims[3].bounds().min_y < dims[0].bounds().min_y);
    }

    #[test]
    fn test_captions() {
        let params = fixtures::three_span();
        let sheet = Sheet::for_params(&params);
        let caps = captions(&sheet);
        let contents: Vec<_> = caps
            .iter()
            .filter_map(|p| match p {
                Primitive::Text { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(contents, vec!["ELEVATION", "PLAN"]);
        assert!(caps[1].bounds().min_y > caps[0].bounds().min_y);
    }

    #[test]
    fn test_info_lines() {
        let params = fixtures::three_span();
        let lines = info_lines(&params, &TitleText::default());
        assert_eq!(lines[0], "BRIDGE DESIGN");
        assert_eq!(lines[1], "SCALE 1:100 (SECTIONS 1:50)");
        assert_eq!(lines[2], "SKEW 15.000 DEG");
        assert_eq!(lines[3], "3 SPAN(S) OF 15.000 M, OVERALL 45.000 M");
    }

    #[test]
    fn test_title_block_below_drawing() {
        let params = fixtures::single_span();
        let sheet = Sheet::for_params(&params);
        let drawn = stream_bounds(&crate::grid::layout_grid(&sheet));
        let block = title_block(&sheet, &TitleText::default(), &drawn).unwrap();
        assert!(block.iter().all(|p| p.layer() == Layer::TitleBlock));
        match &block[0] {
            Primitive::Text { content, .. } => {
                assert_eq!(content, "GENERAL ARRANGEMENT DRAWING")
            }
            other => panic!("expected title, got {other:?}"),
        }
        let frame = block.last().unwrap().bounds();
        assert!(frame.min_y > drawn.max_y);
        assert_abs_diff_eq!(frame.width(), drawn.width(), epsilon = 1e-9);
        let texts = stream_bounds(&block[..block.len() - 1]);
        assert!(texts.max_y < frame.max_y);
    }
}
