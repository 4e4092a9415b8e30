//! Single-page SVG layout.
//!
//! Paper units are divided by the registry's paper scale, so the page is in
//! plotted millimetres. The page is sized to the drawing extents plus a
//! margin. Each layer becomes one `<g>`; text stays as `<text>` so the page
//! is searchable.

use std::path::Path;

use gad_ir::{stream_bounds, BoundingBox2D, HAlign, Layer, Point2D, Primitive, StyleRegistry};
use svg::node::element::{path::Data, Group, Path as SvgPath, Rectangle, Text};
use svg::Document;

use crate::dimension;
use crate::{check_layer, write_atomically, Backend, BackendError, Result, Target};

/// Default page margin in millimetres.
pub const DEFAULT_MARGIN_MM: f64 = 10.0;

/// A straight stroke on the page, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    /// Start point.
    pub start: Point2D,
    /// End point.
    pub end: Point2D,
    /// Layer the stroke belongs to.
    pub layer: Layer,
    /// Whether it comes from an expanded dimension.
    pub from_dimension: bool,
}

/// Maps paper units to page millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    /// Paper point placed at the margin corner.
    pub min: Point2D,
    /// Paper units per millimetre.
    pub scale: f64,
    /// Margin in millimetres.
    pub margin: f64,
    /// Page width in millimetres.
    pub width: f64,
    /// Page height in millimetres.
    pub height: f64,
}

impl PageFrame {
    fn new(bounds: &BoundingBox2D, scale: f64, margin: f64) -> Self {
        Self {
            min: Point2D::new(bounds.min_x, bounds.min_y),
            scale,
            margin,
            width: bounds.width() / scale + 2.0 * margin,
            height: bounds.height() / scale + 2.0 * margin,
        }
    }

    /// Page millimetres of a paper point.
    pub fn to_page(&self, p: Point2D) -> Point2D {
        Point2D::new(
            (p.x - self.min.x) / self.scale + self.margin,
            (p.y - self.min.y) / self.scale + self.margin,
        )
    }

    /// Paper point of a page position.
    pub fn to_paper(&self, p: Point2D) -> Point2D {
        Point2D::new(
            (p.x - self.margin) * self.scale + self.min.x,
            (p.y - self.margin) * self.scale + self.min.y,
        )
    }
}

/// SVG page backend.
#[derive(Debug)]
pub struct SvgBackend {
    registry: Option<StyleRegistry>,
    margin_mm: f64,
    stroke_factor: f64,
    monochrome: bool,
    primitives: Vec<Primitive>,
}

impl Default for SvgBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgBackend {
    /// Backend with the default margin.
    pub fn new() -> Self {
        Self {
            registry: None,
            margin_mm: DEFAULT_MARGIN_MM,
            stroke_factor: 1.0,
            monochrome: false,
            primitives: Vec::new(),
        }
    }

    /// Set the page margin in millimetres.
    pub fn with_margin(mut self, margin_mm: f64) -> Self {
        self.margin_mm = margin_mm.max(0.0);
        self
    }

    /// Multiply every line weight by `factor`.
    pub fn with_stroke_factor(mut self, factor: f64) -> Self {
        self.stroke_factor = factor;
        self
    }

    /// Draw every layer in black.
    pub fn with_monochrome(mut self, monochrome: bool) -> Self {
        self.monochrome = monochrome;
        self
    }

    fn registry(&self) -> Result<&StyleRegistry> {
        self.registry.as_ref().ok_or(BackendError::NotConfigured)
    }

    /// Page frame for the primitives received so far.
    pub fn frame(&self) -> Result<PageFrame> {
        let registry = self.registry()?;
        let mut bounds = stream_bounds(&self.primitives);
        for p in &self.primitives {
            if let Primitive::LinearDim {
                base, p1, p2, angle, ..
            } = p
            {
                let dim = dimension::layout(*base, *p1, *p2, *angle, &registry.dim_style);
                for (a, b) in dim.lines {
                    bounds.include_point(a);
                    bounds.include_point(b);
                }
                bounds.include_point(dim.text_at);
            }
        }
        if !bounds.is_valid() {
            return Err(BackendError::EmptyDrawing);
        }
        Ok(PageFrame::new(&bounds, registry.paper_scale, self.margin_mm))
    }

    /// Every straight stroke on the page: lines, polyline edges and the
    /// strokes of expanded dimensions.
    pub fn strokes(&self) -> Result<Vec<Stroke>> {
        let registry = self.registry()?;
        let frame = self.frame()?;
        let mut out = Vec::new();
        let mut push = |a: Point2D, b: Point2D, layer: Layer, from_dimension: bool| {
            out.push(Stroke {
                start: frame.to_page(a),
                end: frame.to_page(b),
                layer,
                from_dimension,
            })
        };
        for p in &self.primitives {
            match p {
                Primitive::Line {
                    start, end, layer, ..
                } => push(*start, *end, *layer, false),
                Primitive::Polyline {
                    points,
                    closed,
                    layer,
                    ..
                } => {
                    for w in points.windows(2) {
                        push(w[0], w[1], *layer, false);
                    }
                    if *closed {
                        if let (Some(last), Some(first)) = (points.last(), points.first()) {
                            push(*last, *first, *layer, false);
                        }
                    }
                }
                Primitive::LinearDim {
                    base,
                    p1,
                    p2,
                    angle,
                    layer,
                    ..
                } => {
                    let dim = dimension::layout(*base, *p1, *p2, *angle, &registry.dim_style);
                    for (a, b) in dim.lines {
                        push(a, b, *layer, true);
                    }
                }
                Primitive::Text { .. } => {}
            }
        }
        Ok(out)
    }

    /// Build the SVG document.
    pub fn document(&self) -> Result<Document> {
        let registry = self.registry()?;
        let frame = self.frame()?;
        let mut doc = Document::new()
            .set("width", format!("{:.3}mm", frame.width))
            .set("height", format!("{:.3}mm", frame.height))
            .set("viewBox", (0.0, 0.0, frame.width, frame.height))
            .add(
                Rectangle::new()
                    .set("fill", "white")
                    .set("width", frame.width)
                    .set("height", frame.height),
            );

        let text_font = format!("{}, sans-serif", registry.text_style.name);
        for def in &registry.layers {
            let [r, g, b] = if self.monochrome {
                [0, 0, 0]
            } else {
                def.layer.rgb()
            };
            let colour = format!("rgb({r},{g},{b})");
            let mut group = Group::new()
                .set("id", def.layer.name())
                .set("stroke", colour.clone())
                .set("fill", "none")
                .set("stroke-linecap", "round");
            let mut used = false;
            for p in self.primitives.iter().filter(|p| p.layer() == def.layer) {
                used = true;
                group = match p {
                    Primitive::Line {
                        start, end, weight, ..
                    } => group.add(self.path(&frame, &[*start, *end], false, weight.mm())),
                    Primitive::Polyline {
                        points,
                        closed,
                        weight,
                        ..
                    } => group.add(self.path(&frame, points, *closed, weight.mm())),
                    Primitive::Text {
                        position,
                        content,
                        height,
                        rotation,
                        halign,
                        ..
                    } => group.add(text(
                        frame.to_page(*position),
                        content,
                        height / frame.scale,
                        *rotation,
                        *halign,
                        &colour,
                        &text_font,
                    )),
                    Primitive::LinearDim {
                        base, p1, p2, angle, ..
                    } => {
                        let dim =
                            dimension::layout(*base, *p1, *p2, *angle, &registry.dim_style);
                        let mut g = group;
                        for (a, b) in &dim.lines {
                            g = g.add(self.path(&frame, &[*a, *b], false, 0.18));
                        }
                        g.add(text(
                            frame.to_page(dim.text_at),
                            &dim.text,
                            registry.dim_style.text_height / frame.scale,
                            dim.rotation,
                            HAlign::Center,
                            &colour,
                            &text_font,
                        ))
                    }
                };
            }
            if used {
                doc = doc.add(group);
            }
        }
        Ok(doc)
    }

    fn path(&self, frame: &PageFrame, points: &[Point2D], closed: bool, width_mm: f64) -> SvgPath {
        let mut data = Data::new();
        for (i, p) in points.iter().enumerate() {
            let q = frame.to_page(*p);
            data = if i == 0 {
                data.move_to((q.x, q.y))
            } else {
                data.line_to((q.x, q.y))
            };
        }
        if closed {
            data = data.close();
        }
        SvgPath::new()
            .set("stroke-width", width_mm * self.stroke_factor)
            .set("d", data)
    }
}

fn text(
    at: Point2D,
    content: &str,
    size_mm: f64,
    rotation: f64,
    halign: HAlign,
    colour: &str,
    font: &str,
) -> Text {
    let anchor = match halign {
        HAlign::Left => "start",
        HAlign::Center => "middle",
        HAlign::Right => "end",
    };
    let mut node = Text::new(content)
        .set("x", at.x)
        .set("y", at.y)
        .set("font-size", size_mm)
        .set("font-family", font)
        .set("text-anchor", anchor)
        .set("fill", colour)
        .set("stroke", "none");
    if rotation != 0.0 {
        // SVG rotates clockwise on screen.
        node = node.set(
            "transform",
            format!("rotate({:.6} {:.6} {:.6})", -rotation.to_degrees(), at.x, at.y),
        );
    }
    node
}

impl Backend for SvgBackend {
    fn target(&self) -> Target {
        Target::Page
    }

    fn configure(&mut self, registry: &StyleRegistry) -> Result<()> {
        self.registry = Some(registry.clone());
        Ok(())
    }

    fn emit(&mut self, primitive: &Primitive) -> Result<()> {
        check_layer(self.registry.as_ref(), primitive)?;
        self.primitives.push(primitive.clone());
        Ok(())
    }

    fn finalize(&mut self, path: &Path) -> Result<()> {
        let doc = self.document()?;
        tracing::info!(
            primitives = self.primitives.len(),
            "writing SVG {}",
            path.display()
        );
        write_atomically(path, |w| Ok(svg::write(w, &doc)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use gad_ir::LineWeight;

    fn backend() -> SvgBackend {
        let mut svg = SvgBackend::new();
        svg.configure(&StyleRegistry::for_scale(100.0)).unwrap();
        svg
    }

    #[test]
    fn test_page_in_millimetres() {
        let mut page = backend();
        page.emit(&Primitive::line(
            Point2D::new(0.0, 0.0),
            Point2D::new(20_000.0, 5_000.0),
            Layer::Structure,
            LineWeight::Normal,
        ))
        .unwrap();
        let frame = page.frame().unwrap();
        assert_abs_diff_eq!(frame.width, 200.0 + 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(frame.height, 50.0 + 20.0, epsilon = 1e-9);

        let strokes = page.strokes().unwrap();
        assert_eq!(strokes.len(), 1);
        assert_abs_diff_eq!(strokes[0].start.x, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(strokes[0].end.y, 60.0, epsilon = 1e-9);
        let back = frame.to_paper(strokes[0].end);
        assert_abs_diff_eq!(back.x, 20_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(back.y, 5_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_closed_polyline_strokes() {
        let mut page = backend();
        page.emit(
            &Primitive::rectangle(
                Point2D::new(0.0, 0.0),
                Point2D::new(100.0, 100.0),
                Layer::Pier,
                LineWeight::Normal,
            )
            .unwrap(),
        )
        .unwrap();
        assert_eq!(page.strokes().unwrap().len(), 4);
    }

    #[test]
    fn test_text_rotated_and_searchable() {
        let mut page = backend();
        page.emit(&Primitive::text(
            Point2D::new(1000.0, 1000.0),
            "37.500",
            200.0,
            std::f64::consts::FRAC_PI_2,
            Layer::CrossSection,
            HAlign::Left,
        ))
        .unwrap();
        let out = page.document().unwrap().to_string();
        assert!(out.contains("37.500"));
        assert!(out.contains("rotate(-90.000000"));
        assert!(out.contains("id=\"CROSS_SECTION\""));
        assert!(!out.contains("id=\"GRID\""));
    }

    #[test]
    fn test_dimension_expanded() {
        let mut page = backend();
        page.emit(&Primitive::linear_dim(
            Point2D::new(7500.0, -1000.0),
            Point2D::new(0.0, 0.0),
            Point2D::new(15_000.0, 0.0),
            0.0,
            "PMB100",
            Layer::Dimensions,
        ))
        .unwrap();
        let strokes = page.strokes().unwrap();
        assert_eq!(strokes.len(), 5);
        assert!(strokes.iter().all(|s| s.from_dimension));
        let out = page.document().unwrap().to_string();
        assert!(out.contains(">15000<"));
    }

    #[test]
    fn test_monochrome_page() {
        let mut page = backend().with_monochrome(true);
        page.emit(&Primitive::line(
            Point2D::new(0.0, 0.0),
            Point2D::new(100.0, 0.0),
            Layer::CrossSection,
            LineWeight::Thin,
        ))
        .unwrap();
        let out = page.document().unwrap().to_string();
        assert!(out.contains("stroke=\"rgb(0,0,0)\""));
        assert_eq!(out.matches("rgb(").count(), out.matches("rgb(0,0,0)").count());
    }

    #[test]
    fn test_empty_page_is_error() {
        let page = backend();
        assert!(matches!(page.frame(), Err(BackendError::EmptyDrawing)));
    }

    #[test]
    fn test_finalize_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gad.svg");
        let mut page = backend();
        page.emit(&Primitive::line(
            Point2D::new(0.0, 0.0),
            Point2D::new(100.0, 0.0),
            Layer::Grid,
            LineWeight::Thin,
        ))
        .unwrap();
        page.finalize(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<svg"));
        assert!(content.contains("id=\"GRID\""));
    }
}
