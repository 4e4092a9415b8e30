//! Drawing primitives.

use serde::{Deserialize, Serialize};

use crate::registry::{Layer, LineWeight};
use crate::types::{BoundingBox2D, Point2D};
use crate::{IrError, Result};

/// Horizontal text alignment relative to the insertion point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HAlign {
    /// Text starts at the insertion point.
    #[default]
    Left,
    /// Text is centred on the insertion point.
    Center,
    /// Text ends at the insertion point.
    Right,
}

/// A drawing primitive in the paper frame.
///
/// Angles are radians, counter-clockwise as seen on the sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Primitive {
    /// Straight segment.
    Line {
        /// Start point.
        start: Point2D,
        /// End point.
        end: Point2D,
        /// Layer.
        layer: Layer,
        /// Stroke weight.
        weight: LineWeight,
    },
    /// Connected segments, optionally closed back to the first vertex.
    Polyline {
        /// Vertices in order. A closed polyline does not repeat the first vertex.
        points: Vec<Point2D>,
        /// Whether the last vertex connects back to the first.
        closed: bool,
        /// Layer.
        layer: Layer,
        /// Stroke weight.
        weight: LineWeight,
    },
    /// Single-line text.
    Text {
        /// Insertion point (baseline).
        position: Point2D,
        /// Text content.
        content: String,
        /// Cap height in paper units.
        height: f64,
        /// Rotation in radians.
        rotation: f64,
        /// Layer.
        layer: Layer,
        /// Horizontal alignment.
        halign: HAlign,
    },
    /// Linear dimension between two measured points.
    LinearDim {
        /// A point on the dimension line.
        base: Point2D,
        /// First measured point.
        p1: Point2D,
        /// Second measured point.
        p2: Point2D,
        /// Direction of the dimension line in radians.
        angle: f64,
        /// Dimension style name.
        style: String,
        /// Layer.
        layer: Layer,
    },
}

impl Primitive {
    /// A line segment.
    pub fn line(start: Point2D, end: Point2D, layer: Layer, weight: LineWeight) -> Self {
        Primitive::Line {
            start,
            end,
            layer,
            weight,
        }
    }

    /// An open polyline with at least two vertices.
    pub fn open_polyline(points: Vec<Point2D>, layer: Layer, weight: LineWeight) -> Result<Self> {
        if points.len() < 2 {
            return Err(IrError::TooFewVertices(points.len()));
        }
        Ok(Primitive::Polyline {
            points,
            closed: false,
            layer,
            weight,
        })
    }

    /// A closed polyline. Rejects rings with fewer than three distinct vertices.
    ///
    /// A trailing vertex equal to the first is dropped; closure is implied.
    pub fn closed_polyline(
        mut points: Vec<Point2D>,
        layer: Layer,
        weight: LineWeight,
    ) -> Result<Self> {
        if points.len() > 1 && points[0].coincides(&points[points.len() - 1]) {
            points.pop();
        }
        let distinct = distinct_count(&points);
        if distinct < 3 {
            return Err(IrError::DegeneratePolyline { distinct });
        }
        Ok(Primitive::Polyline {
            points,
            closed: true,
            layer,
            weight,
        })
    }

    /// Axis-aligned closed rectangle from two opposite corners.
    pub fn rectangle(a: Point2D, b: Point2D, layer: Layer, weight: LineWeight) -> Result<Self> {
        Self::closed_polyline(
            vec![
                Point2D::new(a.x, a.y),
                Point2D::new(b.x, a.y),
                Point2D::new(b.x, b.y),
                Point2D::new(a.x, b.y),
            ],
            layer,
            weight,
        )
    }

    /// Text primitive.
    pub fn text(
        position: Point2D,
        content: impl Into<String>,
        height: f64,
        rotation: f64,
        layer: Layer,
        halign: HAlign,
    ) -> Self {
        Primitive::Text {
            position,
            content: content.into(),
            height,
            rotation,
            layer,
            halign,
        }
    }

    /// Linear dimension.
    pub fn linear_dim(
        base: Point2D,
        p1: Point2D,
        p2: Point2D,
        angle: f64,
        style: impl Into<String>,
        layer: Layer,
    ) -> Self {
        Primitive::LinearDim {
            base,
            p1,
            p2,
            angle,
            style: style.into(),
            layer,
        }
    }

    /// Layer the primitive is drawn on.
    pub fn layer(&self) -> Layer {
        match self {
            Primitive::Line { layer, .. }
            | Primitive::Polyline { layer, .. }
            | Primitive::Text { layer, .. }
            | Primitive::LinearDim { layer, .. } => *layer,
        }
    }

    /// Short kind name, used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Line { .. } => "line",
            Primitive::Polyline { .. } => "polyline",
            Primitive::Text { .. } => "text",
            Primitive::LinearDim { .. } => "dimension",
        }
    }

    /// Vertices of a closed polyline with the first vertex repeated at the end.
    pub fn closed_ring(&self) -> Option<Vec<Point2D>> {
        match self {
            Primitive::Polyline {
                points,
                closed: true,
                ..
            } => {
                let mut ring = points.clone();
                ring.push(points[0]);
                Some(ring)
            }
            _ => None,
        }
    }

    /// Defining points, used for extents. Text contributes its insertion point only.
    pub fn anchor_points(&self) -> Vec<Point2D> {
        match self {
            Primitive::Line { start, end, .. } => vec![*start, *end],
            Primitive::Polyline { points, .. } => points.clone(),
            Primitive::Text { position, .. } => vec![*position],
            Primitive::LinearDim { base, p1, p2, .. } => vec![*base, *p1, *p2],
        }
    }

    /// Bounding box of [`Primitive::anchor_points`].
    pub fn bounds(&self) -> BoundingBox2D {
        let mut bb = BoundingBox2D::empty();
        for p in self.anchor_points() {
            bb.include_point(p);
        }
        bb
    }

    /// Measured length of a dimension along its direction, in paper units.
    pub fn measurement(&self) -> Option<f64> {
        match self {
            Primitive::LinearDim { p1, p2, angle, .. } => {
                let (s, c) = angle.sin_cos();
                // Sheet y grows downward, so the direction is (cos, -sin).
                Some(((p2.x - p1.x) * c - (p2.y - p1.y) * s).abs())
            }
            _ => None,
        }
    }
}

/// Extents of a primitive stream.
pub fn stream_bounds<'a>(primitives: impl IntoIterator<Item = &'a Primitive>) -> BoundingBox2D {
    let mut bb = BoundingBox2D::empty();
    for p in primitives {
        bb.include_box(&p.bounds());
    }
    bb
}

fn distinct_count(points: &[Point2D]) -> usize {
    let mut seen: Vec<Point2D> = Vec::with_capacity(points.len());
    for p in points {
        if !seen.iter().any(|q| q.coincides(p)) {
            seen.push(*p);
        }
    }
    seen.len()
}
