#![warn(missing_docs)]

//! Geometry builder for bridge general-arrangement drawings.
//!
//! Each module turns the frozen [`BridgeParameters`] into a list of
//! [`Primitive`]s in the paper frame:
//!
//! - **grid**: datum, level and chainage scales
//! - **ground**: the surveyed ground profile
//! - **superstructure**: deck bays, approach slabs, wearing course
//! - **pier**: pier elevation and skewed pier plan
//! - **abutment**: abutment elevation and skewed abutment plan
//! - **section**: transverse deck and pier sections
//! - **annotate**: dimensions, captions and the title block
//!
//! # Example
//!
//! ```ignore
//! use gad_kernel_drafting::{grid, Sheet};
//!
//! let sheet = Sheet::for_params(&params);
//! let primitives = grid::layout_grid(&sheet);
//! ```

pub mod abutment;
pub mod annotate;
pub mod grid;
pub mod ground;
pub mod pier;
pub mod section;
pub mod superstructure;

pub use annotate::TitleText;

use gad_ir::{HAlign, IrError, Layer, LineWeight, Point2D, Primitive, StyleRegistry};
use gad_kernel_math::Projection;
use gad_params::BridgeParameters;
use thiserror::Error;

/// Errors raised when derived geometry breaks an invariant.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A derived length that must be positive is not.
    #[error("{component}: {quantity} must be positive, got {value}")]
    NonPositive {
        /// Component being built, e.g. `pier P1`.
        component: String,
        /// Name of the offending quantity.
        quantity: &'static str,
        /// Its value.
        value: f64,
    },

    /// A primitive could not be formed.
    #[error("{component}: {source}")]
    Primitive {
        /// Component being built.
        component: String,
        /// Underlying construction error.
        #[source]
        source: IrError,
    },
}

/// Result type for geometry construction.
pub type Result<T> = std::result::Result<T, GeometryError>;

/// Everything a builder needs: the parameters and the projection.
#[derive(Debug, Clone)]
pub struct Sheet<'a> {
    /// Frozen parameters.
    pub params: &'a BridgeParameters,
    /// World to paper projection.
    pub proj: Projection,
    /// Name of the registered dimension style.
    pub dim_style: String,
}

impl<'a> Sheet<'a> {
    /// Sheet with an explicit projection.
    pub fn new(params: &'a BridgeParameters, proj: Projection, dim_style: impl Into<String>) -> Self {
        Self {
            params,
            proj,
            dim_style: dim_style.into(),
        }
    }

    /// Sheet with the default projection and the registry's dimension style.
    pub fn for_params(params: &'a BridgeParameters) -> Self {
        let f = params.frame();
        let proj = Projection::new(f.left, f.datum, f.scale1, f.scale2);
        let dim_style = StyleRegistry::for_scale(f.scale1).dim_style.name;
        Self::new(params, proj, dim_style)
    }

    /// Text whose height is given in plotted millimetres.
    pub fn text(
        &self,
        position: Point2D,
        content: impl Into<String>,
        height_mm: f64,
        rotation: f64,
        layer: Layer,
        halign: HAlign,
    ) -> Primitive {
        Primitive::text(
            position,
            content,
            self.proj.su(height_mm),
            rotation,
            layer,
            halign,
        )
    }

    /// Horizontal dimension between two paper points, drawn at paper y `at`.
    pub fn dimension(&self, p1: Point2D, p2: Point2D, at: f64) -> Primitive {
        Primitive::linear_dim(
            Point2D::new((p1.x + p2.x) / 2.0, at),
            p1,
            p2,
            0.0,
            self.dim_style.clone(),
            Layer::Dimensions,
        )
    }
}

/// Closed polyline, attributing a failure to `component`.
pub(crate) fn closed(
    component: &str,
    points: Vec<Point2D>,
    layer: Layer,
    weight: LineWeight,
) -> Result<Primitive> {
    Primitive::closed_polyline(points, layer, weight).map_err(|source| GeometryError::Primitive {
        component: component.to_string(),
        source,
    })
}

/// Open polyline, attributing a failure to `component`.
pub(crate) fn open(
    component: &str,
    points: Vec<Point2D>,
    layer: Layer,
    weight: LineWeight,
) -> Result<Primitive> {
    Primitive::open_polyline(points, layer, weight).map_err(|source| GeometryError::Primitive {
        component: component.to_string(),
        source,
    })
}

/// Fails unless `value` is positive.
pub(crate) fn ensure_positive(component: &str, quantity: &'static str, value: f64) -> Result<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::NonPositive {
            component: component.to_string(),
            quantity,
            value,
        })
    }
}
