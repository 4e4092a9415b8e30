#![warn(missing_docs)]

//! Intermediate representation for bridge general-arrangement drawings.
//!
//! The geometry builder produces a flat stream of [`Primitive`]s in the
//! paper frame, each tagged with one [`Layer`] from the registry. Backends
//! (CAD exchange, page layout, raster preview) consume that stream without
//! knowing anything about bridges.
//!
//! # Example
//!
//! ```ignore
//! use gad_ir::{Layer, LineWeight, Point2D, Primitive};
//!
//! let baseline = Primitive::line(
//!     Point2D::new(0.0, 0.0),
//!     Point2D::new(50_000.0, 0.0),
//!     Layer::Grid,
//!     LineWeight::Thin,
//! );
//! assert_eq!(baseline.layer().name(), "GRID");
//! ```

pub mod primitive;
pub mod registry;
pub mod types;

pub use primitive::{stream_bounds, HAlign, Primitive};
pub use registry::{DimStyle, Layer, LayerDef, LineWeight, StyleRegistry, TextStyle};
pub use types::{BoundingBox2D, Point2D};

use thiserror::Error;

/// Errors raised while constructing primitives.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IrError {
    /// A closed polyline needs at least three distinct vertices.
    #[error("closed polyline has {distinct} distinct vertices, need at least 3")]
    DegeneratePolyline {
        /// Number of distinct vertices found.
        distinct: usize,
    },

    /// An open polyline needs at least two vertices.
    #[error("polyline has {0} vertices, need at least 2")]
    TooFewVertices(usize),
}

/// Result type for IR construction.
pub type Result<T> = std::result::Result<T, IrError>;
