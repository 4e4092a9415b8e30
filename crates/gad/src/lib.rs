#![warn(missing_docs)]

//! gad: parametric bridge general-arrangement drawings.
//!
//! A [`Session`] holds validated bridge parameters, a [`DrawingConfig`] and
//! the projection. [`draw`] runs the geometry builders once and feeds the
//! resulting primitive stream to any [`Backend`]: DXF for CAD exchange,
//! SVG for page layout, PNG for a quick preview.
//!
//! # Example
//!
//! ```ignore
//! use gad::{DrawingConfig, OutputFormat, Session};
//!
//! let session = Session::load("bridge.csv".as_ref(), DrawingConfig::default())?;
//! session.generate(OutputFormat::Both, "out/bridge".as_ref())?;
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod input;
pub mod session;

pub use config::DrawingConfig;
pub use driver::draw;
pub use error::{GadError, Result};
pub use input::{read_source, write_template, InputFormat};
pub use session::{OutputFormat, Session};

pub use gad_export::{Backend, Target, Viewport};
pub use gad_params::{ParameterError, ParameterErrors, ParameterSource};
