//! Error types for drawing sessions.

use std::path::PathBuf;

use gad_export::{BackendError, Target};
use gad_kernel_drafting::GeometryError;
use gad_params::ParameterErrors;
use thiserror::Error;

use crate::input::InputError;

/// Errors from loading, building or writing a drawing.
#[derive(Error, Debug)]
pub enum GadError {
    /// The parameter set failed validation. Every failure is listed.
    #[error("{0}")]
    Parameters(#[from] ParameterErrors),

    /// Derived geometry broke an invariant.
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// A backend refused an entity or could not write its output.
    #[error("{target} backend failed: {source}")]
    BackendFailure {
        /// Output kind of the failing backend.
        target: Target,
        /// Underlying backend error.
        #[source]
        source: BackendError,
    },

    /// Reading an input or configuration file failed.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Writing an output file failed outside a backend.
    #[error("cannot write {}: {source}", path.display())]
    Write {
        /// File or directory being written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The primitive stream could not be serialised.
    #[error("cannot serialise primitives: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An input file could not be parsed.
    #[error("{}: {source}", path.display())]
    Input {
        /// File being parsed.
        path: PathBuf,
        /// What is wrong with it.
        #[source]
        source: InputError,
    },

    /// The drawing configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, GadError>;
