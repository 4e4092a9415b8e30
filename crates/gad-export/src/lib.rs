#![warn(missing_docs)]

//! Rendering backends for drawing primitives.
//!
//! Every backend follows the same protocol: [`Backend::configure`] once with
//! the style registry, [`Backend::emit`] for each primitive in draw order,
//! then [`Backend::finalize`] to write the output file. Files are written to
//! a temporary file next to the target and renamed into place, so a failed
//! run never leaves a partial drawing behind.
//!
//! - [`DxfBackend`]: CAD exchange (DXF)
//! - [`SvgBackend`]: single-page layout (SVG)
//! - [`PreviewBackend`]: raster preview with pan/zoom (PNG)
//!
//! # Example
//!
//! ```ignore
//! use gad_export::{Backend, DxfBackend};
//!
//! let mut dxf = DxfBackend::new();
//! dxf.configure(&registry)?;
//! for p in &primitives {
//!     dxf.emit(p)?;
//! }
//! dxf.finalize("bridge.dxf".as_ref())?;
//! ```

mod dimension;
pub mod dxf;
pub mod page;
pub mod preview;

pub use dxf::DxfBackend;
pub use page::SvgBackend;
pub use preview::{PreviewBackend, Viewport};

use std::fmt;
use std::io::{BufWriter, Write};
use std::path::Path;

use gad_ir::{Layer, Primitive, StyleRegistry};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Output kinds a backend can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Layered CAD exchange file.
    Cad,
    /// Paginated page layout.
    Page,
    /// Raster preview image.
    Preview,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Target::Cad => "cad",
            Target::Page => "page",
            Target::Preview => "preview",
        })
    }
}

/// Errors raised by a backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Writing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Moving the finished file into place failed.
    #[error("could not persist output: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// Encoding the preview image failed.
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    /// Rasterising the page for the preview failed.
    #[error("preview rendering failed: {0}")]
    Render(String),

    /// A primitive arrived before the registry.
    #[error("backend used before configure")]
    NotConfigured,

    /// A primitive references a layer the registry does not define.
    #[error("layer {0} is not registered")]
    UnknownLayer(Layer),

    /// The stream had nothing to draw.
    #[error("nothing to draw")]
    EmptyDrawing,
}

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// A consumer of the primitive stream.
pub trait Backend {
    /// What this backend produces.
    fn target(&self) -> Target;

    /// Receive the layer, text and dimension styles. Called once, first.
    fn configure(&mut self, registry: &StyleRegistry) -> Result<()>;

    /// Accept one primitive.
    fn emit(&mut self, primitive: &Primitive) -> Result<()>;

    /// Write the output to `path`.
    fn finalize(&mut self, path: &Path) -> Result<()>;
}

/// Checks a primitive against the registry a backend was configured with.
pub(crate) fn check_layer(registry: Option<&StyleRegistry>, primitive: &Primitive) -> Result<()> {
    let registry = registry.ok_or(BackendError::NotConfigured)?;
    let layer = primitive.layer();
    if registry.contains(layer) {
        Ok(())
    } else {
        Err(BackendError::UnknownLayer(layer))
    }
}

/// Writes `path` through a temporary file in the same directory.
pub(crate) fn write_atomically(
    path: &Path,
    write: impl FnOnce(&mut dyn Write) -> Result<()>,
) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    tmp.persist(path)?;
    tracing::debug!("wrote {}", path.display());
    Ok(())
}

/// Keeps every primitive it receives. Used to dump or inspect a drawing.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    registry: Option<StyleRegistry>,
    primitives: Vec<Primitive>,
}

impl RecordingBackend {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry received in `configure`.
    pub fn registry(&self) -> Option<&StyleRegistry> {
        self.registry.as_ref()
    }

    /// Primitives in emission order.
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Take the recorded primitives.
    pub fn into_primitives(self) -> Vec<Primitive> {
        self.primitives
    }
}

impl Backend for RecordingBackend {
    fn target(&self) -> Target {
        Target::Cad
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

    fn finalize(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }
}
