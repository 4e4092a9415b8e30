//! The drawing program: one pass over the geometry builders feeding a
//! backend.

use std::path::Path;

use gad_export::{Backend, Target};
use gad_ir::{BoundingBox2D, Primitive};
use gad_kernel_drafting::{abutment, annotate, grid, ground, pier, section, superstructure};
use gad_params::Side;

use crate::{GadError, Result, Session};

/// Forwards primitives to the backend and tracks what has been drawn.
struct Emitter<'b> {
    backend: &'b mut dyn Backend,
    target: Target,
    bounds: BoundingBox2D,
    count: usize,
}

impl Emitter<'_> {
    fn stage(&mut self, name: &str, primitives: Vec<Primitive>) -> Result<()> {
        tracing::debug!("{name}: {} primitives", primitives.len());
        for p in &primitives {
            self.backend.emit(p).map_err(|source| GadError::BackendFailure {
                target: self.target,
                source,
            })?;
            self.bounds.include_box(&p.bounds());
        }
        self.count += primitives.len();
        Ok(())
    }
}

/// Draw the session into `backend` and write `output`.
///
/// Primitives are emitted in a fixed order: grid, ground profile, deck,
/// piers, abutments, sections, then dimensions and the title block. Every
/// backend sees the same stream.
pub fn draw(session: &Session, backend: &mut dyn Backend, output: &Path) -> Result<()> {
    let target = backend.target();
    let fail = |source| GadError::BackendFailure { target, source };

    backend.configure(&session.registry()).map_err(fail)?;

    let sheet = session.sheet();
    let params = session.params();
    let mut out = Emitter {
        backend: &mut *backend,
        target,
        bounds: BoundingBox2D::empty(),
        count: 0,
    };

    out.stage("grid", grid::layout_grid(&sheet))?;
    out.stage("ground", ground::ground_profile(&sheet)?)?;

    out.stage("bays", superstructure::superstructure_bays(&sheet)?)?;
    out.stage("approach slabs", superstructure::approach_slabs(&sheet)?)?;
    out.stage("wearing course", superstructure::wearing_course(&sheet)?)?;
    for i in 1..params.spans().nspan {
        out.stage("pier elevation", pier::pier_elevation(&sheet, i)?)?;
        out.stage("pier plan", pier::pier_plan(&sheet, i)?)?;
    }

    for side in [Side::Left, Side::Right] {
        out.stage("abutment elevation", abutment::abutment_elevation(&sheet, side)?)?;
        out.stage("abutment plan", abutment::abutment_plan(&sheet, side)?)?;
    }
    out.stage("deck section", section::deck_section(&sheet)?)?;
    out.stage("pier section", section::pier_section(&sheet)?)?;

    out.stage("dimensions", annotate::span_dimensions(&sheet))?;
    out.stage("captions", annotate::captions(&sheet))?;
    let drawn = out.bounds;
    let title = annotate::title_block(&sheet, &session.config().title, &drawn)?;
    out.stage("title block", title)?;

    let count = out.count;
    backend.finalize(output).map_err(fail)?;
    tracing::info!("{target}: {count} primitives written to {}", output.display());
    Ok(())
}
