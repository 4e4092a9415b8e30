//! A drawing session: frozen parameters, configuration and projection.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use gad_export::{DxfBackend, PreviewBackend, RecordingBackend, SvgBackend, Viewport};
use gad_ir::{Point2D, Primitive, StyleRegistry};
use gad_kernel_drafting::Sheet;
use gad_kernel_math::Projection;
use gad_params::{load, BridgeParameters, ParameterSource};

use crate::{draw, input, DrawingConfig, GadError, Result};

/// Which files `generate` writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// DXF only.
    Cad,
    /// SVG only.
    Page,
    /// DXF and SVG.
    Both,
}

impl OutputFormat {
    /// Output files for `output`, with the extension of each target.
    pub fn paths(&self, output: &Path) -> Vec<PathBuf> {
        match self {
            OutputFormat::Cad => vec![output.with_extension("dxf")],
            OutputFormat::Page => vec![output.with_extension("svg")],
            OutputFormat::Both => vec![output.with_extension("dxf"), output.with_extension("svg")],
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cad" | "dxf" => Ok(OutputFormat::Cad),
            "page" | "svg" => Ok(OutputFormat::Page),
            "both" => Ok(OutputFormat::Both),
            other => Err(format!("unknown output format `{other}`")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Cad => "cad",
            OutputFormat::Page => "page",
            OutputFormat::Both => "both",
        })
    }
}

/// Everything one drawing needs, threaded through the driver.
#[derive(Debug, Clone)]
pub struct Session {
    params: BridgeParameters,
    config: DrawingConfig,
    projection: Projection,
}

impl Session {
    /// Session for already loaded parameters.
    pub fn new(params: BridgeParameters, config: DrawingConfig) -> Result<Self> {
        config.validate()?;
        let f = params.frame();
        let p = &config.projection;
        let projection = Projection::new(f.left, f.datum, f.scale1, f.scale2)
            .with_factors(p.hhs, p.vvs)
            .with_origin(Point2D::new(p.origin_x, p.origin_y));
        Ok(Self {
            params,
            config,
            projection,
        })
    }

    /// Validate `source` and build a session.
    pub fn from_source(source: &ParameterSource, config: DrawingConfig) -> Result<Self> {
        let params = load(source)?;
        tracing::info!(
            "{} span(s) of {} at {}° skew",
            params.spans().nspan,
            params.spans().span1,
            params.skew_degrees()
        );
        Self::new(params, config)
    }

    /// Read a parameter file and build a session.
    pub fn load(path: &Path, config: DrawingConfig) -> Result<Self> {
        let source = input::read_source(path)?;
        Self::from_source(&source, config)
    }

    /// Frozen parameters.
    pub fn params(&self) -> &BridgeParameters {
        &self.params
    }

    /// Drawing configuration.
    pub fn config(&self) -> &DrawingConfig {
        &self.config
    }

    /// World to paper projection.
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Layers and styles for this drawing's scale.
    pub fn registry(&self) -> StyleRegistry {
        StyleRegistry::for_paper(self.params.frame().scale1, self.projection.paper_scale())
    }

    /// Builder context over this session.
    pub fn sheet(&self) -> Sheet<'_> {
        Sheet::new(&self.params, self.projection, self.registry().dim_style.name)
    }

    /// The primitive stream, in emission order.
    pub fn primitives(&self) -> Result<Vec<Primitive>> {
        let mut rec = RecordingBackend::new();
        draw(self, &mut rec, Path::new(""))?;
        Ok(rec.into_primitives())
    }

    /// The primitive stream as pretty-printed JSON.
    pub fn primitives_json(&self) -> Result<String> {
        let primitives = self.primitives()?;
        Ok(serde_json::to_string_pretty(&primitives)?)
    }

    /// Write the drawing in `format`. Returns the files written.
    ///
    /// Each target gets a fresh backend. All files are drawn into a staging
    /// directory next to `output` and moved into place only once every
    /// target has succeeded.
    pub fn generate(&self, format: OutputFormat, output: &Path) -> Result<Vec<PathBuf>> {
        let paths = format.paths(output);
        stage_outputs(&paths, |staged, path| {
            if path.extension().is_some_and(|e| e == "dxf") {
                draw(self, &mut DxfBackend::new(), staged)
            } else {
                let page = &self.config.page;
                let mut svg = SvgBackend::new()
                    .with_margin(page.margin_mm)
                    .with_stroke_factor(page.stroke_scale);
                draw(self, &mut svg, staged)
            }
        })?;
        Ok(paths)
    }

    /// Write a PNG preview. `viewport` overrides the configured one.
    pub fn preview(&self, output: &Path, viewport: Option<Viewport>) -> Result<()> {
        let cfg = &self.config.preview;
        let viewport = viewport.unwrap_or_else(|| cfg.viewport());
        let mut backend = PreviewBackend::new(cfg.width, cfg.height)
            .with_viewport(viewport)
            .with_stroke_factor(self.config.page.stroke_scale);
        draw(self, &mut backend, output)
    }
}

/// Runs `write(staged, path)` for every path, then moves the staged files
/// into place. Nothing is moved if any write fails.
fn stage_outputs(
    paths: &[PathBuf],
    mut write: impl FnMut(&Path, &Path) -> Result<()>,
) -> Result<()> {
    let Some(first) = paths.first() else {
        return Ok(());
    };
    let dir = match first.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let staging = tempfile::Builder::new()
        .prefix(".gad-")
        .tempdir_in(dir)
        .map_err(|source| GadError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

    let mut staged = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path.file_name().ok_or_else(|| GadError::Write {
            path: path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "no file name"),
        })?;
        let tmp = staging.path().join(name);
        write(&tmp, path)?;
        staged.push((tmp, path));
    }
    for (tmp, path) in staged {
        std::fs::rename(&tmp, path).map_err(|source| GadError::Write {
            path: path.clone(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gad_export::Backend;
    use gad_params::sample_source;

    #[test]
    fn test_format_paths() {
        let out = Path::new("out/bridge");
        assert_eq!(OutputFormat::Cad.paths(out), [PathBuf::from("out/bridge.dxf")]);
        assert_eq!(
            OutputFormat::Both.paths(Path::new("bridge.svg")),
            [PathBuf::from("bridge.dxf"), PathBuf::from("bridge.svg")]
        );
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("CAD".parse::<OutputFormat>(), Ok(OutputFormat::Cad));
        assert_eq!("page".parse::<OutputFormat>(), Ok(OutputFormat::Page));
        assert!("pdf".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_projection_follows_config() {
        let mut config = DrawingConfig::default();
        config.projection.origin_x = 500.0;
        let session = Session::from_source(&sample_source(), config).unwrap();
        let left = session.params().frame().left;
        let datum = session.params().frame().datum;
        assert_eq!(session.projection().pt(left, datum), Point2D::new(500.0, 0.0));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = DrawingConfig::default();
        config.page.stroke_scale = 0.0;
        assert!(matches!(
            Session::from_source(&sample_source(), config),
            Err(GadError::Config(_))
        ));
    }

    #[test]
    fn test_generate_both() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::from_source(&sample_source(), DrawingConfig::default()).unwrap();
        let written = session
            .generate(OutputFormat::Both, &dir.path().join("bridge"))
            .unwrap();
        assert_eq!(written.len(), 2);
        for path in &written {
            assert!(path.exists(), "{} missing", path.display());
        }
    }

    #[test]
    fn test_failed_target_leaves_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputFormat::Both.paths(&dir.path().join("bridge"));
        let result = stage_outputs(&paths, |staged, path| {
            if path.extension().is_some_and(|e| e == "svg") {
                return Err(GadError::Config("page refused".into()));
            }
            std::fs::write(staged, "dxf").unwrap();
            Ok(())
        });
        assert!(matches!(result, Err(GadError::Config(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_generate_replaces_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("bridge");
        std::fs::write(output.with_extension("dxf"), "old").unwrap();
        let session = Session::from_source(&sample_source(), DrawingConfig::default()).unwrap();
        session.generate(OutputFormat::Cad, &output).unwrap();
        let dxf = std::fs::read_to_string(output.with_extension("dxf")).unwrap();
        assert!(dxf.contains("AC1015"));
        // Only the output is left behind, no staging directory.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_paper_factors_keep_page_size() {
        let page_size = |config: DrawingConfig| {
            let session = Session::from_source(&sample_source(), config).unwrap();
            let mut svg = SvgBackend::new();
            svg.configure(&session.registry()).unwrap();
            for p in session.primitives().unwrap() {
                svg.emit(&p).unwrap();
            }
            let frame = svg.frame().unwrap();
            (frame.width, frame.height, session.registry().dim_style.text_height)
        };
        let full = page_size(DrawingConfig::default());
        let mut config = DrawingConfig::default();
        config.projection.hhs = 500.0;
        config.projection.vvs = 500.0;
        let half = page_size(config);
        assert!((full.0 - half.0).abs() < 1e-6);
        assert!((full.1 - half.1).abs() < 1e-6);
        assert_eq!(half.2, full.2 / 2.0);
    }

    #[test]
    fn test_preview_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = DrawingConfig::default();
        config.preview.width = 320;
        config.preview.height = 200;
        let session = Session::from_source(&sample_source(), config).unwrap();
        let path = dir.path().join("bridge.png");
        session.preview(&path, None).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    #[test]
    fn test_primitives_json() {
        let session = Session::from_source(&sample_source(), DrawingConfig::default()).unwrap();
        let json = session.primitives_json().unwrap();
        let back: Vec<Primitive> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), session.primitives().unwrap().len());
    }
}
