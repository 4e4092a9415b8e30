//! Raster preview with pan and zoom.
//!
//! The preview is the SVG page, drawn in black, rasterised with resvg: the
//! page is first fitted to the image, then the [`Viewport`] zooms about the
//! image centre and pans by whole pixels.

use std::path::Path;
use std::sync::Arc;

use gad_ir::{Primitive, StyleRegistry};
use image::{ImageFormat, Rgb, RgbImage};
use resvg::{tiny_skia, usvg};

use crate::page::SvgBackend;
use crate::{write_atomically, Backend, BackendError, Result, Target};

/// Default preview width in pixels.
pub const DEFAULT_WIDTH: u32 = 1600;
/// Default preview height in pixels.
pub const DEFAULT_HEIGHT: u32 = 1000;
/// Border kept free when fitting, in pixels.
const FIT_MARGIN: f32 = 20.0;
/// Smallest and largest zoom factors.
const ZOOM_RANGE: (f64, f64) = (0.05, 200.0);
/// Page margin around the drawing, in millimetres. Keeps a straight run
/// from collapsing the page to zero height.
const PAGE_MARGIN_MM: f64 = 1.0;

/// Zoom and pan applied on top of the fitted view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Magnification relative to the fitted view.
    pub zoom: f64,
    /// Horizontal pan in pixels, positive to the right.
    pub pan_x: f64,
    /// Vertical pan in pixels, positive downward.
    pub pan_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::fit()
    }
}

impl Viewport {
    /// Whole drawing fitted to the image.
    pub fn fit() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }

    /// Multiply the zoom by `factor`, clamped to a sane range.
    pub fn zoom_by(&mut self, factor: f64) {
        if factor.is_finite() && factor > 0.0 {
            self.zoom = (self.zoom * factor).clamp(ZOOM_RANGE.0, ZOOM_RANGE.1);
        }
    }

    /// Shift the view by `(dx, dy)` pixels.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }
}

/// PNG preview backend.
pub struct PreviewBackend {
    page: SvgBackend,
    width: u32,
    height: u32,
    viewport: Viewport,
    fontdb: Option<Arc<usvg::fontdb::Database>>,
}

impl std::fmt::Debug for PreviewBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewBackend")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("viewport", &self.viewport)
            .field("system_fonts", &self.fontdb.is_none())
            .finish()
    }
}

impl Default for PreviewBackend {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl PreviewBackend {
    /// Backend rendering a `width × height` image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            page: SvgBackend::new()
                .with_margin(PAGE_MARGIN_MM)
                .with_monochrome(true),
            width: width.max(1),
            height: height.max(1),
            viewport: Viewport::fit(),
            fontdb: None,
        }
    }

    /// Use `viewport` for the next render.
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Multiply every line weight by `factor`, as on the page.
    pub fn with_stroke_factor(mut self, factor: f64) -> Self {
        self.page = self.page.with_stroke_factor(factor);
        self
    }

    /// Render text with the fonts in `fontdb` instead of the system fonts.
    pub fn with_fonts(mut self, fontdb: usvg::fontdb::Database) -> Self {
        self.fontdb = Some(Arc::new(fontdb));
        self
    }

    /// Current viewport, for interactive adjustment.
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    fn options(&self) -> usvg::Options<'static> {
        let mut opt = usvg::Options::default();
        opt.fontdb = match &self.fontdb {
            Some(db) => Arc::clone(db),
            None => {
                let mut db = usvg::fontdb::Database::new();
                db.load_system_fonts();
                Arc::new(db)
            }
        };
        opt
    }

    /// Page to pixel transform: fit, then zoom about the centre and pan.
    fn transform(&self, size: usvg::Size) -> tiny_skia::Transform {
        let (w, h) = (self.width as f32, self.height as f32);
        let avail_w = (w - 2.0 * FIT_MARGIN).max(1.0);
        let avail_h = (h - 2.0 * FIT_MARGIN).max(1.0);
        let fit = (avail_w / size.width()).min(avail_h / size.height());
        let k = fit * self.viewport.zoom as f32;
        let tx = w / 2.0 + self.viewport.pan_x as f32 - k * size.width() / 2.0;
        let ty = h / 2.0 + self.viewport.pan_y as f32 - k * size.height() / 2.0;
        tiny_skia::Transform::from_row(k, 0.0, 0.0, k, tx, ty)
    }

    /// Render the received primitives.
    pub fn render(&self) -> Result<RgbImage> {
        let svg = self.page.document()?.to_string();
        let tree = usvg::Tree::from_str(&svg, &self.options())
            .map_err(|e| BackendError::Render(e.to_string()))?;
        let mut pixmap = tiny_skia::Pixmap::new(self.width, self.height).ok_or_else(|| {
            BackendError::Render(format!("cannot allocate {}x{}", self.width, self.height))
        })?;
        pixmap.fill(tiny_skia::Color::WHITE);
        resvg::render(&tree, self.transform(tree.size()), &mut pixmap.as_mut());

        let mut img = RgbImage::new(self.width, self.height);
        for (px, out) in pixmap.pixels().iter().zip(img.pixels_mut()) {
            let c = px.demultiply();
            *out = Rgb([c.red(), c.green(), c.blue()]);
        }
        Ok(img)
    }
}

impl Backend for PreviewBackend {
    fn target(&self) -> Target {
        Target::Preview
    }

    fn configure(&mut self, registry: &StyleRegistry) -> Result<()> {
        self.page.configure(registry)
    }

    fn emit(&mut self, primitive: &Primitive) -> Result<()> {
        self.page.emit(primitive)
    }

    fn finalize(&mut self, path: &Path) -> Result<()> {
        let img = self.render()?;
        tracing::info!(
            width = self.width,
            height = self.height,
            zoom = self.viewport.zoom,
            "writing preview {}",
            path.display()
        );
        let mut png = std::io::Cursor::new(Vec::new());
        img.write_to(&mut png, ImageFormat::Png)?;
        write_atomically(path, |w| Ok(w.write_all(png.get_ref())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gad_ir::{HAlign, Layer, LineWeight, Point2D};

    const WHITE: [u8; 3] = [255, 255, 255];

    fn backend(width: u32, height: u32) -> PreviewBackend {
        let mut preview =
            PreviewBackend::new(width, height).with_fonts(usvg::fontdb::Database::new());
        preview.configure(&StyleRegistry::for_scale(100.0)).unwrap();
        preview
    }

    fn diagonal() -> Primitive {
        Primitive::line(
            Point2D::new(0.0, 0.0),
            Point2D::new(1000.0, 1000.0),
            Layer::Structure,
            LineWeight::Normal,
        )
    }

    #[test]
    fn test_fitted_line_spans_image() {
        let mut preview = backend(100, 100);
        preview.emit(&diagonal()).unwrap();
        let img = preview.render().unwrap();
        assert_ne!(img.get_pixel(30, 30).0, WHITE);
        assert_ne!(img.get_pixel(50, 50).0, WHITE);
        assert_ne!(img.get_pixel(70, 70).0, WHITE);
        assert_eq!(img.get_pixel(70, 30).0, WHITE);
        assert_eq!(img.get_pixel(5, 5).0, WHITE);
    }

    #[test]
    fn test_pan_moves_drawing() {
        let mut preview = backend(100, 100);
        preview.emit(&diagonal()).unwrap();
        preview.viewport_mut().pan_by(10.0, 0.0);
        let img = preview.render().unwrap();
        assert_ne!(img.get_pixel(60, 50).0, WHITE);
        assert_eq!(img.get_pixel(50, 50).0, WHITE);
    }

    #[test]
    fn test_zoom_about_centre() {
        let mut preview = backend(100, 100);
        preview.emit(&diagonal()).unwrap();
        preview.viewport_mut().zoom_by(0.5);
        let img = preview.render().unwrap();
        assert_ne!(img.get_pixel(50, 50).0, WHITE);
        assert_eq!(img.get_pixel(30, 30).0, WHITE);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut view = Viewport::fit();
        view.zoom_by(1e9);
        assert_eq!(view.zoom, 200.0);
        view.zoom_by(-1.0);
        assert_eq!(view.zoom, 200.0);
    }

    #[test]
    fn test_layers_drawn_in_black() {
        let mut preview = backend(100, 100);
        preview.emit(&diagonal()).unwrap();
        preview
            .emit(&Primitive::line(
                Point2D::new(0.0, 250.0),
                Point2D::new(1000.0, 250.0),
                Layer::Pier,
                LineWeight::Thick,
            ))
            .unwrap();
        let img = preview.render().unwrap();
        let [r, g, b] = img.get_pixel(70, 37).0;
        assert!(r < 128, "pier stroke should be inked, got {r},{g},{b}");
        assert!(r == g && g == b, "preview is monochrome, got {r},{g},{b}");
    }

    #[test]
    fn test_text_without_fonts_still_renders() {
        let mut preview = backend(200, 100);
        preview.emit(&diagonal()).unwrap();
        preview
            .emit(&Primitive::text(
                Point2D::new(100.0, 500.0),
                "A1",
                200.0,
                0.0,
                Layer::Annotations,
                HAlign::Left,
            ))
            .unwrap();
        assert!(preview.render().is_ok());
    }

    #[test]
    fn test_empty_preview_is_error() {
        let preview = backend(10, 10);
        assert!(matches!(preview.render(), Err(BackendError::EmptyDrawing)));
    }

    #[test]
    fn test_finalize_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.png");
        let mut preview = backend(64, 48);
        preview.emit(&diagonal()).unwrap();
        preview.finalize(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
