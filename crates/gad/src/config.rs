//! Drawing configuration, read from a TOML file.
//!
//! ```toml
//! [projection]
//! hhs = 1000.0
//! vvs = 1000.0
//!
//! [title]
//! title = "GENERAL ARRANGEMENT DRAWING"
//! lines = ["NH-48 BYPASS", "BRIDGE AT CH 12.450"]
//!
//! [page]
//! margin_mm = 10.0
//! stroke_scale = 1.0
//!
//! [preview]
//! width = 1600
//! height = 1000
//! ```
//!
//! Every section and key is optional.

use std::path::Path;

use gad_export::page::DEFAULT_MARGIN_MM;
use gad_export::preview::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use gad_export::Viewport;
use gad_kernel_drafting::TitleText;
use gad_kernel_math::projection::DEFAULT_UNITS_PER_WORLD;
use serde::{Deserialize, Serialize};

use crate::{GadError, Result};

/// Paper units per world unit and the paper position of `(left, datum)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Horizontal paper units per world metre.
    pub hhs: f64,
    /// Vertical paper units per world metre.
    pub vvs: f64,
    /// Paper x of the frame origin.
    pub origin_x: f64,
    /// Paper y of the frame origin.
    pub origin_y: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            hhs: DEFAULT_UNITS_PER_WORLD,
            vvs: DEFAULT_UNITS_PER_WORLD,
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }
}

/// Page layout output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Blank border around the drawing (mm).
    pub margin_mm: f64,
    /// Multiplier on the registry line weights.
    pub stroke_scale: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            margin_mm: DEFAULT_MARGIN_MM,
            stroke_scale: 1.0,
        }
    }
}

/// Raster preview output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Zoom relative to the fitted view.
    pub zoom: f64,
    /// Horizontal pan in pixels.
    pub pan_x: f64,
    /// Vertical pan in pixels.
    pub pan_y: f64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl PreviewConfig {
    /// Viewport described by these settings.
    pub fn viewport(&self) -> Viewport {
        let mut viewport = Viewport::fit();
        viewport.zoom_by(self.zoom);
        viewport.pan_by(self.pan_x, self.pan_y);
        viewport
    }
}

fn positive(v: f64) -> bool {
    v > 0.0 && v.is_finite()
}

/// Settings that shape a drawing without being bridge parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingConfig {
    /// Projection factors and origin.
    pub projection: ProjectionConfig,
    /// Title block text.
    pub title: TitleText,
    /// Page layout output.
    pub page: PageConfig,
    /// Raster preview output.
    pub preview: PreviewConfig,
}

impl DrawingConfig {
    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| GadError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| GadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        tracing::debug!("loaded drawing configuration from {}", path.display());
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| GadError::Config(e.to_string()))
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        let p = &self.projection;
        if !positive(p.hhs) || !positive(p.vvs) {
            return Err(GadError::Config(
                "projection.hhs and projection.vvs must be positive".into(),
            ));
        }
        if !p.origin_x.is_finite() || !p.origin_y.is_finite() {
            return Err(GadError::Config("projection origin must be finite".into()));
        }
        if self.page.margin_mm < 0.0 || !self.page.margin_mm.is_finite() {
            return Err(GadError::Config("page.margin_mm must not be negative".into()));
        }
        if !positive(self.page.stroke_scale) {
            return Err(GadError::Config("page.stroke_scale must be positive".into()));
        }
        if self.preview.width == 0 || self.preview.height == 0 {
            return Err(GadError::Config(
                "preview.width and preview.height must be at least 1".into(),
            ));
        }
        if !positive(self.preview.zoom) {
            return Err(GadError::Config("preview.zoom must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = DrawingConfig::from_toml("").unwrap();
        assert_eq!(config, DrawingConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = DrawingConfig::from_toml(
            r#"
            [title]
            lines = ["RIVER CROSSING", "CH 12.450"]

            [page]
            margin_mm = 5.0
            "#,
        )
        .unwrap();
        assert_eq!(config.title.title, TitleText::default().title);
        assert_eq!(config.title.lines.len(), 2);
        assert_eq!(config.page.margin_mm, 5.0);
        assert_eq!(config.page.stroke_scale, 1.0);
        assert_eq!(config.preview.width, DEFAULT_WIDTH);
    }

    #[test]
    fn test_rejects_zero_factor() {
        let err = DrawingConfig::from_toml("[projection]\nhhs = 0.0\n").unwrap_err();
        assert!(matches!(err, GadError::Config(_)));
    }

    #[test]
    fn test_rejects_unknown_type() {
        assert!(DrawingConfig::from_toml("[preview]\nwidth = \"wide\"\n").is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = DrawingConfig::default();
        config.preview.zoom = 2.5;
        let text = config.to_toml().unwrap();
        assert_eq!(DrawingConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_preview_viewport() {
        let preview = PreviewConfig {
            zoom: 2.0,
            pan_x: 15.0,
            ..Default::default()
        };
        let vp = preview.viewport();
        assert_eq!(vp.zoom, 2.0);
        assert_eq!(vp.pan_x, 15.0);
        assert_eq!(vp.pan_y, 0.0);
    }
}
