//! Layer and style registry.
//!
//! Every primitive names exactly one [`Layer`]. The layer set is closed, so a
//! primitive can never land on the CAD default layer `0`.

use serde::{Deserialize, Serialize};

/// Named drawing layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Layer {
    /// Layout grid, axes, level and chainage scales.
    Grid,
    /// Superstructure, approach slabs, wearing course, reference lines.
    Structure,
    /// Pier footings.
    Foundation,
    /// Pier caps and shafts.
    Pier,
    /// Abutment outlines and plan traces.
    Abutment,
    /// Ground profile and its annotations.
    CrossSection,
    /// Linear dimensions.
    Dimensions,
    /// Labels and view captions.
    Annotations,
    /// Title text and frame.
    TitleBlock,
}

impl Layer {
    /// All layers in registration order.
    pub const ALL: [Layer; 9] = [
        Layer::Grid,
        Layer::Structure,
        Layer::Foundation,
        Layer::Pier,
        Layer::Abutment,
        Layer::CrossSection,
        Layer::Dimensions,
        Layer::Annotations,
        Layer::TitleBlock,
    ];

    /// Layer name as written to output files.
    pub fn name(&self) -> &'static str {
        match self {
            Layer::Grid => "GRID",
            Layer::Structure => "STRUCTURE",
            Layer::Foundation => "FOUNDATION",
            Layer::Pier => "PIER",
            Layer::Abutment => "ABUTMENT",
            Layer::CrossSection => "CROSS_SECTION",
            Layer::Dimensions => "DIMENSIONS",
            Layer::Annotations => "ANNOTATIONS",
            Layer::TitleBlock => "TITLE_BLOCK",
        }
    }

    /// AutoCAD colour index used for the layer.
    pub fn color(&self) -> u8 {
        match self {
            Layer::Grid => 8,
            Layer::Structure => 7,
            Layer::Foundation => 30,
            Layer::Pier => 5,
            Layer::Abutment => 3,
            Layer::CrossSection => 1,
            Layer::Dimensions => 2,
            Layer::Annotations => 7,
            Layer::TitleBlock => 7,
        }
    }

    /// RGB equivalent of [`Layer::color`] for raster and page output.
    pub fn rgb(&self) -> [u8; 3] {
        match self.color() {
            1 => [200, 0, 0],
            2 => [160, 140, 0],
            3 => [0, 140, 0],
            5 => [0, 0, 200],
            8 => [128, 128, 128],
            30 => [230, 120, 0],
            _ => [0, 0, 0],
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Stroke weight classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LineWeight {
    /// Construction and annotation lines.
    Thin,
    /// Default outline weight.
    #[default]
    Normal,
    /// Emphasised outlines (ground profile).
    Thick,
}

impl LineWeight {
    /// Plotted width in millimetres.
    pub fn mm(&self) -> f64 {
        match self {
            LineWeight::Thin => 0.18,
            LineWeight::Normal => 0.35,
            LineWeight::Thick => 0.50,
        }
    }

    /// DXF group 370 value (hundredths of a millimetre).
    pub fn dxf_code(&self) -> i32 {
        (self.mm() * 100.0).round() as i32
    }
}

/// A layer with its display attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDef {
    /// The layer.
    pub layer: Layer,
    /// AutoCAD colour index.
    pub color: u8,
    /// Linetype name.
    pub linetype: String,
}

/// Text style shared by all text primitives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Style name.
    pub name: String,
    /// Font file.
    pub font: String,
}

/// Dimension style. Lengths are in paper units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimStyle {
    /// Style name.
    pub name: String,
    /// Arrowhead (tick) size.
    pub arrow_size: f64,
    /// Dimension text height.
    pub text_height: f64,
    /// Extension line overshoot beyond the dimension line.
    pub ext_extension: f64,
    /// Gap between the measured point and the extension line.
    pub ext_offset: f64,
    /// Linear measurement factor.
    pub linear_factor: f64,
    /// Text style used for the dimension text.
    pub text_style: String,
}

/// The complete registry handed to a backend before any primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRegistry {
    /// Layer definitions in registration order.
    pub layers: Vec<LayerDef>,
    /// Main text style.
    pub text_style: TextStyle,
    /// Dimension style.
    pub dim_style: DimStyle,
    /// Paper units per plotted millimetre (the drawing scale denominator).
    pub paper_scale: f64,
}

impl StyleRegistry {
    /// Linetype used by every layer.
    pub const CONTINUOUS: &'static str = "CONTINUOUS";

    /// Build the registry for a drawing plotted at `1:scale1` whose paper
    /// units are full-size millimetres.
    ///
    /// Dimension sizes are expressed in plotted millimetres and scaled to
    /// paper units, so a 1:100 drawing gets 150 unit arrows and 400 unit text.
    pub fn for_scale(scale1: f64) -> Self {
        Self::for_paper(scale1, scale1)
    }

    /// Registry for a drawing plotted at `1:scale1` with `paper_scale` paper
    /// units per plotted millimetre. Dimension values still read in
    /// full-size millimetres.
    pub fn for_paper(scale1: f64, paper_scale: f64) -> Self {
        let text_style = TextStyle {
            name: "Arial".into(),
            font: "arial.ttf".into(),
        };
        let dim_style = DimStyle {
            name: format!("PMB{}", scale1.round() as i64),
            arrow_size: 1.5 * paper_scale,
            text_height: 4.0 * paper_scale,
            ext_extension: 4.0 * paper_scale,
            ext_offset: 4.0 * paper_scale,
            linear_factor: scale1 / paper_scale,
            text_style: text_style.name.clone(),
        };
        Self {
            layers: Layer::ALL
                .iter()
                .map(|layer| LayerDef {
                    layer: *layer,
                    color: layer.color(),
                    linetype: Self::CONTINUOUS.into(),
                })
                .collect(),
            text_style,
            dim_style,
            paper_scale,
        }
    }

    /// Whether `layer` is registered.
    pub fn contains(&self, layer: Layer) -> bool {
        self.layers.iter().any(|def| def.layer == layer)
    }
}
