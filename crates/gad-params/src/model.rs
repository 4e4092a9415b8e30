//! The frozen parameter record.

use gad_kernel_math::Skew;
use serde::{Deserialize, Serialize};

use crate::error::Diagnostic;

/// Drawing frame and scales.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Elevation/plan scale denominator.
    pub scale1: f64,
    /// Section scale denominator.
    pub scale2: f64,
    /// Datum level (bottom of the level scale).
    pub datum: f64,
    /// Left chainage of the frame.
    pub left: f64,
    /// Right chainage of the frame.
    pub right: f64,
    /// Top level of the level scale.
    pub toprl: f64,
    /// Chainage grid interval.
    pub xincr: f64,
    /// Level grid interval.
    pub yincr: f64,
}

/// Span arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spans {
    /// Number of spans.
    pub nspan: usize,
    /// Span length, centre to centre of supports.
    pub span1: f64,
    /// Total bridge length.
    pub lbridge: f64,
    /// Chainage of the left abutment.
    pub abtl: f64,
    /// Approach slab length. Zero omits approach slabs.
    pub laslab: f64,
}

/// Principal levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Levels {
    /// Road top level.
    pub rtl: f64,
    /// Soffit level.
    pub sofl: f64,
    /// Pier cap top.
    pub capt: f64,
    /// Pier cap bottom.
    pub capb: f64,
    /// Founding level.
    pub futrl: f64,
}

/// Pier and pier footing dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PierParams {
    /// Cap width along the bridge.
    pub capw: f64,
    /// Shaft top width along the bridge.
    pub piertw: f64,
    /// Shaft side batter (vertical over horizontal).
    pub battr: f64,
    /// Shaft length across the bridge.
    pub pierst: f64,
    /// Footing depth.
    pub futd: f64,
    /// Footing width along the bridge.
    pub futw: f64,
    /// Footing length across the bridge.
    pub futl: f64,
}

/// One abutment's dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbutmentParams {
    /// Dirt wall thickness.
    pub dwth: f64,
    /// Abutment cap width.
    pub cap_width: f64,
    /// Abutment cap depth.
    pub cap_depth: f64,
    /// Front face batter.
    pub front_batter: f64,
    /// Level where the front batter ends.
    pub front_batter_level: f64,
    /// Toe batter.
    pub toe_batter: f64,
    /// Level where the toe batter ends.
    pub toe_batter_level: f64,
    /// Footing projection beyond the toe and heel.
    pub front_offset: f64,
    /// Footing depth.
    pub footing_depth: f64,
    /// Back face batter.
    pub back_batter: f64,
    /// Level where the back batter ends.
    pub back_batter_level: f64,
}

/// Deck cross-section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeckParams {
    /// Clear carriageway width.
    pub ccbr: f64,
    /// Kerb width.
    pub kerbw: f64,
    /// Kerb depth.
    pub kerbd: f64,
    /// Slab thickness at the centre.
    pub slbthc: f64,
    /// Slab thickness at the edge.
    pub slbthe: f64,
    /// Slab thickness at the support.
    pub slbtht: f64,
    /// Approach slab thickness.
    pub apthk: f64,
    /// Wearing course thickness. Zero omits the wearing course.
    pub wcth: f64,
}

/// One ground profile sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossSectionSample {
    /// Chainage.
    pub chainage: f64,
    /// Ground level.
    pub level: f64,
}

/// Values derived from the inputs at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Derived {
    /// `scale1 / scale2`.
    pub sc: f64,
    /// End of the first span, `abtl + span1`.
    pub spane: f64,
    /// Carriageway width along the skew, `ccbr / c`.
    pub ccbrsq: f64,
    /// Kerb width along the skew, `kerbw / c`.
    pub kerbwsq: f64,
    /// Abutment length across the bridge, `ccbrsq + 2·kerbwsq`.
    pub abtlen: f64,
    /// Pier cap width along the skew, `capw / c`.
    pub capwsq: f64,
    /// Pier shaft top width along the skew, `piertw / c`.
    pub piertwsq: f64,
    /// Pier plan length, `pierst / c + |piertw·tn|`.
    pub pierstsq: f64,
    /// Horizontal spread of each shaft side, `(capb − (futrl + futd)) / battr`.
    pub ofset: f64,
}

/// Which end of the bridge an abutment sits at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Start of the bridge (`A1`).
    Left,
    /// End of the bridge (`A2`).
    Right,
}

impl Side {
    /// +1 for the left abutment, −1 for the mirrored right one.
    pub fn sign(&self) -> f64 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
        }
    }

    /// Support label used on the drawing.
    pub fn label(&self) -> &'static str {
        match self {
            Side::Left => "A1",
            Side::Right => "A2",
        }
    }
}

/// All design inputs with their derived values.
///
/// Built only by [`crate::load`]; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BridgeParameters {
    pub(crate) frame: Frame,
    pub(crate) spans: Spans,
    pub(crate) levels: Levels,
    pub(crate) pier: PierParams,
    pub(crate) left_abutment: AbutmentParams,
    pub(crate) right_abutment: AbutmentParams,
    pub(crate) deck: DeckParams,
    pub(crate) skew_degrees: f64,
    pub(crate) skew: Skew,
    pub(crate) cross_section: Vec<CrossSectionSample>,
    pub(crate) derived: Derived,
    #[serde(skip)]
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl BridgeParameters {
    /// Frame and scales.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Span arrangement.
    pub fn spans(&self) -> &Spans {
        &self.spans
    }

    /// Principal levels.
    pub fn levels(&self) -> &Levels {
        &self.levels
    }

    /// Pier dimensions.
    pub fn pier(&self) -> &PierParams {
        &self.pier
    }

    /// Abutment dimensions for one side.
    pub fn abutment(&self, side: Side) -> &AbutmentParams {
        match side {
            Side::Left => &self.left_abutment,
            Side::Right => &self.right_abutment,
        }
    }

    /// Deck dimensions.
    pub fn deck(&self) -> &DeckParams {
        &self.deck
    }

    /// Skew trigonometry.
    pub fn skew(&self) -> &Skew {
        &self.skew
    }

    /// Skew as supplied, in degrees.
    pub fn skew_degrees(&self) -> f64 {
        self.skew_degrees
    }

    /// Ground profile samples with strictly increasing chainage.
    pub fn cross_section(&self) -> &[CrossSectionSample] {
        &self.cross_section
    }

    /// Derived values.
    pub fn derived(&self) -> &Derived {
        &self.derived
    }

    /// Non-fatal findings from loading.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Chainage of abutment `side`.
    pub fn abutment_chainage(&self, side: Side) -> f64 {
        match side {
            Side::Left => self.spans.abtl,
            Side::Right => self.spans.abtl + self.spans.nspan as f64 * self.spans.span1,
        }
    }

    /// Chainages of the interior supports, `abtl + i·span1` for `i = 1..nspan`.
    pub fn pier_chainages(&self) -> impl Iterator<Item = f64> + '_ {
        (1..self.spans.nspan).map(move |i| self.spans.abtl + i as f64 * self.spans.span1)
    }
}
