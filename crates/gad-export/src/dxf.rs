//! DXF export for general-arrangement drawings.
//!
//! Writes an AutoCAD 2000 (AC1015) ASCII file. Every table record, block and
//! entity carries a handle (group 5), its owner (group 330) and the AcDb
//! subclass markers (group 100) that R2000 readers expect:
//! - Line → `LINE`
//! - Polyline → `LWPOLYLINE` (closed flag in group 70)
//! - Text → `TEXT` with height, rotation and alignment
//! - LinearDim → `DIMENSION` using the registered dimension style, with its
//!   geometry in an anonymous `*D<n>` block
//!
//! Paper y grows down the sheet; DXF is y-up, so every y is negated.
//! Output is a pure function of the registry and the primitive stream.

use std::fmt::Display;
use std::io::Write;
use std::path::Path;

use gad_ir::{stream_bounds, HAlign, Layer, LineWeight, Point2D, Primitive, StyleRegistry};

use crate::dimension::{self, DimensionLayout};
use crate::{check_layer, write_atomically, Backend, BackendError, Result, Target};

/// Owner handle of the top-level tables and the root dictionary.
const ROOT: &str = "0";

/// DXF document builder.
///
/// Buffers primitives until [`Backend::finalize`] so the tables can be
/// written first.
#[derive(Debug, Default)]
pub struct DxfBackend {
    registry: Option<StyleRegistry>,
    entities: Vec<Primitive>,
}

impl DxfBackend {
    /// Create an unconfigured backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Primitives buffered so far.
    pub fn entities(&self) -> &[Primitive] {
        &self.entities
    }

    /// Write the whole document to `writer`.
    pub fn export_to_writer(&self, writer: &mut dyn Write) -> Result<()> {
        let registry = self.registry.as_ref().ok_or(BackendError::NotConfigured)?;

        // Handles are allocated while the body is written; the header needs
        // the next free one, so it goes out last.
        let mut body = Vec::new();
        let mut doc = Document::new(&mut body, registry, &self.entities);
        doc.write_body()?;
        let seed = doc.handles.next;

        write_header(writer, registry, &self.entities, seed)?;
        writer.write_all(&body)?;
        pair(writer, 0, "EOF")?;
        Ok(())
    }

    /// The document as a string.
    pub fn to_dxf_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.export_to_writer(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl Backend for DxfBackend {
    fn target(&self) -> Target {
        Target::Cad
    }

    fn configure(&mut self, registry: &StyleRegistry) -> Result<()> {
        self.registry = Some(registry.clone());
        Ok(())
    }

    fn emit(&mut self, primitive: &Primitive) -> Result<()> {
        check_layer(self.registry.as_ref(), primitive)?;
        self.entities.push(primitive.clone());
        Ok(())
    }

    fn finalize(&mut self, path: &Path) -> Result<()> {
        tracing::info!(
            entities = self.entities.len(),
            "writing DXF {}",
            path.display()
        );
        write_atomically(path, |w| self.export_to_writer(w))
    }
}

/// One group code / value pair.
fn pair(writer: &mut dyn Write, code: u16, value: impl Display) -> std::io::Result<()> {
    writeln!(writer, "{code}")?;
    writeln!(writer, "{value}")
}

/// CAD y for a paper y.
fn cad_y(y: f64) -> f64 {
    if y == 0.0 {
        0.0
    } else {
        -y
    }
}

fn write_point(writer: &mut dyn Write, code: u16, p: Point2D) -> std::io::Result<()> {
    pair(writer, code, format_args!("{:.6}", p.x))?;
    pair(writer, code + 10, format_args!("{:.6}", cad_y(p.y)))?;
    Ok(())
}

/// Text values are single-line in DXF: control characters would split a
/// group pair.
fn single_line(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

fn write_header(
    writer: &mut dyn Write,
    registry: &StyleRegistry,
    entities: &[Primitive],
    seed: u32,
) -> std::io::Result<()> {
    pair(writer, 0, "SECTION")?;
    pair(writer, 2, "HEADER")?;

    pair(writer, 9, "$ACADVER")?;
    pair(writer, 1, "AC1015")?; // DXF 2000, first with LWPOLYLINE lineweights
    pair(writer, 9, "$HANDSEED")?;
    pair(writer, 5, format_args!("{seed:X}"))?;
    pair(writer, 9, "$INSUNITS")?;
    pair(writer, 70, 4)?; // Millimeters
    pair(writer, 9, "$TEXTSTYLE")?;
    pair(writer, 7, &registry.text_style.name)?;
    pair(writer, 9, "$DIMSTYLE")?;
    pair(writer, 2, &registry.dim_style.name)?;

    let bounds = stream_bounds(entities);
    if bounds.is_valid() {
        // Paper y is flipped, so the paper max y is the CAD min y.
        pair(writer, 9, "$EXTMIN")?;
        write_point(writer, 10, Point2D::new(bounds.min_x, bounds.max_y))?;
        pair(writer, 9, "$EXTMAX")?;
        write_point(writer, 10, Point2D::new(bounds.max_x, bounds.min_y))?;
    }

    pair(writer, 0, "ENDSEC")?;
    Ok(())
}

/// Sequential hexadecimal handles.
#[derive(Debug)]
struct Handles {
    next: u32,
}

impl Handles {
    fn take(&mut self) -> String {
        let h = format!("{:X}", self.next);
        self.next += 1;
        h
    }
}

/// Block record and layout of one dimension's anonymous block.
struct DimBlock {
    name: String,
    record: String,
    layout: DimensionLayout,
}

/// Writer for everything after the header.
struct Document<'a> {
    w: &'a mut dyn Write,
    registry: &'a StyleRegistry,
    entities: &'a [Primitive],
    handles: Handles,
    model_space: String,
    paper_space: String,
    dims: Vec<DimBlock>,
}

impl<'a> Document<'a> {
    fn new(w: &'a mut dyn Write, registry: &'a StyleRegistry, entities: &'a [Primitive]) -> Self {
        Self {
            w,
            registry,
            entities,
            handles: Handles { next: 1 },
            model_space: String::new(),
            paper_space: String::new(),
            dims: Vec::new(),
        }
    }

    fn write_body(&mut self) -> std::io::Result<()> {
        self.write_tables()?;
        self.write_blocks()?;
        self.write_entities()?;
        self.write_objects()
    }

    fn pair(&mut self, code: u16, value: impl Display) -> std::io::Result<()> {
        pair(self.w, code, value)
    }

    fn point(&mut self, code: u16, p: Point2D) -> std::io::Result<()> {
        write_point(self.w, code, p)
    }

    fn begin_section(&mut self, name: &str) -> std::io::Result<()> {
        self.pair(0, "SECTION")?;
        self.pair(2, name)
    }

    fn end_section(&mut self) -> std::io::Result<()> {
        self.pair(0, "ENDSEC")
    }

    /// Opens a symbol table and returns its handle.
    fn begin_table(&mut self, name: &str, count: usize) -> std::io::Result<String> {
        let handle = self.handles.take();
        self.pair(0, "TABLE")?;
        self.pair(2, name)?;
        self.pair(5, &handle)?;
        self.pair(330, ROOT)?;
        self.pair(100, "AcDbSymbolTable")?;
        self.pair(70, count)?;
        Ok(handle)
    }

    fn end_table(&mut self) -> std::io::Result<()> {
        self.pair(0, "ENDTAB")
    }

    /// Record header shared by every table entry except DIMSTYLE.
    fn begin_record(&mut self, kind: &str, table: &str, subclass: &str) -> std::io::Result<String> {
        let handle = self.handles.take();
        self.pair(0, kind)?;
        self.pair(5, &handle)?;
        self.pair(330, table)?;
        self.pair(100, "AcDbSymbolTableRecord")?;
        self.pair(100, subclass)?;
        Ok(handle)
    }

    fn write_tables(&mut self) -> std::io::Result<()> {
        self.begin_section("TABLES")?;

        let table = self.begin_table("VPORT", 1)?;
        self.begin_record("VPORT", &table, "AcDbViewportTableRecord")?;
        self.pair(2, "*Active")?;
        self.pair(70, 0)?;
        let bounds = stream_bounds(self.entities);
        let (center, height) = if bounds.is_valid() {
            (bounds.center(), bounds.height().max(bounds.width() / 2.0) * 1.1)
        } else {
            (Point2D::new(0.0, 0.0), 1.0)
        };
        self.point(12, center)?;
        self.pair(40, format_args!("{height:.6}"))?;
        self.pair(41, "2.0")?;
        self.end_table()?;

        let table = self.begin_table("LTYPE", 3)?;
        for (name, description) in [
            ("ByBlock", ""),
            ("ByLayer", ""),
            (StyleRegistry::CONTINUOUS, "Solid line"),
        ] {
            self.begin_record("LTYPE", &table, "AcDbLinetypeTableRecord")?;
            self.pair(2, name)?;
            self.pair(70, 0)?;
            self.pair(3, description)?;
            self.pair(72, 65)?;
            self.pair(73, 0)?;
            self.pair(40, "0.0")?;
        }
        self.end_table()?;

        let registry = self.registry;
        let table = self.begin_table("LAYER", registry.layers.len() + 1)?;
        let layer_zero = (
            "0".to_string(),
            7,
            StyleRegistry::CONTINUOUS.to_string(),
        );
        let layers = std::iter::once(layer_zero).chain(
            registry
                .layers
                .iter()
                .map(|def| (def.layer.name().to_string(), def.color, def.linetype.clone())),
        );
        for (name, color, linetype) in layers {
            self.begin_record("LAYER", &table, "AcDbLayerTableRecord")?;
            self.pair(2, name)?;
            self.pair(70, 0)?;
            self.pair(62, color)?;
            self.pair(6, linetype)?;
            self.pair(370, -3)?; // Default lineweight; entities carry their own
        }
        self.end_table()?;

        let text = &registry.text_style;
        let table = self.begin_table("STYLE", 2)?;
        for (name, font) in [("Standard", "txt"), (text.name.as_str(), text.font.as_str())] {
            self.begin_record("STYLE", &table, "AcDbTextStyleTableRecord")?;
            self.pair(2, name)?;
            self.pair(70, 0)?;
            self.pair(40, "0.0")?; // Height set per entity
            self.pair(41, "1.0")?;
            self.pair(50, "0.0")?;
            self.pair(71, 0)?;
            self.pair(42, "2.5")?;
            self.pair(3, font)?;
            self.pair(4, "")?;
        }
        self.end_table()?;

        for name in ["VIEW", "UCS"] {
            self.begin_table(name, 0)?;
            self.end_table()?;
        }

        let table = self.begin_table("APPID", 1)?;
        self.begin_record("APPID", &table, "AcDbRegAppTableRecord")?;
        self.pair(2, "ACAD")?;
        self.pair(70, 0)?;
        self.end_table()?;

        let dim = &registry.dim_style;
        let table = self.begin_table("DIMSTYLE", 1)?;
        self.pair(100, "AcDbDimStyleTable")?;
        let handle = self.handles.take();
        self.pair(0, "DIMSTYLE")?;
        self.pair(105, handle)?;
        self.pair(330, &table)?;
        self.pair(100, "AcDbSymbolTableRecord")?;
        self.pair(100, "AcDbDimStyleTableRecord")?;
        self.pair(2, &dim.name)?;
        self.pair(70, 0)?;
        self.pair(41, format_args!("{:.6}", dim.arrow_size))?; // DIMASZ
        self.pair(42, format_args!("{:.6}", dim.ext_offset))?; // DIMEXO
        self.pair(44, format_args!("{:.6}", dim.ext_extension))?; // DIMEXE
        self.pair(140, format_args!("{:.6}", dim.text_height))?; // DIMTXT
        self.pair(144, format_args!("{:.6}", dim.linear_factor))?; // DIMLFAC
        self.end_table()?;

        let layouts: Vec<DimensionLayout> = self
            .entities
            .iter()
            .filter_map(|p| match p {
                Primitive::LinearDim {
                    base, p1, p2, angle, ..
                } => Some(dimension::layout(*base, *p1, *p2, *angle, dim)),
                _ => None,
            })
            .collect();
        let table = self.begin_table("BLOCK_RECORD", 2 + layouts.len())?;
        self.model_space = self.block_record(&table, "*Model_Space")?;
        self.paper_space = self.block_record(&table, "*Paper_Space")?;
        for (i, layout) in layouts.into_iter().enumerate() {
            let name = format!("*D{}", i + 1);
            let record = self.block_record(&table, &name)?;
            self.dims.push(DimBlock {
                name,
                record,
                layout,
            });
        }
        self.end_table()?;

        self.end_section()
    }

    fn block_record(&mut self, table: &str, name: &str) -> std::io::Result<String> {
        let handle = self.begin_record("BLOCK_RECORD", table, "AcDbBlockTableRecord")?;
        self.pair(2, name)?;
        Ok(handle)
    }

    fn begin_block(&mut self, record: &str, name: &str, flags: u8) -> std::io::Result<()> {
        let handle = self.handles.take();
        self.pair(0, "BLOCK")?;
        self.pair(5, handle)?;
        self.pair(330, record)?;
        self.pair(100, "AcDbEntity")?;
        self.pair(8, "0")?;
        self.pair(100, "AcDbBlockBegin")?;
        self.pair(2, name)?;
        self.pair(70, flags)?;
        self.point(10, Point2D::new(0.0, 0.0))?;
        self.pair(3, name)?;
        self.pair(1, "")
    }

    fn end_block(&mut self, record: &str) -> std::io::Result<()> {
        let handle = self.handles.take();
        self.pair(0, "ENDBLK")?;
        self.pair(5, handle)?;
        self.pair(330, record)?;
        self.pair(100, "AcDbEntity")?;
        self.pair(8, "0")?;
        self.pair(100, "AcDbBlockEnd")
    }

    fn write_blocks(&mut self) -> std::io::Result<()> {
        self.begin_section("BLOCKS")?;
        for (record, name) in [
            (self.model_space.clone(), "*Model_Space"),
            (self.paper_space.clone(), "*Paper_Space"),
        ] {
            self.begin_block(&record, name, 0)?;
            self.end_block(&record)?;
        }

        let dims = std::mem::take(&mut self.dims);
        for dim in &dims {
            // Anonymous block
            self.begin_block(&dim.record, &dim.name, 1)?;
            for (a, b) in &dim.layout.lines {
                self.begin_entity("LINE", &dim.record, "0", Some(LineWeight::Thin))?;
                self.pair(100, "AcDbLine")?;
                self.point(10, *a)?;
                self.point(11, *b)?;
            }
            let size = self.registry.dim_style.text_height;
            self.text(
                &dim.record,
                "0",
                dim.layout.text_at,
                &dim.layout.text,
                size,
                dim.layout.rotation,
                HAlign::Center,
            )?;
            self.end_block(&dim.record)?;
        }
        self.dims = dims;
        self.end_section()
    }

    fn begin_entity(
        &mut self,
        kind: &str,
        owner: &str,
        layer: &str,
        weight: Option<LineWeight>,
    ) -> std::io::Result<()> {
        let handle = self.handles.take();
        self.pair(0, kind)?;
        self.pair(5, handle)?;
        self.pair(330, owner)?;
        self.pair(100, "AcDbEntity")?;
        self.pair(8, layer)?;
        if let Some(weight) = weight {
            self.pair(370, weight.dxf_code())?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn text(
        &mut self,
        owner: &str,
        layer: &str,
        position: Point2D,
        content: &str,
        height: f64,
        rotation: f64,
        halign: HAlign,
    ) -> std::io::Result<()> {
        self.begin_entity("TEXT", owner, layer, None)?;
        self.pair(100, "AcDbText")?;
        self.point(10, position)?;
        self.pair(40, format_args!("{height:.6}"))?;
        self.pair(1, single_line(content))?;
        self.pair(50, format_args!("{:.6}", rotation.to_degrees()))?;
        let registry = self.registry;
        self.pair(7, &registry.text_style.name)?;
        let code = match halign {
            HAlign::Left => 0,
            HAlign::Center => 1,
            HAlign::Right => 2,
        };
        if code != 0 {
            self.pair(72, code)?;
            // Aligned text is placed by its alignment point
            self.point(11, position)?;
        }
        self.pair(100, "AcDbText")
    }

    fn write_entities(&mut self) -> std::io::Result<()> {
        self.begin_section("ENTITIES")?;
        let owner = self.model_space.clone();
        let mut dims = 0;
        for entity in self.entities {
            match entity {
                Primitive::Line {
                    start,
                    end,
                    layer,
                    weight,
                } => {
                    self.begin_entity("LINE", &owner, layer.name(), Some(*weight))?;
                    self.pair(100, "AcDbLine")?;
                    self.point(10, *start)?;
                    self.point(11, *end)?;
                }
                Primitive::Polyline {
                    points,
                    closed,
                    layer,
                    weight,
                } => {
                    self.begin_entity("LWPOLYLINE", &owner, layer.name(), Some(*weight))?;
                    self.pair(100, "AcDbPolyline")?;
                    self.pair(90, points.len())?;
                    self.pair(70, if *closed { 1 } else { 0 })?;
                    for p in points {
                        self.point(10, *p)?;
                    }
                }
                Primitive::Text {
                    position,
                    content,
                    height,
                    rotation,
                    layer,
                    halign,
                } => self.text(
                    &owner,
                    layer.name(),
                    *position,
                    content,
                    *height,
                    *rotation,
                    *halign,
                )?,
                Primitive::LinearDim {
                    base,
                    p1,
                    p2,
                    angle,
                    style,
                    layer,
                } => {
                    let text_at = self.dims[dims].layout.text_at;
                    let block = self.dims[dims].name.clone();
                    dims += 1;
                    self.write_dimension(&owner, *layer, &block, style, *base, *p1, *p2, *angle, text_at)?;
                }
            }
        }
        self.end_section()
    }

    #[allow(clippy::too_many_arguments)]
    fn write_dimension(
        &mut self,
        owner: &str,
        layer: Layer,
        block: &str,
        style: &str,
        base: Point2D,
        p1: Point2D,
        p2: Point2D,
        angle: f64,
        text_at: Point2D,
    ) -> std::io::Result<()> {
        self.begin_entity("DIMENSION", owner, layer.name(), None)?;
        self.pair(100, "AcDbDimension")?;
        self.pair(2, block)?;
        self.point(10, base)?;
        self.point(11, text_at)?;
        self.pair(70, 32)?; // Rotated linear, block used by this dimension only
        self.pair(3, style)?;
        self.pair(100, "AcDbAlignedDimension")?;
        self.point(13, p1)?;
        self.point(14, p2)?;
        self.pair(50, format_args!("{:.6}", angle.to_degrees()))?;
        self.pair(100, "AcDbRotatedDimension")
    }

    fn write_objects(&mut self) -> std::io::Result<()> {
        self.begin_section("OBJECTS")?;
        let root = self.handles.take();
        let groups = self.handles.take();
        self.pair(0, "DICTIONARY")?;
        self.pair(5, &root)?;
        self.pair(330, ROOT)?;
        self.pair(100, "AcDbDictionary")?;
        self.pair(281, 1)?;
        self.pair(3, "ACAD_GROUP")?;
        self.pair(350, &groups)?;
        self.pair(0, "DICTIONARY")?;
        self.pair(5, &groups)?;
        self.pair(330, &root)?;
        self.pair(100, "AcDbDictionary")?;
        self.pair(281, 1)?;
        self.end_section()
    }
}
