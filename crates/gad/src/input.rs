//! Parameter input files.
//!
//! Two layouts are accepted, picked by file extension:
//!
//! - **sheet** (`.csv`, `.txt` and anything else): one parameter per row,
//!   either `NAME, value[, description]` or `value, NAME[, description]`.
//!   `#` starts a comment. A leading header row is skipped.
//! - **structured** (`.toml`, `.json`): a `parameters` table of
//!   `NAME = value` and a `cross_section` list of `[chainage, level]` pairs.

use std::collections::BTreeMap;
use std::path::Path;

use gad_params::{load, sample_source, ParameterSource};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{GadError, Result};

/// Problems found while parsing an input file.
#[derive(Error, Debug)]
pub enum InputError {
    /// A sheet row could not be read.
    #[error("line {line}: {message}")]
    Row {
        /// 1-based line number.
        line: usize,
        /// What is wrong with the row.
        message: String,
    },

    /// Malformed TOML.
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Input file layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Spreadsheet-style rows.
    Sheet,
    /// Structured TOML.
    Toml,
    /// Structured JSON.
    Json,
}

impl InputFormat {
    /// Layout implied by the file extension.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => InputFormat::Toml,
            Some("json") => InputFormat::Json,
            _ => InputFormat::Sheet,
        }
    }
}

/// The structured layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredInput {
    /// Ground samples as `[chainage, level]`.
    #[serde(default)]
    pub cross_section: Vec<[f64; 2]>,
    /// Scalar parameters by key.
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
}

impl StructuredInput {
    fn into_source(self) -> ParameterSource {
        let mut source: ParameterSource = self.parameters.into_iter().collect();
        for [chainage, level] in self.cross_section {
            source.push_sample(chainage, level);
        }
        source
    }
}

/// Parse input text in the given layout.
pub fn parse_source(text: &str, format: InputFormat) -> std::result::Result<ParameterSource, InputError> {
    match format {
        InputFormat::Sheet => parse_sheet(text),
        InputFormat::Toml => Ok(toml::from_str::<StructuredInput>(text)?.into_source()),
        InputFormat::Json => Ok(serde_json::from_str::<StructuredInput>(text)?.into_source()),
    }
}

/// Read a parameter file, choosing the layout from its extension.
pub fn read_source(path: &Path) -> Result<ParameterSource> {
    let text = std::fs::read_to_string(path).map_err(|source| GadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let format = InputFormat::from_path(path);
    let source = parse_source(&text, format).map_err(|source| GadError::Input {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        "read {} entries ({} samples) from {}",
        source.entries().len(),
        source.sample_count(),
        path.display()
    );
    Ok(source)
}

fn is_name(cell: &str) -> bool {
    let mut chars = cell.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse the spreadsheet row layout.
pub fn parse_sheet(text: &str) -> std::result::Result<ParameterSource, InputError> {
    let mut source = ParameterSource::new();
    let mut seen_row = false;

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let row = raw.split('#').next().unwrap_or_default().trim();
        if row.is_empty() {
            continue;
        }
        let cells: Vec<&str> = row.split([',', '\t', ';']).map(str::trim).collect();
        let err = |message: String| InputError::Row { line, message };
        if cells.len() < 2 {
            return Err(err(format!("expected `NAME, value`, got `{row}`")));
        }

        let first_row = !seen_row;
        seen_row = true;
        let (name, value) = match (cells[0].parse::<f64>(), cells[1].parse::<f64>()) {
            (Ok(value), _) => (cells[1], value),
            (Err(_), Ok(value)) => (cells[0], value),
            (Err(_), Err(_)) if first_row => {
                tracing::debug!("skipping header row `{row}`");
                continue;
            }
            (Err(_), Err(_)) => {
                return Err(err(format!("no numeric value in `{row}`")));
            }
        };
        if !is_name(name) {
            return Err(err(format!("`{name}` is not a parameter name")));
        }
        if !value.is_finite() {
            return Err(err(format!("value of {name} is not finite")));
        }
        source.push(name, value);
    }
    Ok(source)
}

/// Short descriptions written next to the keys in a sheet template.
const DESCRIPTIONS: &[(&str, &str)] = &[
    ("SCALE1", "scale of elevation and plan"),
    ("SCALE2", "scale of sections"),
    ("SKEW", "skew angle in degrees"),
    ("DATUM", "datum level"),
    ("TOPRL", "top level of the grid"),
    ("LEFT", "start chainage of the grid"),
    ("RIGHT", "end chainage of the grid"),
    ("XINCR", "chainage interval"),
    ("YINCR", "level interval"),
    ("NSPAN", "number of spans"),
    ("LBRIDGE", "overall length of the bridge"),
    ("ABTL", "chainage of the left abutment"),
    ("RTL", "road top level"),
    ("SOFL", "soffit level"),
    ("KERBW", "kerb width"),
    ("KERBD", "kerb depth"),
    ("CCBR", "clear carriageway width"),
    ("SLBTHC", "slab thickness at centre"),
    ("SLBTHE", "slab thickness at edge"),
    ("SLBTHT", "slab thickness at tip"),
    ("CAPT", "pier cap top level"),
    ("CAPB", "pier cap bottom level"),
    ("CAPW", "pier cap width"),
    ("PIERTW", "pier top width"),
    ("BATTR", "pier batter (1 in n)"),
    ("PIERST", "pier length along the bearing line"),
    ("SPAN1", "span length"),
    ("FUTRL", "pier footing founding level"),
    ("FUTD", "pier footing depth"),
    ("FUTW", "pier footing width"),
    ("FUTL", "pier footing length"),
    ("DWTH", "dirt wall thickness"),
    ("APTHK", "approach slab thickness"),
    ("LASLAB", "approach slab length"),
    ("WCTH", "wearing course thickness"),
];

/// A complete sample input in the given layout.
pub fn template(format: InputFormat) -> Result<String> {
    let source = sample_source();
    match format {
        InputFormat::Sheet => {
            let mut out = String::from("# Bridge general-arrangement drawing parameters\n");
            out.push_str("# NAME, value, description\n");
            for (key, value) in source.entries() {
                match DESCRIPTIONS.iter().find(|(k, _)| *k == key.as_str()) {
                    Some((_, desc)) => out.push_str(&format!("{key}, {value}, {desc}\n")),
                    None => out.push_str(&format!("{key}, {value}\n")),
                }
            }
            Ok(out)
        }
        InputFormat::Toml | InputFormat::Json => {
            let params = load(&source)?;
            let input = StructuredInput {
                parameters: source.scalar_entries().cloned().collect(),
                cross_section: params
                    .cross_section()
                    .iter()
                    .map(|s| [s.chainage, s.level])
                    .collect(),
            };
            let text = if format == InputFormat::Toml {
                toml::to_string_pretty(&input).map_err(|e| GadError::Config(e.to_string()))?
            } else {
                serde_json::to_string_pretty(&input).map_err(|e| GadError::Config(e.to_string()))?
            };
            Ok(text)
        }
    }
}

/// Write a sample input file to `path`.
pub fn write_template(path: &Path) -> Result<()> {
    let text = template(InputFormat::from_path(path))?;
    std::fs::write(path, text).map_err(|source| GadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("wrote template {}", path.display());
    Ok(())
}
