//! Error and diagnostic types for parameter loading.

use std::fmt;

use thiserror::Error;

/// A single validation failure. Loading collects every failure before
/// reporting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A required key is absent.
    #[error("missing parameter {0}")]
    MissingParameter(String),

    /// A value is outside its admissible range.
    #[error("invalid value for {name}: {reason}")]
    InvalidRange {
        /// Parameter key.
        name: String,
        /// What the value violates.
        reason: String,
    },

    /// A count was given with a fractional part.
    #[error("{name} must be a whole number, got {value}")]
    NotAnInteger {
        /// Parameter key.
        name: String,
        /// Value supplied.
        value: f64,
    },

    /// Two keys name the same sample, such as `CH01` and `CH1`.
    #[error("{name} repeats sample {previous}")]
    DuplicateSample {
        /// Key seen second.
        name: String,
        /// Key seen first.
        previous: String,
    },

    /// Cross-section chainages must strictly increase.
    #[error(
        "cross-section sample CH{index} ({chainage:.3}) does not exceed the previous chainage ({previous:.3})"
    )]
    NonMonotonic {
        /// Sample number as used in the `CH<i>` key.
        index: usize,
        /// Chainage of the previous sample.
        previous: f64,
        /// Offending chainage.
        chainage: f64,
    },

    /// A cross-section chainage lies outside `[left, right]`.
    #[error("cross-section sample CH{index} ({chainage:.3}) lies outside [{left:.3}, {right:.3}]")]
    OutOfFrame {
        /// Sample number as used in the `CH<i>` key.
        index: usize,
        /// Offending chainage.
        chainage: f64,
        /// Left edge of the frame.
        left: f64,
        /// Right edge of the frame.
        right: f64,
    },

    /// No cross-section samples were supplied.
    #[error("cross-section has no samples")]
    EmptyCrossSection,

    /// The skew leaves a vanishing cosine.
    #[error("skew of {degrees}° is degenerate (cos = {cosine:.3e})")]
    DegenerateSkew {
        /// Skew as supplied, in degrees.
        degrees: f64,
        /// Its cosine.
        cosine: f64,
    },
}

/// Every error collected during one load.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterErrors(pub Vec<ParameterError>);

impl ParameterErrors {
    /// Number of collected errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the collected errors.
    pub fn iter(&self) -> impl Iterator<Item = &ParameterError> {
        self.0.iter()
    }
}

impl fmt::Display for ParameterErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} parameter error(s)", self.0.len())?;
        for err in &self.0 {
            write!(f, "\n  - {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParameterErrors {}

/// Non-fatal findings recorded while loading.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A key that no parameter reads.
    IgnoredKey(String),
    /// A key given more than once; the last value wins.
    DuplicateKey(String),
    /// Skew above the comfortable construction range.
    LargeSkew(f64),
    /// Carriageway narrower than a single traffic lane.
    NarrowCarriageway(f64),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::IgnoredKey(key) => write!(f, "ignored unknown key {key}"),
            Diagnostic::DuplicateKey(key) => write!(f, "key {key} given more than once"),
            Diagnostic::LargeSkew(deg) => {
                write!(f, "skew of {deg}° may complicate construction")
            }
            Diagnostic::NarrowCarriageway(w) => {
                write!(f, "carriageway width {w:.3} is narrower than 3.0")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_display_lists_all() {
        let errs = ParameterErrors(vec![
            ParameterError::MissingParameter("RTL".into()),
            ParameterError::NonMonotonic {
                index: 3,
                previous: 5.0,
                chainage: 3.0,
            },
        ]);
        let text = errs.to_string();
        assert!(text.starts_with("2 parameter error(s)"));
        assert!(text.contains("missing parameter RTL"));
        assert!(text.contains("CH3"));
    }
}
