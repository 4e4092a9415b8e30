#![warn(missing_docs)]

//! Bridge design parameters.
//!
//! [`load`] turns an ordered key/value [`ParameterSource`] into a frozen
//! [`BridgeParameters`] record with all derived values computed. Every
//! validation failure is collected and reported together.
//!
//! # Example
//!
//! ```ignore
//! use gad_params::{load, sample_source};
//!
//! let params = load(&sample_source())?;
//! println!("{} spans of {} m", params.spans().nspan, params.spans().span1);
//! ```

pub mod error;
pub mod model;
pub mod source;

pub use error::{Diagnostic, ParameterError, ParameterErrors};
pub use model::{
    AbutmentParams, BridgeParameters, CrossSectionSample, DeckParams, Derived, Frame, Levels,
    PierParams, Side, Spans,
};
pub use source::ParameterSource;

use std::collections::{BTreeMap, HashMap, HashSet};

use gad_kernel_math::Skew;
use source::{sample_key, SampleKey};

/// Skews above this many degrees are flagged in the diagnostics.
pub const LARGE_SKEW_DEGREES: f64 = 20.0;

/// Carriageways narrower than this are flagged in the diagnostics.
pub const MIN_CARRIAGEWAY: f64 = 3.0;

/// Keys for one abutment, in the order of [`AbutmentParams`] after `dwth`.
const LEFT_ABUTMENT_KEYS: [&str; 10] = [
    "ALCW", "ALCD", "ALFB", "ALFBL", "ALTB", "ALTBL", "ALFO", "ALFD", "ALBB", "ALBBL",
];
const RIGHT_ABUTMENT_KEYS: [&str; 10] = [
    "ARCW", "ARCD", "ARFB", "ARFBL", "ARTB", "ARTBL", "ARFO", "ARFD", "ARBB", "ARBBL",
];

/// Load and validate parameters.
pub fn load(source: &ParameterSource) -> Result<BridgeParameters, ParameterErrors> {
    let mut r = Reader::new(source);

    let frame = Frame {
        scale1: r.required("SCALE1"),
        scale2: r.required("SCALE2"),
        datum: r.required("DATUM"),
        left: r.required("LEFT"),
        right: r.required("RIGHT"),
        toprl: r.required("TOPRL"),
        xincr: r.required("XINCR"),
        yincr: r.required("YINCR"),
    };
    let skew_degrees = r.required("SKEW");
    let nspan = r.count("NSPAN", true);
    let span1 = r.required("SPAN1");
    let lbridge = r
        .optional("LBRIDGE")
        .unwrap_or_else(|| nspan.map_or(f64::NAN, |n| n as f64 * span1));
    let spans = Spans {
        nspan: nspan.unwrap_or(0),
        span1,
        lbridge,
        abtl: r.required("ABTL"),
        laslab: r.optional("LASLAB").unwrap_or(0.0),
    };
    let levels = Levels {
        rtl: r.required("RTL"),
        sofl: r.required("SOFL"),
        capt: r.required("CAPT"),
        capb: r.required("CAPB"),
        futrl: r.required("FUTRL"),
    };
    let pier = PierParams {
        capw: r.required("CAPW"),
        piertw: r.required("PIERTW"),
        battr: r.required("BATTR"),
        pierst: r.required("PIERST"),
        futd: r.required("FUTD"),
        futw: r.required("FUTW"),
        futl: r.required("FUTL"),
    };
    let slbtht = r.required("SLBTHT");
    let deck = DeckParams {
        ccbr: r.required("CCBR"),
        kerbw: r.required("KERBW"),
        kerbd: r.required("KERBD"),
        slbthc: r.optional("SLBTHC").unwrap_or(slbtht),
        slbthe: r.optional("SLBTHE").unwrap_or(slbtht),
        slbtht,
        apthk: r.required("APTHK"),
        wcth: r.optional("WCTH").unwrap_or(0.0),
    };
    let dwth = r.required("DWTH");
    let left_values = LEFT_ABUTMENT_KEYS.map(|k| r.required(k));
    let right_values = {
        let mut values = left_values;
        for (value, key) in values.iter_mut().zip(RIGHT_ABUTMENT_KEYS) {
            if let Some(v) = r.optional(key) {
                *value = v;
            }
        }
        values
    };
    let left_abutment = abutment_from(dwth, left_values);
    let right_abutment = abutment_from(dwth, right_values);
    let noch = r.count("NOCH", false);
    let cross_section = r.samples();

    // Range checks. Missing values are NaN and skipped.
    r.positive("SCALE1", frame.scale1);
    r.positive("SCALE2", frame.scale2);
    r.positive("XINCR", frame.xincr);
    r.positive("YINCR", frame.yincr);
    r.positive("SPAN1", spans.span1);
    r.positive("BATTR", pier.battr);
    r.positive("LBRIDGE", spans.lbridge);
    r.non_negative("LASLAB", spans.laslab);
    r.non_negative("WCTH", deck.wcth);
    r.non_negative("CCBR", deck.ccbr);
    r.non_negative("KERBW", deck.kerbw);
    for (keys, ab) in [
        (&LEFT_ABUTMENT_KEYS, &left_abutment),
        (&RIGHT_ABUTMENT_KEYS, &right_abutment),
    ] {
        r.positive(keys[2], ab.front_batter);
        r.positive(keys[4], ab.toe_batter);
        r.positive(keys[8], ab.back_batter);
    }
    r.ordered("RIGHT", frame.right, ">", "LEFT", frame.left, |a, b| a > b);
    r.ordered("TOPRL", frame.toprl, ">=", "DATUM", frame.datum, |a, b| a >= b);
    r.ordered("CAPT", levels.capt, ">=", "CAPB", levels.capb, |a, b| a >= b);
    r.ordered("FUTRL", levels.futrl, "<=", "CAPB", levels.capb, |a, b| a <= b);
    if nspan == Some(0) {
        r.invalid("NSPAN", "must be at least 1".into());
    }
    if let Some(noch) = noch {
        if noch != cross_section.len() {
            r.invalid(
                "NOCH",
                format!(
                    "declares {noch} samples but {} were given",
                    cross_section.len()
                ),
            );
        }
    }

    let skew = Skew::from_degrees(skew_degrees);
    if skew_degrees.is_finite() && skew.is_degenerate() {
        r.errors.push(ParameterError::DegenerateSkew {
            degrees: skew_degrees,
            cosine: skew.c,
        });
    }

    r.check_cross_section(&cross_section, frame.left, frame.right);

    if skew_degrees.abs() > LARGE_SKEW_DEGREES {
        r.diagnostics.push(Diagnostic::LargeSkew(skew_degrees));
    }
    if deck.ccbr.is_finite() && deck.ccbr < MIN_CARRIAGEWAY {
        r.diagnostics.push(Diagnostic::NarrowCarriageway(deck.ccbr));
    }
    r.record_ignored();

    if !r.errors.is_empty() {
        tracing::warn!("parameter validation failed with {} error(s)", r.errors.len());
        return Err(ParameterErrors(r.errors));
    }

    let derived = derive(&frame, &spans, &levels, &pier, &deck, &skew);
    for d in &r.diagnostics {
        tracing::warn!("{d}");
    }
    tracing::debug!(
        nspan = spans.nspan,
        span1 = spans.span1,
        skew = skew_degrees,
        samples = cross_section.len(),
        "loaded bridge parameters"
    );

    Ok(BridgeParameters {
        frame,
        spans,
        levels,
        pier,
        left_abutment,
        right_abutment,
        deck,
        skew_degrees,
        skew,
        cross_section,
        derived,
        diagnostics: r.diagnostics,
    })
}

fn abutment_from(dwth: f64, v: [f64; 10]) -> AbutmentParams {
    AbutmentParams {
        dwth,
        cap_width: v[0],
        cap_depth: v[1],
        front_batter: v[2],
        front_batter_level: v[3],
        toe_batter: v[4],
        toe_batter_level: v[5],
        front_offset: v[6],
        footing_depth: v[7],
        back_batter: v[8],
        back_batter_level: v[9],
    }
}

fn derive(
    frame: &Frame,
    spans: &Spans,
    levels: &Levels,
    pier: &PierParams,
    deck: &DeckParams,
    skew: &Skew,
) -> Derived {
    let ccbrsq = skew.across(deck.ccbr);
    let kerbwsq = skew.across(deck.kerbw);
    Derived {
        sc: frame.scale1 / frame.scale2,
        spane: spans.abtl + spans.span1,
        ccbrsq,
        kerbwsq,
        abtlen: ccbrsq + 2.0 * kerbwsq,
        capwsq: skew.across(pier.capw),
        piertwsq: skew.across(pier.piertw),
        pierstsq: skew.pier_length(pier.pierst, pier.piertw),
        ofset: (levels.capb - (levels.futrl + pier.futd)) / pier.battr,
    }
}

/// Reads keys out of a source while collecting errors and noting usage.
struct Reader {
    values: HashMap<String, f64>,
    order: Vec<String>,
    used: HashSet<String>,
    errors: Vec<ParameterError>,
    diagnostics: Vec<Diagnostic>,
}

impl Reader {
    fn new(source: &ParameterSource) -> Self {
        let mut values = HashMap::new();
        let mut order = Vec::new();
        let mut errors = Vec::new();
        let mut diagnostics = Vec::new();
        for (key, value) in source.entries() {
            if !value.is_finite() {
                errors.push(ParameterError::InvalidRange {
                    name: key.clone(),
                    reason: "must be a finite number".into(),
                });
            }
            if values.insert(key.clone(), *value).is_some() {
                diagnostics.push(Diagnostic::DuplicateKey(key.clone()));
            } else {
                order.push(key.clone());
            }
        }
        Self {
            values,
            order,
            used: HashSet::new(),
            errors,
            diagnostics,
        }
    }

    fn optional(&mut self, key: &str) -> Option<f64> {
        self.used.insert(key.to_string());
        self.values.get(key).copied().filter(|v| v.is_finite())
    }

    fn required(&mut self, key: &str) -> f64 {
        self.used.insert(key.to_string());
        match self.values.get(key) {
            Some(v) if v.is_finite() => *v,
            Some(_) => f64::NAN,
            None => {
                self.errors
                    .push(ParameterError::MissingParameter(key.to_string()));
                f64::NAN
            }
        }
    }

    /// A whole-number key. An absent optional key is `None` without error.
    fn count(&mut self, key: &str, required: bool) -> Option<usize> {
        let value = if required {
            Some(self.required(key)).filter(|v| !v.is_nan())
        } else {
            self.optional(key)
        };
        let value = value?;
        if value.fract() != 0.0 || value < 0.0 {
            self.errors.push(ParameterError::NotAnInteger {
                name: key.to_string(),
                value,
            });
            return None;
        }
        Some(value as usize)
    }

    fn samples(&mut self) -> Vec<CrossSectionSample> {
        let mut chainages: BTreeMap<usize, (&str, f64)> = BTreeMap::new();
        let mut levels: BTreeMap<usize, (&str, f64)> = BTreeMap::new();
        let mut errors = Vec::new();
        let mut used = Vec::new();
        for key in &self.order {
            let Some((kind, n)) = sample_key(key) else {
                continue;
            };
            used.push(key.clone());
            let value = self.values[key];
            let slot = match kind {
                SampleKey::Chainage => &mut chainages,
                SampleKey::Level => &mut levels,
            };
            match slot.get(&n) {
                Some(&(previous, _)) => errors.push(ParameterError::DuplicateSample {
                    name: key.clone(),
                    previous: previous.to_string(),
                }),
                None => {
                    slot.insert(n, (key, value));
                }
            }
        }

        // Sample numbers are bounded by how many samples were given, so a
        // stray large index never drives the loop below.
        let count = chainages.len().max(levels.len());
        for map in [&mut chainages, &mut levels] {
            map.retain(|&n, &mut (key, _)| {
                let reason = if n == 0 {
                    "sample numbers start at 1".to_string()
                } else if n > count {
                    format!("sample number exceeds the {count} sample(s) given")
                } else {
                    return true;
                };
                errors.push(ParameterError::InvalidRange {
                    name: key.to_string(),
                    reason,
                });
                false
            });
        }

        let last = chainages
            .keys()
            .chain(levels.keys())
            .copied()
            .max()
            .unwrap_or(0);
        let mut samples = Vec::with_capacity(last);
        for n in 1..=last {
            match (chainages.get(&n), levels.get(&n)) {
                (Some(&(_, chainage)), Some(&(_, level))) => {
                    samples.push(CrossSectionSample { chainage, level })
                }
                (ch, rl) => {
                    if ch.is_none() {
                        errors.push(ParameterError::MissingParameter(format!("CH{n}")));
                    }
                    if rl.is_none() {
                        errors.push(ParameterError::MissingParameter(format!("RL{n}")));
                    }
                }
            }
        }
        self.errors.extend(errors);
        self.used.extend(used);
        samples
    }

    fn check_cross_section(&mut self, samples: &[CrossSectionSample], left: f64, right: f64) {
        if samples.is_empty() {
            if !self.errors.iter().any(|e| {
                matches!(e, ParameterError::MissingParameter(k) if sample_key(k).is_some())
            }) {
                self.errors.push(ParameterError::EmptyCrossSection);
            }
            return;
        }
        for (i, pair) in samples.windows(2).enumerate() {
            if pair[1].chainage <= pair[0].chainage {
                self.errors.push(ParameterError::NonMonotonic {
                    index: i + 2,
                    previous: pair[0].chainage,
                    chainage: pair[1].chainage,
                });
            }
        }
        if left.is_finite() && right.is_finite() {
            for (i, s) in samples.iter().enumerate() {
                if s.chainage < left || s.chainage > right {
                    self.errors.push(ParameterError::OutOfFrame {
                        index: i + 1,
                        chainage: s.chainage,
                        left,
                        right,
                    });
                }
            }
        }
    }

    fn invalid(&mut self, name: &str, reason: String) {
        self.errors.push(ParameterError::InvalidRange {
            name: name.to_string(),
            reason,
        });
    }

    fn positive(&mut self, name: &str, value: f64) {
        if !value.is_nan() && value <= 0.0 {
            self.invalid(name, format!("must be positive, got {value}"));
        }
    }

    fn non_negative(&mut self, name: &str, value: f64) {
        if !value.is_nan() && value < 0.0 {
            self.invalid(name, format!("must not be negative, got {value}"));
        }
    }

    fn ordered(
        &mut self,
        name: &str,
        value: f64,
        relation: &str,
        other_name: &str,
        other: f64,
        holds: impl Fn(f64, f64) -> bool,
    ) {
        if !value.is_nan() && !other.is_nan() && !holds(value, other) {
            self.invalid(
                name,
                format!("must be {relation} {other_name} ({other}), got {value}"),
            );
        }
    }

    fn record_ignored(&mut self) {
        for key in &self.order {
            if !self.used.contains(key) {
                tracing::debug!("ignoring unknown parameter {key}");
                self.diagnostics.push(Diagnostic::IgnoredKey(key.clone()));
            }
        }
    }
}

/// A complete three-span, 15° skew example bridge.
pub fn sample_source() -> ParameterSource {
    let mut source: ParameterSource = [
        ("SCALE1", 100.0),
        ("SCALE2", 50.0),
        ("SKEW", 15.0),
        ("DATUM", 100.0),
        ("TOPRL", 110.0),
        ("LEFT", 0.0),
        ("RIGHT", 50.0),
        ("XINCR", 5.0),
        ("YINCR", 1.0),
        ("NSPAN", 3.0),
        ("LBRIDGE", 45.0),
        ("ABTL", 0.0),
        ("RTL", 105.0),
        ("SOFL", 104.0),
        ("KERBW", 0.5),
        ("KERBD", 0.3),
        ("CCBR", 7.5),
        ("SLBTHC", 0.9),
        ("SLBTHE", 0.75),
        ("SLBTHT", 0.75),
        ("CAPT", 104.0),
        ("CAPB", 103.5),
        ("CAPW", 1.5),
        ("PIERTW", 1.2),
        ("BATTR", 10.0),
        ("PIERST", 10.0),
        ("SPAN1", 15.0),
        ("FUTRL", 95.0),
        ("FUTD", 1.0),
        ("FUTW", 3.0),
        ("FUTL", 12.0),
        ("DWTH", 0.3),
        ("ALCW", 1.0),
        ("ALCD", 1.0),
        ("ALFB", 10.0),
        ("ALFBL", 101.0),
        ("ALTB", 10.0),
        ("ALTBL", 100.5),
        ("ALFO", 0.5),
        ("ALFD", 1.0),
        ("ALBB", 3.0),
        ("ALBBL", 101.0),
        ("APTHK", 0.38),
        ("LASLAB", 3.5),
        ("WCTH", 0.08),
    ]
    .into_iter()
    .collect();
    for (ch, rl) in [
        (0.0, 100.5),
        (5.0, 100.2),
        (10.0, 99.8),
        (15.0, 99.1),
        (20.0, 98.6),
        (25.0, 98.4),
        (30.0, 98.9),
        (37.5, 99.6),
        (45.0, 100.3),
        (50.0, 100.6),
    ] {
        source.push_sample(ch, rl);
    }
    source
}
