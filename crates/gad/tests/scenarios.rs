//! End-to-end drawings from literal parameter sets.

use std::path::Path;

use approx::assert_abs_diff_eq;
use gad::{draw, DrawingConfig, GadError, OutputFormat, ParameterError, ParameterSource, Session};
use gad_export::{DxfBackend, SvgBackend};
use gad_ir::{HAlign, Layer, Point2D, Primitive};
use gad_kernel_drafting::pier;

fn minimal_single_span() -> ParameterSource {
    let mut src: ParameterSource = [
        ("SCALE1", 100.0),
        ("SCALE2", 50.0),
        ("SKEW", 0.0),
        ("DATUM", 100.0),
        ("LEFT", 0.0),
        ("RIGHT", 20.0),
        ("TOPRL", 110.0),
        ("XINCR", 5.0),
        ("YINCR", 1.0),
        ("NSPAN", 1.0),
        ("SPAN1", 20.0),
        ("ABTL", 0.0),
        ("RTL", 105.0),
        ("SOFL", 103.0),
        ("CCBR", 7.5),
        ("KERBW", 0.3),
        ("KERBD", 0.2),
        ("PIERTW", 1.0),
        ("BATTR", 10.0),
        ("CAPT", 104.0),
        ("CAPB", 103.5),
        ("CAPW", 1.0),
        ("PIERST", 8.0),
        ("FUTRL", 95.0),
        ("FUTD", 1.0),
        ("FUTW", 3.0),
        ("FUTL", 6.0),
        ("DWTH", 0.3),
        ("ALCW", 1.0),
        ("ALCD", 1.0),
        ("ALFB", 10.0),
        ("ALFBL", 101.0),
        ("ALTB", 10.0),
        ("ALTBL", 100.5),
        ("ALFO", 0.5),
        ("ALFD", 1.0),
        ("ALBB", 8.0),
        ("ALBBL", 101.5),
        ("APTHK", 0.38),
        ("SLBTHT", 0.75),
    ]
    .into_iter()
    .collect();
    for (ch, rl) in [
        (0.0, 100.5),
        (5.0, 100.8),
        (10.0, 101.0),
        (15.0, 100.7),
        (20.0, 100.9),
    ] {
        src.push_sample(ch, rl);
    }
    src
}

fn three_span_skew() -> ParameterSource {
    let mut src = minimal_single_span();
    src.set("NSPAN", 3.0);
    src.set("SPAN1", 12.0);
    src.set("LBRIDGE", 36.0);
    src.set("SKEW", 15.0);
    src.set("RIGHT", 50.0);
    src
}

fn session(src: &ParameterSource) -> Session {
    Session::from_source(src, DrawingConfig::default()).unwrap()
}

/// Value texts beside the level axis.
fn level_labels(prims: &[Primitive]) -> Vec<&str> {
    prims
        .iter()
        .filter_map(|p| match p {
            Primitive::Text {
                content,
                layer: Layer::Grid,
                halign: HAlign::Right,
                ..
            } => Some(content.as_str()),
            _ => None,
        })
        .collect()
}

/// Support labels `A1`, `P1`, … in emission order.
fn support_labels(prims: &[Primitive], kind: char) -> Vec<&str> {
    prims
        .iter()
        .filter_map(|p| match p {
            Primitive::Text {
                content,
                layer: Layer::Annotations,
                ..
            } => Some(content.as_str()),
            _ => None,
        })
        .filter(|c| {
            c.strip_prefix(kind)
                .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
        })
        .collect()
}

/// Vertices of a closed polyline, without the closing repeat.
fn closed_points(p: &Primitive) -> Option<&[Point2D]> {
    match p {
        Primitive::Polyline {
            points,
            closed: true,
            ..
        } => Some(points),
        _ => None,
    }
}

/// Closed four-sided deck outlines inside the elevation.
fn deck_bays(session: &Session, prims: &[Primitive]) -> usize {
    let right = session.projection().hpos(session.params().frame().right);
    prims
        .iter()
        .filter(|p| p.layer() == Layer::Structure)
        .filter_map(closed_points)
        .filter(|pts| pts.len() == 4 && pts.iter().all(|q| q.x <= right))
        .count()
}

#[test]
fn test_minimal_single_span() {
    let session = session(&minimal_single_span());
    let prims = session.primitives().unwrap();

    assert_eq!(deck_bays(&session, &prims), 1);

    assert!(prims.iter().all(|p| p.layer() != Layer::Pier));
    assert!(support_labels(&prims, 'P').is_empty());

    let abutments = prims
        .iter()
        .filter(|p| p.layer() == Layer::Abutment)
        .filter_map(closed_points)
        .count();
    assert_eq!(abutments, 2);
    assert_eq!(support_labels(&prims, 'A'), ["A1", "A2"]);

    let profile: Vec<_> = prims
        .iter()
        .filter_map(|p| match p {
            Primitive::Polyline {
                points,
                closed: false,
                layer: Layer::CrossSection,
                ..
            } => Some(points),
            _ => None,
        })
        .collect();
    assert_eq!(profile.len(), 1);
    assert_eq!(profile[0].len() - 1, 4);

    // datum to TOPRL in steps of YINCR
    let levels = level_labels(&prims);
    assert_eq!(levels.len(), 11);
    assert_eq!(levels.first(), Some(&"100.000"));
    assert_eq!(levels.last(), Some(&"110.000"));
}

#[test]
fn test_three_span_skew() {
    let session = session(&three_span_skew());
    let prims = session.primitives().unwrap();

    assert_eq!(deck_bays(&session, &prims), 3);
    assert_eq!(support_labels(&prims, 'P'), ["P1", "P2"]);

    let sheet = session.sheet();
    for i in 1..=2 {
        let plan = pier::pier_plan(&sheet, i).unwrap();
        let quad = plan
            .iter()
            .filter(|p| p.layer() == Layer::Foundation)
            .find_map(closed_points)
            .unwrap();
        assert_eq!(quad.len(), 4);
        for k in 0..4 {
            let (a, b) = (quad[k], quad[(k + 1) % 4]);
            let angle = (b.y - a.y).atan2(b.x - a.x).to_degrees().rem_euclid(90.0);
            assert!(
                (b.y - a.y).abs() > 1e-6,
                "pier P{i} edge {k} is parallel to the x-axis"
            );
            assert_abs_diff_eq!(angle.min(90.0 - angle), 15.0, epsilon = 1e-6);
        }
    }
}

#[test]
fn test_level_ticks_at_yincr_two() {
    let mut src = minimal_single_span();
    src.set("YINCR", 2.0);
    let prims = session(&src).primitives().unwrap();
    assert_eq!(
        level_labels(&prims),
        ["100.000", "102.000", "104.000", "106.000", "108.000", "110.000"]
    );
    let ticks = prims
        .iter()
        .filter(|p| match p {
            Primitive::Line { start, end, layer: Layer::Grid, .. } => {
                start.y == end.y && (end.x - start.x - 500.0).abs() < 1e-9
            }
            _ => false,
        })
        .count();
    assert_eq!(ticks, 6);
}

#[test]
fn test_right_angle_skew_rejected_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut src = minimal_single_span();
    src.set("SKEW", 90.0);

    let err = Session::from_source(&src, DrawingConfig::default())
        .and_then(|s| s.generate(OutputFormat::Both, &dir.path().join("bridge")))
        .unwrap_err();
    match err {
        GadError::Parameters(errors) => {
            assert_eq!(errors.len(), 1);
            assert!(matches!(errors.0[0], ParameterError::DegenerateSkew { .. }));
        }
        other => panic!("expected parameter errors, got {other}"),
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_non_monotonic_cross_section_names_index() {
    let mut src = minimal_single_span();
    for i in 1..=5 {
        src.remove(format!("CH{i}"));
        src.remove(format!("RL{i}"));
    }
    for (ch, rl) in [(0.0, 100.0), (5.0, 100.5), (3.0, 100.2), (10.0, 100.1)] {
        src.push_sample(ch, rl);
    }
    let err = Session::from_source(&src, DrawingConfig::default()).unwrap_err();
    let GadError::Parameters(errors) = err else {
        panic!("expected parameter errors");
    };
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors.0[0],
        ParameterError::NonMonotonic { index: 3, .. }
    ));
    assert!(errors.to_string().contains("CH3"));
}

/// Straight segments of every model-space LINE and LWPOLYLINE in a DXF
/// file, in paper coordinates (y down).
fn dxf_segments(path: &Path) -> Vec<(Point2D, Point2D)> {
    let drawing = dxf::Drawing::load_file(path).unwrap();
    let paper = |x: f64, y: f64| Point2D::new(x, -y);
    let mut out = Vec::new();
    for e in drawing.entities() {
        match &e.specific {
            dxf::entities::EntityType::Line(line) => {
                out.push((paper(line.p1.x, line.p1.y), paper(line.p2.x, line.p2.y)))
            }
            dxf::entities::EntityType::LwPolyline(pl) => {
                let pts: Vec<Point2D> = pl.vertices.iter().map(|v| paper(v.x, v.y)).collect();
                for w in pts.windows(2) {
                    out.push((w[0], w[1]));
                }
                if pl.is_closed() && pts.len() > 2 {
                    out.push((pts[pts.len() - 1], pts[0]));
                }
            }
            _ => {}
        }
    }
    out
}

#[test]
fn test_cad_and_page_agree() {
    let dir = tempfile::tempdir().unwrap();
    let session = session(&minimal_single_span());

    let dxf_path = dir.path().join("bridge.dxf");
    draw(&session, &mut DxfBackend::new(), &dxf_path).unwrap();
    let mut cad = dxf_segments(&dxf_path);

    let mut svg = SvgBackend::new();
    draw(&session, &mut svg, &dir.path().join("bridge.svg")).unwrap();
    let frame = svg.frame().unwrap();
    let page: Vec<(Point2D, Point2D)> = svg
        .strokes()
        .unwrap()
        .into_iter()
        .filter(|s| !s.from_dimension)
        .map(|s| (frame.to_paper(s.start), frame.to_paper(s.end)))
        .collect();

    assert_eq!(cad.len(), page.len());
    let close = |a: Point2D, b: Point2D| (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3;
    for (a, b) in page {
        let hit = cad
            .iter()
            .position(|&(c, d)| (close(a, c) && close(b, d)) || (close(a, d) && close(b, c)));
        let Some(k) = hit else {
            panic!("page segment {a:?} -> {b:?} has no CAD counterpart");
        };
        cad.swap_remove(k);
    }
    assert!(cad.is_empty());
}

#[test]
fn test_cad_output_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let session = session(&three_span_skew());
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    session.generate(OutputFormat::Cad, &a).unwrap();
    session.generate(OutputFormat::Cad, &b).unwrap();
    let a = std::fs::read(a.with_extension("dxf")).unwrap();
    let b = std::fs::read(b.with_extension("dxf")).unwrap();
    assert!(!a.is_empty());
    assert_eq!(a, b);
}

#[test]
fn test_every_primitive_on_a_registered_layer() {
    for src in [minimal_single_span(), three_span_skew()] {
        let session = session(&src);
        let registry = session.registry();
        for p in session.primitives().unwrap() {
            assert!(registry.contains(p.layer()));
            assert_ne!(p.layer().name(), "0");
            if let Some(pts) = closed_points(&p) {
                assert!(pts.len() >= 3);
                for (k, a) in pts.iter().enumerate() {
                    assert!(pts[k + 1..].iter().all(|b| !a.coincides(b)));
                }
            }
        }
    }
}

#[test]
fn test_square_bridge_has_no_oblique_quadrilaterals() {
    let prims = session(&minimal_single_span()).primitives().unwrap();
    for ring in prims.iter().filter_map(closed_points) {
        if ring.len() != 4 {
            continue;
        }
        for k in 0..4 {
            let (a, b) = (ring[k], ring[(k + 1) % 4]);
            assert!(
                (a.x - b.x).abs() < 1e-9 || (a.y - b.y).abs() < 1e-9,
                "edge {a:?} -> {b:?} is oblique"
            );
        }
    }
}

#[test]
fn test_abutments_mirror_about_bridge_centre() {
    let session = session(&minimal_single_span());
    let prims = session.primitives().unwrap();
    let rings: Vec<&[Point2D]> = prims
        .iter()
        .filter(|p| p.layer() == Layer::Abutment)
        .filter_map(closed_points)
        .collect();
    assert_eq!(rings.len(), 2);

    let proj = session.projection();
    let axis = proj.hpos(10.0);
    for (l, r) in rings[0].iter().zip(rings[1]) {
        assert_abs_diff_eq!(l.x, 2.0 * axis - r.x, epsilon = 1e-6);
        assert_abs_diff_eq!(l.y, r.y, epsilon = 1e-6);
    }
}

#[test]
fn test_sheet_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bridge.csv");
    let mut text = String::from("Parameter, Value\n");
    for (k, v) in minimal_single_span().entries() {
        text.push_str(&format!("{k}, {v}\n"));
    }
    std::fs::write(&input, text).unwrap();

    let session = Session::load(&input, DrawingConfig::default()).unwrap();
    let out = dir.path().join("out").join("bridge");
    std::fs::create_dir_all(out.parent().unwrap()).unwrap();
    let written = session.generate(OutputFormat::Page, &out).unwrap();
    let svg = std::fs::read_to_string(&written[0]).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("ELEVATION"));
    assert!(Path::new(&written[0]).extension().is_some_and(|e| e == "svg"));
}
