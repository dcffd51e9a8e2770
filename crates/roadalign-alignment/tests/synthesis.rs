use approx::assert_abs_diff_eq;
use roadalign_alignment::{
    Alignment, AlignmentError, InputSystem, PiAlignmentSpec, PiSpec,
};
use roadalign_core::Point;
use roadalign_geometry::{ElementKind, Geometry, GeometryElement, Rotation};
use roadalign_parser::Value;

fn from_pis(pis: Vec<PiSpec>) -> Result<Alignment, AlignmentError> {
    Alignment::from_pis(PiAlignmentSpec {
        pis,
        ..PiAlignmentSpec::default()
    })
}

fn kinds(a: &Alignment) -> Vec<ElementKind> {
    a.elements().iter().map(Geometry::kind).collect()
}

fn assert_continuous(a: &Alignment) {
    for pair in a.elements().windows(2) {
        assert!(
            pair[0].end().distance_to(pair[1].start()) < 1e-6,
            "gap between {:?} and {:?}",
            pair[0].end(),
            pair[1].start()
        );
        let turn = (pair[1].dir_start() - pair[0].dir_end()).sin().abs();
        assert!(turn < 1e-6, "heading kink of {turn}");
    }
}

/// Third PI turning `deflection` from the +X leg through (400, 0).
fn third(deflection: f64) -> Point {
    Point::new(400.0, 0.0) + Point::from_heading(deflection) * 400.0
}

#[test]
fn straight_pis_give_one_line() {
    let a = from_pis(vec![
        PiSpec::new(Point::new(0.0, 0.0)),
        PiSpec::new(Point::new(100.0, 0.0)).with_curve(50.0),
        PiSpec::new(Point::new(200.0, 0.0)),
    ])
    .unwrap();
    assert_eq!(kinds(&a), vec![ElementKind::Line]);
    assert_abs_diff_eq!(a.length(), 200.0, epsilon = 1e-9);
    assert_eq!(a.align_pis().len(), 3);
    assert_abs_diff_eq!(a.align_pis()[1].station.unwrap(), 100.0, epsilon = 1e-9);
}

#[test]
fn simple_curve_uses_r_tan_half_delta() {
    let a = from_pis(vec![
        PiSpec::new(Point::new(0.0, 0.0)),
        PiSpec::new(Point::new(400.0, 0.0)).with_curve(300.0),
        PiSpec::new(third(0.7)),
    ])
    .unwrap();
    assert_eq!(
        kinds(&a),
        vec![ElementKind::Line, ElementKind::Curve, ElementKind::Line]
    );
    assert_continuous(&a);
    let t = 300.0 * 0.35f64.tan();
    assert_abs_diff_eq!(a.elements()[0].length(), 400.0 - t, epsilon = 1e-9);
    let GeometryElement::Curve(curve) = &a.elements()[1] else {
        panic!("expected a curve");
    };
    assert_abs_diff_eq!(curve.radius(), 300.0, epsilon = 1e-9);
    assert_abs_diff_eq!(curve.delta(), 0.7, epsilon = 1e-9);
    assert_eq!(curve.rotation(), Rotation::Ccw);
    assert!(a.end_point().distance_to(third(0.7)) < 1e-9);
}

#[test]
fn symmetric_spirals() {
    let a = from_pis(vec![
        PiSpec::new(Point::new(0.0, 0.0)),
        PiSpec::new(Point::new(400.0, 0.0))
            .with_curve(300.0)
            .with_spirals(60.0, 60.0),
        PiSpec::new(third(0.7)),
    ])
    .unwrap();
    assert_eq!(
        kinds(&a),
        vec![
            ElementKind::Line,
            ElementKind::Spiral,
            ElementKind::Curve,
            ElementKind::Spiral,
            ElementKind::Line
        ]
    );
    assert_continuous(&a);
    assert_abs_diff_eq!(a.elements()[0].length(), 260.318_999_695_972_25, epsilon = 1e-6);
    assert_abs_diff_eq!(a.elements()[4].length(), 260.318_999_695_972_25, epsilon = 1e-6);
    assert_abs_diff_eq!(a.elements()[1].dir_end(), 0.1, epsilon = 1e-9);
    assert_abs_diff_eq!(a.length(), 790.637_999_391_944_5, epsilon = 1e-6);
    assert!(a.end_point().distance_to(third(0.7)) < 1e-9);
}

#[test]
fn unequal_spirals_turning_right() {
    let end = Point::new(400.0, 0.0) + Point::from_heading(-0.7) * 400.0;
    let a = from_pis(vec![
        PiSpec::new(Point::new(0.0, 0.0)),
        PiSpec::new(Point::new(400.0, 0.0))
            .with_curve(300.0)
            .with_spirals(80.0, 40.0),
        PiSpec::new(end),
    ])
    .unwrap();
    assert_continuous(&a);
    assert_abs_diff_eq!(a.elements()[0].length(), 400.0 - 148.775_094_383_110_57, epsilon = 1e-6);
    assert_abs_diff_eq!(a.elements()[4].length(), 400.0 - 130.620_716_323_374_92, epsilon = 1e-6);
    let GeometryElement::Spiral(entry) = &a.elements()[1] else {
        panic!("expected a spiral");
    };
    assert_eq!(entry.rotation(), Rotation::Cw);
    assert_abs_diff_eq!(entry.dir_end(), -80.0 / 600.0, epsilon = 1e-9);
    let mid = a.sta_end() / 2.0;
    let p = a.get_point_at_station(mid).unwrap();
    let so = a.get_station_offset(p, InputSystem::Global).unwrap();
    assert_abs_diff_eq!(so.station, mid, epsilon = 1e-6);
}

#[test]
fn spirals_can_take_the_whole_deflection() {
    // 2 * 60 / (2 * 300) = 0.2 rad of spiral on a 0.2 rad deflection.
    let a = from_pis(vec![
        PiSpec::new(Point::new(0.0, 0.0)),
        PiSpec::new(Point::new(400.0, 0.0))
            .with_curve(300.0)
            .with_spirals(60.0, 60.0),
        PiSpec::new(third(0.2)),
    ])
    .unwrap();
    assert_eq!(
        kinds(&a),
        vec![
            ElementKind::Line,
            ElementKind::Spiral,
            ElementKind::Spiral,
            ElementKind::Line
        ]
    );
    assert_continuous(&a);
}

#[test]
fn spiral_longer_than_deflection_fails() {
    let err = from_pis(vec![
        PiSpec::new(Point::new(0.0, 0.0)),
        PiSpec::new(Point::new(400.0, 0.0))
            .with_curve(300.0)
            .with_spirals(100.0, 100.0),
        PiSpec::new(third(0.3)),
    ])
    .unwrap_err();
    assert!(matches!(err, AlignmentError::SpiralTooLong { index: 1, .. }));
}

#[test]
fn overlapping_tangents_fail() {
    let err = from_pis(vec![
        PiSpec::new(Point::new(0.0, 0.0)),
        PiSpec::new(Point::new(50.0, 0.0)).with_curve(300.0),
        PiSpec::new(Point::new(50.0, 0.0) + Point::from_heading(1.0) * 400.0),
    ])
    .unwrap_err();
    assert!(matches!(err, AlignmentError::TangentsOverlap { index: 1 }));
}

#[test]
fn angle_point_without_radius() {
    let a = from_pis(vec![
        PiSpec::new(Point::new(0.0, 0.0)),
        PiSpec::new(Point::new(100.0, 0.0)),
        PiSpec::new(Point::new(100.0, 100.0)),
    ])
    .unwrap();
    assert_eq!(kinds(&a), vec![ElementKind::Line, ElementKind::Line]);
    assert_abs_diff_eq!(a.length(), 200.0, epsilon = 1e-9);
}

#[test]
fn too_few_pis() {
    let err = from_pis(vec![PiSpec::new(Point::ORIGIN)]).unwrap_err();
    assert!(matches!(err, AlignmentError::TooFewPis { count: 1 }));
}

#[test]
fn pi_document() {
    let v = Value::from_json_value(&serde_json::json!({
        "name": "from pis",
        "staStart": 100,
        "PIs": [
            {"point": [0, 0], "desc": "BOP"},
            {"point": [400, 0], "radius": 300, "spiralIn": 60, "spiralOut": 60},
            {"point": [700, 300]}
        ]
    }));
    let a = Alignment::from_pis(PiAlignmentSpec::from_value(&v).unwrap()).unwrap();
    assert_eq!(a.name(), Some("from pis"));
    assert_eq!(a.element_count(), 5);
    assert_abs_diff_eq!(a.sta_start(), 100.0);
    assert_eq!(a.align_pis()[0].description.as_deref(), Some("BOP"));
    let rebuilt = Alignment::from_value(&a.to_value()).unwrap();
    assert_eq!(rebuilt.element_count(), 5);
    assert_abs_diff_eq!(rebuilt.sta_end(), a.sta_end(), epsilon = 1e-9);
}
