use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, SQRT_2};

use approx::assert_abs_diff_eq;
use roadalign_alignment::{
    Alignment, AlignmentError, InputSystem, StationIncrements,
};
use roadalign_core::{Point, SystemType};
use roadalign_geometry::{ElementKind, Geometry, Side};
use roadalign_parser::Value;

fn doc(j: serde_json::Value) -> Value {
    Value::from_json_value(&j)
}

fn simple_curve() -> Alignment {
    Alignment::from_value(&doc(serde_json::json!({
        "name": "simple",
        "staStart": 0,
        "CoordGeom": [
            {"Type": "Line", "Start": [0, 0], "End": [100, 0]},
            {"Type": "Curve", "rot": "ccw", "Start": [100, 0], "Center": [100, 50], "End": [150, 50]}
        ]
    })))
    .unwrap()
}

#[test]
fn simple_curve_midpoint() {
    let a = simple_curve();
    let arc_length = 50.0 * FRAC_PI_2;
    assert_abs_diff_eq!(a.length(), 100.0 + arc_length, epsilon = 1e-9);
    assert_abs_diff_eq!(a.sta_end(), 100.0 + arc_length, epsilon = 1e-9);

    let mid = a.get_point_at_station(100.0 + arc_length / 2.0).unwrap();
    assert_abs_diff_eq!(mid.x, 100.0 + 50.0 * FRAC_PI_4.cos(), epsilon = 1e-9);
    assert_abs_diff_eq!(mid.y, 50.0 - 50.0 * FRAC_PI_4.sin(), epsilon = 1e-9);

    let (_, left) = a
        .get_orthogonal_at_station(100.0 + arc_length / 2.0, Side::Left)
        .unwrap();
    assert_abs_diff_eq!(left.heading(), FRAC_PI_4 + FRAC_PI_2, epsilon = 1e-9);

    let start = a.get_point_at_station(100.0).unwrap();
    let end = a.get_point_at_station(a.sta_end()).unwrap();
    assert_abs_diff_eq!(start.distance_to(end), 50.0 * SQRT_2, epsilon = 1e-9);
    assert_abs_diff_eq!(mid.distance_to(start), mid.distance_to(end), epsilon = 1e-9);
}

#[test]
fn simple_curve_round_trips_station_offset() {
    let a = simple_curve();
    for station in [10.0, 99.0, 120.0, 170.0] {
        for (side, sign) in [(Side::Left, -1.0), (Side::Right, 1.0)] {
            let (p, n) = a.get_orthogonal_at_station(station, side).unwrap();
            let q = p + n * 4.0;
            let so = a.get_station_offset(q, InputSystem::Current).unwrap();
            assert_abs_diff_eq!(so.station, station, epsilon = 1e-7);
            assert_abs_diff_eq!(so.offset, sign * 4.0, epsilon = 1e-7);
        }
    }
}

#[test]
fn station_equation_leaves_a_gap() {
    let a = Alignment::from_value(&doc(serde_json::json!({
        "StaEquation": [{"staBack": 500, "staAhead": 600}],
        "CoordGeom": [{"Type": "Line", "Start": [0, 0], "End": [1000, 0]}]
    })))
    .unwrap();
    assert_abs_diff_eq!(a.station_to_internal(600.0), a.station_to_internal(500.0));
    assert_abs_diff_eq!(a.sta_end(), 1100.0);

    let before = a.get_point_at_station(599.999).unwrap();
    let after = a.get_point_at_station(600.0).unwrap();
    assert_abs_diff_eq!(before.x, 599.999, epsilon = 1e-9);
    assert_abs_diff_eq!(after.x, 500.0, epsilon = 1e-9);
    assert!(before.distance_to(after) > 99.0);

    let so = a
        .get_station_offset(Point::new(700.0, 0.0), InputSystem::Global)
        .unwrap();
    assert_abs_diff_eq!(so.station, 800.0, epsilon = 1e-9);

    let stations = a
        .generate_stations(Some((450.0, 650.0)), StationIncrements::uniform(50.0), true)
        .unwrap();
    assert_eq!(stations, vec![450.0, 500.0, 600.0, 650.0]);

    let walked: Vec<f64> = a
        .generate_points(250.0)
        .unwrap()
        .iter()
        .map(|p| p.station)
        .collect();
    assert_eq!(walked, vec![0.0, 250.0, 500.0, 750.0, 1000.0, 1100.0]);
}

#[test]
fn generated_stations_follow_element_increments() {
    let a = simple_curve();
    let increments = StationIncrements {
        line: 50.0,
        curve: 20.0,
        spiral: 10.0,
    };
    let with = a.generate_stations(None, increments, true).unwrap();
    let end = a.sta_end();
    let expected = [0.0, 50.0, 100.0, 120.0, 140.0, 160.0, end];
    assert_eq!(with.len(), expected.len());
    for (got, want) in with.iter().zip(expected) {
        assert_abs_diff_eq!(*got, want, epsilon = 1e-9);
    }

    let without = a
        .generate_stations(Some((10.0, 130.0)), increments, false)
        .unwrap();
    assert_eq!(without, vec![10.0, 50.0, 100.0, 120.0, 130.0]);
}

#[test]
fn spiral_alignment_from_document() {
    let a = Alignment::from_document_str(
        r"
name: transition
staStart: 1000
CoordGeom:
  - Type: Line
    Start: [0, 0]
    End: [100, 0]
  - Type: Spiral
    rot: ccw
    length: 50
    radiusStart: INF
    radiusEnd: 200
    Start: [100, 0]
    End: [149.92193149366025, 2.0810093401773626]
    PI: [120, 0]
",
    )
    .unwrap();
    assert_eq!(a.element_count(), 2);
    assert_eq!(a.elements()[1].kind(), ElementKind::Spiral);
    assert_abs_diff_eq!(a.sta_end(), 1150.0, epsilon = 1e-9);
    let end = a.get_point_at_station(1150.0).unwrap();
    assert_abs_diff_eq!(end.x, 149.92193149366025, epsilon = 1e-6);
    assert_abs_diff_eq!(end.y, 2.0810093401773626, epsilon = 1e-6);
}

#[test]
fn discontinuous_document_is_rejected() {
    let err = Alignment::from_value(&doc(serde_json::json!({
        "CoordGeom": [
            {"Type": "Line", "Start": [0, 0], "End": [100, 0]},
            {"Type": "Line", "Start": [100, 5], "End": [200, 5]}
        ]
    })))
    .unwrap_err();
    assert!(matches!(
        err,
        AlignmentError::DiscontinuousAlignment { index: 0, .. }
    ));
}

#[test]
fn element_errors_carry_their_index() {
    let err = Alignment::from_value(&doc(serde_json::json!({
        "CoordGeom": [
            {"Type": "Line", "Start": [0, 0], "End": [100, 0]},
            {"Type": "Spiral", "Start": [100, 0], "End": [150, 2]}
        ]
    })))
    .unwrap_err();
    assert!(matches!(err, AlignmentError::Element { index: 1, .. }));
}

#[test]
fn document_round_trip() {
    let mut a = Alignment::from_value(&doc(serde_json::json!({
        "name": "round trip",
        "desc": "two pieces",
        "staStart": 250,
        "StaEquation": [{"staBack": 300, "staAhead": 320, "desc": "eq"}],
        "AlignPIs": [{"point": [0, 0]}, {"point": [100, 0]}],
        "coordinateSystem": {"system_type": "custom", "origin": [10, 0], "rotation": 0.5, "swap": true},
        "CoordGeom": [
            {"Type": "Line", "Start": [0, 0], "End": [100, 0]},
            {"Type": "Curve", "rot": "ccw", "Start": [100, 0], "Center": [100, 50], "End": [150, 50]}
        ]
    })))
    .unwrap();
    let written = a.to_value();
    assert_eq!(written.get("staEnd").and_then(Value::as_f64), Some(a.sta_end()));
    assert_eq!(written.get("elementCount").and_then(Value::as_f64), Some(2.0));

    let again = Alignment::from_value(&written).unwrap();
    assert_eq!(again, a);

    a.set_coordinate_system(SystemType::Global, None, None).unwrap();
    assert!(a.coordinate_system().swap);
    assert_eq!(a.start_point(), Point::new(0.0, 0.0));
}

#[test]
fn custom_system_transforms_query_results() {
    let mut a = simple_curve();
    a.set_coordinate_system(SystemType::Custom, Some(Point::new(100.0, 0.0)), Some(FRAC_PI_2))
        .unwrap();
    let end = a.end_point();
    assert_abs_diff_eq!(end.x, 50.0, epsilon = 1e-9);
    assert_abs_diff_eq!(end.y, -50.0, epsilon = 1e-9);
    let pis = a.align_pis();
    assert!(pis.is_empty());

    let so = a
        .get_station_offset(Point::new(0.0, 50.0), InputSystem::Current)
        .unwrap();
    assert_abs_diff_eq!(so.station, 50.0, epsilon = 1e-9);
    assert_eq!(so.offset, 0.0);
}
