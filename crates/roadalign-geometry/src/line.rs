use roadalign_core::{normalize_signed_angle, Point, CONTINUITY_TOLERANCE};
use roadalign_parser::{Fields, Value};
use tracing::warn;

use crate::error::GeometryError;
use crate::types::{check_distance, ElementKind, Header};
use crate::Geometry;

const ELEMENT: &str = "Line";

/// Raw line attributes as read from a document.
#[derive(Debug, Clone, Default)]
pub struct LineSpec {
    pub header: Header,
    pub start: Option<Point>,
    pub end: Option<Point>,
    pub dir: Option<f64>,
    pub length: Option<f64>,
}

impl LineSpec {
    pub fn from_value(value: &Value) -> Result<Self, GeometryError> {
        let f = Fields::new(value, ELEMENT)?;
        Ok(Self {
            header: Header::read(&f)?,
            start: f.point("Start")?,
            end: f.point("End")?,
            dir: f.number("dir")?,
            length: f.number("length")?,
        })
    }

    /// Resolve the line. `End` may be replaced by `dir` + `length`.
    pub fn build(self) -> Result<Line, GeometryError> {
        let start = self.start.ok_or(GeometryError::MissingRequiredField {
            element: ELEMENT,
            field: "Start",
        })?;
        let end = match (self.end, self.dir, self.length) {
            (Some(end), _, _) => end,
            (None, Some(dir), Some(length)) => start + Point::from_heading(dir) * length,
            _ => {
                return Err(GeometryError::MissingRequiredField {
                    element: ELEMENT,
                    field: "End",
                })
            }
        };
        let delta = end - start;
        let distance = delta.length();
        if distance <= 0.0 {
            return Err(GeometryError::InvalidField {
                element: ELEMENT,
                field: "length",
                message: "Start and End coincide".into(),
            });
        }
        let direction = delta.heading();
        if let Some(dir) = self.dir {
            if normalize_signed_angle(dir - direction).abs() > 1e-6 {
                warn!(dir, direction, "line dir disagrees with Start and End");
            }
        }

        let length = match self.length {
            Some(length) if length.is_finite() && length > 0.0 => {
                if (length - distance).abs() > CONTINUITY_TOLERANCE {
                    warn!(length, distance, "line length disagrees with Start and End");
                }
                length
            }
            Some(length) => {
                return Err(GeometryError::InvalidField {
                    element: ELEMENT,
                    field: "length",
                    message: format!("must be positive, got {length}"),
                })
            }
            None => distance,
        };
        Ok(Line {
            header: self.header,
            start,
            end,
            direction,
            length,
        })
    }
}

/// Straight tangent between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    header: Header,
    start: Point,
    end: Point,
    direction: f64,
    length: f64,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Result<Self, GeometryError> {
        LineSpec {
            start: Some(start),
            end: Some(end),
            ..LineSpec::default()
        }
        .build()
    }

    /// Heading of the line in radians.
    #[must_use]
    pub fn direction(&self) -> f64 {
        self.direction
    }

    pub(crate) fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }
}

impl Geometry for Line {
    fn kind(&self) -> ElementKind {
        ElementKind::Line
    }

    fn header(&self) -> &Header {
        &self.header
    }

    fn length(&self) -> f64 {
        self.length
    }

    fn start(&self) -> Point {
        self.start
    }

    fn end(&self) -> Point {
        self.end
    }

    fn dir_start(&self) -> f64 {
        self.direction
    }

    fn dir_end(&self) -> f64 {
        self.direction
    }

    fn point_at_distance(&self, s: f64) -> Result<Point, GeometryError> {
        let s = check_distance(s, self.length)?;
        Ok(self.start + Point::from_heading(self.direction) * s)
    }

    fn tangent_at(&self, s: f64) -> Result<Point, GeometryError> {
        check_distance(s, self.length)?;
        Ok(Point::from_heading(self.direction))
    }

    fn project_point(&self, p: Point) -> Result<f64, GeometryError> {
        const SLACK: f64 = 1e-9;
        let t = (p - self.start).dot(Point::from_heading(self.direction));
        if t < -SLACK || t > self.length + SLACK {
            return Err(GeometryError::NoProjection);
        }
        Ok(t.clamp(0.0, self.length))
    }

    fn key_points(&self) -> Vec<Point> {
        vec![self.start, self.end]
    }

    fn to_value(&self) -> Value {
        let mut out = Value::map();
        self.header.write(ElementKind::Line, &mut out);
        out.insert("length", self.length.into());
        out.insert("dir", self.direction.into());
        out.insert("Start", self.start.into());
        out.insert("End", self.end.into());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Side;
    use approx::assert_abs_diff_eq;

    fn line() -> Line {
        Line::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0)).unwrap()
    }

    #[test]
    fn interpolates_along_direction() {
        let p = line().point_at_distance(25.0).unwrap();
        assert_abs_diff_eq!(p.x, 25.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-12);
        assert!(matches!(
            line().point_at_distance(100.5),
            Err(GeometryError::DistanceOutOfRange { .. })
        ));
    }

    #[test]
    fn orthogonal_sides() {
        let (p, left) = line().orthogonal(40.0, Side::Left).unwrap();
        let (_, right) = line().orthogonal(40.0, Side::Right).unwrap();
        assert_abs_diff_eq!(p.x, 40.0, epsilon = 1e-12);
        assert_abs_diff_eq!(left.y, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(right.y, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn projection_rejects_points_past_the_ends() {
        let l = line();
        assert_abs_diff_eq!(l.project_point(Point::new(30.0, 7.0)).unwrap(), 30.0, epsilon = 1e-12);
        assert!(matches!(
            l.project_point(Point::new(-1.0, 0.0)),
            Err(GeometryError::NoProjection)
        ));
        assert!(l.project_point(Point::new(100.5, 2.0)).is_err());
    }

    #[test]
    fn end_from_dir_and_length() {
        let spec = LineSpec {
            start: Some(Point::new(1.0, 1.0)),
            dir: Some(std::f64::consts::FRAC_PI_2),
            length: Some(10.0),
            ..LineSpec::default()
        };
        let l = spec.build().unwrap();
        assert_abs_diff_eq!(l.end().x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(l.end().y, 11.0, epsilon = 1e-12);
    }

    #[test]
    fn supplied_length_is_kept() {
        let spec = LineSpec {
            start: Some(Point::new(0.0, 0.0)),
            end: Some(Point::new(100.0, 0.0)),
            length: Some(100.0004),
            ..LineSpec::default()
        };
        let l = spec.build().unwrap();
        assert_eq!(l.length(), 100.0004);
        assert_abs_diff_eq!(l.end().x, 100.0, epsilon = 1e-12);

        let doc = Value::from_json_value(&serde_json::json!({
            "Start": [0, 0], "End": [0, 50], "length": 50.0, "dir": 1.5707963267948966
        }));
        let l = LineSpec::from_value(&doc).unwrap().build().unwrap();
        assert_eq!(l.length(), 50.0);
        assert_abs_diff_eq!(l.direction(), std::f64::consts::FRAC_PI_2, epsilon = 1e-12);

        let bad = LineSpec {
            start: Some(Point::new(0.0, 0.0)),
            end: Some(Point::new(1.0, 0.0)),
            length: Some(-1.0),
            ..LineSpec::default()
        };
        assert!(matches!(
            bad.build(),
            Err(GeometryError::InvalidField { field: "length", .. })
        ));
    }

    #[test]
    fn zero_length_is_rejected() {
        let p = Point::new(3.0, 3.0);
        assert!(matches!(
            Line::new(p, p),
            Err(GeometryError::InvalidField { field: "length", .. })
        ));
    }

    #[test]
    fn generate_points_rejects_steps_too_fine_to_sample() {
        for step in [5e-324, 1e-9, 0.0, -1.0] {
            assert!(matches!(
                line().generate_points(step),
                Err(GeometryError::InvalidStep { .. })
            ));
        }
        assert_eq!(line().generate_points(1e-3).unwrap().len(), 100_001);
    }

    #[test]
    fn generate_points_includes_end() {
        let pts = line().generate_points(30.0).unwrap();
        let xs: Vec<f64> = pts.iter().map(|p| p.x).collect();
        assert_eq!(xs.len(), 5);
        assert_abs_diff_eq!(xs[3], 90.0, epsilon = 1e-12);
        assert_abs_diff_eq!(xs[4], 100.0, epsilon = 1e-12);
    }
}
