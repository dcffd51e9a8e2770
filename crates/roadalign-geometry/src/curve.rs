use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;
use std::str::FromStr;

use roadalign_core::{normalize_angle, Point, POSITION_EPSILON};
use roadalign_parser::{Fields, Value};
use tracing::debug;

use crate::error::GeometryError;
use crate::types::{check_distance, read_rotation, ElementKind, Header, Rotation};
use crate::{intersect_headings, Geometry};

const ELEMENT: &str = "Curve";

/// Angular noise tolerated at either end of the sweep when projecting.
const ANGLE_SLACK: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurveType {
    #[default]
    Arc,
    Chord,
}

impl CurveType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CurveType::Arc => "arc",
            CurveType::Chord => "chord",
        }
    }
}

impl fmt::Display for CurveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurveType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "arc" => Ok(CurveType::Arc),
            "chord" => Ok(CurveType::Chord),
            _ => Err(format!("crvType must be \"arc\" or \"chord\", got \"{s}\"")),
        }
    }
}

/// Raw arc attributes. Anything left `None` is derived by [`CurveSpec::build`].
#[derive(Debug, Clone, Default)]
pub struct CurveSpec {
    pub header: Header,
    pub rotation: Option<Rotation>,
    pub curve_type: Option<CurveType>,
    pub start: Option<Point>,
    pub end: Option<Point>,
    pub center: Option<Point>,
    pub pi: Option<Point>,
    pub radius: Option<f64>,
    pub delta: Option<f64>,
    pub length: Option<f64>,
    pub chord: Option<f64>,
    pub tangent: Option<f64>,
    pub mid_ordinate: Option<f64>,
    pub external: Option<f64>,
    pub dir_start: Option<f64>,
    pub dir_end: Option<f64>,
}

impl CurveSpec {
    pub fn from_value(value: &Value) -> Result<Self, GeometryError> {
        let f = Fields::new(value, ELEMENT)?;
        let curve_type = f
            .string("crvType")?
            .map(|s| {
                s.parse().map_err(|message| GeometryError::InvalidField {
                    element: ELEMENT,
                    field: "crvType",
                    message,
                })
            })
            .transpose()?;
        Ok(Self {
            header: Header::read(&f)?,
            rotation: read_rotation(&f, ELEMENT)?,
            curve_type,
            start: f.point("Start")?,
            end: f.point("End")?,
            center: f.point("Center")?,
            pi: f.point("PI")?,
            radius: f.number("radius")?,
            delta: f.number("delta")?,
            length: f.number("length")?,
            chord: f.number("chord")?,
            tangent: f.number("tangent")?,
            mid_ordinate: f.number("midOrd")?,
            external: f.number("external")?,
            dir_start: f.number("dirStart")?,
            dir_end: f.number("dirEnd")?,
        })
    }

    /// Resolve the arc.
    ///
    /// Order: centre (given, or placed from a solved radius) → delta → length →
    /// bearings → PI points → chord, tangent, middle ordinate, external.
    /// Supplied values are kept as given.
    pub fn build(self) -> Result<Curve, GeometryError> {
        let start = self.start.ok_or(GeometryError::MissingRequiredField {
            element: ELEMENT,
            field: "Start",
        })?;
        let end = self.end.ok_or(GeometryError::MissingRequiredField {
            element: ELEMENT,
            field: "End",
        })?;
        let rotation = self.rotation.ok_or(GeometryError::MissingRequiredField {
            element: ELEMENT,
            field: "rot",
        })?;
        let sigma = rotation.sign();

        let center = match self.center {
            Some(c) => c,
            None => self.place_center(start, end, rotation)?,
        };
        let radius = start.distance_to(center);
        if radius <= POSITION_EPSILON {
            return Err(GeometryError::InvalidField {
                element: ELEMENT,
                field: "radius",
                message: "Center coincides with Start".into(),
            });
        }
        let start_angle = center.heading_to(start);

        let delta = match self.delta {
            Some(d) => d.abs(),
            None => {
                let from_points = sweep(start_angle, center.heading_to(end), rotation);
                match (from_points > 0.0, self.dir_start, self.dir_end) {
                    (false, Some(a), Some(b)) => sweep(a, b, rotation),
                    _ => from_points,
                }
            }
        };
        if delta <= 0.0 {
            return Err(GeometryError::InvalidField {
                element: ELEMENT,
                field: "delta",
                message: "arc has no sweep".into(),
            });
        }

        let length = self.length.unwrap_or(radius * delta);
        if length <= 0.0 {
            return Err(GeometryError::InvalidField {
                element: ELEMENT,
                field: "length",
                message: format!("must be positive, got {length}"),
            });
        }

        let dir_start = self.dir_start.unwrap_or(start_angle + sigma * FRAC_PI_2);
        let dir_end = self.dir_end.unwrap_or(dir_start + sigma * delta);

        let mut curve = Curve {
            header: self.header,
            curve_type: self.curve_type.unwrap_or_default(),
            rotation,
            start,
            end,
            center,
            radius,
            start_angle,
            delta,
            length,
            dir_start,
            dir_end,
            pi: self.pi,
            pi_points: Vec::new(),
            chord: 0.0,
            tangent: 0.0,
            mid_ordinate: 0.0,
            external: 0.0,
        };

        curve.pi_points = curve.compute_pi_points();
        if curve.pi.is_none() {
            curve.pi = curve.pi_points.first().copied();
        }

        let half = delta / 2.0;
        curve.chord = self.chord.unwrap_or(2.0 * radius * half.sin());
        curve.tangent = self.tangent.unwrap_or(radius * half.tan());
        curve.mid_ordinate = self.mid_ordinate.unwrap_or(radius * (1.0 - half.cos()));
        curve.external = self.external.unwrap_or(radius * (1.0 / half.cos() - 1.0));

        debug!(
            radius,
            delta,
            length,
            rot = %rotation,
            "resolved curve"
        );
        Ok(curve)
    }

    /// Place the centre on the chord bisector from whichever parameter fixes the radius.
    fn place_center(
        &self,
        start: Point,
        end: Point,
        rotation: Rotation,
    ) -> Result<Point, GeometryError> {
        let chord_vec = end - start;
        let c = chord_vec.length();
        let Some(u) = chord_vec.unit().filter(|_| c > POSITION_EPSILON) else {
            return Err(GeometryError::UnderdeterminedGeometry {
                element: ELEMENT,
                reason: "Start and End coincide and no Center was given".into(),
            });
        };

        let (radius, delta) = self.solve_radius(c, rotation)?;
        let half_chord = c / 2.0;
        if !radius.is_finite() || radius < half_chord - POSITION_EPSILON {
            return Err(GeometryError::InvalidField {
                element: ELEMENT,
                field: "radius",
                message: format!("{radius} cannot span a chord of {c}"),
            });
        }
        let offset = (radius * radius - half_chord * half_chord).max(0.0).sqrt();
        // Minor arcs keep the centre on the turning side.
        let major = delta.is_some_and(|d| d > PI);
        let side = if major { -rotation.sign() } else { rotation.sign() };
        Ok(start.midpoint(end) + u.left_normal() * (side * offset))
    }

    /// Radius (and the sweep, when it falls out) from chord length `c` plus one
    /// more parameter.
    fn solve_radius(
        &self,
        c: f64,
        rotation: Rotation,
    ) -> Result<(f64, Option<f64>), GeometryError> {
        let invalid = |field: &'static str, message: String| GeometryError::InvalidField {
            element: ELEMENT,
            field,
            message,
        };

        if let Some(r) = self.radius {
            return Ok((r.abs(), self.delta.map(f64::abs)));
        }
        if let Some(d) = self.delta {
            let d = d.abs();
            let s = (d / 2.0).sin();
            if d <= 0.0 || d >= TAU || s <= 0.0 {
                return Err(invalid("delta", format!("{d} cannot define an arc")));
            }
            return Ok((c / (2.0 * s), Some(d)));
        }
        if let Some(l) = self.length {
            if l <= c {
                return Err(invalid("length", format!("{l} is not longer than the chord {c}")));
            }
            // L/c = Δ / (2 sin(Δ/2)), increasing on (0, 2π).
            let d = bisect(|d| d / (2.0 * (d / 2.0).sin()), l / c, 1e-12, TAU - 1e-12);
            return Ok((l / d, Some(d)));
        }
        if let Some(t) = self.tangent {
            if t <= c / 2.0 {
                return Err(invalid("tangent", format!("{t} is too short for the chord {c}")));
            }
            let h = (c / (2.0 * t)).acos();
            return Ok((t / h.tan(), Some(2.0 * h)));
        }
        if let Some(m) = self.mid_ordinate {
            if m <= 0.0 {
                return Err(invalid("midOrd", format!("must be positive, got {m}")));
            }
            let r = (c * c / 4.0 + m * m) / (2.0 * m);
            let mut h = (c / (2.0 * r)).min(1.0).asin();
            if m > r {
                h = PI - h;
            }
            return Ok((r, Some(2.0 * h)));
        }
        if let Some(e) = self.external {
            if e <= 0.0 {
                return Err(invalid("external", format!("must be positive, got {e}")));
            }
            // E/c = (1 − cos h) / (2 sin h cos h), increasing on (0, π/2).
            let h = bisect(
                |h| (1.0 - h.cos()) / (2.0 * h.sin() * h.cos()),
                e / c,
                1e-12,
                FRAC_PI_2 - 1e-12,
            );
            return Ok((c / (2.0 * h.sin()), Some(2.0 * h)));
        }
        if let (Some(a), Some(b)) = (self.dir_start, self.dir_end) {
            let d = sweep(a, b, rotation);
            let s = (d / 2.0).sin();
            if s <= 0.0 {
                return Err(invalid("dirEnd", "bearings do not turn".into()));
            }
            return Ok((c / (2.0 * s), Some(d)));
        }
        Err(GeometryError::UnderdeterminedGeometry {
            element: ELEMENT,
            reason: "need Center, radius, delta, length, tangent, midOrd, external \
                     or dirStart and dirEnd"
                .into(),
        })
    }
}

/// Sweep from `from` to `to` in the sense of `rotation`, in `[0, 2π)`.
fn sweep(from: f64, to: f64, rotation: Rotation) -> f64 {
    normalize_angle(rotation.sign() * (to - from))
}

/// Root of `f(x) = target` for increasing `f` on `[lo, hi]`.
fn bisect(f: impl Fn(f64) -> f64, target: f64, mut lo: f64, mut hi: f64) -> f64 {
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if f(mid) < target {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1e-15 {
            break;
        }
    }
    0.5 * (lo + hi)
}

/// Circular arc.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    header: Header,
    curve_type: CurveType,
    rotation: Rotation,
    start: Point,
    end: Point,
    center: Point,
    radius: f64,
    start_angle: f64,
    delta: f64,
    length: f64,
    dir_start: f64,
    dir_end: f64,
    pi: Option<Point>,
    pi_points: Vec<Point>,
    chord: f64,
    tangent: f64,
    mid_ordinate: f64,
    external: f64,
}

impl Curve {
    /// Arc from its start, centre and end points.
    pub fn from_center(
        start: Point,
        center: Point,
        end: Point,
        rotation: Rotation,
    ) -> Result<Self, GeometryError> {
        CurveSpec {
            start: Some(start),
            center: Some(center),
            end: Some(end),
            rotation: Some(rotation),
            ..CurveSpec::default()
        }
        .build()
    }

    pub(crate) fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    #[must_use]
    pub fn center(&self) -> Point {
        self.center
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[must_use]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    #[must_use]
    pub fn curve_type(&self) -> CurveType {
        self.curve_type
    }

    /// Central angle, radians, always positive.
    #[must_use]
    pub fn delta(&self) -> f64 {
        self.delta
    }

    #[must_use]
    pub fn chord(&self) -> f64 {
        self.chord
    }

    #[must_use]
    pub fn tangent(&self) -> f64 {
        self.tangent
    }

    #[must_use]
    pub fn mid_ordinate(&self) -> f64 {
        self.mid_ordinate
    }

    #[must_use]
    pub fn external(&self) -> f64 {
        self.external
    }

    #[must_use]
    pub fn pi(&self) -> Option<Point> {
        self.pi
    }

    /// One tangent intersection, or two when the arc sweeps half a turn or more.
    #[must_use]
    pub fn pi_points(&self) -> &[Point] {
        &self.pi_points
    }

    fn point_at_angle(&self, angle: f64) -> Point {
        self.center + Point::from_heading(angle) * self.radius
    }

    fn tangent_heading(&self, angle: f64) -> f64 {
        angle + self.rotation.sign() * FRAC_PI_2
    }

    fn compute_pi_points(&self) -> Vec<Point> {
        let sigma = self.rotation.sign();
        let end_angle = self.start_angle + sigma * self.delta;
        let pi_between = |a1: f64, a2: f64| {
            intersect_headings(
                self.point_at_angle(a1),
                self.tangent_heading(a1),
                self.point_at_angle(a2),
                self.tangent_heading(a2),
            )
        };
        if self.delta >= PI {
            let mid_angle = self.start_angle + sigma * self.delta / 2.0;
            [
                pi_between(self.start_angle, mid_angle),
                pi_between(mid_angle, end_angle),
            ]
            .into_iter()
            .flatten()
            .collect()
        } else {
            pi_between(self.start_angle, end_angle).into_iter().collect()
        }
    }
}

impl Geometry for Curve {
    fn kind(&self) -> ElementKind {
        ElementKind::Curve
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
        self.dir_start
    }

    fn dir_end(&self) -> f64 {
        self.dir_end
    }

    fn point_at_distance(&self, s: f64) -> Result<Point, GeometryError> {
        let s = check_distance(s, self.length)?;
        let angle = self.start_angle + self.rotation.sign() * s / self.radius;
        Ok(self.point_at_angle(angle))
    }

    fn tangent_at(&self, s: f64) -> Result<Point, GeometryError> {
        let s = check_distance(s, self.length)?;
        let angle = self.start_angle + self.rotation.sign() * s / self.radius;
        Ok(Point::from_heading(self.tangent_heading(angle)))
    }

    fn project_point(&self, p: Point) -> Result<f64, GeometryError> {
        if p.distance_to(self.center) <= POSITION_EPSILON {
            return Err(GeometryError::NoProjection);
        }
        let traversed = sweep(self.start_angle, self.center.heading_to(p), self.rotation);
        let angle = if traversed <= self.delta + ANGLE_SLACK {
            traversed.min(self.delta)
        } else if traversed >= TAU - ANGLE_SLACK {
            0.0
        } else {
            return Err(GeometryError::NoProjection);
        };
        Ok(self.radius * angle)
    }

    fn key_points(&self) -> Vec<Point> {
        let mid = self.point_at_angle(self.start_angle + self.rotation.sign() * self.delta / 2.0);
        vec![self.start, mid, self.end]
    }

    fn to_value(&self) -> Value {
        let mut out = Value::map();
        self.header.write(ElementKind::Curve, &mut out);
        out.insert("crvType", self.curve_type.as_str().into());
        out.insert("rot", self.rotation.as_str().into());
        out.insert("radius", self.radius.into());
        out.insert("delta", self.delta.into());
        out.insert("length", self.length.into());
        out.insert("chord", self.chord.into());
        out.insert("tangent", self.tangent.into());
        out.insert("midOrd", self.mid_ordinate.into());
        out.insert("external", self.external.into());
        out.insert("dirStart", self.dir_start.into());
        out.insert("dirEnd", self.dir_end.into());
        out.insert("Start", self.start.into());
        out.insert("Center", self.center.into());
        out.insert("End", self.end.into());
        out.insert("PI", self.pi.map_or(Value::Null, Value::point));
        out.insert(
            "piPoints",
            Value::Seq(self.pi_points.iter().copied().map(Value::point).collect()),
        );
        out
    }
}
