use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use roadalign_core::{Point, POSITION_EPSILON};
use roadalign_parser::{Fields, Value};
use tracing::debug;

use crate::error::GeometryError;
use crate::fresnel::fresnel;
use crate::types::{check_distance, read_rotation, ElementKind, Header, Rotation};
use crate::{intersect_headings, Geometry};

const ELEMENT: &str = "Spiral";

/// Step for numerical tangents, in length units.
const DIFF_STEP: f64 = 1e-6;
const SCAN_SAMPLES: usize = 50;
const REFINE_ITERATIONS: usize = 60;
const REFINE_TOLERANCE: f64 = 1e-7;
/// How far a query may sit behind an end point, along the tangent, and still project onto it.
const END_SLACK: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpiralType {
    #[default]
    Clothoid,
    Bloss,
    Cosine,
    Sine,
    Biquadratic,
}

impl SpiralType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SpiralType::Clothoid => "clothoid",
            SpiralType::Bloss => "bloss",
            SpiralType::Cosine => "cosine",
            SpiralType::Sine => "sine",
            SpiralType::Biquadratic => "biquadratic",
        }
    }
}

impl fmt::Display for SpiralType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpiralType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clothoid" => Ok(SpiralType::Clothoid),
            "bloss" => Ok(SpiralType::Bloss),
            "cosine" => Ok(SpiralType::Cosine),
            "sine" => Ok(SpiralType::Sine),
            "biquadratic" => Ok(SpiralType::Biquadratic),
            _ => Err(format!(
                "spiType must be one of clothoid, bloss, cosine, sine, biquadratic; got \"{s}\""
            )),
        }
    }
}

/// Raw spiral attributes. `length`, both radii, `rot`, `Start` and `End` are
/// required; `PI` may be replaced by `dirStart`.
#[derive(Debug, Clone, Default)]
pub struct SpiralSpec {
    pub header: Header,
    pub rotation: Option<Rotation>,
    pub spiral_type: Option<SpiralType>,
    pub start: Option<Point>,
    pub end: Option<Point>,
    pub pi: Option<Point>,
    pub length: Option<f64>,
    pub radius_start: Option<f64>,
    pub radius_end: Option<f64>,
    pub constant: Option<f64>,
    pub dir_start: Option<f64>,
    pub total_x: Option<f64>,
    pub total_y: Option<f64>,
    pub tan_long: Option<f64>,
    pub tan_short: Option<f64>,
    pub chord: Option<f64>,
}

impl SpiralSpec {
    pub fn from_value(value: &Value) -> Result<Self, GeometryError> {
        let f = Fields::new(value, ELEMENT)?;
        let spiral_type = f
            .string("spiType")?
            .map(|s| {
                s.parse().map_err(|message| GeometryError::InvalidField {
                    element: ELEMENT,
                    field: "spiType",
                    message,
                })
            })
            .transpose()?;
        Ok(Self {
            header: Header::read(&f)?,
            rotation: read_rotation(&f, ELEMENT)?,
            spiral_type,
            start: f.point("Start")?,
            end: f.point("End")?,
            pi: f.point("PI")?,
            length: f.number("length")?,
            radius_start: f.number("radiusStart")?,
            radius_end: f.number("radiusEnd")?,
            constant: f.number("constant")?,
            dir_start: f.number("dirStart")?,
            total_x: f.number("totalX")?,
            total_y: f.number("totalY")?,
            tan_long: f.number("tanLong")?,
            tan_short: f.number("tanShort")?,
            chord: f.number("chord")?,
        })
    }

    /// Resolve the spiral: constant → theta → bearings → end offsets.
    pub fn build(self) -> Result<Spiral, GeometryError> {
        let missing = |field| GeometryError::MissingRequiredField {
            element: ELEMENT,
            field,
        };
        let invalid = |field, message: String| GeometryError::InvalidField {
            element: ELEMENT,
            field,
            message,
        };

        let length = self.length.ok_or_else(|| missing("length"))?;
        let radius_start = self.radius_start.ok_or_else(|| missing("radiusStart"))?;
        let radius_end = self.radius_end.ok_or_else(|| missing("radiusEnd"))?;
        let rotation = self.rotation.ok_or_else(|| missing("rot"))?;
        let start = self.start.ok_or_else(|| missing("Start"))?;
        let end = self.end.ok_or_else(|| missing("End"))?;

        if length <= 0.0 || !length.is_finite() {
            return Err(invalid("length", format!("must be positive, got {length}")));
        }
        for (field, r) in [("radiusStart", radius_start), ("radiusEnd", radius_end)] {
            if r.is_nan() || r <= 0.0 {
                return Err(invalid(field, format!("must be positive, got {r}")));
            }
        }
        if radius_start.is_infinite() && radius_end.is_infinite() {
            return Err(invalid("radiusEnd", "both radii are infinite".into()));
        }
        if (radius_start - radius_end).abs() <= POSITION_EPSILON {
            return Err(invalid(
                "radiusEnd",
                format!("equal radii ({radius_start}) describe a circular arc"),
            ));
        }

        let constant = match self.constant {
            Some(a) => a,
            None if radius_start.is_infinite() => (radius_end * length).sqrt(),
            None if radius_end.is_infinite() => (radius_start * length).sqrt(),
            None => {
                (radius_start * radius_end * length / (radius_start - radius_end).abs()).sqrt()
            }
        };
        if constant <= 0.0 || !constant.is_finite() {
            return Err(invalid("constant", format!("must be positive, got {constant}")));
        }

        // Curvature grows from the anchor end. Reversed spirals are anchored at End.
        let reversed = radius_end > radius_start;
        let near_radius = if reversed { radius_end } else { radius_start };
        let s0 = if near_radius.is_infinite() {
            0.0
        } else {
            constant * constant / near_radius
        };
        let theta = ((s0 + length).powi(2) - s0 * s0) / (2.0 * constant * constant);

        let sigma = rotation.sign();
        let dir_start = match (self.pi, self.dir_start) {
            (Some(pi), _) => {
                if pi.distance_to(start) <= POSITION_EPSILON {
                    return Err(invalid("PI", "coincides with Start".into()));
                }
                start.heading_to(pi)
            }
            (None, Some(d)) => d,
            (None, None) => return Err(missing("PI")),
        };
        let dir_end = dir_start + sigma * theta;

        let frame = if reversed {
            Frame {
                anchor: end,
                heading: dir_end + PI,
                mirror: -sigma,
            }
        } else {
            Frame {
                anchor: start,
                heading: dir_start,
                mirror: sigma,
            }
        };

        let mut spiral = Spiral {
            header: self.header,
            spiral_type: self.spiral_type.unwrap_or_default(),
            rotation,
            start,
            end,
            pi: self.pi,
            length,
            radius_start,
            radius_end,
            constant,
            theta,
            dir_start,
            dir_end,
            total_x: 0.0,
            total_y: 0.0,
            tan_long: 0.0,
            tan_short: 0.0,
            chord: 0.0,
            reversed,
            s0,
            frame,
        };

        if spiral.pi.is_none() {
            spiral.pi = intersect_headings(start, dir_start, end, dir_end);
        }

        let far = spiral.reference(length);
        spiral.total_x = self.total_x.unwrap_or(far.x);
        spiral.total_y = self.total_y.unwrap_or(far.y);
        spiral.tan_long = self.tan_long.unwrap_or(far.x - far.y / theta.tan());
        spiral.tan_short = self.tan_short.unwrap_or(far.y / theta.sin());
        spiral.chord = self.chord.unwrap_or(far.length());

        debug!(
            constant,
            theta,
            reversed,
            compound = spiral.is_compound(),
            "resolved spiral"
        );
        Ok(spiral)
    }
}

/// Point at arclength `s` on the left-turning clothoid with parameter `a`,
/// starting at the origin heading along +X.
#[must_use]
pub fn clothoid_point(a: f64, s: f64) -> Point {
    let scale = a * PI.sqrt();
    let (fs, fc) = fresnel(s / scale);
    Point::new(scale * fc, scale * fs)
}

/// End offsets of a spiral of `length` leaving a tangent and reaching `radius`:
/// `x` along the tangent, `y` towards the turn.
#[must_use]
pub fn tangent_offsets(length: f64, radius: f64) -> Point {
    clothoid_point((radius * length).sqrt(), length)
}

/// Local clothoid frame: origin at the anchor, x along `heading`, y mirrored for
/// right-hand turns.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Frame {
    anchor: Point,
    heading: f64,
    mirror: f64,
}

/// Clothoid transition between two curvatures.
///
/// Geometry is evaluated on the reference clothoid `κ(s) = s / A²` between
/// arclengths `s0 = A² / R_near` and `s0 + length`, where the near end is the
/// one with the larger radius. Spirals whose radius grows along the direction
/// of travel are evaluated backwards from `End`.
#[derive(Debug, Clone, PartialEq)]
pub struct Spiral {
    header: Header,
    spiral_type: SpiralType,
    rotation: Rotation,
    start: Point,
    end: Point,
    pi: Option<Point>,
    length: f64,
    radius_start: f64,
    radius_end: f64,
    constant: f64,
    theta: f64,
    dir_start: f64,
    dir_end: f64,
    total_x: f64,
    total_y: f64,
    tan_long: f64,
    tan_short: f64,
    chord: f64,
    reversed: bool,
    s0: f64,
    frame: Frame,
}

impl Spiral {
    pub(crate) fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    #[must_use]
    pub fn spiral_type(&self) -> SpiralType {
        self.spiral_type
    }

    #[must_use]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    #[must_use]
    pub fn radius_start(&self) -> f64 {
        self.radius_start
    }

    #[must_use]
    pub fn radius_end(&self) -> f64 {
        self.radius_end
    }

    /// Clothoid parameter `A`.
    #[must_use]
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Total change of heading, radians.
    #[must_use]
    pub fn theta(&self) -> f64 {
        self.theta
    }

    #[must_use]
    pub fn pi(&self) -> Option<Point> {
        self.pi
    }

    #[must_use]
    pub fn total_x(&self) -> f64 {
        self.total_x
    }

    #[must_use]
    pub fn total_y(&self) -> f64 {
        self.total_y
    }

    #[must_use]
    pub fn tan_long(&self) -> f64 {
        self.tan_long
    }

    #[must_use]
    pub fn tan_short(&self) -> f64 {
        self.tan_short
    }

    #[must_use]
    pub fn chord(&self) -> f64 {
        self.chord
    }

    #[must_use]
    pub fn is_compound(&self) -> bool {
        self.radius_start.is_finite() && self.radius_end.is_finite()
    }

    /// True when evaluation runs backwards from `End`.
    #[must_use]
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Left-turning offset `u` along the spiral from the anchor, in the anchor frame.
    fn reference(&self, u: f64) -> Point {
        let base = clothoid_point(self.constant, self.s0);
        let phi0 = self.s0 * self.s0 / (2.0 * self.constant * self.constant);
        (clothoid_point(self.constant, self.s0 + u) - base).rotate(-phi0)
    }

    fn local(&self, u: f64) -> Point {
        let r = self.reference(u);
        Point::new(r.x, self.frame.mirror * r.y)
    }

    fn to_metric(&self, local: Point) -> Point {
        self.frame.anchor + local.rotate(self.frame.heading)
    }

    fn to_local(&self, p: Point) -> Point {
        (p - self.frame.anchor).rotate(-self.frame.heading)
    }

    fn local_offset(&self, s: f64) -> f64 {
        if self.reversed {
            self.length - s
        } else {
            s
        }
    }

    /// Unit derivative of the local curve with respect to `u`.
    fn local_tangent(&self, u: f64) -> Result<Point, GeometryError> {
        let before = (u - DIFF_STEP).max(0.0);
        let after = (u + DIFF_STEP).min(self.length);
        (self.local(after) - self.local(before))
            .unit()
            .ok_or(GeometryError::NoProjection)
    }

    /// Arclength offset from the anchor closest to `q`, by a coarse scan and
    /// quarter-point refinement.
    fn closest_offset(&self, q: Point) -> f64 {
        let dist = |u: f64| (self.local(u) - q).length_squared();
        let step = self.length / SCAN_SAMPLES as f64;
        let (i_min, _) = (0..=SCAN_SAMPLES)
            .map(|i| (i, dist(i as f64 * step)))
            .fold((0, f64::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best });

        let mut a = i_min.saturating_sub(1) as f64 * step;
        let mut b = (i_min + 1).min(SCAN_SAMPLES) as f64 * step;
        for _ in 0..REFINE_ITERATIONS {
            let m1 = a + (b - a) * 0.25;
            let m2 = a + (b - a) * 0.5;
            let m3 = a + (b - a) * 0.75;
            let (f1, f2, f3) = (dist(m1), dist(m2), dist(m3));
            if f1 < f2 {
                b = m2;
            } else if f3 < f2 {
                a = m2;
            } else {
                a = m1;
                b = m3;
            }
            if b - a < REFINE_TOLERANCE {
                break;
            }
        }
        (0.5 * (a + b)).clamp(0.0, self.length)
    }
}

impl Geometry for Spiral {
    fn kind(&self) -> ElementKind {
        ElementKind::Spiral
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
        Ok(self.to_metric(self.local(self.local_offset(s))))
    }

    fn tangent_at(&self, s: f64) -> Result<Point, GeometryError> {
        let s = check_distance(s, self.length)?;
        let t = self
            .local_tangent(self.local_offset(s))?
            .rotate(self.frame.heading);
        Ok(if self.reversed { -t } else { t })
    }

    fn project_point(&self, p: Point) -> Result<f64, GeometryError> {
        let q = self.to_local(p);
        let u = self.closest_offset(q);

        // At an end point the foot must still be perpendicular, otherwise the
        // query lies beyond the spiral.
        let at_anchor = u <= END_SLACK;
        let at_far_end = u >= self.length - END_SLACK;
        if at_anchor || at_far_end {
            let along = self.local_tangent(u)?.dot(q - self.local(u));
            if (at_anchor && along < -END_SLACK) || (at_far_end && along > END_SLACK) {
                return Err(GeometryError::NoProjection);
            }
        }
        Ok(self.local_offset(u))
    }

    fn key_points(&self) -> Vec<Point> {
        let mut out = vec![self.start];
        out.extend(self.pi);
        out.push(self.end);
        out
    }

    fn to_value(&self) -> Value {
        let mut out = Value::map();
        self.header.write(ElementKind::Spiral, &mut out);
        out.insert("spiType", self.spiral_type.as_str().into());
        out.insert("rot", self.rotation.as_str().into());
        out.insert("length", self.length.into());
        out.insert("radiusStart", self.radius_start.into());
        out.insert("radiusEnd", self.radius_end.into());
        out.insert("constant", self.constant.into());
        out.insert("theta", self.theta.into());
        out.insert("totalX", self.total_x.into());
        out.insert("totalY", self.total_y.into());
        out.insert("tanLong", self.tan_long.into());
        out.insert("tanShort", self.tan_short.into());
        out.insert("chord", self.chord.into());
        out.insert("dirStart", self.dir_start.into());
        out.insert("dirEnd", self.dir_end.into());
        out.insert("Start", self.start.into());
        out.insert("PI", self.pi.map_or(Value::Null, Value::point));
        out.insert("End", self.end.into());
        out
    }
}
