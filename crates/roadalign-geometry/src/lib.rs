//! Horizontal alignment elements: tangents, circular arcs and clothoid spirals.
//!
//! Every element is resolved once from a partially specified description and
//! is immutable afterwards. Distances passed to queries are measured from the
//! element's own start.

pub mod curve;
pub mod error;
pub mod fresnel;
pub mod line;
pub mod spiral;
pub mod types;

use roadalign_core::{sample_count, Point};
use roadalign_parser::{Fields, Value};

pub use curve::{Curve, CurveSpec, CurveType};
pub use error::GeometryError;
pub use line::{Line, LineSpec};
pub use spiral::{clothoid_point, tangent_offsets, Spiral, SpiralSpec, SpiralType};
pub use types::{ElementKind, Header, Rotation, Side};

/// Queries shared by every element kind.
pub trait Geometry {
    fn kind(&self) -> ElementKind;

    fn header(&self) -> &Header;

    fn length(&self) -> f64;

    fn start(&self) -> Point;

    fn end(&self) -> Point;

    /// Heading at the start, radians.
    fn dir_start(&self) -> f64;

    /// Heading at the end, radians.
    fn dir_end(&self) -> f64;

    fn point_at_distance(&self, s: f64) -> Result<Point, GeometryError>;

    /// Unit vector along the direction of travel at `s`.
    fn tangent_at(&self, s: f64) -> Result<Point, GeometryError>;

    /// Distance along the element of the closest point to `p`.
    fn project_point(&self, p: Point) -> Result<f64, GeometryError>;

    fn key_points(&self) -> Vec<Point>;

    /// Element attributes, resolved values included, in document form.
    fn to_value(&self) -> Value;

    /// Point at `s` and the unit normal towards `side`.
    fn orthogonal(&self, s: f64, side: Side) -> Result<(Point, Point), GeometryError> {
        let point = self.point_at_distance(s)?;
        let tangent = self.tangent_at(s)?;
        let normal = match side {
            Side::Left => tangent.left_normal(),
            Side::Right => tangent.right_normal(),
        };
        Ok((point, normal))
    }

    /// Points every `step` from the start, always ending with the end point.
    fn generate_points(&self, step: f64) -> Result<Vec<Point>, GeometryError> {
        let length = self.length();
        let count = sample_count(length, step).ok_or(GeometryError::InvalidStep { step })?;
        let mut out = Vec::with_capacity(count + 2);
        for i in 0..=count {
            let s = i as f64 * step;
            if s >= length {
                break;
            }
            out.push(self.point_at_distance(s)?);
        }
        out.push(self.point_at_distance(length)?);
        Ok(out)
    }

    fn sta_start(&self) -> Option<f64> {
        self.header().sta_start
    }

    fn sta_end(&self) -> Option<f64> {
        self.sta_start().map(|s| s + self.length())
    }
}

/// One element of an alignment.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryElement {
    Line(Line),
    Curve(Curve),
    Spiral(Spiral),
}

impl GeometryElement {
    /// Build an element from its document form, dispatching on `Type`.
    pub fn from_value(value: &Value) -> Result<Self, GeometryError> {
        let f = Fields::new(value, "CoordGeom")?;
        let kind = f
            .string("Type")?
            .ok_or(GeometryError::MissingRequiredField {
                element: "CoordGeom",
                field: "Type",
            })?;
        match kind.to_ascii_lowercase().as_str() {
            "line" => Ok(Self::Line(LineSpec::from_value(value)?.build()?)),
            "curve" => Ok(Self::Curve(CurveSpec::from_value(value)?.build()?)),
            "spiral" => Ok(Self::Spiral(SpiralSpec::from_value(value)?.build()?)),
            _ => Err(GeometryError::UnknownType {
                kind: kind.to_string(),
            }),
        }
    }

    fn inner(&self) -> &dyn Geometry {
        match self {
            Self::Line(l) => l,
            Self::Curve(c) => c,
            Self::Spiral(s) => s,
        }
    }

    pub fn set_sta_start(&mut self, sta: f64) {
        let header = match self {
            Self::Line(l) => l.header_mut(),
            Self::Curve(c) => c.header_mut(),
            Self::Spiral(s) => s.header_mut(),
        };
        header.sta_start = Some(sta);
    }
}

impl From<Line> for GeometryElement {
    fn from(l: Line) -> Self {
        Self::Line(l)
    }
}

impl From<Curve> for GeometryElement {
    fn from(c: Curve) -> Self {
        Self::Curve(c)
    }
}

impl From<Spiral> for GeometryElement {
    fn from(s: Spiral) -> Self {
        Self::Spiral(s)
    }
}

impl Geometry for GeometryElement {
    fn kind(&self) -> ElementKind {
        self.inner().kind()
    }

    fn header(&self) -> &Header {
        self.inner().header()
    }

    fn length(&self) -> f64 {
        self.inner().length()
    }

    fn start(&self) -> Point {
        self.inner().start()
    }

    fn end(&self) -> Point {
        self.inner().end()
    }

    fn dir_start(&self) -> f64 {
        self.inner().dir_start()
    }

    fn dir_end(&self) -> f64 {
        self.inner().dir_end()
    }

    fn point_at_distance(&self, s: f64) -> Result<Point, GeometryError> {
        self.inner().point_at_distance(s)
    }

    fn tangent_at(&self, s: f64) -> Result<Point, GeometryError> {
        self.inner().tangent_at(s)
    }

    fn project_point(&self, p: Point) -> Result<f64, GeometryError> {
        self.inner().project_point(p)
    }

    fn key_points(&self) -> Vec<Point> {
        self.inner().key_points()
    }

    fn to_value(&self) -> Value {
        self.inner().to_value()
    }

    fn orthogonal(&self, s: f64, side: Side) -> Result<(Point, Point), GeometryError> {
        self.inner().orthogonal(s, side)
    }
}

/// Intersection of two rays given by point and heading, `None` when parallel.
pub(crate) fn intersect_headings(p1: Point, h1: f64, p2: Point, h2: f64) -> Option<Point> {
    let d1 = Point::from_heading(h1);
    let d2 = Point::from_heading(h2);
    let denom = d1.cross(d2);
    if denom.abs() < 1e-10 {
        return None;
    }
    let t = (p2 - p1).cross(d2) / denom;
    Some(p1 + d1 * t)
}
