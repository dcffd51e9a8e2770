use std::f64::consts::PI;

use roadalign_core::{normalize_signed_angle, Point, POSITION_EPSILON};
use roadalign_geometry::{
    tangent_offsets, CurveSpec, GeometryElement, GeometryError, Line, Rotation, SpiralSpec,
};
use roadalign_parser::{Fields, Value};
use tracing::debug;

use crate::alignment::{AlignPi, Alignment, AlignmentSpec, CoordinateSystemSpec};
use crate::error::AlignmentError;
use crate::stations::StationEquations;

/// Deflections smaller than this are treated as straight.
const MIN_DEFLECTION: f64 = 1e-6;

/// One point of intersection with its optional curve.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PiSpec {
    pub point: Point,
    pub radius: Option<f64>,
    pub spiral_in: Option<f64>,
    pub spiral_out: Option<f64>,
    pub description: Option<String>,
}

impl PiSpec {
    #[must_use]
    pub fn new(point: Point) -> Self {
        Self {
            point,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_curve(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    #[must_use]
    pub fn with_spirals(mut self, spiral_in: f64, spiral_out: f64) -> Self {
        self.spiral_in = Some(spiral_in);
        self.spiral_out = Some(spiral_out);
        self
    }

    fn from_value(index: usize, value: &Value) -> Result<Self, AlignmentError> {
        let f = Fields::new(value, "PIs")?;
        let point = f
            .point("point")?
            .ok_or_else(|| AlignmentError::InvalidAlignPi {
                index,
                message: "missing \"point\"".into(),
            })?;
        Ok(Self {
            point,
            radius: f.number("radius")?,
            spiral_in: f.number("spiralIn")?,
            spiral_out: f.number("spiralOut")?,
            description: f.string("desc")?.map(str::to_string),
        })
    }
}

/// Input for [`Alignment::from_pis`].
#[derive(Debug, Clone, Default)]
pub struct PiAlignmentSpec {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sta_start: f64,
    pub pis: Vec<PiSpec>,
    pub equations: StationEquations,
    pub coordinate_system: CoordinateSystemSpec,
}

impl PiAlignmentSpec {
    /// Parse `{ name, desc, staStart, PIs: [{point, radius, spiralIn, spiralOut}], StaEquation }`.
    pub fn from_value(value: &Value) -> Result<Self, AlignmentError> {
        let f = Fields::new(value, "PI alignment")?;
        let pis = f
            .seq("PIs")?
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(index, v)| PiSpec::from_value(index, v))
            .collect::<Result<Vec<_>, _>>()?;
        let equations = match f.seq("StaEquation")? {
            Some(items) => StationEquations::from_values(items)?,
            None => StationEquations::default(),
        };
        Ok(Self {
            name: f.string("name")?.map(str::to_string),
            description: f.string("desc")?.map(str::to_string),
            sta_start: f.number("staStart")?.unwrap_or(0.0),
            pis,
            equations,
            coordinate_system: CoordinateSystemSpec::default(),
        })
    }
}

/// Spiral quantities for one side of a curve.
#[derive(Debug, Clone, Copy, Default)]
struct Transition {
    length: f64,
    /// End offsets along and across the tangent.
    x: f64,
    y: f64,
    theta: f64,
    /// Shift of the circle from the tangent.
    p: f64,
    /// Position of the shifted circle's tangent point along the tangent.
    k: f64,
}

impl Transition {
    fn new(length: Option<f64>, radius: f64) -> Self {
        let Some(length) = length.filter(|l| *l > 0.0 && l.is_finite()) else {
            return Self::default();
        };
        let end = tangent_offsets(length, radius);
        let theta = length / (2.0 * radius);
        Self {
            length,
            x: end.x,
            y: end.y,
            theta,
            p: end.y - radius * (1.0 - theta.cos()),
            k: end.x - radius * theta.sin(),
        }
    }

    fn is_some(&self) -> bool {
        self.length > 0.0
    }

    /// Distance from the tangent end to the spiral's PI.
    fn long_tangent(&self) -> f64 {
        self.x - self.y / self.theta.tan()
    }
}

/// Elements and end points produced for one PI.
struct CurveRun {
    elements: Vec<GeometryElement>,
    /// Tangent start (TS or PC), or the PI itself for an angle point.
    entry: Point,
    /// Tangent end (ST or PT).
    exit: Point,
}

/// Curve at interior PI `index`, `None` when the tangents barely deflect.
///
/// `first` is the alignment index reported for the run's first element in errors.
fn curve_at(
    index: usize,
    first: usize,
    pi: &PiSpec,
    dir_in: f64,
    dir_out: f64,
) -> Result<Option<CurveRun>, AlignmentError> {
    let signed = normalize_signed_angle(dir_out - dir_in);
    let deflection = signed.abs();
    if deflection < MIN_DEFLECTION {
        return Ok(None);
    }
    let Some(radius) = pi.radius else {
        return Ok(Some(CurveRun {
            elements: Vec::new(),
            entry: pi.point,
            exit: pi.point,
        }));
    };
    if !(radius.is_finite() && radius > 0.0) {
        return Err(AlignmentError::InvalidAlignPi {
            index,
            message: format!("radius must be positive, got {radius}"),
        });
    }
    if deflection >= PI - MIN_DEFLECTION {
        return Err(AlignmentError::InvalidAlignPi {
            index,
            message: "tangents reverse direction".into(),
        });
    }

    let rotation = Rotation::from_sign(signed);
    let sigma = rotation.sign();
    let t_in = Transition::new(pi.spiral_in, radius);
    let t_out = Transition::new(pi.spiral_out, radius);
    let spiral_angle = t_in.theta + t_out.theta;
    if spiral_angle > deflection + MIN_DEFLECTION {
        return Err(AlignmentError::SpiralTooLong {
            index,
            spiral_angle,
            deflection,
        });
    }

    let half_tan = (deflection / 2.0).tan();
    let skew = (t_in.p - t_out.p) / deflection.sin();
    let tangent_in = t_in.k + (radius + t_in.p) * half_tan - skew;
    let tangent_out = t_out.k + (radius + t_out.p) * half_tan + skew;

    let u_in = Point::from_heading(dir_in);
    let u_out = Point::from_heading(dir_out);
    let n_in = u_in.left_normal() * sigma;
    let n_out = u_out.left_normal() * sigma;

    let entry = pi.point - u_in * tangent_in;
    let exit = pi.point + u_out * tangent_out;
    let arc_start = entry + u_in * t_in.x + n_in * t_in.y;
    let arc_end = exit - u_out * t_out.x + n_out * t_out.y;
    let center = entry + u_in * t_in.k + n_in * (radius + t_in.p);

    let mut elements: Vec<GeometryElement> = Vec::with_capacity(3);
    let wrap = |offset: usize| {
        move |source: GeometryError| AlignmentError::Element {
            index: first + offset,
            source,
        }
    };

    if t_in.is_some() {
        let spiral = SpiralSpec {
            rotation: Some(rotation),
            start: Some(entry),
            end: Some(arc_start),
            pi: Some(entry + u_in * t_in.long_tangent()),
            length: Some(t_in.length),
            radius_start: Some(f64::INFINITY),
            radius_end: Some(radius),
            ..SpiralSpec::default()
        }
        .build()
        .map_err(wrap(elements.len()))?;
        elements.push(spiral.into());
    }

    let arc_length = radius * (deflection - spiral_angle);
    if arc_length > POSITION_EPSILON {
        let curve = CurveSpec {
            rotation: Some(rotation),
            start: Some(arc_start),
            end: Some(arc_end),
            center: Some(center),
            ..CurveSpec::default()
        }
        .build()
        .map_err(wrap(elements.len()))?;
        elements.push(curve.into());
    } else {
        debug!(index, "spirals take the whole deflection, no circular arc");
    }

    if t_out.is_some() {
        let spiral = SpiralSpec {
            rotation: Some(rotation),
            start: Some(arc_end),
            end: Some(exit),
            pi: Some(exit - u_out * t_out.long_tangent()),
            length: Some(t_out.length),
            radius_start: Some(radius),
            radius_end: Some(f64::INFINITY),
            ..SpiralSpec::default()
        }
        .build()
        .map_err(wrap(elements.len()))?;
        elements.push(spiral.into());
    }

    debug!(
        index,
        radius,
        deflection,
        tangent_in,
        tangent_out,
        rotation = %rotation,
        "curve placed at PI"
    );
    Ok(Some(CurveRun {
        elements,
        entry,
        exit,
    }))
}

impl Alignment {
    /// Build an alignment from points of intersection.
    ///
    /// Interior PIs with a radius get a circular arc, optionally between
    /// entry and exit spirals; tangents join everything else. The result
    /// starts at the first PI and ends at the last one.
    pub fn from_pis(spec: PiAlignmentSpec) -> Result<Self, AlignmentError> {
        let pis = &spec.pis;
        if pis.len() < 2 {
            return Err(AlignmentError::TooFewPis { count: pis.len() });
        }
        for (index, pair) in pis.windows(2).enumerate() {
            if pair[0].point.distance_to(pair[1].point) <= POSITION_EPSILON {
                return Err(AlignmentError::InvalidAlignPi {
                    index: index + 1,
                    message: "coincides with the previous PI".into(),
                });
            }
        }

        let mut elements: Vec<GeometryElement> = Vec::new();
        let mut cursor = pis[0].point;
        for index in 1..pis.len() - 1 {
            let pi = &pis[index];
            let dir_in = pis[index - 1].point.heading_to(pi.point);
            let dir_out = pi.point.heading_to(pis[index + 1].point);
            let first = elements.len() + 1;
            let Some(run) = curve_at(index, first, pi, dir_in, dir_out)? else {
                continue;
            };

            let lead = run.entry - cursor;
            if lead.dot(Point::from_heading(dir_in)) < -POSITION_EPSILON {
                return Err(AlignmentError::TangentsOverlap { index });
            }
            if lead.length() > POSITION_EPSILON {
                elements.push(tangent(elements.len(), cursor, run.entry)?);
            }
            elements.extend(run.elements);
            cursor = run.exit;
        }

        let last = pis.len() - 1;
        let end = pis[last].point;
        let tail = end - cursor;
        let dir_last = pis[last - 1].point.heading_to(end);
        if tail.dot(Point::from_heading(dir_last)) < -POSITION_EPSILON {
            return Err(AlignmentError::TangentsOverlap { index: last - 1 });
        }
        if tail.length() > POSITION_EPSILON {
            elements.push(tangent(elements.len(), cursor, end)?);
        }

        debug!(pis = pis.len(), elements = elements.len(), "alignment synthesised from PIs");
        AlignmentSpec {
            name: spec.name,
            description: spec.description,
            sta_start: spec.sta_start,
            length: None,
            start: None,
            elements,
            equations: spec.equations,
            align_pis: pis
                .iter()
                .map(|pi| AlignPi {
                    point: pi.point,
                    station: None,
                    description: pi.description.clone(),
                })
                .collect(),
            coordinate_system: spec.coordinate_system,
        }
        .assemble(false)
    }
}

fn tangent(index: usize, start: Point, end: Point) -> Result<GeometryElement, AlignmentError> {
    Line::new(start, end)
        .map(GeometryElement::from)
        .map_err(|source| AlignmentError::Element { index, source })
}
