use roadalign_core::{CoordinateSystem, Point, SystemType, CONTINUITY_TOLERANCE};
use roadalign_geometry::{Geometry, GeometryElement, Side};
use roadalign_parser::{Fields, Value};
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::error::AlignmentError;
use crate::stations::StationEquations;

/// Query points closer than this to the centreline have zero offset.
const ON_LINE_TOLERANCE: f64 = 1e-3;

/// Slack when matching an internal station against element bounds.
pub(crate) const STATION_SLACK: f64 = 1e-9;

/// A point of intersection recorded on the alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignPi {
    pub point: Point,
    pub station: Option<f64>,
    pub description: Option<String>,
}

impl AlignPi {
    fn from_value(index: usize, value: &Value) -> Result<Self, AlignmentError> {
        let f = Fields::new(value, "AlignPIs")?;
        let point = f
            .point("point")?
            .ok_or_else(|| AlignmentError::InvalidAlignPi {
                index,
                message: "missing \"point\"".into(),
            })?;
        Ok(Self {
            point,
            station: f.number("station")?,
            description: f.string("desc")?.map(str::to_string),
        })
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut v = Value::map();
        v.insert("point", Value::point(self.point));
        v.insert("station", Value::optional_number(self.station));
        if let Some(d) = &self.description {
            v.insert("desc", Value::from(d.as_str()));
        }
        v
    }
}

/// Frame in which a query point is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputSystem {
    /// The alignment's active coordinate system.
    #[default]
    Current,
    Global,
}

/// Answer of [`Alignment::get_station_offset`].
///
/// Offsets are negative to the left of the direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StationOffset {
    pub station: f64,
    pub offset: f64,
}

/// Coordinate system as written in a document. `local` systems take their
/// missing origin and rotation from the alignment start.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CoordinateSystemSpec {
    pub system_type: SystemType,
    pub origin: Option<Point>,
    pub rotation: Option<f64>,
    pub swap: bool,
}

impl CoordinateSystemSpec {
    fn from_fields(f: &Fields<'_>) -> Result<Self, AlignmentError> {
        let system_type = match f.string("system_type")? {
            Some(s) => s
                .parse::<SystemType>()
                .map_err(|e| AlignmentError::invalid(e.to_string()))?,
            None => SystemType::Global,
        };
        Ok(Self {
            system_type,
            origin: f.point("origin")?,
            rotation: f.number("rotation")?,
            swap: f.boolean("swap")?.unwrap_or(false),
        })
    }

    fn resolve(self, start: Point, dir_start: f64) -> Result<CoordinateSystem, AlignmentError> {
        match self.system_type {
            SystemType::Global => Ok(CoordinateSystem::global(self.swap)),
            SystemType::Local => Ok(CoordinateSystem::local(
                self.origin.unwrap_or(start),
                self.rotation.unwrap_or(dir_start),
                self.swap,
            )),
            SystemType::Custom => {
                let origin = self.origin.ok_or_else(|| {
                    AlignmentError::invalid("custom coordinate system needs an origin")
                })?;
                Ok(CoordinateSystem::custom(
                    origin,
                    self.rotation.unwrap_or(0.0),
                    self.swap,
                ))
            }
        }
    }
}

/// Everything needed to assemble an [`Alignment`].
#[derive(Debug, Clone, Default)]
pub struct AlignmentSpec {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sta_start: f64,
    pub length: Option<f64>,
    pub start: Option<Point>,
    pub elements: Vec<GeometryElement>,
    pub equations: StationEquations,
    pub align_pis: Vec<AlignPi>,
    pub coordinate_system: CoordinateSystemSpec,
}

impl AlignmentSpec {
    pub fn from_value(value: &Value) -> Result<Self, AlignmentError> {
        let f = Fields::new(value, "Alignment")?;

        let elements = f
            .seq("CoordGeom")?
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(index, v)| {
                GeometryElement::from_value(v)
                    .map_err(|source| AlignmentError::Element { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let equations = match f.seq("StaEquation")? {
            Some(items) => StationEquations::from_values(items)?,
            None => StationEquations::default(),
        };

        let align_pis = f
            .seq("AlignPIs")?
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(index, v)| AlignPi::from_value(index, v))
            .collect::<Result<Vec<_>, _>>()?;

        let coordinate_system = match f.nested("coordinateSystem")? {
            Some(cs) => CoordinateSystemSpec::from_fields(&cs)?,
            None => CoordinateSystemSpec::default(),
        };

        Ok(Self {
            name: f.string("name")?.map(str::to_string),
            description: f.string("desc")?.map(str::to_string),
            sta_start: f.number("staStart")?.unwrap_or(0.0),
            length: f.number("length")?,
            start: f.point("start")?,
            elements,
            equations,
            align_pis,
            coordinate_system,
        })
    }

    /// Assemble and validate continuity between consecutive elements.
    pub fn build(self) -> Result<Alignment, AlignmentError> {
        self.assemble(true)
    }

    pub(crate) fn assemble(self, check_continuity: bool) -> Result<Alignment, AlignmentError> {
        let Some(first) = self.elements.first() else {
            return Err(AlignmentError::invalid("alignment has no geometry elements"));
        };
        if !self.sta_start.is_finite() {
            return Err(AlignmentError::invalid(format!(
                "staStart must be finite, got {}",
                self.sta_start
            )));
        }

        if let Some(start) = self.start {
            let gap = start.distance_to(first.start());
            if gap > CONTINUITY_TOLERANCE {
                return Err(AlignmentError::StartMismatch { gap });
            }
        }
        if check_continuity {
            for (index, pair) in self.elements.windows(2).enumerate() {
                let gap = pair[0].end().distance_to(pair[1].start());
                if gap > CONTINUITY_TOLERANCE {
                    return Err(AlignmentError::DiscontinuousAlignment { index, gap });
                }
            }
        }

        let equations = self.equations;
        let mut elements = self.elements;
        let mut internal_starts = Vec::with_capacity(elements.len());
        let mut current = equations.to_internal(self.sta_start);
        for (index, element) in elements.iter_mut().enumerate() {
            let internal = match element.sta_start() {
                Some(sta) => {
                    let internal = equations.to_internal(sta);
                    if (internal - current).abs() > CONTINUITY_TOLERANCE {
                        warn!(index, sta, expected = current, "element station does not follow the chain");
                    }
                    internal
                }
                None => {
                    element.set_sta_start(equations.to_station(current));
                    current
                }
            };
            internal_starts.push(internal);
            current = internal + element.length();
        }

        let length: f64 = elements.iter().map(Geometry::length).sum();
        if let Some(declared) = self.length {
            if (declared - length).abs() > CONTINUITY_TOLERANCE {
                warn!(declared, length, "declared alignment length differs from its elements");
            }
        }

        let coordinate_system = self
            .coordinate_system
            .resolve(elements[0].start(), elements[0].dir_start())?;

        let mut alignment = Alignment {
            name: self.name,
            description: self.description,
            sta_start: self.sta_start,
            length,
            elements,
            internal_starts,
            equations,
            align_pis: Vec::new(),
            coordinate_system,
        };

        let mut pis = self.align_pis;
        for (index, pi) in pis.iter_mut().enumerate() {
            if pi.station.is_none() {
                pi.station = alignment
                    .get_station_offset(pi.point, InputSystem::Global)
                    .map(|so| so.station);
                if pi.station.is_none() {
                    warn!(index, x = pi.point.x, y = pi.point.y, "PI does not project onto the alignment");
                }
            }
        }
        if pis.iter().all(|pi| pi.station.is_some()) {
            pis.sort_by(|a, b| {
                a.station
                    .partial_cmp(&b.station)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        alignment.align_pis = pis;

        debug!(
            name = alignment.name.as_deref().unwrap_or(""),
            elements = alignment.elements.len(),
            length = alignment.length,
            sta_end = alignment.sta_end(),
            "assembled alignment"
        );
        Ok(alignment)
    }
}

/// A chain of geometry elements with stationing.
///
/// Geometry is kept in the metric frame; queries return results in the
/// active [`CoordinateSystem`], except [`Alignment::to_value`] which always
/// writes the metric frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    name: Option<String>,
    description: Option<String>,
    sta_start: f64,
    length: f64,
    elements: Vec<GeometryElement>,
    internal_starts: Vec<f64>,
    equations: StationEquations,
    align_pis: Vec<AlignPi>,
    coordinate_system: CoordinateSystem,
}

impl Alignment {
    pub fn from_value(value: &Value) -> Result<Self, AlignmentError> {
        AlignmentSpec::from_value(value)?.build()
    }

    /// Parse a JSON or YAML alignment document.
    pub fn from_document_str(text: &str) -> Result<Self, AlignmentError> {
        Self::from_value(&Value::from_document_str(text)?)
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn sta_start(&self) -> f64 {
        self.sta_start
    }

    #[must_use]
    pub fn sta_end(&self) -> f64 {
        self.equations.to_station(self.internal_end())
    }

    /// Sum of element lengths.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    #[must_use]
    pub fn elements(&self) -> &[GeometryElement] {
        &self.elements
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Internal station at the start of each element.
    #[must_use]
    pub fn internal_starts(&self) -> &[f64] {
        &self.internal_starts
    }

    #[must_use]
    pub fn station_equations(&self) -> &StationEquations {
        &self.equations
    }

    #[must_use]
    pub fn coordinate_system(&self) -> &CoordinateSystem {
        &self.coordinate_system
    }

    #[must_use]
    pub fn station_to_internal(&self, station: f64) -> f64 {
        self.equations.to_internal(station)
    }

    #[must_use]
    pub fn internal_to_station(&self, internal: f64) -> f64 {
        self.equations.to_station(internal)
    }

    pub(crate) fn internal_start(&self) -> f64 {
        self.internal_starts[0]
    }

    pub(crate) fn internal_end(&self) -> f64 {
        let last = self.elements.len() - 1;
        self.internal_starts[last] + self.elements[last].length()
    }

    #[must_use]
    pub fn contains_station(&self, station: f64) -> bool {
        self.locate(station).is_ok()
    }

    fn out_of_range(&self, station: f64) -> AlignmentError {
        AlignmentError::StationOutOfRange {
            station,
            start: self.sta_start,
            end: self.sta_end(),
        }
    }

    /// Owning element index and distance along it for a displayed station.
    /// The first element whose range holds the station wins.
    pub(crate) fn locate(&self, station: f64) -> Result<(usize, f64), AlignmentError> {
        let internal = self.equations.to_internal(station);
        if !(internal >= self.internal_start() - STATION_SLACK
            && internal <= self.internal_end() + STATION_SLACK)
        {
            return Err(self.out_of_range(station));
        }
        for (index, (element, start)) in self.elements.iter().zip(&self.internal_starts).enumerate() {
            let length = element.length();
            if internal >= start - STATION_SLACK && internal <= start + length + STATION_SLACK {
                let s = (internal - start).clamp(0.0, length);
                trace!(station, index, s, "station located");
                return Ok((index, s));
            }
        }
        Err(self.out_of_range(station))
    }

    pub fn get_element_at_station(&self, station: f64) -> Result<&GeometryElement, AlignmentError> {
        let (index, _) = self.locate(station)?;
        Ok(&self.elements[index])
    }

    pub fn get_point_at_station(&self, station: f64) -> Result<Point, AlignmentError> {
        let (index, s) = self.locate(station)?;
        let p = self.elements[index]
            .point_at_distance(s)
            .map_err(|source| AlignmentError::Element { index, source })?;
        Ok(self.coordinate_system.to_system(p))
    }

    /// Point at `station` and the unit normal towards `side`.
    pub fn get_orthogonal_at_station(
        &self,
        station: f64,
        side: Side,
    ) -> Result<(Point, Point), AlignmentError> {
        let (index, s) = self.locate(station)?;
        let (p, n) = self.elements[index]
            .orthogonal(s, side)
            .map_err(|source| AlignmentError::Element { index, source })?;
        Ok((
            self.coordinate_system.to_system(p),
            self.coordinate_system.vector_to_system(n),
        ))
    }

    /// Station and signed offset of the nearest projection of `point`.
    ///
    /// Every element is tried; the closest foot wins and ties go to the
    /// earlier element. `None` when no element takes the projection.
    #[must_use]
    pub fn get_station_offset(&self, point: Point, input: InputSystem) -> Option<StationOffset> {
        let query = match input {
            InputSystem::Current => self.coordinate_system.from_system(point),
            InputSystem::Global => point,
        };

        let mut best: Option<(f64, usize, f64, Point, Point)> = None;
        for (index, element) in self.elements.iter().enumerate() {
            let (s, foot, left) = match element
                .project_point(query)
                .and_then(|s| element.orthogonal(s, Side::Left).map(|(p, n)| (s, p, n)))
            {
                Ok(found) => found,
                Err(e) => {
                    trace!(index, error = %e, "no projection");
                    continue;
                }
            };
            let distance = foot.distance_to(query);
            if best.map_or(true, |(d, ..)| distance < d) {
                best = Some((distance, index, s, foot, left));
            }
        }

        let (distance, index, s, foot, left) = best?;
        let station = self.equations.to_station(self.internal_starts[index] + s);
        let offset = if distance < ON_LINE_TOLERANCE {
            0.0
        } else if (query - foot).dot(left) > 0.0 {
            -distance
        } else {
            distance
        };
        Some(StationOffset { station, offset })
    }

    /// Align PIs in the active coordinate system.
    #[must_use]
    pub fn align_pis(&self) -> Vec<AlignPi> {
        self.align_pis
            .iter()
            .map(|pi| AlignPi {
                point: self.coordinate_system.to_system(pi.point),
                ..pi.clone()
            })
            .collect()
    }

    /// The align PI recorded within `tolerance` of `station`.
    #[must_use]
    pub fn pi_at_station(&self, station: f64, tolerance: f64) -> Option<AlignPi> {
        self.align_pis()
            .into_iter()
            .find(|pi| pi.station.is_some_and(|s| (s - station).abs() <= tolerance))
    }

    #[must_use]
    pub fn start_point(&self) -> Point {
        self.coordinate_system.to_system(self.elements[0].start())
    }

    #[must_use]
    pub fn end_point(&self) -> Point {
        let last = self.elements.len() - 1;
        self.coordinate_system.to_system(self.elements[last].end())
    }

    /// Switch the active coordinate system, keeping the axis swap.
    ///
    /// `local` defaults to the alignment start point and start direction;
    /// `custom` needs an origin.
    pub fn set_coordinate_system(
        &mut self,
        system_type: SystemType,
        origin: Option<Point>,
        rotation: Option<f64>,
    ) -> Result<(), AlignmentError> {
        let spec = CoordinateSystemSpec {
            system_type,
            origin,
            rotation,
            swap: self.coordinate_system.swap,
        };
        self.coordinate_system =
            spec.resolve(self.elements[0].start(), self.elements[0].dir_start())?;
        debug!(system = %system_type, "coordinate system changed");
        Ok(())
    }

    /// Document form in the metric frame.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut v = Value::map();
        if let Some(name) = &self.name {
            v.insert("name", Value::from(name.as_str()));
        }
        if let Some(desc) = &self.description {
            v.insert("desc", Value::from(desc.as_str()));
        }
        v.insert("length", Value::number(self.length));
        v.insert("staStart", Value::number(self.sta_start));
        v.insert("staEnd", Value::number(self.sta_end()));
        v.insert("start", Value::point(self.elements[0].start()));
        let last = self.elements.len() - 1;
        v.insert("endPoint", Value::point(self.elements[last].end()));
        v.insert("elementCount", Value::number(self.elements.len() as f64));
        v.insert("piCount", Value::number(self.align_pis.len() as f64));
        v.insert("stationEquationCount", Value::number(self.equations.len() as f64));
        v.insert(
            "AlignPIs",
            Value::Seq(self.align_pis.iter().map(AlignPi::to_value).collect()),
        );
        v.insert("StaEquation", self.equations.to_value());
        v.insert(
            "CoordGeom",
            Value::Seq(self.elements.iter().map(Geometry::to_value).collect()),
        );

        let cs = &self.coordinate_system;
        let mut system = Value::map();
        system.insert("system_type", Value::from(cs.system_type.as_str()));
        system.insert("origin", Value::point(cs.origin));
        system.insert("rotation", Value::number(cs.rotation));
        system.insert("swap", Value::Bool(cs.swap));
        v.insert("coordinateSystem", system);
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use roadalign_geometry::{Curve, Line, Rotation};

    fn line(x0: f64, y0: f64, x1: f64, y1: f64) -> GeometryElement {
        Line::new(Point::new(x0, y0), Point::new(x1, y1)).unwrap().into()
    }

    fn straight(sta_start: f64, equations: StationEquations) -> Alignment {
        AlignmentSpec {
            sta_start,
            elements: vec![line(0.0, 0.0, 100.0, 0.0), line(100.0, 0.0, 300.0, 0.0)],
            equations,
            ..AlignmentSpec::default()
        }
        .build()
        .unwrap()
    }

    #[test]
    fn stations_are_walked_along_the_chain() {
        let a = straight(1000.0, StationEquations::default());
        assert_eq!(a.elements()[0].sta_start(), Some(1000.0));
        assert_eq!(a.elements()[1].sta_start(), Some(1100.0));
        assert_abs_diff_eq!(a.sta_end(), 1300.0);
        assert_abs_diff_eq!(a.length(), 300.0);
        assert_eq!(a.internal_starts(), &[1000.0, 1100.0]);
    }

    #[test]
    fn first_element_wins_at_shared_station() {
        let a = straight(0.0, StationEquations::default());
        assert!(matches!(
            a.get_element_at_station(100.0).unwrap(),
            GeometryElement::Line(l) if l.end() == Point::new(100.0, 0.0)
        ));
    }

    #[test]
    fn out_of_range_stations_fail() {
        let a = straight(0.0, StationEquations::default());
        for sta in [-0.5, 300.5, f64::NAN] {
            assert!(matches!(
                a.get_point_at_station(sta),
                Err(AlignmentError::StationOutOfRange { .. })
            ));
        }
        assert!(a.contains_station(300.0));
        assert!(!a.contains_station(300.5));
    }

    #[test]
    fn empty_alignment_is_rejected() {
        let err = AlignmentSpec::default().build().unwrap_err();
        assert!(matches!(err, AlignmentError::InvalidArgument { .. }));
    }

    #[test]
    fn gap_between_elements_is_rejected() {
        let err = AlignmentSpec {
            elements: vec![line(0.0, 0.0, 100.0, 0.0), line(100.01, 0.0, 200.0, 0.0)],
            ..AlignmentSpec::default()
        }
        .build()
        .unwrap_err();
        assert!(matches!(
            err,
            AlignmentError::DiscontinuousAlignment { index: 0, .. }
        ));
    }

    #[test]
    fn start_point_must_match_first_element() {
        let err = AlignmentSpec {
            start: Some(Point::new(0.0, 1.0)),
            elements: vec![line(0.0, 0.0, 100.0, 0.0)],
            ..AlignmentSpec::default()
        }
        .build()
        .unwrap_err();
        assert!(matches!(err, AlignmentError::StartMismatch { .. }));
    }

    #[test]
    fn offset_sign_follows_left_negative() {
        let a = straight(0.0, StationEquations::default());
        let left = a
            .get_station_offset(Point::new(50.0, 1.0), InputSystem::Global)
            .unwrap();
        assert_abs_diff_eq!(left.station, 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(left.offset, -1.0, epsilon = 1e-9);
        let right = a
            .get_station_offset(Point::new(150.0, -2.5), InputSystem::Global)
            .unwrap();
        assert_abs_diff_eq!(right.station, 150.0, epsilon = 1e-9);
        assert_abs_diff_eq!(right.offset, 2.5, epsilon = 1e-9);
        let on = a
            .get_station_offset(Point::new(150.0, 0.0005), InputSystem::Global)
            .unwrap();
        assert_eq!(on.offset, 0.0);
    }

    #[test]
    fn point_beyond_the_ends_has_no_station() {
        let a = straight(0.0, StationEquations::default());
        assert!(a
            .get_station_offset(Point::new(-5.0, 1.0), InputSystem::Global)
            .is_none());
    }

    #[test]
    fn element_without_a_projection_does_not_end_the_search() {
        let a = AlignmentSpec {
            elements: vec![line(0.0, 0.0, 100.0, 0.0), line(100.0, 0.0, 100.0, 100.0)],
            ..AlignmentSpec::default()
        }
        .build()
        .unwrap();
        let so = a
            .get_station_offset(Point::new(105.0, 50.0), InputSystem::Global)
            .unwrap();
        assert_abs_diff_eq!(so.station, 150.0, epsilon = 1e-9);
        assert_abs_diff_eq!(so.offset, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn align_pis_get_projected_stations_and_sorted() {
        let v = Value::from_json_value(&serde_json::json!({
            "staStart": 10,
            "AlignPIs": [
                {"point": [300, 0], "desc": "end"},
                {"point": [0, 0], "desc": "begin"}
            ],
            "CoordGeom": [
                {"Type": "Line", "Start": [0, 0], "End": [300, 0]}
            ]
        }));
        let a = Alignment::from_value(&v).unwrap();
        let pis = a.align_pis();
        assert_eq!(pis[0].description.as_deref(), Some("begin"));
        assert_abs_diff_eq!(pis[0].station.unwrap(), 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pis[1].station.unwrap(), 310.0, epsilon = 1e-9);
        assert_eq!(
            a.pi_at_station(310.0, 1e-6).and_then(|p| p.description),
            Some("end".to_string())
        );
        assert!(a.pi_at_station(200.0, 1e-6).is_none());
    }

    #[test]
    fn local_system_anchors_at_start() {
        let mut a = AlignmentSpec {
            elements: vec![line(10.0, 10.0, 10.0, 110.0)],
            ..AlignmentSpec::default()
        }
        .build()
        .unwrap();
        a.set_coordinate_system(SystemType::Local, None, None).unwrap();
        assert_abs_diff_eq!(a.start_point().x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(a.start_point().y, 0.0, epsilon = 1e-12);
        let p = a.get_point_at_station(40.0).unwrap();
        assert_abs_diff_eq!(p.x, 40.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-9);

        let so = a
            .get_station_offset(Point::new(40.0, 3.0), InputSystem::Current)
            .unwrap();
        assert_abs_diff_eq!(so.station, 40.0, epsilon = 1e-9);
        assert_abs_diff_eq!(so.offset, -3.0, epsilon = 1e-9);

        assert!(matches!(
            a.set_coordinate_system(SystemType::Custom, None, None),
            Err(AlignmentError::InvalidArgument { .. })
        ));
        a.set_coordinate_system(SystemType::Global, None, None).unwrap();
        assert_eq!(a.start_point(), Point::new(10.0, 10.0));
    }

    #[test]
    fn curve_then_line_projection_prefers_nearest() {
        let arc = Curve::from_center(
            Point::new(100.0, 0.0),
            Point::new(100.0, 50.0),
            Point::new(150.0, 50.0),
            Rotation::Ccw,
        )
        .unwrap();
        let a = AlignmentSpec {
            elements: vec![line(0.0, 0.0, 100.0, 0.0), arc.into()],
            ..AlignmentSpec::default()
        }
        .build()
        .unwrap();
        let so = a
            .get_station_offset(Point::new(160.0, 50.0), InputSystem::Global)
            .unwrap();
        assert_abs_diff_eq!(so.station, 100.0 + 50.0 * std::f64::consts::FRAC_PI_2, epsilon = 1e-9);
        assert_abs_diff_eq!(so.offset, 10.0, epsilon = 1e-9);
    }
}
