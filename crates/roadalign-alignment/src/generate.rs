use roadalign_core::{sample_count, Point, MAX_SAMPLES, POSITION_EPSILON};
use roadalign_geometry::{ElementKind, Geometry, Side};
use serde::Serialize;

use crate::alignment::{Alignment, STATION_SLACK};
use crate::error::AlignmentError;

/// Station spacing per element kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationIncrements {
    pub line: f64,
    pub curve: f64,
    pub spiral: f64,
}

impl Default for StationIncrements {
    fn default() -> Self {
        Self::uniform(10.0)
    }
}

impl StationIncrements {
    #[must_use]
    pub fn uniform(step: f64) -> Self {
        Self {
            line: step,
            curve: step,
            spiral: step,
        }
    }

    #[must_use]
    pub fn for_kind(&self, kind: ElementKind) -> f64 {
        match kind {
            ElementKind::Line => self.line,
            ElementKind::Curve => self.curve,
            ElementKind::Spiral => self.spiral,
        }
    }

    fn validate(&self) -> Result<(), AlignmentError> {
        for (kind, step) in [
            (ElementKind::Line, self.line),
            (ElementKind::Curve, self.curve),
            (ElementKind::Spiral, self.spiral),
        ] {
            if !(step.is_finite() && step > 0.0) {
                return Err(AlignmentError::invalid(format!(
                    "{kind} increment must be positive, got {step}"
                )));
            }
        }
        Ok(())
    }
}

/// A generated point and the station it was taken at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StationPoint {
    pub station: f64,
    #[serde(flatten)]
    pub point: Point,
}

impl Alignment {
    /// Displayed stations from start to end every `step`, skipping equation
    /// gaps and always ending on the end station.
    fn station_walk(&self, step: f64) -> Result<Vec<f64>, AlignmentError> {
        let (start, end) = (self.sta_start(), self.sta_end());
        let count = sample_count(end - start, step).ok_or_else(|| step_error(step))?;
        let equations = self.station_equations();

        let mut out: Vec<f64> = Vec::with_capacity(count + 2);
        for i in 0..=count {
            let station = start + i as f64 * step;
            if station > end {
                break;
            }
            if !equations.is_void(station) && out.last().map_or(true, |last| station > *last) {
                out.push(station);
            }
        }
        if out.last().map_or(true, |last| (end - last).abs() > POSITION_EPSILON) {
            out.push(end);
        }
        Ok(out)
    }

    /// Centreline points every `step` of displayed station.
    pub fn generate_points(&self, step: f64) -> Result<Vec<StationPoint>, AlignmentError> {
        self.station_walk(step)?
            .into_iter()
            .map(|station| {
                Ok(StationPoint {
                    station,
                    point: self.get_point_at_station(station)?,
                })
            })
            .collect()
    }

    /// Points `offset` away from the centreline towards `side`, every `step`.
    pub fn generate_offset_points(
        &self,
        offset: f64,
        step: f64,
        side: Side,
    ) -> Result<Vec<StationPoint>, AlignmentError> {
        if !(offset.is_finite() && offset >= 0.0) {
            return Err(AlignmentError::invalid(format!(
                "offset must be non-negative, got {offset}"
            )));
        }
        self.station_walk(step)?
            .into_iter()
            .map(|station| {
                let (p, n) = self.get_orthogonal_at_station(station, side)?;
                Ok(StationPoint {
                    station,
                    point: p + n * offset,
                })
            })
            .collect()
    }

    /// Ascending, de-duplicated stations for cross sections.
    ///
    /// `range` defaults to the whole alignment. Each element contributes the
    /// multiples of its own increment that fall on it, plus its end stations
    /// when `at_geometry_points` is set.
    pub fn generate_stations(
        &self,
        range: Option<(f64, f64)>,
        increments: StationIncrements,
        at_geometry_points: bool,
    ) -> Result<Vec<f64>, AlignmentError> {
        let (start, end) = range.unwrap_or((self.sta_start(), self.sta_end()));
        if !(start <= end) {
            return Err(AlignmentError::invalid(format!(
                "start station {start} is after end station {end}"
            )));
        }
        for station in [start, end] {
            if !self.contains_station(station) {
                return Err(AlignmentError::StationOutOfRange {
                    station,
                    start: self.sta_start(),
                    end: self.sta_end(),
                });
            }
        }
        increments.validate()?;

        let equations = self.station_equations();
        let mut stations = vec![start, end];
        for (element, &s0) in self.elements().iter().zip(self.internal_starts()) {
            let s1 = s0 + element.length();
            let (d0, d1) = (equations.to_station(s0), equations.to_station(s1));
            if at_geometry_points {
                stations.extend([d0, d1].into_iter().filter(|d| *d >= start && *d <= end));
            }

            let step = increments.for_kind(element.kind());
            let (lo, hi) = (start.max(d0), end.min(d1));
            if lo > hi {
                continue;
            }
            let count = sample_count(hi - lo, step).ok_or_else(|| step_error(step))?;
            let mut k = (lo / step).ceil();
            for _ in 0..=count + 1 {
                let station = k * step;
                if station > hi {
                    break;
                }
                if !equations.is_void(station) {
                    let internal = equations.to_internal(station);
                    if internal >= s0 - STATION_SLACK && internal <= s1 + STATION_SLACK {
                        stations.push(station);
                    }
                }
                k += 1.0;
            }
        }

        stations.sort_by(f64::total_cmp);
        stations.dedup_by(|a, b| (*a - *b).abs() <= STATION_SLACK);
        Ok(stations)
    }
}

fn step_error(step: f64) -> AlignmentError {
    AlignmentError::invalid(format!(
        "step must be positive and give at most {MAX_SAMPLES} points, got {step}"
    ))
}
