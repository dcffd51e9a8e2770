use std::fmt;
use std::str::FromStr;

use roadalign_parser::{Fields, Value};
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// Side of the path, relative to the direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Left,
    Right,
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            _ => Err(format!("side must be \"left\" or \"right\", got \"{s}\"")),
        }
    }
}

/// Turning sense of a curve or spiral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    Cw,
    Ccw,
}

impl Rotation {
    /// `+1` for counter-clockwise (left) turns, `-1` for clockwise.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Rotation::Ccw => 1.0,
            Rotation::Cw => -1.0,
        }
    }

    #[must_use]
    pub fn from_sign(sign: f64) -> Self {
        if sign >= 0.0 {
            Rotation::Ccw
        } else {
            Rotation::Cw
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Rotation::Cw => "cw",
            Rotation::Ccw => "ccw",
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rotation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cw" => Ok(Rotation::Cw),
            "ccw" => Ok(Rotation::Ccw),
            _ => Err(format!("rot must be \"cw\" or \"ccw\", got \"{s}\"")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Line,
    Curve,
    Spiral,
}

impl ElementKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Line => "Line",
            ElementKind::Curve => "Curve",
            ElementKind::Spiral => "Spiral",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive fields every element carries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Header {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Displayed station at the element start; filled in by the owning alignment
    /// when the input leaves it out.
    pub sta_start: Option<f64>,
}

impl Header {
    pub(crate) fn read(f: &Fields<'_>) -> Result<Self, GeometryError> {
        Ok(Self {
            name: f.string("name")?.map(str::to_string),
            description: f.string("desc")?.map(str::to_string),
            sta_start: f.number("staStart")?,
        })
    }

    pub(crate) fn write(&self, kind: ElementKind, out: &mut Value) {
        out.insert("Type", kind.as_str().into());
        out.insert(
            "name",
            self.name.clone().map_or(Value::Null, Value::String),
        );
        out.insert(
            "desc",
            self.description.clone().map_or(Value::Null, Value::String),
        );
        out.insert("staStart", Value::optional_number(self.sta_start));
    }
}

pub(crate) fn read_rotation(
    f: &Fields<'_>,
    element: &'static str,
) -> Result<Option<Rotation>, GeometryError> {
    f.string("rot")?
        .map(|s| {
            s.parse().map_err(|message| GeometryError::InvalidField {
                element,
                field: "rot",
                message,
            })
        })
        .transpose()
}

/// Validate a distance against `[0, length]`, absorbing rounding noise at the ends.
pub(crate) fn check_distance(s: f64, length: f64) -> Result<f64, GeometryError> {
    const SLACK: f64 = 1e-9;
    if !s.is_finite() || s < -SLACK || s > length + SLACK {
        return Err(GeometryError::DistanceOutOfRange {
            distance: s,
            length,
        });
    }
    Ok(s.clamp(0.0, length))
}
