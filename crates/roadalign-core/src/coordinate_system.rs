use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::point::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemType {
    #[default]
    Global,
    Local,
    Custom,
}

impl SystemType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SystemType::Global => "global",
            SystemType::Local => "local",
            SystemType::Custom => "custom",
        }
    }
}

impl fmt::Display for SystemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSystemType(pub String);

impl fmt::Display for UnknownSystemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown coordinate system type \"{}\" (expected global, local or custom)",
            self.0
        )
    }
}

impl std::error::Error for UnknownSystemType {}

impl FromStr for SystemType {
    type Err = UnknownSystemType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "global" => Ok(SystemType::Global),
            "local" => Ok(SystemType::Local),
            "custom" => Ok(SystemType::Custom),
            _ => Err(UnknownSystemType(s.to_string())),
        }
    }
}

/// Presentation frame for alignment output.
///
/// Geometry is always stored in the metric frame. Output goes through
/// [`CoordinateSystem::to_system`]: translate by `-origin`, rotate by `-rotation`,
/// then optionally swap the axes. The global system skips the first two steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSystem {
    pub system_type: SystemType,
    pub origin: Point,
    /// Radians, counter-clockwise.
    pub rotation: f64,
    pub swap: bool,
}

impl Default for CoordinateSystem {
    fn default() -> Self {
        Self::global(false)
    }
}

impl CoordinateSystem {
    #[must_use]
    pub fn global(swap: bool) -> Self {
        Self {
            system_type: SystemType::Global,
            origin: Point::ORIGIN,
            rotation: 0.0,
            swap,
        }
    }

    #[must_use]
    pub fn local(origin: Point, rotation: f64, swap: bool) -> Self {
        Self {
            system_type: SystemType::Local,
            origin,
            rotation,
            swap,
        }
    }

    #[must_use]
    pub fn custom(origin: Point, rotation: f64, swap: bool) -> Self {
        Self {
            system_type: SystemType::Custom,
            origin,
            rotation,
            swap,
        }
    }

    #[must_use]
    pub fn is_global(&self) -> bool {
        self.system_type == SystemType::Global
    }

    fn apply_swap(&self, p: Point) -> Point {
        if self.swap {
            p.swapped()
        } else {
            p
        }
    }

    /// Metric frame to this system.
    #[must_use]
    pub fn to_system(&self, p: Point) -> Point {
        if self.is_global() {
            return self.apply_swap(p);
        }
        self.apply_swap((p - self.origin).rotate(-self.rotation))
    }

    /// This system back to the metric frame.
    #[must_use]
    pub fn from_system(&self, p: Point) -> Point {
        let p = self.apply_swap(p);
        if self.is_global() {
            return p;
        }
        p.rotate(self.rotation) + self.origin
    }

    /// Like [`Self::to_system`] without the translation.
    #[must_use]
    pub fn vector_to_system(&self, v: Point) -> Point {
        if self.is_global() {
            return self.apply_swap(v);
        }
        self.apply_swap(v.rotate(-self.rotation))
    }

    #[must_use]
    pub fn vector_from_system(&self, v: Point) -> Point {
        let v = self.apply_swap(v);
        if self.is_global() {
            return v;
        }
        v.rotate(self.rotation)
    }

    #[must_use]
    pub fn angle_to_system(&self, angle: f64) -> f64 {
        if self.is_global() {
            angle
        } else {
            angle - self.rotation
        }
    }

    #[must_use]
    pub fn angle_from_system(&self, angle: f64) -> f64 {
        if self.is_global() {
            angle
        } else {
            angle + self.rotation
        }
    }
}
