use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A planar position or direction in the metric frame.
///
/// Headings are radians measured counter-clockwise from +X.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `heading`.
    #[must_use]
    pub fn from_heading(heading: f64) -> Self {
        let (s, c) = heading.sin_cos();
        Self::new(c, s)
    }

    #[must_use]
    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product.
    #[must_use]
    pub fn cross(self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        (other - self).length()
    }

    /// Heading of this vector, `atan2(y, x)`.
    #[must_use]
    pub fn heading(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Heading of the vector from `self` to `other`.
    #[must_use]
    pub fn heading_to(self, other: Point) -> f64 {
        (other - self).heading()
    }

    /// Normalised copy, or `None` for a zero-length vector.
    #[must_use]
    pub fn unit(self) -> Option<Point> {
        let len = self.length();
        if len <= f64::EPSILON {
            return None;
        }
        Some(self * (1.0 / len))
    }

    /// Rotate this vector counter-clockwise by `angle` radians.
    #[must_use]
    pub fn rotate(self, angle: f64) -> Point {
        let (s, c) = angle.sin_cos();
        Point::new(self.x * c - self.y * s, self.x * s + self.y * c)
    }

    #[must_use]
    pub fn rotate_about(self, angle: f64, origin: Point) -> Point {
        (self - origin).rotate(angle) + origin
    }

    /// The vector rotated +90 degrees.
    #[must_use]
    pub fn left_normal(self) -> Point {
        Point::new(-self.y, self.x)
    }

    /// The vector rotated -90 degrees.
    #[must_use]
    pub fn right_normal(self) -> Point {
        Point::new(self.y, -self.x)
    }

    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    #[must_use]
    pub fn swapped(self) -> Point {
        Point::new(self.y, self.x)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point {
    fn from(v: [f64; 2]) -> Self {
        Point::new(v[0], v[1])
    }
}

impl From<(f64, f64)> for Point {
    fn from(v: (f64, f64)) -> Self {
        Point::new(v.0, v.1)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}
