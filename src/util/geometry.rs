//! Pure 2D geometry helpers for network layout.
//!
//! All angles are in degrees; [modulo360] brings arbitrary angles into
//! `[0, 360)`.

use std::ops::{Add, Sub};

/// A point in the drawing plane.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// The origin.
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    /// Creates a point from coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(self, other: Point) -> f64 {
        (other - self).magnitude()
    }

    /// Euclidean length of this point as a vector.
    pub fn magnitude(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Direction of this point as a vector, in degrees in `[0, 360)`.
    ///
    /// The zero vector maps to 0.
    pub fn angle(self) -> f64 {
        if self.x == 0.0 && self.y == 0.0 {
            return 0.0;
        }
        modulo360(self.y.atan2(self.x).to_degrees())
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Normalizes an angle in degrees into `[0, 360)`.
pub fn modulo360(angle: f64) -> f64 {
    let a = angle % 360.0;
    if a < 0.0 { a + 360.0 } else { a }
}

/// Translates `p` by `distance` in direction `angle` (degrees).
pub fn translate_by_angle(p: Point, angle: f64, distance: f64) -> Point {
    let radians = angle.to_radians();
    Point::new(
        p.x + distance * radians.cos(),
        p.y + distance * radians.sin(),
    )
}

/// Direction from `a` to `b` in degrees in `[0, 360)`.
pub fn angle_between(a: Point, b: Point) -> f64 {
    (b - a).angle()
}

/// Signed difference `to - from` folded into `(-180, 180]`.
///
/// Useful for deciding which way around the circle a rotation goes.
pub fn angle_diff(from: f64, to: f64) -> f64 {
    let d = modulo360(to - from);
    if d > 180.0 { d - 360.0 } else { d }
}
