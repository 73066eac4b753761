//! Point type for fractal-local and world coordinates.
//!
//! Cross-sections are computed in a normalized frame (base on the [-1,1]
//! square, apex at z = √2) and later mapped to bed coordinates in mm. Both
//! use the same floating-point [`Point3`].

use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// A 3D point (or vector) with floating-point coordinates.
#[derive(Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: CoordF,
    pub y: CoordF,
    pub z: CoordF,
}

impl Point3 {
    /// Create a new point.
    #[inline]
    pub const fn new(x: CoordF, y: CoordF, z: CoordF) -> Self {
        Self { x, y, z }
    }

    /// The origin.
    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Same point with the Z coordinate replaced.
    #[inline]
    pub const fn with_z(&self, z: CoordF) -> Self {
        Self::new(self.x, self.y, z)
    }

    /// Squared distance to another point.
    #[inline]
    pub fn distance_squared(&self, other: &Point3) -> CoordF {
        (*other - *self).length_squared()
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point3) -> CoordF {
        self.distance_squared(other).sqrt()
    }

    /// Squared length of this vector.
    #[inline]
    pub fn length_squared(&self) -> CoordF {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// True when the squared distance to `other` is below `epsilon_sq`.
    #[inline]
    pub fn coincides_with(&self, other: &Point3, epsilon_sq: CoordF) -> bool {
        self.distance_squared(other) < epsilon_sq
    }

    /// Per-axis approximate equality.
    #[inline]
    pub fn approx_eq(&self, other: &Point3, epsilon: CoordF) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
    }
}

impl fmt::Debug for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point3({:.6}, {:.6}, {:.6})", self.x, self.y, self.z)
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6}, {:.6})", self.x, self.y, self.z)
    }
}

impl Add for Point3 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Point3 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<CoordF> for Point3 {
    type Output = Self;

    #[inline]
    fn mul(self, s: CoordF) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}
