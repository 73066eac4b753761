//! 3D affine transforms in homogeneous form.
//!
//! Sub-pyramid placements are composed from translate, scale and rotate
//! primitives and passed around as plain values; there is no transform
//! stack.

use super::Point3;
use crate::CoordF;
use std::fmt;

/// A 3D affine transformation matrix.
///
/// Represented as a 4x4 matrix in homogeneous coordinates.
#[derive(Clone, Copy, PartialEq)]
pub struct Transform3D {
    /// The 4x4 matrix stored in column-major order.
    /// [m00, m10, m20, m30, m01, m11, m21, m31, m02, m12, m22, m32, m03, m13, m23, m33]
    pub matrix: [CoordF; 16],
}

impl Transform3D {
    /// Create an identity transform.
    pub const fn identity() -> Self {
        Self {
            matrix: [
                1.0, 0.0, 0.0, 0.0, // Column 0
                0.0, 1.0, 0.0, 0.0, // Column 1
                0.0, 0.0, 1.0, 0.0, // Column 2
                0.0, 0.0, 0.0, 1.0, // Column 3
            ],
        }
    }

    /// Create a translation transform.
    pub const fn translation(tx: CoordF, ty: CoordF, tz: CoordF) -> Self {
        Self {
            matrix: [
                1.0, 0.0, 0.0, 0.0, // Column 0
                0.0, 1.0, 0.0, 0.0, // Column 1
                0.0, 0.0, 1.0, 0.0, // Column 2
                tx, ty, tz, 1.0, // Column 3
            ],
        }
    }

    /// Create a scaling transform.
    pub const fn scaling(sx: CoordF, sy: CoordF, sz: CoordF) -> Self {
        Self {
            matrix: [
                sx, 0.0, 0.0, 0.0, // Column 0
                0.0, sy, 0.0, 0.0, // Column 1
                0.0, 0.0, sz, 0.0, // Column 2
                0.0, 0.0, 0.0, 1.0, // Column 3
            ],
        }
    }

    /// Create a uniform scaling transform.
    #[inline]
    pub const fn uniform_scaling(s: CoordF) -> Self {
        Self::scaling(s, s, s)
    }

    /// Create a rotation transform around the Z axis (angle in radians).
    pub fn rotation_z(angle: CoordF) -> Self {
        let cos_a = angle.cos();
        let sin_a = angle.sin();
        Self {
            matrix: [
                cos_a, sin_a, 0.0, 0.0, // Column 0
                -sin_a, cos_a, 0.0, 0.0, // Column 1
                0.0, 0.0, 1.0, 0.0, // Column 2
                0.0, 0.0, 0.0, 1.0, // Column 3
            ],
        }
    }

    /// Create a transform that exchanges the X and Y axes.
    ///
    /// This is a reflection: it reverses the winding of any polygon it is
    /// applied to.
    pub const fn swap_xy() -> Self {
        Self {
            matrix: [
                0.0, 1.0, 0.0, 0.0, // Column 0
                1.0, 0.0, 0.0, 0.0, // Column 1
                0.0, 0.0, 1.0, 0.0, // Column 2
                0.0, 0.0, 0.0, 1.0, // Column 3
            ],
        }
    }

    /// Get a matrix element by row and column.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> CoordF {
        self.matrix[col * 4 + row]
    }

    /// Multiply this transform by another (compose transformations).
    /// Returns a transform that first applies self, then other.
    /// Mathematically: result = other * self (so result.apply(p) == other.apply(self.apply(p)))
    pub fn then(&self, other: &Transform3D) -> Self {
        let mut matrix = [0.0; 16];
        for col in 0..4 {
            for row in 0..4 {
                matrix[col * 4 + row] = (0..4).map(|k| other.get(row, k) * self.get(k, col)).sum();
            }
        }
        Self { matrix }
    }

    /// Apply this transform to a point.
    ///
    /// Every constructor yields an affine matrix, so the bottom row is
    /// (0, 0, 0, 1) and no perspective divide is needed.
    pub fn apply(&self, p: Point3) -> Point3 {
        let row = |r: usize| {
            self.get(r, 0) * p.x + self.get(r, 1) * p.y + self.get(r, 2) * p.z + self.get(r, 3)
        };
        Point3::new(row(0), row(1), row(2))
    }

    /// Apply this transform to every point of a slice in place.
    pub fn apply_all(&self, points: &mut [Point3]) {
        for p in points.iter_mut() {
            *p = self.apply(*p);
        }
    }
}

impl fmt::Debug for Transform3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transform3D(")?;
        for i in 0..4 {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(
                f,
                "[{:.4}, {:.4}, {:.4}, {:.4}]",
                self.get(i, 0),
                self.get(i, 1),
                self.get(i, 2),
                self.get(i, 3)
            )?;
        }
        write!(f, ")")
    }
}
