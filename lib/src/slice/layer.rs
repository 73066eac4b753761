//! Layer data structure.
//!
//! A [`Layer`] is one printable cross-section in bed coordinates together
//! with the Z it is printed at.

use crate::geometry::{Point3, Polygon};
use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single horizontal layer of the print.
///
/// Every vertex of `polygon` carries the same Z as the layer itself. That Z
/// is assigned from the layer index, not derived from the fractal recursion.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Layer index (0-based).
    index: usize,

    /// Print height of this layer in mm.
    z: CoordF,

    /// Closed loop in bed coordinates (mm).
    polygon: Polygon,
}

impl Layer {
    /// Create a new layer. The polygon's Z values are replaced by `z`.
    pub fn new(index: usize, z: CoordF, mut polygon: Polygon) -> Self {
        for p in polygon.points_mut().iter_mut() {
            p.z = z;
        }
        Self { index, z, polygon }
    }

    /// Get the layer index.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Get the print Z in mm.
    #[inline]
    pub fn z(&self) -> CoordF {
        self.z
    }

    /// Get the layer's loop.
    #[inline]
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Get the points of the loop.
    #[inline]
    pub fn points(&self) -> &[Point3] {
        self.polygon.points()
    }

    /// Number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.polygon.len()
    }

    /// Check if the layer has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polygon.is_empty()
    }

    /// Where printing of this layer starts and ends.
    #[inline]
    pub fn start_point(&self) -> Option<Point3> {
        self.polygon.first_point()
    }

    /// Length of the printed loop including the closing edge.
    #[inline]
    pub fn loop_length(&self) -> CoordF {
        self.polygon.perimeter()
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Layer({}: z={:.3}, {} points)",
            self.index,
            self.z,
            self.polygon.len()
        )
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer {} at z={:.3}", self.index, self.z)
    }
}
