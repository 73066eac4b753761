//! Line segment type.
//!
//! Segments are compared in the XY plane: every polygon in this crate is a
//! horizontal cross-section, so Z never takes part in intersection tests.

use super::Point3;
use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A line segment defined by two endpoints.
#[derive(Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub a: Point3,
    pub b: Point3,
}

impl Line {
    /// Create a new line segment from two points.
    #[inline]
    pub const fn new(a: Point3, b: Point3) -> Self {
        Self { a, b }
    }

    /// Get the direction vector (b - a).
    #[inline]
    pub fn direction(&self) -> Point3 {
        self.b - self.a
    }

    /// Get the length of the line segment.
    #[inline]
    pub fn length(&self) -> CoordF {
        self.a.distance(&self.b)
    }

    /// Check if this line segment is a point (zero length within epsilon).
    #[inline]
    pub fn is_point(&self, epsilon_sq: CoordF) -> bool {
        self.a.coincides_with(&self.b, epsilon_sq)
    }

    /// Signed area of the triangle (a, b, p) in the XY plane, times two.
    ///
    /// Positive when `p` lies to the left of the segment direction.
    #[inline]
    pub fn ccw(&self, p: &Point3) -> CoordF {
        orient_xy(&self.a, &self.b, p)
    }

    /// True when the two segments cross at a single interior point.
    ///
    /// Touching at an endpoint, or running along each other, is not a
    /// crossing.
    pub fn crosses(&self, other: &Line, epsilon: CoordF) -> bool {
        let d1 = other.ccw(&self.a);
        let d2 = other.ccw(&self.b);
        let d3 = self.ccw(&other.a);
        let d4 = self.ccw(&other.b);
        strictly_opposite(d1, d2, epsilon) && strictly_opposite(d3, d4, epsilon)
    }

    /// True when the segments are collinear and share a stretch of positive
    /// length.
    pub fn overlaps(&self, other: &Line, epsilon: CoordF) -> bool {
        if self.ccw(&other.a).abs() > epsilon || self.ccw(&other.b).abs() > epsilon {
            return false;
        }
        let dir = self.direction();
        let len_sq = dir.x * dir.x + dir.y * dir.y;
        if len_sq < epsilon * epsilon {
            return false;
        }
        let project = |p: &Point3| ((p.x - self.a.x) * dir.x + (p.y - self.a.y) * dir.y) / len_sq;
        let (t0, t1) = (project(&other.a), project(&other.b));
        let lo = t0.min(t1).max(0.0);
        let hi = t0.max(t1).min(1.0);
        (hi - lo) * len_sq.sqrt() > epsilon
    }

    /// True when the segments cross or overlap.
    ///
    /// This is the test used to validate cross-sections: sub-squares of the
    /// fractal may touch at shared vertices, but must never cut through or
    /// run along each other.
    #[inline]
    pub fn conflicts_with(&self, other: &Line, epsilon: CoordF) -> bool {
        self.crosses(other, epsilon) || self.overlaps(other, epsilon)
    }
}

#[inline]
fn orient_xy(a: &Point3, b: &Point3, p: &Point3) -> CoordF {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

#[inline]
fn strictly_opposite(d1: CoordF, d2: CoordF, epsilon: CoordF) -> bool {
    (d1 > epsilon && d2 < -epsilon) || (d1 < -epsilon && d2 > epsilon)
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line({} -> {})", self.a, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: CoordF = 1e-9;

    fn line(ax: CoordF, ay: CoordF, bx: CoordF, by: CoordF) -> Line {
        Line::new(Point3::new(ax, ay, 0.0), Point3::new(bx, by, 0.0))
    }

    #[test]
    fn test_length() {
        assert!((line(0.0, 0.0, 3.0, 4.0).length() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_crossing_segments() {
        let a = line(0.0, 0.0, 2.0, 2.0);
        let b = line(0.0, 2.0, 2.0, 0.0);
        assert!(a.crosses(&b, EPS));
        assert!(a.conflicts_with(&b, EPS));
    }

    #[test]
    fn test_touching_at_endpoint_is_not_crossing() {
        let a = line(0.0, 0.0, 1.0, 1.0);
        let b = line(1.0, 1.0, 2.0, 0.0);
        assert!(!a.crosses(&b, EPS));
        assert!(!a.overlaps(&b, EPS));
    }

    #[test]
    fn test_t_junction_is_not_crossing() {
        // endpoint of b lies on the interior of a
        let a = line(0.0, 0.0, 2.0, 0.0);
        let b = line(1.0, 0.0, 1.0, 1.0);
        assert!(!a.crosses(&b, EPS));
    }

    #[test]
    fn test_collinear_overlap() {
        let a = line(0.0, 0.0, 2.0, 0.0);
        let b = line(1.0, 0.0, 3.0, 0.0);
        assert!(a.overlaps(&b, EPS));

        let c = line(2.0, 0.0, 3.0, 0.0);
        assert!(!a.overlaps(&c, EPS));
    }

    #[test]
    fn test_disjoint() {
        let a = line(0.0, 0.0, 1.0, 0.0);
        let b = line(0.0, 1.0, 1.0, 1.0);
        assert!(!a.conflicts_with(&b, EPS));
    }
}
