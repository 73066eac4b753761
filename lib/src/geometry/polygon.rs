//! Polygon type for closed cross-section loops.
//!
//! A [`Polygon`] is implicitly closed: the last point connects back to the
//! first. Cross-sections produced by the fractal generator may contain
//! zero-length edges and vertices shared by two sub-loops; both are valid.

use super::{Line, Point3, Transform3D};
use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, Index};

/// A closed polygon defined by a sequence of points.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    points: Vec<Point3>,
}

impl Polygon {
    /// Create a new empty polygon.
    #[inline]
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a polygon from a vector of points.
    #[inline]
    pub fn from_points(points: Vec<Point3>) -> Self {
        Self { points }
    }

    /// Get the points of this polygon.
    #[inline]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Get a mutable reference to the points.
    #[inline]
    pub fn points_mut(&mut self) -> &mut Vec<Point3> {
        &mut self.points
    }

    /// Consume the polygon and return its points.
    #[inline]
    pub fn into_points(self) -> Vec<Point3> {
        self.points
    }

    /// Get the number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the polygon has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First point, if any.
    #[inline]
    pub fn first_point(&self) -> Option<Point3> {
        self.points.first().copied()
    }

    /// Get the edge starting at `index` (wrapping to the first point).
    #[inline]
    pub fn edge(&self, index: usize) -> Line {
        let n = self.points.len();
        Line::new(self.points[index], self.points[(index + 1) % n])
    }

    /// Get all edges, including the closing edge.
    pub fn edges(&self) -> Vec<Line> {
        (0..self.edge_count()).map(|i| self.edge(i)).collect()
    }

    /// Number of edges; equal to the number of points for two or more points.
    #[inline]
    pub fn edge_count(&self) -> usize {
        if self.points.len() < 2 {
            0
        } else {
            self.points.len()
        }
    }

    /// Length of the closed loop, including the closing edge.
    pub fn perimeter(&self) -> CoordF {
        self.edges().iter().map(Line::length).sum()
    }

    /// Signed area in the XY plane (shoelace formula).
    /// Positive for counter-clockwise loops.
    pub fn signed_area(&self) -> CoordF {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut twice = 0.0;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            twice += a.x * b.y - b.x * a.y;
        }
        twice * 0.5
    }

    /// Axis-aligned XY extent as (min, max). Z is taken from the first point.
    pub fn extent(&self) -> Option<(Point3, Point3)> {
        let first = self.first_point()?;
        let (mut min, mut max) = (first, first);
        for p in &self.points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some((min, max))
    }

    /// True when every vertex coincides with the first within `epsilon_sq`.
    pub fn is_point_like(&self, epsilon_sq: CoordF) -> bool {
        match self.first_point() {
            Some(first) => self
                .points
                .iter()
                .all(|p| p.coincides_with(&first, epsilon_sq)),
            None => true,
        }
    }

    /// Find the first pair of non-adjacent edges that cross or overlap.
    ///
    /// Brute force, O(n²). Zero-length edges are skipped, and edges that
    /// only touch at a shared vertex are accepted, so a loop that pinches
    /// through a common corner is still considered simple.
    pub fn first_conflict(&self, epsilon: CoordF) -> Option<(usize, usize)> {
        let n = self.edge_count();
        let edges = self.edges();
        for i in 0..n {
            if edges[i].is_point(epsilon * epsilon) {
                continue;
            }
            for j in (i + 1)..n {
                let adjacent = j == i + 1 || (i == 0 && j == n - 1);
                if adjacent || edges[j].is_point(epsilon * epsilon) {
                    continue;
                }
                if edges[i].conflicts_with(&edges[j], epsilon) {
                    return Some((i, j));
                }
            }
        }
        None
    }

    /// True when no two non-adjacent edges cross or overlap.
    #[inline]
    pub fn is_simple(&self, epsilon: CoordF) -> bool {
        self.first_conflict(epsilon).is_none()
    }

    /// Apply a transform to every point in place.
    #[inline]
    pub fn transform(&mut self, t: &Transform3D) {
        t.apply_all(&mut self.points);
    }

    /// Get a transformed copy.
    pub fn transformed(&self, t: &Transform3D) -> Self {
        let mut copy = self.clone();
        copy.transform(t);
        copy
    }
}

impl fmt::Debug for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polygon({} points)", self.points.len())
    }
}

impl Deref for Polygon {
    type Target = [Point3];

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

impl Index<usize> for Polygon {
    type Output = Point3;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl FromIterator<Point3> for Polygon {
    fn from_iter<I: IntoIterator<Item = Point3>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Point3>> for Polygon {
    fn from(points: Vec<Point3>) -> Self {
        Self::from_points(points)
    }
}

impl From<Polygon> for Vec<Point3> {
    fn from(polygon: Polygon) -> Self {
        polygon.points
    }
}
