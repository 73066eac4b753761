//! Support fin geometry.
//!
//! In support mode every loop of the inverted stack gets short detours
//! ("fins") from its four quarter-boundary vertices out to the corners of
//! the footprint square. Each vertex is tagged once with a [`BoundaryKind`];
//! the three mid-loop corners look their detour up in a [`FinCorner`] table,
//! the loop start and end are handled by [`start_fins`] and [`end_fins`].

use super::AXIS_EPSILON;
use crate::geometry::Point3;
use crate::CoordF;

/// Role of a loop vertex for fin synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryKind {
    /// Vertex 0; fins are added before and after the loop instead.
    Start,
    /// Vertex `n/4`.
    LowerRight,
    /// Vertex `n/2`.
    UpperRight,
    /// Vertex `3n/4`.
    UpperLeft,
    /// Any other vertex.
    Interior,
}

impl BoundaryKind {
    /// Classify vertex `index` of a loop with `len` vertices.
    pub fn classify(index: usize, len: usize) -> Self {
        let quarter = len / 4;
        if index == 0 {
            return BoundaryKind::Start;
        }
        if quarter == 0 || index % quarter != 0 {
            return BoundaryKind::Interior;
        }
        match index / quarter {
            1 => BoundaryKind::LowerRight,
            2 => BoundaryKind::UpperRight,
            3 => BoundaryKind::UpperLeft,
            _ => BoundaryKind::Interior,
        }
    }

    /// Detour table entry for mid-loop corners.
    pub fn corner(&self) -> Option<&'static FinCorner> {
        match self {
            BoundaryKind::LowerRight => Some(&FinCorner::LOWER_RIGHT),
            BoundaryKind::UpperRight => Some(&FinCorner::UPPER_RIGHT),
            BoundaryKind::UpperLeft => Some(&FinCorner::UPPER_LEFT),
            BoundaryKind::Start | BoundaryKind::Interior => None,
        }
    }
}

/// Axis of the move that arrived at a vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriorMove {
    /// Y did not change.
    pub along_x: bool,
    /// X did not change.
    pub along_y: bool,
}

impl PriorMove {
    /// Classify the move from `from` to `to`.
    pub fn between(from: &Point3, to: &Point3) -> Self {
        Self {
            along_x: (to.y - from.y).abs() < AXIS_EPSILON,
            along_y: (to.x - from.x).abs() < AXIS_EPSILON,
        }
    }
}

/// Which leg of a fin is printed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinLead {
    /// Start with the Y leg when the loop arrived moving along Y.
    YWhenArrivingAlongY,
    /// Start with the Y leg unless the loop arrived moving along X.
    YUnlessArrivingAlongX,
}

/// Detour from a mid-loop corner vertex to a footprint corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinCorner {
    /// Outward direction in X (+1 or -1).
    pub sign_x: CoordF,
    /// Outward direction in Y (+1 or -1).
    pub sign_y: CoordF,
    pub lead: FinLead,
}

impl FinCorner {
    pub const LOWER_RIGHT: FinCorner = FinCorner {
        sign_x: 1.0,
        sign_y: -1.0,
        lead: FinLead::YWhenArrivingAlongY,
    };
    pub const UPPER_RIGHT: FinCorner = FinCorner {
        sign_x: 1.0,
        sign_y: 1.0,
        lead: FinLead::YUnlessArrivingAlongX,
    };
    pub const UPPER_LEFT: FinCorner = FinCorner {
        sign_x: -1.0,
        sign_y: 1.0,
        lead: FinLead::YWhenArrivingAlongY,
    };

    /// Footprint corner this fin reaches for.
    #[inline]
    pub fn target(&self, xy_min: CoordF, xy_max: CoordF) -> (CoordF, CoordF) {
        let pick = |sign: CoordF| if sign > 0.0 { xy_max } else { xy_min };
        (pick(self.sign_x), pick(self.sign_y))
    }

    /// Does the fin start with its Y leg?
    #[inline]
    pub fn leads_with_y(&self, prior: PriorMove) -> bool {
        match self.lead {
            FinLead::YWhenArrivingAlongY => prior.along_y,
            FinLead::YUnlessArrivingAlongX => !prior.along_x,
        }
    }

    /// The four fin points for vertex `pt`, in print order.
    ///
    /// The Y leg leaves `pt` outward along Y and runs to the footprint
    /// corner's X side; the X leg leaves outward along X to the corner's Y
    /// side. One leg goes out, the other comes back.
    pub fn detour(
        &self,
        pt: Point3,
        xy_min: CoordF,
        xy_max: CoordF,
        offset: CoordF,
        prior: PriorMove,
    ) -> [Point3; 4] {
        let (cx, cy) = self.target(xy_min, xy_max);
        let z = pt.z;
        let y_out = Point3::new(pt.x, pt.y + self.sign_y * offset, z);
        let y_corner = Point3::new(cx - self.sign_x * offset, cy, z);
        let x_corner = Point3::new(cx, cy - self.sign_y * offset, z);
        let x_out = Point3::new(pt.x + self.sign_x * offset, pt.y, z);
        if self.leads_with_y(prior) {
            [y_out, y_corner, x_corner, x_out]
        } else {
            [x_out, x_corner, y_corner, y_out]
        }
    }
}

/// Fin points printed before a loop that starts at `first`.
///
/// A 4-vertex loop is a single base square and gets the detour mirrored.
pub fn start_fins(first: Point3, xy_min: CoordF, offset: CoordF, base_square: bool) -> Vec<Point3> {
    let z = first.z;
    let mut points = vec![Point3::new(xy_min + offset, xy_min, z)];
    if base_square {
        points.push(Point3::new(xy_min, xy_min + offset, z));
        points.push(Point3::new(first.x - offset, first.y, z));
    } else {
        points.push(Point3::new(first.x, first.y - offset, z));
    }
    points
}

/// Fin points printed after a loop that ends at `first`.
pub fn end_fins(first: Point3, xy_min: CoordF, offset: CoordF, base_square: bool) -> Vec<Point3> {
    let z = first.z;
    if base_square {
        vec![
            Point3::new(first.x, first.y - offset, z),
            Point3::new(xy_min + offset, xy_min, z),
        ]
    } else {
        vec![
            Point3::new(first.x - offset, first.y, z),
            Point3::new(xy_min, xy_min + offset, z),
            Point3::new(xy_min + offset, xy_min, z),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(BoundaryKind::classify(0, 20), BoundaryKind::Start);
        assert_eq!(BoundaryKind::classify(5, 20), BoundaryKind::LowerRight);
        assert_eq!(BoundaryKind::classify(10, 20), BoundaryKind::UpperRight);
        assert_eq!(BoundaryKind::classify(15, 20), BoundaryKind::UpperLeft);
        assert_eq!(BoundaryKind::classify(7, 20), BoundaryKind::Interior);
        assert_eq!(BoundaryKind::classify(1, 4), BoundaryKind::LowerRight);
        assert_eq!(BoundaryKind::classify(3, 4), BoundaryKind::UpperLeft);
    }

    #[test]
    fn test_only_corners_have_table_entries() {
        assert!(BoundaryKind::Start.corner().is_none());
        assert!(BoundaryKind::Interior.corner().is_none());
        assert_eq!(BoundaryKind::LowerRight.corner(), Some(&FinCorner::LOWER_RIGHT));
    }

    #[test]
    fn test_prior_move() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let along_x = PriorMove::between(&a, &Point3::new(5.0, 0.0, 0.0));
        assert!(along_x.along_x && !along_x.along_y);
        let along_y = PriorMove::between(&a, &Point3::new(0.0, 5.0, 0.0));
        assert!(!along_y.along_x && along_y.along_y);
        let diagonal = PriorMove::between(&a, &Point3::new(1.0, 1.0, 0.0));
        assert_eq!(diagonal, PriorMove::default());
    }

    #[test]
    fn test_lower_right_detour() {
        let pt = Point3::new(120.0, 60.0, 1.0);
        let prior = PriorMove { along_x: false, along_y: true };
        let fin = FinCorner::LOWER_RIGHT.detour(pt, 50.0, 150.0, 2.0, prior);
        assert_eq!(
            fin,
            [
                Point3::new(120.0, 58.0, 1.0),
                Point3::new(148.0, 50.0, 1.0),
                Point3::new(150.0, 52.0, 1.0),
                Point3::new(122.0, 60.0, 1.0),
            ]
        );

        let reversed = FinCorner::LOWER_RIGHT.detour(pt, 50.0, 150.0, 2.0, PriorMove::default());
        let mut expected = fin;
        expected.reverse();
        assert_eq!(reversed, expected);
    }

    #[test]
    fn test_upper_right_lead() {
        let pt = Point3::new(140.0, 140.0, 0.0);
        let arriving_along_x = PriorMove { along_x: true, along_y: false };
        let fin = FinCorner::UPPER_RIGHT.detour(pt, 50.0, 150.0, 2.0, arriving_along_x);
        assert_eq!(fin[0], Point3::new(142.0, 140.0, 0.0));
        assert_eq!(fin[1], Point3::new(150.0, 148.0, 0.0));
        assert_eq!(fin[2], Point3::new(148.0, 150.0, 0.0));
        assert_eq!(fin[3], Point3::new(140.0, 142.0, 0.0));

        let diagonal = FinCorner::UPPER_RIGHT.detour(pt, 50.0, 150.0, 2.0, PriorMove::default());
        assert_eq!(diagonal[0], Point3::new(140.0, 142.0, 0.0));
    }

    #[test]
    fn test_upper_left_detour() {
        let pt = Point3::new(60.0, 140.0, 0.0);
        let prior = PriorMove { along_x: false, along_y: true };
        let fin = FinCorner::UPPER_LEFT.detour(pt, 50.0, 150.0, 2.0, prior);
        assert_eq!(fin[0], Point3::new(60.0, 142.0, 0.0));
        assert_eq!(fin[1], Point3::new(52.0, 150.0, 0.0));
        assert_eq!(fin[2], Point3::new(50.0, 148.0, 0.0));
        assert_eq!(fin[3], Point3::new(58.0, 140.0, 0.0));
    }

    #[test]
    fn test_start_and_end_fins() {
        let first = Point3::new(60.0, 60.0, 3.0);
        assert_eq!(
            start_fins(first, 50.0, 2.0, false),
            vec![Point3::new(52.0, 50.0, 3.0), Point3::new(60.0, 58.0, 3.0)]
        );
        assert_eq!(start_fins(first, 50.0, 2.0, true).len(), 3);
        assert_eq!(
            end_fins(first, 50.0, 2.0, true),
            vec![Point3::new(60.0, 58.0, 3.0), Point3::new(52.0, 50.0, 3.0)]
        );
        let end = end_fins(first, 50.0, 2.0, false);
        assert_eq!(end.len(), 3);
        assert_eq!(end[2], Point3::new(52.0, 50.0, 3.0));
    }
}
