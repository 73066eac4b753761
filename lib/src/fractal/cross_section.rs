//! Cross-section loops of the pyramid.

use serde::Serialize;

use super::{
    apex_local_height, apex_placement, check_height, ensure_quartered, is_lower_half,
    occlusion_depth, SubPyramid, SubSections, PYRAMID_NOMINAL_HEIGHT,
};
use crate::geometry::{Point3, Polygon};
use crate::{CoordF, Result};

/// Order 0 section: the square of half-side `(H - h) / H` at height `h`,
/// counter-clockwise from the lower-left corner.
pub fn base_square(height: CoordF) -> Polygon {
    let s = (PYRAMID_NOMINAL_HEIGHT - height) / PYRAMID_NOMINAL_HEIGHT;
    Polygon::from_points(vec![
        Point3::new(-s, -s, height),
        Point3::new(s, -s, height),
        Point3::new(s, s, height),
        Point3::new(-s, s, height),
    ])
}

/// Closed cross-section loop of the order `order` pyramid at `height`.
///
/// The result is in the normalized frame (base on [-1,1]², every vertex at
/// Z = `height`), has a vertex count that is a positive multiple of 4, and
/// is a single loop that may touch itself at shared corners but never
/// crosses itself at non-dyadic heights.
///
/// # Errors
///
/// [`Error::HeightOutOfRange`](crate::Error::HeightOutOfRange) when `height`
/// is outside [0, H], and
/// [`Error::MalformedSection`](crate::Error::MalformedSection) if a
/// sub-section fails to split into quarters.
pub fn cross_section(order: u32, height: CoordF) -> Result<Polygon> {
    check_height(height)?;
    if order == 0 {
        return Ok(base_square(height));
    }

    if is_lower_half(height) {
        // The four corners share one local height, so one evaluation serves all.
        let corner = cross_section(order - 1, SubPyramid::LowerLeft.local_height(height))?;
        let middle = cross_section(order - 1, SubPyramid::Middle.local_height(height))?;

        let sections = SubSections::try_build(|part| {
            let source = if part.is_corner() { &corner } else { &middle };
            Ok(source.transformed(&part.placement(order)).into_points())
        })?;
        Ok(Polygon::from_points(sections.stitch()))
    } else {
        let mut top = cross_section(order - 1, apex_local_height(height))?;
        ensure_quartered(top.len())?;
        top.transform(&apex_placement());
        Ok(top)
    }
}

/// A cross-section together with its per-edge occlusion depth.
#[derive(Debug, Clone, Serialize)]
pub struct CrossSection {
    pub order: u32,
    pub height: CoordF,
    pub polygon: Polygon,
    pub occlusion: Vec<u32>,
}

impl CrossSection {
    /// Compute both sequences for one `(order, height)`.
    pub fn compute(order: u32, height: CoordF) -> Result<Self> {
        Ok(Self {
            order,
            height,
            polygon: cross_section(order, height)?,
            occlusion: occlusion_depth(order, height)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Line;
    use crate::Error;

    const H: CoordF = PYRAMID_NOMINAL_HEIGHT;

    /// Expected vertex count, derived from the routing rule alone.
    fn expected_len(order: u32, height: CoordF) -> usize {
        if order == 0 {
            4
        } else if height < H / 2.0 {
            4 * expected_len(order - 1, height * 2.0) + expected_len(order - 1, H - height * 2.0)
        } else {
            expected_len(order - 1, (height - H / 2.0) * 2.0)
        }
    }

    #[test]
    fn test_base_square() {
        let sq = base_square(0.0);
        assert_eq!(sq[0], Point3::new(-1.0, -1.0, 0.0));
        assert_eq!(sq[2], Point3::new(1.0, 1.0, 0.0));
        assert!(sq.signed_area() > 0.0);

        let half = base_square(H / 2.0);
        assert!((half[1].x - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_order_one_vertex_count() {
        assert_eq!(cross_section(1, 0.1).unwrap().len(), 20);
        assert_eq!(cross_section(1, 0.9).unwrap().len(), 4);
    }

    #[test]
    fn test_lengths_are_quartered() {
        for order in 0..=5 {
            for k in 0..=20 {
                let height = H * (k as CoordF / 20.0);
                let poly = cross_section(order, height).unwrap();
                assert!(!poly.is_empty());
                assert_eq!(poly.len() % 4, 0, "order {order} height {height}");
                assert_eq!(poly.len(), expected_len(order, height));
            }
        }
    }

    #[test]
    fn test_known_vertex_counts() {
        assert_eq!(cross_section(2, 0.1 * H).unwrap().len(), 84);
        assert_eq!(cross_section(2, 0.3 * H).unwrap().len(), 36);
        assert_eq!(cross_section(2, 0.6 * H).unwrap().len(), 20);
        assert_eq!(cross_section(2, 0.9 * H).unwrap().len(), 4);
        assert_eq!(cross_section(3, 0.01 * H).unwrap().len(), 340);
        assert_eq!(cross_section(4, 0.01 * H).unwrap().len(), 1364);
    }

    #[test]
    fn test_vertices_lie_on_cut_plane() {
        for order in 0..=4 {
            for height in [0.0, 0.2, 0.5, 0.7, 1.0, 1.3] {
                let poly = cross_section(order, height).unwrap();
                for p in poly.iter() {
                    assert!((p.z - height).abs() < 1e-9, "order {order} z {} != {height}", p.z);
                }
            }
        }
    }

    #[test]
    fn test_apex_is_point_like() {
        for order in 0..=5 {
            let poly = cross_section(order, H).unwrap();
            assert!(poly.is_point_like(1e-12), "order {order}");
        }
    }

    #[test]
    fn test_base_covers_full_square() {
        for order in 0..=5 {
            let (min, max) = cross_section(order, 0.0).unwrap().extent().unwrap();
            assert!((min.x + 1.0).abs() < 1e-12 && (min.y + 1.0).abs() < 1e-12);
            assert!((max.x - 1.0).abs() < 1e-12 && (max.y - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_sections_are_simple() {
        let fractions = [0.1, 0.3, 0.37, 0.45, 0.55, 0.7];
        for order in 0..=4 {
            for f in fractions {
                let poly = cross_section(order, f * H).unwrap();
                assert_eq!(
                    poly.first_conflict(1e-9),
                    None,
                    "order {order} at {f}·H self-intersects"
                );
            }
        }
    }

    #[test]
    fn test_no_proper_crossings_at_dyadic_heights() {
        // Sub-loops may share collinear edges here, but no two edges may cut
        // through each other.
        let heights = (0..=64).map(|k| H * k as CoordF / 64.0).chain([H / 2.0]);
        for height in heights {
            for order in 1..=4 {
                let poly = cross_section(order, height).unwrap();
                let n = poly.len();
                let edges: Vec<Line> = (0..n).map(|i| poly.edge(i)).collect();
                for i in 0..n {
                    for j in (i + 2)..n {
                        if i == 0 && j == n - 1 {
                            continue;
                        }
                        assert!(
                            !edges[i].crosses(&edges[j], 1e-9),
                            "order {order} at {}·H: edges {i} and {j} cross",
                            height / H
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_half_height_follows_upper_rule() {
        // at exactly H/2 only the top copy contributes, evaluated at its base
        for order in 1..=4 {
            let poly = cross_section(order, H / 2.0).unwrap();
            let mut top = cross_section(order - 1, 0.0).unwrap();
            top.transform(&apex_placement());
            assert_eq!(poly.len(), top.len());
            for (a, b) in poly.iter().zip(top.iter()) {
                assert!(a.approx_eq(b, 1e-12));
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let a = cross_section(3, 0.42).unwrap();
        let b = cross_section(3, 0.42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_height_out_of_range() {
        for order in [0, 2] {
            assert!(matches!(
                cross_section(order, -0.1),
                Err(Error::HeightOutOfRange { .. })
            ));
            assert!(cross_section(order, H * 1.01).is_err());
        }
    }

    #[test]
    fn test_cross_section_bundle() {
        let s = CrossSection::compute(2, 0.4).unwrap();
        assert_eq!(s.polygon.len(), s.occlusion.len());
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["order"], 2);
        assert_eq!(json["polygon"].as_array().unwrap().len(), s.polygon.len());
    }
}
