//! Per-edge occlusion depth of a cross-section.
//!
//! Counts, for every edge of [`cross_section`](super::cross_section), how
//! many enclosing sub-pyramid shells hide it when the pyramid is viewed from
//! the fixed lower-left direction. Used by visualizations only.

use super::{apex_local_height, check_height, is_lower_half, SubPyramid, SubSections};
use crate::{CoordF, Result};

/// Occlusion depth for each edge of the order `order` section at `height`.
///
/// Recurses exactly like [`cross_section`](super::cross_section), so the
/// result has one entry per vertex of the matching loop (entry `i` belongs
/// to the edge from vertex `i` to vertex `i + 1`).
pub fn occlusion_depth(order: u32, height: CoordF) -> Result<Vec<u32>> {
    check_height(height)?;
    if order == 0 {
        return Ok(vec![0; 4]);
    }
    if !is_lower_half(height) {
        return occlusion_depth(order - 1, apex_local_height(height));
    }

    let corner = occlusion_depth(order - 1, SubPyramid::LowerLeft.local_height(height))?;
    let middle = occlusion_depth(order - 1, SubPyramid::Middle.local_height(height))?;

    let sections = SubSections::try_build(|part| {
        let mut depths = if part.is_corner() {
            corner.clone()
        } else {
            middle.clone()
        };
        let n = depths.len();
        match part {
            // the middle half faces the other corners
            SubPyramid::LowerLeft => bump(&mut depths[n / 4..3 * n / 4]),
            SubPyramid::LowerRight | SubPyramid::UpperRight | SubPyramid::UpperLeft => {
                bump(&mut depths[..n / 4]);
                bump(&mut depths[3 * n / 4..]);
            }
            SubPyramid::Middle => {}
        }
        Ok(depths)
    })?;
    Ok(sections.stitch())
}

#[inline]
fn bump(depths: &mut [u32]) {
    depths.iter_mut().for_each(|d| *d += 1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fractal::{cross_section, PYRAMID_NOMINAL_HEIGHT};

    const H: CoordF = PYRAMID_NOMINAL_HEIGHT;

    #[test]
    fn test_base_case() {
        assert_eq!(occlusion_depth(0, 0.3).unwrap(), vec![0; 4]);
    }

    #[test]
    fn test_order_one_lower_half() {
        let depths = occlusion_depth(1, 0.2).unwrap();
        assert_eq!(
            depths,
            vec![0, 1, 0, 1, 0, 0, 1, 0, 1, 0, 0, 1, 0, 1, 0, 0, 1, 0, 1, 0]
        );
    }

    #[test]
    fn test_upper_half_passes_through() {
        assert_eq!(occlusion_depth(1, 0.9).unwrap(), vec![0; 4]);
        assert_eq!(
            occlusion_depth(3, H * 0.8).unwrap(),
            occlusion_depth(2, (H * 0.8 - H / 2.0) * 2.0).unwrap()
        );
    }

    #[test]
    fn test_matches_cross_section_length() {
        for order in 0..=5 {
            for k in 0..=16 {
                let height = H * (k as CoordF / 16.0);
                let depths = occlusion_depth(order, height).unwrap();
                let poly = cross_section(order, height).unwrap();
                assert_eq!(depths.len(), poly.len(), "order {order} height {height}");
            }
        }
    }

    #[test]
    fn test_depth_bounded_by_order() {
        // every recursion level adds at most one shell
        for order in 0..=5 {
            let depths = occlusion_depth(order, 0.05).unwrap();
            assert!(depths.iter().all(|&d| d <= order));
            if order > 0 {
                assert!(depths.iter().any(|&d| d > 0));
            }
        }
    }

    #[test]
    fn test_out_of_range() {
        assert!(occlusion_depth(2, -1.0).is_err());
        assert!(occlusion_depth(0, 2.0).is_err());
    }
}
