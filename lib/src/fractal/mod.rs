//! Sierpinski pyramid cross-sections.
//!
//! A pyramid of order `n` is five half-scale copies of the order `n - 1`
//! pyramid: four corner copies standing on the base, and one inverted
//! "middle" copy filling the octahedral gap between them (its apex touches
//! the base at the center, its base is at half height). Above half height
//! only the upright top copy remains.
//!
//! - [`cross_section`] - the closed loop at a given height
//! - [`occlusion_depth`] - per-edge count of shells hiding that edge from a
//!   fixed viewpoint, in the same order as the loop's edges
//!
//! Both functions are pure and recurse with the same shape, so their
//! outputs always have the same length.

mod cross_section;
mod occlusion;

pub use cross_section::{base_square, cross_section, CrossSection};
pub use occlusion::occlusion_depth;

use std::f64::consts::{FRAC_PI_2, SQRT_2};

use crate::geometry::Transform3D;
use crate::{CoordF, Error, Result};

/// Height of the normalized pyramid, whose base spans the [-1,1] square.
pub const PYRAMID_NOMINAL_HEIGHT: CoordF = SQRT_2;

/// One of the five copies a pyramid is subdivided into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubPyramid {
    /// Corner copy in the -X/-Y quadrant.
    LowerLeft,
    /// Corner copy in the +X/-Y quadrant, rotated -90°.
    LowerRight,
    /// Corner copy in the +X/+Y quadrant.
    UpperRight,
    /// Corner copy in the -X/+Y quadrant, rotated +90°.
    UpperLeft,
    /// Inverted copy between the corners, apex down at the base center.
    Middle,
}

impl SubPyramid {
    /// All five copies.
    pub const ALL: [SubPyramid; 5] = [
        SubPyramid::LowerLeft,
        SubPyramid::LowerRight,
        SubPyramid::UpperRight,
        SubPyramid::UpperLeft,
        SubPyramid::Middle,
    ];

    /// Is this one of the four copies standing on the base?
    #[inline]
    pub fn is_corner(&self) -> bool {
        !matches!(self, SubPyramid::Middle)
    }

    /// Height inside this copy's own [0, H] frame that corresponds to
    /// `height` in the lower half of the parent.
    #[inline]
    pub fn local_height(&self, height: CoordF) -> CoordF {
        if self.is_corner() {
            height * 2.0
        } else {
            PYRAMID_NOMINAL_HEIGHT - height * 2.0
        }
    }

    /// Placement of this copy inside a parent of the given order, for
    /// sections in the lower half of the parent.
    ///
    /// Corner copies are rotated (if at all), halved and moved to their
    /// quadrant. When the copies are base squares (parent order 1) their X
    /// and Y axes are exchanged first, which reverses the winding of every
    /// leaf square inside a stitched loop.
    pub fn placement(&self, parent_order: u32) -> Transform3D {
        let half = Transform3D::uniform_scaling(0.5);
        let (tx, ty, rotation) = match self {
            SubPyramid::LowerLeft => (-0.5, -0.5, None),
            SubPyramid::LowerRight => (0.5, -0.5, Some(-FRAC_PI_2)),
            SubPyramid::UpperRight => (0.5, 0.5, None),
            SubPyramid::UpperLeft => (-0.5, 0.5, Some(FRAC_PI_2)),
            SubPyramid::Middle => {
                return half
                    .then(&Transform3D::scaling(1.0, 1.0, -1.0))
                    .then(&Transform3D::translation(0.0, 0.0, PYRAMID_NOMINAL_HEIGHT / 2.0));
            }
        };

        let mut t = if parent_order == 1 {
            Transform3D::swap_xy()
        } else {
            Transform3D::identity()
        };
        if let Some(angle) = rotation {
            t = t.then(&Transform3D::rotation_z(angle));
        }
        t.then(&half).then(&Transform3D::translation(tx, ty, 0.0))
    }
}

/// Placement of the upright top copy, used for sections in the upper half.
pub fn apex_placement() -> Transform3D {
    Transform3D::uniform_scaling(0.5).then(&Transform3D::translation(
        0.0,
        0.0,
        PYRAMID_NOMINAL_HEIGHT / 2.0,
    ))
}

/// Does `height` select a section of the lower half, where all five copies
/// are cut?
#[inline]
pub fn is_lower_half(height: CoordF) -> bool {
    height < PYRAMID_NOMINAL_HEIGHT / 2.0
}

/// Height inside the top copy's frame for a section in the upper half.
#[inline]
pub fn apex_local_height(height: CoordF) -> CoordF {
    (height - PYRAMID_NOMINAL_HEIGHT / 2.0) * 2.0
}

/// Reject heights outside [0, H] (including NaN).
pub fn check_height(height: CoordF) -> Result<()> {
    if (0.0..=PYRAMID_NOMINAL_HEIGHT).contains(&height) {
        Ok(())
    } else {
        Err(Error::HeightOutOfRange {
            height,
            max: PYRAMID_NOMINAL_HEIGHT,
        })
    }
}

/// Per-copy sequences of one recursion step, ready to be stitched.
#[derive(Debug, Clone)]
pub(crate) struct SubSections<T> {
    pub lower_left: Vec<T>,
    pub lower_right: Vec<T>,
    pub upper_right: Vec<T>,
    pub upper_left: Vec<T>,
    pub middle: Vec<T>,
}

impl<T: Copy> SubSections<T> {
    /// Build all five sequences with `f`, checking each length.
    pub fn try_build<F>(mut f: F) -> Result<Self>
    where
        F: FnMut(SubPyramid) -> Result<Vec<T>>,
    {
        let mut part = |which: SubPyramid| -> Result<Vec<T>> {
            let seq = f(which)?;
            ensure_quartered(seq.len())?;
            Ok(seq)
        };
        Ok(Self {
            lower_left: part(SubPyramid::LowerLeft)?,
            lower_right: part(SubPyramid::LowerRight)?,
            upper_right: part(SubPyramid::UpperRight)?,
            upper_left: part(SubPyramid::UpperLeft)?,
            middle: part(SubPyramid::Middle)?,
        })
    }

    /// Total number of elements over all five copies.
    pub fn total_len(&self) -> usize {
        self.lower_left.len()
            + self.lower_right.len()
            + self.upper_right.len()
            + self.upper_left.len()
            + self.middle.len()
    }

    /// Join the five sequences into one closed loop.
    ///
    /// The loop starts in the lower-left copy, leaves it halfway round to
    /// take a quarter of the middle copy, walks all of the lower-right copy,
    /// the next middle quarter, the upper-right copy, the next middle
    /// quarter, the upper-left copy, the last middle quarter, and ends with
    /// the second half of the lower-left copy. Any other order produces a
    /// self-intersecting or disconnected loop from order 2 upwards.
    pub fn stitch(&self) -> Vec<T> {
        let ll = &self.lower_left;
        let m = &self.middle;
        let (ll_half, m_quarter) = (ll.len() / 2, m.len() / 4);

        let mut out = Vec::with_capacity(self.total_len());
        out.extend_from_slice(&ll[..ll_half]);
        out.extend_from_slice(&m[..m_quarter]);
        out.extend_from_slice(&self.lower_right);
        out.extend_from_slice(&m[m_quarter..2 * m_quarter]);
        out.extend_from_slice(&self.upper_right);
        out.extend_from_slice(&m[2 * m_quarter..3 * m_quarter]);
        out.extend_from_slice(&self.upper_left);
        out.extend_from_slice(&m[3 * m_quarter..]);
        out.extend_from_slice(&ll[ll_half..]);
        out
    }
}

/// Every sub-loop must split into four equal quarters.
#[inline]
pub(crate) fn ensure_quartered(len: usize) -> Result<()> {
    if len == 0 || len % 4 != 0 {
        return Err(Error::MalformedSection { len });
    }
    Ok(())
}
