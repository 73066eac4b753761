//! Geometry primitives.
//!
//! - [`Point3`] - 3D point with floating-point coordinates
//! - [`Transform3D`] - 3D affine transform (translate, scale, rotate, compose, apply)
//! - [`Line`] - Line segment with XY intersection predicates
//! - [`Polygon`] - Implicitly closed loop of points
//!
//! ## Coordinate System
//!
//! The fractal is generated in a normalized frame: the pyramid base spans
//! the [-1,1] square in X and Y, and Z runs from 0 to
//! [`PYRAMID_NOMINAL_HEIGHT`](crate::fractal::PYRAMID_NOMINAL_HEIGHT).
//! Layers are then mapped to bed coordinates in mm.

mod line;
mod point;
mod polygon;
mod transform;

pub use line::Line;
pub use point::Point3;
pub use polygon::Polygon;
pub use transform::Transform3D;
