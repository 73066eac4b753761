//! # Sierpinski
//!
//! Direct G-code generation for a Sierpinski pyramid, without a mesh and
//! without a slicer.
//!
//! The pyramid's horizontal cross-section at any height is computed exactly
//! by recursion over its five sub-pyramids; every cross-section is a single
//! closed loop, so the whole object prints as one continuous vase-like path:
//! - Cross-section generation (the fractal recursion)
//! - Layer building (one loop per layer, scaled onto the bed)
//! - Toolpath emission (prime line, layers, fan control, optional support
//!   fins)
//!
//! ## Example
//!
//! ```rust,ignore
//! use sierpinski::{PrintConfig, PrintPipeline};
//!
//! let config = PrintConfig::from_file("pyramid.json")?;
//! let pipeline = PrintPipeline::new(config);
//! let stats = pipeline.process(std::io::stdout().lock())?;
//! println!("{}", stats);
//! ```

pub mod config;
pub mod fractal;
pub mod gcode;
pub mod geometry;
pub mod pipeline;
pub mod slice;

pub use config::{OutputTarget, PrintConfig, PrintParams};
pub use fractal::{cross_section, occlusion_depth, CrossSection, PYRAMID_NOMINAL_HEIGHT};
pub use gcode::{GCodeCommand, GCodeStats, GCodeWriter, ToolpathEmitter};
pub use geometry::{Line, Point3, Polygon, Transform3D};
pub use pipeline::PrintPipeline;
pub use slice::{Layer, LayerBuilder};

/// Floating-point coordinate type (mm in world space).
pub type CoordF = f64;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for pyramid generation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Height {height} is outside the pyramid (0..={max})")]
    HeightOutOfRange { height: CoordF, max: CoordF },

    #[error("Malformed cross-section: {len} points is not a multiple of 4")]
    MalformedSection { len: usize },

    #[error("G-code error: {0}")]
    GCode(String),
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Source revision this binary was built from, when the build provides
/// `SIERPINSKI_GIT_REV`.
pub const BUILD_REVISION: &str = match option_env!("SIERPINSKI_GIT_REV") {
    Some(rev) => rev,
    None => "HEAD",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::HeightOutOfRange {
            height: 2.0,
            max: 1.5,
        };
        assert_eq!(err.to_string(), "Height 2 is outside the pyramid (0..=1.5)");
        let err = Error::MalformedSection { len: 7 };
        assert!(err.to_string().contains("7 points"));
    }
}
