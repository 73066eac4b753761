//! Derived print parameters.

use crate::geometry::Point3;
use crate::CoordF;
use serde::Serialize;
use std::fmt;

/// Tolerance of the first-layer height test, as a fraction of the layer
/// height.
pub const FIRST_LAYER_TOLERANCE: CoordF = 0.001;

/// Everything the layer builder and the emitter need, resolved from a
/// [`PrintConfig`](super::PrintConfig).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PrintParams {
    pub order: u32,
    pub size: CoordF,
    pub speed: CoordF,
    pub bed_size: CoordF,
    pub z_offset: CoordF,
    pub fan_start_layer: usize,
    pub relative_extrusion: bool,
    pub extrusion_width: CoordF,
    pub first_layer_extrusion_width: CoordF,
    pub layer_height: CoordF,
    pub prime_filament_length: CoordF,

    /// Printed height of the pyramid (mm).
    pub pyramid_z_height: CoordF,
    /// Number of layers.
    pub layer_count: usize,
    /// Filament per mm of path for normal layers.
    pub extrusion_per_mm: CoordF,
    /// Filament per mm of path for first-layer moves.
    pub first_layer_extrusion_per_mm: CoordF,
    /// Center of the pyramid base on the bed, at the first layer's Z.
    pub bed_center: Point3,
    /// Lower bound of the pyramid footprint in X and Y.
    pub xy_min: CoordF,
    /// Upper bound of the pyramid footprint in X and Y.
    pub xy_max: CoordF,
    /// Base edge length of the smallest sub-pyramid.
    pub smallest_pyramid_size: CoordF,
    pub xy_decimals: usize,
    pub e_decimals: usize,

    pub support_fins: bool,
    pub support_fin_height: CoordF,
    pub support_extrusion_factor: CoordF,

    pub start_gcode: String,
    pub end_gcode: String,
}

impl PrintParams {
    /// Is a move ending at `z` part of the first layer?
    ///
    /// Only the layer printed at `z_offset` counts: the prime line and the
    /// lowest loop in plain mode, the raft in support mode. Everything from
    /// the next layer up gets the normal bead and full speed.
    #[inline]
    pub fn is_first_layer_z(&self, z: CoordF) -> bool {
        z <= self.z_offset + self.layer_height * FIRST_LAYER_TOLERANCE
    }

    /// Filament per mm of path for a move ending at `z`.
    #[inline]
    pub fn extrusion_per_mm_at(&self, z: CoordF) -> CoordF {
        if self.is_first_layer_z(z) {
            self.first_layer_extrusion_per_mm
        } else {
            self.extrusion_per_mm
        }
    }

    /// Print speed (mm/s) for a move ending at `z`.
    #[inline]
    pub fn print_speed_at(&self, z: CoordF) -> CoordF {
        if self.is_first_layer_z(z) {
            self.speed / 2.0
        } else {
            self.speed
        }
    }

    /// How far fins reach out from the loop (mm).
    #[inline]
    pub fn fin_offset(&self) -> CoordF {
        self.extrusion_width * 4.0
    }

    /// Filament per mm of path for fins.
    #[inline]
    pub fn fin_extrusion_per_mm(&self) -> CoordF {
        self.extrusion_per_mm * self.support_extrusion_factor
    }

    /// Fin print speed (mm/s).
    #[inline]
    pub fn fin_speed(&self) -> CoordF {
        self.speed * 2.0
    }

    /// Rough print time (s) for a given amount of filament.
    pub fn estimated_print_time(&self, filament_mm: CoordF) -> CoordF {
        filament_mm / self.extrusion_per_mm / self.speed
    }
}

impl fmt::Display for PrintParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "pyramid_z_height: {:.6}", self.pyramid_z_height)?;
        writeln!(f, "layer_count: {}", self.layer_count)?;
        writeln!(f, "extrusion_per_mm: {:.6}", self.extrusion_per_mm)?;
        writeln!(
            f,
            "first_layer_extrusion_per_mm: {:.6}",
            self.first_layer_extrusion_per_mm
        )?;
        writeln!(f, "smallest_pyramid_size: {:.6}", self.smallest_pyramid_size)?;
        writeln!(f, "xy_decimals: {}", self.xy_decimals)?;
        write!(f, "e_decimals: {}", self.e_decimals)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::PrintConfig;

    #[test]
    fn test_first_layer_window() {
        let params = PrintConfig::default().resolve().unwrap();
        assert!(params.is_first_layer_z(0.0));
        assert!(!params.is_first_layer_z(0.2));
        assert_eq!(params.print_speed_at(0.0), 20.0);
        assert_eq!(params.print_speed_at(0.2), 40.0);
        assert_eq!(params.extrusion_per_mm_at(0.0), params.first_layer_extrusion_per_mm);
        assert_eq!(params.extrusion_per_mm_at(0.2), params.extrusion_per_mm);
    }

    #[test]
    fn test_first_layer_window_with_offset() {
        let mut config = PrintConfig::default();
        config.z_offset = 0.2;
        let params = config.resolve().unwrap();
        assert!(params.is_first_layer_z(0.2));
        assert_eq!(params.print_speed_at(0.2), 20.0);
        assert_eq!(params.extrusion_per_mm_at(0.2), params.first_layer_extrusion_per_mm);

        // layer 1 sits one layer height above the offset
        assert!(!params.is_first_layer_z(0.4));
        assert_eq!(params.print_speed_at(0.4), 40.0);
        assert_eq!(params.extrusion_per_mm_at(0.4), params.extrusion_per_mm);
    }

    #[test]
    fn test_fin_settings() {
        let params = PrintConfig::default().resolve().unwrap();
        assert!((params.fin_offset() - 1.6).abs() < 1e-12);
        assert!((params.fin_extrusion_per_mm() - params.extrusion_per_mm * 0.25).abs() < 1e-15);
        assert_eq!(params.fin_speed(), 80.0);
    }

    #[test]
    fn test_display() {
        let text = PrintConfig::default().resolve().unwrap().to_string();
        assert!(text.contains("layer_count: 354"));
        assert!(text.lines().count() == 7);
    }
}
