//! Print configuration document.
//!
//! [`PrintConfig`] is the user-facing JSON document. Every field is optional
//! in the file and falls back to its default; unknown fields are rejected.
//! [`PrintConfig::resolve`] turns it into [`PrintParams`].

use super::{OutputTarget, PrintParams};
use crate::geometry::Point3;
use crate::{CoordF, Error, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, SQRT_2};
use std::fmt;
use std::fs;
use std::path::Path;

/// Highest recursion order a print may ask for.
///
/// Each order multiplies the loop's vertex count by about four; at order 8
/// a loop already has a few hundred thousand vertices and the smallest
/// sub-pyramid of a 100 mm print is under half a millimeter wide.
pub const MAX_ORDER: u32 = 8;

/// Settings for one pyramid print.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrintConfig {
    // === Fractal ===
    /// Recursion order of the pyramid.
    pub order: u32,
    /// Edge length of the pyramid base (mm).
    pub size: CoordF,

    // === Machine ===
    /// Print and travel speed (mm/s).
    pub speed: CoordF,
    /// Square bed edge length (mm); the pyramid is centered on it.
    pub bed_size: CoordF,
    /// Z of the first layer (mm).
    pub z_offset: CoordF,
    /// Layer index after which the part cooling fan is switched on.
    pub fan_start_layer: usize,

    // === Extrusion ===
    /// Use relative extrusion mode (M83) instead of absolute (M82).
    pub relative_extrusion: bool,
    /// Extrusion width (mm).
    pub extrusion_width: CoordF,
    /// First layer extrusion width (mm). Defaults to 1.5x `extrusion_width`.
    pub first_layer_extrusion_width: Option<CoordF>,
    /// Filament diameter (mm).
    pub filament_diameter: CoordF,
    /// Layer height (mm).
    pub layer_height: CoordF,
    /// Filament extruded by the prime line (mm).
    pub prime_filament_length: CoordF,

    // === G-code text ===
    /// Emitted before the print.
    pub start_gcode: String,
    /// Emitted after the print.
    pub end_gcode: String,
    /// Where to write; the CLI picks a default when absent.
    pub output: Option<OutputTarget>,
    /// Decimal places for X and Y in compact moves.
    pub gcode_xy_decimals: usize,
    /// Decimal places for E in compact moves. Derived when absent.
    pub gcode_e_decimals: Option<usize>,

    // === Support fins ===
    /// Print the inverted support stack with fins under the pyramid.
    pub support_fins: bool,
    /// Fins are added to support layers below this Z (mm). Derived when absent.
    pub support_fin_height: Option<CoordF>,
    /// Fin extrusion as a fraction of normal extrusion.
    pub support_extrusion_factor: CoordF,
}

impl PrintConfig {
    /// Create a new PrintConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a configuration from a JSON string and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a pretty JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builder method: set the recursion order.
    pub fn order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    /// Builder method: set the base edge length.
    pub fn size(mut self, size: CoordF) -> Self {
        self.size = size;
        self
    }

    /// Builder method: set the layer height.
    pub fn layer_height(mut self, height: CoordF) -> Self {
        self.layer_height = height;
        self
    }

    /// Builder method: set relative/absolute extrusion.
    pub fn relative_extrusion(mut self, relative: bool) -> Self {
        self.relative_extrusion = relative;
        self
    }

    /// Builder method: enable/disable support fins.
    pub fn support_fins(mut self, enabled: bool) -> Self {
        self.support_fins = enabled;
        self
    }

    /// Builder method: set the output target.
    pub fn output(mut self, output: OutputTarget) -> Self {
        self.output = Some(output);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.order > MAX_ORDER {
            return Err(Error::Config(format!(
                "order must be at most {MAX_ORDER}, got {}",
                self.order
            )));
        }
        let positive = [
            ("size", self.size),
            ("speed", self.speed),
            ("extrusion_width", self.extrusion_width),
            ("filament_diameter", self.filament_diameter),
            ("layer_height", self.layer_height),
            ("support_extrusion_factor", self.support_extrusion_factor),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(Error::Config(format!("{name} must be positive, got {value}")));
            }
        }
        if let Some(width) = self.first_layer_extrusion_width {
            if width.is_nan() || width <= 0.0 {
                return Err(Error::Config(format!(
                    "first_layer_extrusion_width must be positive, got {width}"
                )));
            }
        }
        if self.bed_size < self.size {
            return Err(Error::Config(format!(
                "bed_size ({}) is smaller than the pyramid ({})",
                self.bed_size, self.size
            )));
        }
        if self.prime_filament_length < 0.0 {
            return Err(Error::Config("prime_filament_length must not be negative".into()));
        }
        if matches!(self.support_fin_height, Some(h) if h < 0.0) {
            return Err(Error::Config("support_fin_height must not be negative".into()));
        }
        Ok(())
    }

    /// Validate and compute the derived print parameters.
    pub fn resolve(&self) -> Result<PrintParams> {
        self.validate()?;

        let pyramid_z_height = SQRT_2 * self.size / 2.0;
        let layer_count = (pyramid_z_height / self.layer_height).ceil() as usize;
        let filament_area = PI * (self.filament_diameter / 2.0).powi(2);
        let extrusion_per_mm = self.layer_height * self.extrusion_width / filament_area;

        let first_layer_extrusion_width = self
            .first_layer_extrusion_width
            .unwrap_or(self.extrusion_width * 1.5);
        let first_layer_extrusion_per_mm =
            self.layer_height * first_layer_extrusion_width / filament_area;

        let half_bed = self.bed_size / 2.0;
        let smallest_pyramid_size = self.size / 2f64.powi(self.order as i32);

        let e_decimals = self.gcode_e_decimals.unwrap_or_else(|| {
            let base = (2f64.powi(self.gcode_xy_decimals as i32) / extrusion_per_mm)
                .log2()
                .ceil()
                .max(0.0) as usize;
            if self.relative_extrusion {
                base
            } else {
                base + self.gcode_xy_decimals
            }
        });

        let support_fin_height = self.support_fin_height.unwrap_or_else(|| {
            (pyramid_z_height - 20.0 * self.layer_height).min(pyramid_z_height * 0.85)
        });

        if smallest_pyramid_size < 5.0 * self.extrusion_width {
            warn!(
                "the smallest pyramids ({:.3}mm) are very small compared to the extrusion width \
                 ({:.3}mm); {:.3}mm or larger is recommended, consider lowering the order",
                smallest_pyramid_size,
                self.extrusion_width,
                5.0 * self.extrusion_width
            );
        }

        Ok(PrintParams {
            order: self.order,
            size: self.size,
            speed: self.speed,
            bed_size: self.bed_size,
            z_offset: self.z_offset,
            fan_start_layer: self.fan_start_layer,
            relative_extrusion: self.relative_extrusion,
            extrusion_width: self.extrusion_width,
            first_layer_extrusion_width,
            layer_height: self.layer_height,
            prime_filament_length: self.prime_filament_length,
            pyramid_z_height,
            layer_count,
            extrusion_per_mm,
            first_layer_extrusion_per_mm,
            bed_center: Point3::new(half_bed, half_bed, self.z_offset),
            xy_min: half_bed - self.size / 2.0,
            xy_max: half_bed + self.size / 2.0,
            smallest_pyramid_size,
            xy_decimals: self.gcode_xy_decimals,
            e_decimals,
            support_fins: self.support_fins,
            support_fin_height,
            support_extrusion_factor: self.support_extrusion_factor,
            start_gcode: self.start_gcode.clone(),
            end_gcode: self.end_gcode.clone(),
        })
    }
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            order: 3,
            size: 100.0,

            speed: 40.0,
            bed_size: 200.0,
            z_offset: 0.0,
            fan_start_layer: 3,

            relative_extrusion: true,
            extrusion_width: 0.4,
            first_layer_extrusion_width: None,
            filament_diameter: 1.75,
            layer_height: 0.2,
            prime_filament_length: 10.0,

            start_gcode: String::new(),
            end_gcode: String::new(),
            output: None,
            gcode_xy_decimals: 2,
            gcode_e_decimals: None,

            support_fins: false,
            support_fin_height: None,
            support_extrusion_factor: 0.25,
        }
    }
}

impl fmt::Display for PrintConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PrintConfig(order={}, size={:.1}mm, layer={:.2}mm, speed={:.0}mm/s)",
            self.order, self.size, self.layer_height, self.speed
        )
    }
}
