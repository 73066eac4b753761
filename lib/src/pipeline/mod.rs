//! Pipeline module - orchestrates a complete pyramid print.
//!
//! config → params → layers → G-code
//!
//! # Example
//!
//! ```rust,ignore
//! use sierpinski::pipeline::PrintPipeline;
//! use sierpinski::PrintConfig;
//!
//! let pipeline = PrintPipeline::new(PrintConfig::new().order(4));
//! let stats = pipeline.process(std::fs::File::create("pyramid.gcode")?)?;
//! ```

use crate::config::{OutputTarget, PrintConfig, PrintParams};
use crate::gcode::{GCodeStats, ToolpathEmitter};
use crate::slice::{filament_estimate, Layer, LayerBuilder};
use crate::{CoordF, Result};
use log::info;
use std::io::Write;

/// Runs a [`PrintConfig`] through layer building and G-code emission.
#[derive(Clone, Debug)]
pub struct PrintPipeline {
    config: PrintConfig,
}

impl PrintPipeline {
    /// Create a new pipeline for the given configuration.
    pub fn new(config: PrintConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &PrintConfig {
        &self.config
    }

    /// Validate the configuration and derive the print parameters.
    pub fn params(&self) -> Result<PrintParams> {
        self.config.resolve()
    }

    /// Build all layers for the given parameters.
    pub fn layers(&self, params: &PrintParams) -> Result<Vec<Layer>> {
        LayerBuilder::from_params(params).build()
    }

    /// Filament (mm) the header will announce: all layer paths plus the
    /// prime line.
    pub fn estimated_filament(&self, params: &PrintParams, layers: &[Layer]) -> CoordF {
        filament_estimate(layers, |z| params.extrusion_per_mm_at(z)) + params.prime_filament_length
    }

    /// Generate the whole print into `out`.
    pub fn process<W: Write>(&self, out: W) -> Result<GCodeStats> {
        self.process_with_callback(out, |_, _| {})
    }

    /// Generate the whole print into `out` with a progress callback.
    ///
    /// The callback receives (stage_name, progress_0_to_1); stages are
    /// `"layers"` and `"gcode"`.
    pub fn process_with_callback<W, F>(&self, out: W, mut callback: F) -> Result<GCodeStats>
    where
        W: Write,
        F: FnMut(&str, f64),
    {
        let params = self.params()?;
        info!("calculated variables:\n{}", params);

        // Step 1: one cross-section per layer
        callback("layers", 0.0);
        let layers = LayerBuilder::from_params(&params)
            .build_with_callback(|progress| callback("layers", progress))?;
        callback("layers", 1.0);
        info!("built {} layers", layers.len());

        // Step 2: emit
        callback("gcode", 0.0);
        let echo = self.config.to_json()?;
        let mut emitter = ToolpathEmitter::new(params, out);
        emitter.emit(&layers, &echo, |progress| callback("gcode", progress))?;
        let stats = emitter.stats().clone();
        emitter.into_inner()?;
        callback("gcode", 1.0);

        Ok(stats)
    }

    /// Generate the whole print into an output target.
    pub fn process_to_target<F>(&self, target: &OutputTarget, callback: F) -> Result<GCodeStats>
    where
        F: FnMut(&str, f64),
    {
        info!("writing G-code to {}", target);
        let out = target.open()?;
        self.process_with_callback(out, callback)
    }
}
