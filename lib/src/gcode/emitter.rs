//! Toolpath emitter.
//!
//! [`ToolpathEmitter`] owns the running machine state (toolhead position,
//! extruder position, fan) and turns layers into G-code through a
//! [`GCodeWriter`]. It is strictly sequential: every move depends on where
//! the previous one ended.
//!
//! # Move primitives
//!
//! - [`travel_to`](ToolpathEmitter::travel_to) - `G0`, skipped when already there
//! - [`print_to`](ToolpathEmitter::print_to) - verbose `G1` with Z and F,
//!   first-layer aware, skipped when already there
//! - [`print_to_with`](ToolpathEmitter::print_to_with) - verbose `G1` with an
//!   explicit speed and extrusion rate, never skipped (it also resets F)
//! - [`print_to_compact`](ToolpathEmitter::print_to_compact) - shortest
//!   `G1 X Y E` form for in-layer moves
//!
//! # Lifecycle
//!
//! `Idle → Configured → Priming → Printing(i) → FanOn → ... → FanOff → Finished`

use super::{
    end_fins, start_fins, BoundaryKind, GCodeCommand, GCodeStats, GCodeWriter, PriorMove,
};
use crate::config::PrintParams;
use crate::geometry::Point3;
use crate::slice::{filament_estimate, Layer};
use crate::{CoordF, Error, Result, BUILD_REVISION, VERSION};
use log::{debug, info};
use std::fmt;
use std::io::Write;

/// Moves shorter than this (squared, mm²) are not emitted.
pub const DEDUP_EPSILON_SQ: CoordF = 1e-8;

/// A coordinate that changes by less than this (mm) counts as unchanged.
pub const AXIS_EPSILON: CoordF = 1e-3;

/// Where the emitter is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterPhase {
    Idle,
    /// Prologue written.
    Configured,
    /// Prime line and raft.
    Priming,
    /// Printing the loop with this running index (counts both passes in
    /// support mode).
    Printing(usize),
    /// Fan switched on after the given layer.
    FanOn(usize),
    FanOff,
    Finished,
}

impl fmt::Display for EmitterPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitterPhase::Idle => write!(f, "idle"),
            EmitterPhase::Configured => write!(f, "configured"),
            EmitterPhase::Priming => write!(f, "priming"),
            EmitterPhase::Printing(i) => write!(f, "printing layer {}", i),
            EmitterPhase::FanOn(i) => write!(f, "fan on after layer {}", i),
            EmitterPhase::FanOff => write!(f, "fan off"),
            EmitterPhase::Finished => write!(f, "finished"),
        }
    }
}

/// Mutable machine state threaded through every move.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterState {
    /// Last toolhead position.
    pub position: Point3,
    /// Running extruder position (absolute mode only).
    pub extruder_position: CoordF,
    pub fan_on: bool,
    pub phase: EmitterPhase,
}

impl Default for EmitterState {
    fn default() -> Self {
        Self {
            position: Point3::zero(),
            extruder_position: 0.0,
            fan_on: false,
            phase: EmitterPhase::Idle,
        }
    }
}

/// Speed and extrusion rate of a print move.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Extrusion {
    speed: CoordF,
    per_mm: CoordF,
}

/// Converts layers into a G-code stream.
pub struct ToolpathEmitter<W: Write> {
    params: PrintParams,
    writer: GCodeWriter<W>,
    state: EmitterState,
    stats: GCodeStats,
}

impl<W: Write> ToolpathEmitter<W> {
    /// Create an emitter writing to `out`.
    pub fn new(params: PrintParams, out: W) -> Self {
        Self {
            params,
            writer: GCodeWriter::new(out),
            state: EmitterState::default(),
            stats: GCodeStats::new(),
        }
    }

    /// Get the print parameters.
    #[inline]
    pub fn params(&self) -> &PrintParams {
        &self.params
    }

    /// Get the current machine state.
    #[inline]
    pub fn state(&self) -> &EmitterState {
        &self.state
    }

    /// Get the statistics collected so far.
    #[inline]
    pub fn stats(&self) -> &GCodeStats {
        &self.stats
    }

    /// Flush and return the sink.
    pub fn into_inner(self) -> Result<W> {
        self.writer.into_inner()
    }

    fn set_phase(&mut self, phase: EmitterPhase) {
        if self.state.phase != phase {
            debug!("emitter: {} -> {}", self.state.phase, phase);
            self.state.phase = phase;
        }
    }

    fn write(&mut self, command: GCodeCommand) -> Result<()> {
        if self.state.phase == EmitterPhase::Finished {
            return Err(Error::GCode(format!(
                "cannot write `{}` after the print has finished",
                command.to_gcode()
            )));
        }
        self.writer.write(&command)
    }

    fn comment(&mut self, text: impl Into<String>) -> Result<()> {
        self.write(GCodeCommand::Comment(text.into()))
    }

    #[inline]
    fn feed_rate(speed: CoordF) -> CoordF {
        speed * 60.0
    }

    #[inline]
    fn is_at(&self, p: &Point3) -> bool {
        self.state.position.coincides_with(p, DEDUP_EPSILON_SQ)
    }

    /// Normal-layer extrusion for a move ending at `z`.
    fn extrusion_at(&self, z: CoordF) -> Extrusion {
        Extrusion {
            speed: self.params.print_speed_at(z),
            per_mm: self.params.extrusion_per_mm_at(z),
        }
    }

    fn normal_extrusion(&self) -> Extrusion {
        Extrusion {
            speed: self.params.speed,
            per_mm: self.params.extrusion_per_mm,
        }
    }

    fn fin_extrusion(&self) -> Extrusion {
        Extrusion {
            speed: self.params.fin_speed(),
            per_mm: self.params.fin_extrusion_per_mm(),
        }
    }

    /// Book `length` mm of filament and return the E value to write.
    fn extrude(&mut self, length: CoordF, distance: CoordF, speed: CoordF) -> CoordF {
        self.stats.filament_used_mm += length;
        match self.state.phase {
            EmitterPhase::Printing(_) => self.stats.model_filament_mm += length,
            _ => self.stats.prime_filament_mm += length,
        }
        self.stats.extrusion_distance_mm += distance;
        self.stats.print_moves += 1;
        if speed > 0.0 {
            self.stats.print_time_seconds += distance / speed;
        }

        if self.params.relative_extrusion {
            length
        } else {
            self.state.extruder_position += length;
            self.state.extruder_position
        }
    }

    /// Non-extruding move. Does nothing if the toolhead is already at `p`.
    pub fn travel_to(&mut self, p: Point3) -> Result<()> {
        if self.is_at(&p) {
            return Ok(());
        }
        let distance = self.state.position.distance(&p);
        self.write(GCodeCommand::RapidMove {
            x: Some(p.x),
            y: Some(p.y),
            z: Some(p.z),
            f: Some(Self::feed_rate(self.params.speed)),
        })?;
        self.stats.travel_moves += 1;
        self.stats.travel_distance_mm += distance;
        self.stats.print_time_seconds += distance / self.params.speed;
        self.state.position = p;
        Ok(())
    }

    /// Extruding move with first-layer handling. Does nothing if the
    /// toolhead is already at `p`.
    pub fn print_to(&mut self, p: Point3) -> Result<()> {
        if self.is_at(&p) {
            return Ok(());
        }
        let extrusion = self.extrusion_at(p.z);
        self.print_to_with(p, extrusion.speed, extrusion.per_mm)
    }

    /// Extruding move at the current height.
    pub fn print_to_xy(&mut self, x: CoordF, y: CoordF) -> Result<()> {
        self.print_to(Point3::new(x, y, self.state.position.z))
    }

    /// Extruding move with explicit speed (mm/s) and filament per mm.
    ///
    /// Always written, even for a zero-length move, so it can be used to
    /// change the feed rate in place.
    pub fn print_to_with(&mut self, p: Point3, speed: CoordF, per_mm: CoordF) -> Result<()> {
        let distance = self.state.position.distance(&p);
        let e = self.extrude(distance * per_mm, distance, speed);
        self.write(GCodeCommand::LinearMove {
            x: Some(p.x),
            y: Some(p.y),
            z: Some(p.z),
            e: Some(e),
            f: Some(Self::feed_rate(speed)),
        })?;
        self.state.position = p;
        Ok(())
    }

    fn print_with(&mut self, p: Point3, extrusion: Extrusion) -> Result<()> {
        self.print_to_with(p, extrusion.speed, extrusion.per_mm)
    }

    /// In-plane extruding move in the shortest text form (no Z, no F).
    /// Does nothing if the toolhead is already at `p`.
    pub fn print_to_compact(&mut self, p: Point3) -> Result<()> {
        if self.is_at(&p) {
            return Ok(());
        }
        let distance = self.state.position.distance(&p);
        let extrusion = self.extrusion_at(p.z);
        let e = self.extrude(distance * extrusion.per_mm, distance, extrusion.speed);
        self.write(GCodeCommand::CompactMove {
            x: p.x,
            y: p.y,
            e,
            xy_decimals: self.params.xy_decimals,
            e_decimals: self.params.e_decimals,
        })?;
        self.state.position = p;
        Ok(())
    }

    /// Write the banner, configuration echo, calculated values, statistics
    /// comments, start G-code and mode commands.
    ///
    /// `config_echo` is echoed line by line as comments.
    pub fn write_prologue(&mut self, config_echo: &str, filament_estimate: CoordF) -> Result<()> {
        let p = self.params.clone();
        self.comment("generated by sierpinski-gcode")?;
        self.comment(format!("version: {} (commit {})", VERSION, BUILD_REVISION))?;
        self.write(GCodeCommand::Blank)?;

        self.comment("input config file:")?;
        for line in config_echo.lines() {
            self.comment(line)?;
        }
        self.write(GCodeCommand::Blank)?;

        self.comment("calculated variables")?;
        self.comment(format!("pyramid_z_height: {:.6}", p.pyramid_z_height))?;
        self.comment(format!("layer_count: {}", p.layer_count))?;
        self.comment(format!("extrusion_per_mm: {:.6}", p.extrusion_per_mm))?;
        self.comment(format!("smallest_pyramid_size: {:.6}", p.smallest_pyramid_size))?;
        self.write(GCodeCommand::Blank)?;

        // keys recognized by PrusaSlicer-aware firmware and tools
        self.comment(format!(
            "estimated printing time (normal mode) = {:.6}s",
            p.estimated_print_time(filament_estimate)
        ))?;
        self.comment(format!("filament used [mm] = {:.6}", filament_estimate))?;
        self.comment(format!("layer_height = {:.6}", p.layer_height))?;
        self.comment(format!("END_LAYER_OBJECT z={:.6}", p.pyramid_z_height))?;
        self.write(GCodeCommand::Blank)?;

        self.comment("start gcode:")?;
        self.write(GCodeCommand::Raw(p.start_gcode.clone()))?;
        self.write(GCodeCommand::SetUnitsMm)?;
        self.write(if p.relative_extrusion {
            GCodeCommand::RelativeExtrusion
        } else {
            GCodeCommand::AbsoluteExtrusion
        })?;
        self.write(GCodeCommand::Blank)?;

        self.set_phase(EmitterPhase::Configured);
        Ok(())
    }

    /// Print the prime line in front of the object, ending at its
    /// lower-left corner on the first layer.
    ///
    /// The line is a serpentine of paired passes, as many as needed to push
    /// out `prime_filament_length` (rounded up to an even count).
    pub fn prime(&mut self) -> Result<()> {
        self.set_phase(EmitterPhase::Priming);
        self.comment("prime the nozzle")?;

        let p = &self.params;
        let half_bed = p.bed_size / 2.0;
        let half_size = p.size / 2.0;
        let mut line_count =
            (p.prime_filament_length / p.first_layer_extrusion_per_mm / p.size).ceil() as usize;
        if line_count % 2 == 1 {
            line_count += 1;
        }
        let separation = p.first_layer_extrusion_width * 2.0;
        let distance_from_object = (2.0 * separation).max(5.0);

        let min_x = half_bed - half_size;
        let max_x = half_bed + half_size;
        let start_y =
            half_bed - half_size - distance_from_object - separation * line_count as CoordF;
        let z = p.z_offset;

        self.travel_to(Point3::new(min_x, start_y, z))?;
        for i in 0..line_count / 2 {
            let y0 = start_y + (2 * i) as CoordF * separation;
            let y1 = start_y + (2 * i + 1) as CoordF * separation;
            self.print_to_xy(min_x, y0)?;
            self.print_to_xy(max_x, y0)?;
            self.print_to_xy(max_x, y1)?;
            self.print_to_xy(min_x, y1)?;
        }
        self.print_to_xy(min_x, min_x)?;
        self.write(GCodeCommand::Blank)
    }

    /// Print a serpentine raft under the whole footprint for the support
    /// stack, then step up one layer at the lower-left corner.
    pub fn raft(&mut self) -> Result<()> {
        self.set_phase(EmitterPhase::Priming);
        let (xy_min, xy_max) = (self.params.xy_min, self.params.xy_max);
        let width = self.params.first_layer_extrusion_width;
        let sections = (self.params.size / width).ceil() as usize;

        for i in 0..(sections + 1) / 2 {
            let y0 = xy_min + (2 * i) as CoordF * width;
            let y1 = xy_min + (2 * i + 1) as CoordF * width;
            self.print_to_xy(xy_min, y0)?;
            self.print_to_xy(xy_max, y0)?;
            self.print_to_xy(xy_max, y1)?;
            self.print_to_xy(xy_min, y1)?;
        }
        self.print_to_xy(xy_min, xy_max + width)?;
        self.print_to_xy(xy_min - width, xy_max + width)?;
        self.print_to_xy(xy_min - width, xy_min)?;
        self.print_to(Point3::new(
            xy_min,
            xy_min,
            self.params.z_offset + self.params.layer_height,
        ))
    }

    /// Print one layer at its own height.
    pub fn print_layer(&mut self, layer: &Layer) -> Result<()> {
        self.print_loop(layer.points(), layer.z(), false)
    }

    /// Print a closed loop at height `z`, optionally with support fins.
    ///
    /// The move onto the loop is a print move, not a travel: on this shape
    /// it leaves a cleaner seam. Every vertex is printed compactly and the
    /// loop is closed back to its first vertex unless it already ends there.
    pub fn print_loop(&mut self, points: &[Point3], z: CoordF, fins: bool) -> Result<()> {
        let Some(first) = points.first().map(|p| p.with_z(z)) else {
            return Ok(());
        };
        let last = points[points.len() - 1].with_z(z);
        let (xy_min, xy_max) = (self.params.xy_min, self.params.xy_max);
        let offset = self.params.fin_offset();
        let base_square = points.len() == 4;
        let fin = self.fin_extrusion();
        let normal = self.normal_extrusion();

        if fins {
            for p in start_fins(first, xy_min, offset, base_square) {
                self.print_with(p, fin)?;
            }
            self.print_with(first, fin)?;
            self.print_with(first, normal)?;
        } else {
            self.print_to(first)?;
        }

        for (i, p) in points.iter().enumerate() {
            let pt = p.with_z(z);
            let prior = PriorMove::between(&self.state.position, &pt);
            self.print_to_compact(pt)?;
            if !fins {
                continue;
            }
            if let Some(corner) = BoundaryKind::classify(i, points.len()).corner() {
                for q in corner.detour(pt, xy_min, xy_max, offset, prior) {
                    self.print_with(q, fin)?;
                }
                self.print_with(pt, fin)?;
                self.print_with(pt, normal)?;
            }
        }

        if !first.coincides_with(&last, DEDUP_EPSILON_SQ) {
            self.print_to(first)?;
        }

        if fins {
            for p in end_fins(first, xy_min, offset, base_square) {
                self.print_with(p, fin)?;
            }
        }
        self.stats.layer_count += 1;
        Ok(())
    }

    /// Switch the part cooling fan on. Only the first call writes anything.
    pub fn fan_on(&mut self, after_layer: usize) -> Result<()> {
        if self.state.fan_on {
            return Ok(());
        }
        self.write(GCodeCommand::SetFanSpeed { s: 255 })?;
        self.state.fan_on = true;
        self.set_phase(EmitterPhase::FanOn(after_layer));
        Ok(())
    }

    /// Switch the part cooling fan off.
    pub fn fan_off(&mut self) -> Result<()> {
        self.write(GCodeCommand::FanOff)?;
        self.state.fan_on = false;
        self.set_phase(EmitterPhase::FanOff);
        Ok(())
    }

    /// Write the end G-code, flush, and refuse any further output.
    pub fn finish(&mut self) -> Result<()> {
        self.write(GCodeCommand::Blank)?;
        self.comment("end gcode:")?;
        let end = self.params.end_gcode.clone();
        self.write(GCodeCommand::Raw(end))?;
        self.write(GCodeCommand::Blank)?;
        self.writer.flush()?;
        self.set_phase(EmitterPhase::Finished);
        Ok(())
    }

    fn print_pass_layer(
        &mut self,
        running_index: usize,
        pass_index: usize,
        points: &[Point3],
        z: CoordF,
        fins: bool,
    ) -> Result<()> {
        self.set_phase(EmitterPhase::Printing(running_index));
        self.print_loop(points, z, fins)?;
        if pass_index == self.params.fan_start_layer {
            self.fan_on(pass_index)?;
        }
        Ok(())
    }

    /// Emit a complete print: prologue, prime line, all layers, fan
    /// control and end G-code.
    ///
    /// In support mode a raft and an upside-down copy of the whole stack
    /// (each loop one layer higher than the layer it mirrors, with fins
    /// below `support_fin_height`) are printed first, and the pyramid is
    /// printed on top of it.
    ///
    /// The callback receives a progress value from 0.0 to 1.0.
    pub fn emit<F>(&mut self, layers: &[Layer], config_echo: &str, mut progress: F) -> Result<()>
    where
        F: FnMut(f64),
    {
        let estimate = filament_estimate(layers, |z| self.params.extrusion_per_mm_at(z))
            + self.params.prime_filament_length;
        info!("estimated filament: {:.1}mm", estimate);

        self.write_prologue(config_echo, estimate)?;
        self.prime()?;
        self.comment("sierpinski pyramid starts now")?;

        let n = layers.len();
        if self.params.support_fins && n > 0 {
            self.raft()?;
            let lh = self.params.layer_height;
            let fin_height = self.params.support_fin_height;
            let total = 2 * n;
            for i in 0..n {
                let mirrored = &layers[n - 1 - i];
                let z = layers[i].z() + lh;
                let fins = layers[i].z() < fin_height;
                self.print_pass_layer(i, i, mirrored.points(), z, fins)?;
                progress((i + 1) as f64 / total as f64);
            }
            let lift = layers[n - 1].z() - self.params.z_offset + lh;
            for (i, layer) in layers.iter().enumerate() {
                self.print_pass_layer(n + i, i, layer.points(), layer.z() + lift, false)?;
                progress((n + i + 1) as f64 / total as f64);
            }
        } else {
            for (i, layer) in layers.iter().enumerate() {
                self.print_pass_layer(i, i, layer.points(), layer.z(), false)?;
                progress((i + 1) as f64 / n as f64);
            }
        }

        self.fan_off()?;
        self.finish()?;
        info!("{}", self.stats);
        Ok(())
    }
}
