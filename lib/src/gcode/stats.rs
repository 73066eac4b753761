//! Statistics about emitted G-code.

use std::fmt;

/// Running totals kept by the emitter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GCodeStats {
    /// Number of layer loops printed (both passes in support mode).
    pub layer_count: usize,

    /// Total estimated print time (seconds).
    pub print_time_seconds: f64,

    /// Total filament used (mm).
    pub filament_used_mm: f64,

    /// Filament used by layer loops and their fins (mm).
    pub model_filament_mm: f64,

    /// Filament used by the prime line and raft (mm).
    pub prime_filament_mm: f64,

    /// Total travel distance (mm).
    pub travel_distance_mm: f64,

    /// Total extrusion distance (mm).
    pub extrusion_distance_mm: f64,

    /// Number of travel moves written.
    pub travel_moves: usize,

    /// Number of extrusion moves written.
    pub print_moves: usize,
}

impl GCodeStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get print time formatted as HH:MM:SS.
    pub fn print_time_formatted(&self) -> String {
        let total_seconds = self.print_time_seconds as u64;
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    }

    /// Get filament used in meters.
    pub fn filament_used_meters(&self) -> f64 {
        self.filament_used_mm / 1000.0
    }
}

impl fmt::Display for GCodeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GCodeStats(layers={}, moves={}, time={}, filament={:.2}m)",
            self.layer_count,
            self.travel_moves + self.print_moves,
            self.print_time_formatted(),
            self.filament_used_meters()
        )
    }
}
