//! G-code generation module.
//!
//! This module turns layers into a G-code stream:
//! - [`GCodeCommand`] - one instruction line
//! - [`GCodeWriter`] - line writer over any [`std::io::Write`] sink
//! - [`ToolpathEmitter`] - moves, extrusion bookkeeping, prime line, raft,
//!   support fins and fan control
//! - [`format_smallest`] - compact number formatting for size-optimized moves

mod emitter;
mod fins;
mod number;
mod stats;
mod writer;

pub use emitter::{EmitterPhase, EmitterState, ToolpathEmitter, AXIS_EPSILON, DEDUP_EPSILON_SQ};
pub use fins::{end_fins, start_fins, BoundaryKind, FinCorner, FinLead, PriorMove};
pub use number::format_smallest;
pub use stats::GCodeStats;
pub use writer::GCodeWriter;

/// Decimal places of verbose moves.
pub const VERBOSE_DECIMALS: usize = 6;

/// G-code command types.
#[derive(Clone, Debug, PartialEq)]
pub enum GCodeCommand {
    /// G0 - Rapid move (travel)
    RapidMove {
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
        f: Option<f64>,
    },
    /// G1 - Linear move (extrusion), full precision
    LinearMove {
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
        e: Option<f64>,
        f: Option<f64>,
    },
    /// G1 - In-plane extrusion move in the shortest text form
    CompactMove {
        x: f64,
        y: f64,
        e: f64,
        xy_decimals: usize,
        e_decimals: usize,
    },
    /// G21 - Units are millimeters
    SetUnitsMm,
    /// M82 - Absolute extrusion
    AbsoluteExtrusion,
    /// M83 - Relative extrusion
    RelativeExtrusion,
    /// M106 - Set fan speed
    SetFanSpeed { s: u32 },
    /// M107 - Fan off
    FanOff,
    /// Comment
    Comment(String),
    /// Raw G-code text, written as is
    Raw(String),
    /// Empty line
    Blank,
}

impl GCodeCommand {
    /// Convert the command to a G-code string (without line terminator).
    pub fn to_gcode(&self) -> String {
        let d = VERBOSE_DECIMALS;
        match self {
            GCodeCommand::RapidMove { x, y, z, f } => {
                let mut cmd = String::from("G0");
                push_field(&mut cmd, 'X', *x, d);
                push_field(&mut cmd, 'Y', *y, d);
                push_field(&mut cmd, 'Z', *z, d);
                push_field(&mut cmd, 'F', *f, d);
                cmd
            }
            GCodeCommand::LinearMove { x, y, z, e, f } => {
                let mut cmd = String::from("G1");
                push_field(&mut cmd, 'X', *x, d);
                push_field(&mut cmd, 'Y', *y, d);
                push_field(&mut cmd, 'Z', *z, d);
                push_field(&mut cmd, 'E', *e, d);
                push_field(&mut cmd, 'F', *f, d);
                cmd
            }
            GCodeCommand::CompactMove {
                x,
                y,
                e,
                xy_decimals,
                e_decimals,
            } => format!(
                "G1 X{} Y{} E{}",
                format_smallest(*x, *xy_decimals),
                format_smallest(*y, *xy_decimals),
                format_smallest(*e, *e_decimals)
            ),
            GCodeCommand::SetUnitsMm => "G21 ; set units to mm".to_string(),
            GCodeCommand::AbsoluteExtrusion => "M82 ; set absolute extrusion".to_string(),
            GCodeCommand::RelativeExtrusion => "M83 ; set relative extrusion".to_string(),
            GCodeCommand::SetFanSpeed { s } => format!("M106 S{}", s),
            GCodeCommand::FanOff => "M107".to_string(),
            GCodeCommand::Comment(text) => format!("; {}", text),
            GCodeCommand::Raw(text) => text.clone(),
            GCodeCommand::Blank => String::new(),
        }
    }
}

#[inline]
fn push_field(cmd: &mut String, letter: char, value: Option<f64>, decimals: usize) {
    if let Some(v) = value {
        cmd.push_str(&format!(" {}{:.*}", letter, decimals, v));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rapid_move() {
        let cmd = GCodeCommand::RapidMove {
            x: Some(10.0),
            y: Some(20.0),
            z: Some(0.2),
            f: Some(2400.0),
        };
        assert_eq!(
            cmd.to_gcode(),
            "G0 X10.000000 Y20.000000 Z0.200000 F2400.000000"
        );
    }

    #[test]
    fn test_linear_move() {
        let cmd = GCodeCommand::LinearMove {
            x: Some(10.0),
            y: Some(20.0),
            z: None,
            e: Some(1.5),
            f: Some(1200.0),
        };
        assert_eq!(cmd.to_gcode(), "G1 X10.000000 Y20.000000 E1.500000 F1200.000000");
    }

    #[test]
    fn test_compact_move() {
        let cmd = GCodeCommand::CompactMove {
            x: 50.0,
            y: 62.504,
            e: 0.0123456,
            xy_decimals: 2,
            e_decimals: 5,
        };
        assert_eq!(cmd.to_gcode(), "G1 X50 Y62.5 E.01235");
    }

    #[test]
    fn test_mode_commands() {
        assert_eq!(GCodeCommand::SetUnitsMm.to_gcode(), "G21 ; set units to mm");
        assert!(GCodeCommand::RelativeExtrusion.to_gcode().starts_with("M83"));
        assert!(GCodeCommand::AbsoluteExtrusion.to_gcode().starts_with("M82"));
    }

    #[test]
    fn test_fan_commands() {
        assert_eq!(GCodeCommand::SetFanSpeed { s: 255 }.to_gcode(), "M106 S255");
        assert_eq!(GCodeCommand::FanOff.to_gcode(), "M107");
    }

    #[test]
    fn test_comment() {
        let cmd = GCodeCommand::Comment("layer_height = 0.2".to_string());
        assert_eq!(cmd.to_gcode(), "; layer_height = 0.2");
        assert_eq!(GCodeCommand::Blank.to_gcode(), "");
    }
}
