//! Slicing module - turns the fractal into printable layers.
//!
//! - [`Layer`] - one cross-section in bed coordinates with its print Z
//! - [`LayerBuilder`] - samples the pyramid at equally spaced heights
//! - [`layer_path_lengths`], [`filament_estimate`] - path bookkeeping used
//!   for the G-code header statistics

mod builder;
mod layer;

pub use builder::{filament_estimate, layer_path_lengths, LayerBuilder};
pub use layer::Layer;
