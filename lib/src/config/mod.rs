//! Configuration module.
//!
//! - [`PrintConfig`] - the JSON document a print is described by
//! - [`OutputTarget`] - where G-code goes (stdout or a file)
//! - [`PrintParams`] - values derived from a config, shared by the layer
//!   builder and the emitter

mod output;
mod params;
mod print_config;

pub use output::OutputTarget;
pub use params::{PrintParams, FIRST_LAYER_TOLERANCE};
pub use print_config::{PrintConfig, MAX_ORDER};
