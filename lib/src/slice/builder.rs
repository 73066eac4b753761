//! LayerBuilder - samples the fractal into printable layers.
//!
//! Layer `i` of `n` cuts the normalized pyramid at `H · i / n`, maps the
//! loop to bed coordinates, and is printed at `origin.z + i · layer_height`.
//! The geometric Z of the section is thrown away so that print heights are
//! an exact arithmetic progression.

use crate::config::PrintParams;
use crate::fractal::{self, PYRAMID_NOMINAL_HEIGHT};
use crate::geometry::{Point3, Transform3D};
use crate::slice::Layer;
use crate::{CoordF, Result};
use log::debug;

/// Builds the ordered layer list for one print.
#[derive(Debug, Clone)]
pub struct LayerBuilder {
    /// Fractal recursion order.
    order: u32,

    /// Number of layers to sample.
    layer_count: usize,

    /// Edge length of the pyramid base in mm.
    size: CoordF,

    /// Bed position of the base center; its Z is the first layer's Z.
    origin: Point3,

    /// Physical layer height in mm.
    layer_height: CoordF,
}

impl LayerBuilder {
    /// Create a builder from explicit parameters.
    pub fn new(
        order: u32,
        layer_count: usize,
        size: CoordF,
        origin: Point3,
        layer_height: CoordF,
    ) -> Self {
        Self {
            order,
            layer_count,
            size,
            origin,
            layer_height,
        }
    }

    /// Create a builder from resolved print parameters.
    pub fn from_params(params: &PrintParams) -> Self {
        Self::new(
            params.order,
            params.layer_count,
            params.size,
            params.bed_center,
            params.layer_height,
        )
    }

    /// Normalized cut height for layer `index`.
    #[inline]
    pub fn nominal_height(&self, index: usize) -> CoordF {
        PYRAMID_NOMINAL_HEIGHT * index as CoordF / self.layer_count as CoordF
    }

    /// Print Z for layer `index`.
    #[inline]
    pub fn print_z(&self, index: usize) -> CoordF {
        self.origin.z + index as CoordF * self.layer_height
    }

    /// Normalized frame to bed coordinates.
    pub fn world_transform(&self) -> Transform3D {
        Transform3D::uniform_scaling(self.size / 2.0).then(&Transform3D::translation(
            self.origin.x,
            self.origin.y,
            self.origin.z,
        ))
    }

    /// Build a single layer.
    pub fn build_layer(&self, index: usize) -> Result<Layer> {
        let mut polygon = fractal::cross_section(self.order, self.nominal_height(index))?;
        polygon.transform(&self.world_transform());
        Ok(Layer::new(index, self.print_z(index), polygon))
    }

    /// Build all layers, bottom to top.
    pub fn build(&self) -> Result<Vec<Layer>> {
        self.build_with_callback(|_| {})
    }

    /// Build all layers with a progress callback.
    ///
    /// The callback receives a progress value from 0.0 to 1.0.
    pub fn build_with_callback<F>(&self, mut callback: F) -> Result<Vec<Layer>>
    where
        F: FnMut(f64),
    {
        let mut layers = Vec::with_capacity(self.layer_count);
        for i in 0..self.layer_count {
            layers.push(self.build_layer(i)?);
            callback((i + 1) as f64 / self.layer_count as f64);
        }
        debug!(
            "built {} layers (order {}, {} vertices)",
            layers.len(),
            self.order,
            layers.iter().map(Layer::len).sum::<usize>()
        );
        Ok(layers)
    }
}

/// Length of the printed path of each layer.
///
/// Entry `i` is the move from the previous layer's start point (or from
/// layer 0's own start) to layer `i`'s start, plus its closed loop. This is
/// the path the emitter extrudes along when layers are printed in order.
pub fn layer_path_lengths(layers: &[Layer]) -> Vec<CoordF> {
    let mut previous = layers.first().and_then(Layer::start_point);
    layers
        .iter()
        .map(|layer| {
            let start = layer.start_point();
            let transition = match (previous, start) {
                (Some(a), Some(b)) => a.distance(&b),
                _ => 0.0,
            };
            if start.is_some() {
                previous = start;
            }
            transition + layer.loop_length()
        })
        .collect()
}

/// Filament (mm) needed to print `layers` in order, with `rate_at` giving
/// the extrusion per mm of travel at a print Z.
pub fn filament_estimate<F>(layers: &[Layer], rate_at: F) -> CoordF
where
    F: Fn(CoordF) -> CoordF,
{
    layers
        .iter()
        .zip(layer_path_lengths(layers))
        .map(|(layer, length)| length * rate_at(layer.z()))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(order: u32, layer_count: usize) -> LayerBuilder {
        LayerBuilder::new(order, layer_count, 100.0, Point3::new(100.0, 100.0, 0.2), 0.5)
    }

    #[test]
    fn test_nominal_heights_span_pyramid() {
        let b = builder(2, 10);
        assert_eq!(b.nominal_height(0), 0.0);
        assert!((b.nominal_height(5) - PYRAMID_NOMINAL_HEIGHT / 2.0).abs() < 1e-12);
        assert!(b.nominal_height(9) < PYRAMID_NOMINAL_HEIGHT);
    }

    #[test]
    fn test_layer_z_is_exact_progression() {
        let layers = builder(3, 40).build().unwrap();
        assert_eq!(layers.len(), 40);
        for (i, layer) in layers.iter().enumerate() {
            assert_eq!(layer.index(), i);
            let expected = 0.2 + i as CoordF * 0.5;
            assert_eq!(layer.z(), expected);
            assert!(layer.points().iter().all(|p| p.z == expected));
        }
    }

    #[test]
    fn test_first_layer_maps_to_bed() {
        let layer = builder(2, 10).build_layer(0).unwrap();
        let (min, max) = layer.polygon().extent().unwrap();
        assert!((min.x - 50.0).abs() < 1e-9 && (min.y - 50.0).abs() < 1e-9);
        assert!((max.x - 150.0).abs() < 1e-9 && (max.y - 150.0).abs() < 1e-9);
        let start = layer.start_point().unwrap();
        assert!((start.x - 50.0).abs() < 1e-9 && (start.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_progress_callback() {
        let mut seen = Vec::new();
        builder(1, 4)
            .build_with_callback(|p| seen.push(p))
            .unwrap();
        assert_eq!(seen, vec![0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_zero_layers() {
        assert!(builder(2, 0).build().unwrap().is_empty());
        assert!(layer_path_lengths(&[]).is_empty());
    }

    #[test]
    fn test_layer_path_lengths() {
        let layers = builder(0, 2).build().unwrap();
        let lengths = layer_path_lengths(&layers);
        // first layer: the full 100 mm square
        assert!((lengths[0] - 400.0).abs() < 1e-9);
        // second layer: diagonal step in, then its smaller square
        let inset = 100.0 / 2.0 * (1.0 - (PYRAMID_NOMINAL_HEIGHT / 2.0) / PYRAMID_NOMINAL_HEIGHT);
        let step = (2.0 * (50.0 - inset).powi(2) + 0.25).sqrt();
        assert!((lengths[1] - (step + 8.0 * inset)).abs() < 1e-9);
    }

    #[test]
    fn test_filament_estimate_uses_rate_per_layer() {
        let layers = builder(0, 2).build().unwrap();
        let lengths = layer_path_lengths(&layers);
        let estimate = filament_estimate(&layers, |z| if z < 0.5 { 2.0 } else { 1.0 });
        assert!((estimate - (lengths[0] * 2.0 + lengths[1])).abs() < 1e-9);
    }
}
