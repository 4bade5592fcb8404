use std::sync::Arc;

use scivis::Vec3;

use crate::colormap::{resample_points, ColorMap};

/// Transfer function table length.
pub const TABLE_SIZE: usize = 256;

/// Color and opacity tables feeding the engine transfer function.
///
/// Opacity defaults to a linear 0 to 1 ramp; a user map replaces the ramp and
/// attenuation scales whatever is there.
pub struct TransferFunction {
    colors: Vec<[f32; 3]>,
    opacities: Vec<f32>,
}

impl TransferFunction {
    pub fn new(map: ColorMap) -> TransferFunction {
        let opacities = (0..TABLE_SIZE)
            .map(|i| i as f32 / (TABLE_SIZE - 1) as f32)
            .collect();
        TransferFunction {
            colors: map.resample(TABLE_SIZE),
            opacities,
        }
    }

    pub fn set_color_map(&mut self, map: ColorMap) {
        self.colors = map.resample(TABLE_SIZE);
    }

    /// Replaces the opacity ramp with the user's control points, linearly
    /// resampled to the table length. Empty input keeps the current table.
    pub fn set_opacity_map(&mut self, points: &[f32]) {
        if points.is_empty() {
            return;
        }
        if points.len() == 1 {
            self.opacities = vec![points[0].clamp(0.0, 1.0); TABLE_SIZE];
            return;
        }
        let as_rgb: Vec<[f32; 3]> = points.iter().map(|&p| [p; 3]).collect();
        self.opacities = resample_points(&as_rgb, TABLE_SIZE)
            .into_iter()
            .map(|v| v[0].clamp(0.0, 1.0))
            .collect();
    }

    /// Scales every opacity entry; values >= 1.0 do nothing.
    pub fn attenuate(&mut self, attenuation: f32) {
        if attenuation >= 1.0 || attenuation < 0.0 {
            return;
        }
        for o in &mut self.opacities {
            *o *= attenuation;
        }
    }

    pub fn opacities(&self) -> &[f32] {
        &self.opacities
    }

    /// Builds the engine-side lookup object over the given value range.
    pub fn to_engine(&self, value_range: (f32, f32)) -> Arc<scivis::TransferFunction> {
        let colors = self
            .colors
            .iter()
            .map(|c| Vec3(c[0], c[1], c[2]))
            .collect();
        Arc::new(scivis::TransferFunction::new(
            colors,
            self.opacities.clone(),
            value_range,
        ))
    }
}

impl Default for TransferFunction {
    fn default() -> Self {
        TransferFunction::new(ColorMap::Grayscale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_opacity_is_ramp() {
        let tf = TransferFunction::default();
        assert_eq!(tf.opacities().len(), TABLE_SIZE);
        assert_eq!(tf.opacities()[0], 0.0);
        assert_eq!(tf.opacities()[TABLE_SIZE - 1], 1.0);
    }

    #[test]
    fn test_opacity_map_resampled() {
        let mut tf = TransferFunction::default();
        tf.set_opacity_map(&[1.0, 0.0]);
        assert_eq!(tf.opacities()[0], 1.0);
        assert_eq!(tf.opacities()[TABLE_SIZE - 1], 0.0);
        let mid = tf.opacities()[TABLE_SIZE / 2];
        assert!((mid - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_attenuation_only_below_one() {
        let mut tf = TransferFunction::default();
        tf.set_opacity_map(&[0.8]);
        tf.attenuate(2.0);
        assert_eq!(tf.opacities()[0], 0.8);
        tf.attenuate(0.5);
        assert!((tf.opacities()[0] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_engine_conversion_range() {
        let mut tf = TransferFunction::new(ColorMap::Viridis);
        tf.set_opacity_map(&[0.25]);
        let engine = tf.to_engine((0.0, 100.0));
        assert!((engine.opacity(50.0) - 0.25).abs() < 1e-5);
    }
}
