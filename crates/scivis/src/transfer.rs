use crate::vec3::Vec3;

/// Maps scalar values to color and opacity over a fixed value range.
///
/// Both tables are sampled with linear interpolation; values outside the
/// range clamp to the table ends.
pub struct TransferFunction {
    colors: Vec<Vec3>,
    opacities: Vec<f32>,
    value_range: (f32, f32),
}

impl TransferFunction {
    pub fn new(colors: Vec<Vec3>, opacities: Vec<f32>, value_range: (f32, f32)) -> TransferFunction {
        assert!(!colors.is_empty());
        assert!(!opacities.is_empty());
        TransferFunction {
            colors,
            opacities,
            value_range,
        }
    }

    fn normalize(&self, value: f32) -> f32 {
        let (lo, hi) = self.value_range;
        if hi <= lo {
            return 0.0;
        }
        ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
    }

    pub fn color(&self, value: f32) -> Vec3 {
        let t = self.normalize(value) * (self.colors.len() - 1) as f32;
        let i = t.floor() as usize;
        let f = t - i as f32;
        if i + 1 >= self.colors.len() {
            return self.colors[self.colors.len() - 1];
        }
        Vec3::lerp(self.colors[i], self.colors[i + 1], f)
    }

    pub fn opacity(&self, value: f32) -> f32 {
        let t = self.normalize(value) * (self.opacities.len() - 1) as f32;
        let i = t.floor() as usize;
        let f = t - i as f32;
        if i + 1 >= self.opacities.len() {
            return self.opacities[self.opacities.len() - 1];
        }
        self.opacities[i] * (1.0 - f) + self.opacities[i + 1] * f
    }
}
