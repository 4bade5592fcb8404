//! Named color maps as control-point lists.
//!
//! Control points are evenly spaced over the normalized scalar range and
//! resampled to the transfer function table length with linear interpolation.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMap {
    /// Black to white ramp, the fallback when no map is requested.
    Grayscale,
    CoolToWarm,
    SpectralReverse,
    Magma,
    Viridis,
}

const GRAYSCALE: &[[f32; 3]] = &[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]];

// ParaView's diverging cool-to-warm endpoints
const COOL_TO_WARM: &[[f32; 3]] = &[
    [0.231, 0.298, 0.753],
    [0.865, 0.865, 0.865],
    [0.706, 0.016, 0.149],
];

// ColorBrewer 11-class Spectral, reversed so low values are blue
const SPECTRAL_REVERSE: &[[f32; 3]] = &[
    [0.369, 0.310, 0.635],
    [0.196, 0.533, 0.741],
    [0.400, 0.761, 0.647],
    [0.671, 0.867, 0.643],
    [0.902, 0.961, 0.596],
    [1.000, 1.000, 0.749],
    [0.996, 0.878, 0.545],
    [0.992, 0.682, 0.380],
    [0.957, 0.427, 0.263],
    [0.835, 0.243, 0.310],
    [0.620, 0.004, 0.259],
];

const MAGMA: &[[f32; 3]] = &[
    [0.001, 0.000, 0.014],
    [0.135, 0.068, 0.340],
    [0.317, 0.072, 0.485],
    [0.494, 0.117, 0.506],
    [0.716, 0.215, 0.475],
    [0.869, 0.288, 0.409],
    [0.987, 0.536, 0.382],
    [0.997, 0.770, 0.583],
    [0.987, 0.991, 0.750],
];

const VIRIDIS: &[[f32; 3]] = &[
    [0.267, 0.005, 0.329],
    [0.283, 0.141, 0.458],
    [0.254, 0.265, 0.530],
    [0.207, 0.372, 0.553],
    [0.128, 0.567, 0.551],
    [0.135, 0.659, 0.518],
    [0.369, 0.789, 0.383],
    [0.741, 0.873, 0.150],
    [0.993, 0.906, 0.144],
];

impl ColorMap {
    /// Accepts the same spellings the original configuration did.
    pub fn from_name(name: &str) -> Option<ColorMap> {
        match name {
            "coolToWarm" | "cool to warm" => Some(ColorMap::CoolToWarm),
            "spectralReverse" | "spectral reverse" | "reverse spectral" => {
                Some(ColorMap::SpectralReverse)
            }
            "magma" => Some(ColorMap::Magma),
            "viridis" => Some(ColorMap::Viridis),
            _ => None,
        }
    }

    pub fn control_points(&self) -> &'static [[f32; 3]] {
        match self {
            ColorMap::Grayscale => GRAYSCALE,
            ColorMap::CoolToWarm => COOL_TO_WARM,
            ColorMap::SpectralReverse => SPECTRAL_REVERSE,
            ColorMap::Magma => MAGMA,
            ColorMap::Viridis => VIRIDIS,
        }
    }

    /// Linearly resamples the control points to an `n`-entry table.
    pub fn resample(&self, n: usize) -> Vec<[f32; 3]> {
        resample_points(self.control_points(), n)
    }
}

pub(crate) fn resample_points(points: &[[f32; 3]], n: usize) -> Vec<[f32; 3]> {
    assert!(n >= 2);
    if points.len() == 1 {
        return vec![points[0]; n];
    }

    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let t = i as f32 / (n - 1) as f32 * (points.len() - 1) as f32;
        let lo = t.floor() as usize;
        let hi = (lo + 1).min(points.len() - 1);
        let f = t - lo as f32;
        out.push([
            points[lo][0] * (1.0 - f) + points[hi][0] * f,
            points[lo][1] * (1.0 - f) + points[hi][1] * f,
            points[lo][2] * (1.0 - f) + points[hi][2] * f,
        ]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_spellings() {
        assert_eq!(ColorMap::from_name("cool to warm"), Some(ColorMap::CoolToWarm));
        assert_eq!(ColorMap::from_name("coolToWarm"), Some(ColorMap::CoolToWarm));
        assert_eq!(
            ColorMap::from_name("reverse spectral"),
            Some(ColorMap::SpectralReverse)
        );
        assert_eq!(ColorMap::from_name("viridis"), Some(ColorMap::Viridis));
        assert_eq!(ColorMap::from_name("plasma"), None);
    }

    #[test]
    fn test_resample_preserves_endpoints() {
        let table = ColorMap::Grayscale.resample(256);
        assert_eq!(table.len(), 256);
        assert_eq!(table[0], [0.0, 0.0, 0.0]);
        assert_eq!(table[255], [1.0, 1.0, 1.0]);
        // midpoint of a linear ramp
        let mid = table[128][0];
        assert!((mid - 128.0 / 255.0).abs() < 1e-5);
    }

    #[test]
    fn test_resample_down() {
        let table = resample_points(&[[0.0; 3], [0.5; 3], [1.0; 3]], 2);
        assert_eq!(table, vec![[0.0; 3], [1.0; 3]]);
    }
}
