use crate::vec3::Vec3;

/// Axis-aligned bounds of a scene object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Slab intersection; returns the parametric entry/exit of `origin + t*dir`.
    pub fn intersect_ray(&self, origin: Vec3, dir: Vec3) -> Option<(f32, f32)> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let (o, d, lo, hi) = match axis {
                0 => (origin.0, dir.0, self.min.0, self.max.0),
                1 => (origin.1, dir.1, self.min.1, self.max.1),
                _ => (origin.2, dir.2, self.min.2, self.max.2),
            };

            if d.abs() < 1e-12 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let (t0, t1) = if inv >= 0.0 {
                ((lo - o) * inv, (hi - o) * inv)
            } else {
                ((hi - o) * inv, (lo - o) * inv)
            };
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        Some((t_near, t_far))
    }
}

/// A regular scalar grid, centered on the origin.
///
/// Voxel (0,0,0) sits at `origin`; the grid spans `dims * spacing` world
/// units. Samples outside the grid read as the nearest edge voxel.
pub struct StructuredVolume {
    dims: [usize; 3],
    spacing: Vec3,
    origin: Vec3,
    data: Vec<f32>,
    value_range: (f32, f32),
}

impl StructuredVolume {
    pub fn new(dims: [usize; 3], spacing: Vec3, data: Vec<f32>) -> StructuredVolume {
        assert_eq!(data.len(), dims[0] * dims[1] * dims[2]);

        let mut lo = f32::INFINITY;
        let mut hi = f32::NEG_INFINITY;
        for &v in &data {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        if !lo.is_finite() || !hi.is_finite() {
            lo = 0.0;
            hi = 1.0;
        }

        let extent = Vec3(
            dims[0] as f32 * spacing.0,
            dims[1] as f32 * spacing.1,
            dims[2] as f32 * spacing.2,
        );
        let origin = -extent * 0.5;

        StructuredVolume {
            dims,
            spacing,
            origin,
            data,
            value_range: (lo, hi),
        }
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn value_range(&self) -> (f32, f32) {
        self.value_range
    }

    pub fn bounds(&self) -> Bounds {
        let extent = Vec3(
            self.dims[0] as f32 * self.spacing.0,
            self.dims[1] as f32 * self.spacing.1,
            self.dims[2] as f32 * self.spacing.2,
        );
        Bounds {
            min: self.origin,
            max: self.origin + extent,
        }
    }

    pub fn min_spacing(&self) -> f32 {
        self.spacing.0.min(self.spacing.1).min(self.spacing.2)
    }

    fn voxel(&self, x: usize, y: usize, z: usize) -> f32 {
        let x = x.min(self.dims[0] - 1);
        let y = y.min(self.dims[1] - 1);
        let z = z.min(self.dims[2] - 1);
        self.data[x + self.dims[0] * (y + self.dims[1] * z)]
    }

    /// Trilinear sample at a world-space point.
    pub fn sample(&self, p: Vec3) -> f32 {
        // voxel-center convention: voxel (i,j,k) is centered at
        // origin + (i + 0.5) * spacing
        let gx = (p.0 - self.origin.0) / self.spacing.0 - 0.5;
        let gy = (p.1 - self.origin.1) / self.spacing.1 - 0.5;
        let gz = (p.2 - self.origin.2) / self.spacing.2 - 0.5;

        let gx = gx.clamp(0.0, (self.dims[0] - 1) as f32);
        let gy = gy.clamp(0.0, (self.dims[1] - 1) as f32);
        let gz = gz.clamp(0.0, (self.dims[2] - 1) as f32);

        let x0 = gx.floor() as usize;
        let y0 = gy.floor() as usize;
        let z0 = gz.floor() as usize;
        let fx = gx - x0 as f32;
        let fy = gy - y0 as f32;
        let fz = gz - z0 as f32;

        let c000 = self.voxel(x0, y0, z0);
        let c100 = self.voxel(x0 + 1, y0, z0);
        let c010 = self.voxel(x0, y0 + 1, z0);
        let c110 = self.voxel(x0 + 1, y0 + 1, z0);
        let c001 = self.voxel(x0, y0, z0 + 1);
        let c101 = self.voxel(x0 + 1, y0, z0 + 1);
        let c011 = self.voxel(x0, y0 + 1, z0 + 1);
        let c111 = self.voxel(x0 + 1, y0 + 1, z0 + 1);

        let c00 = c000 * (1.0 - fx) + c100 * fx;
        let c10 = c010 * (1.0 - fx) + c110 * fx;
        let c01 = c001 * (1.0 - fx) + c101 * fx;
        let c11 = c011 * (1.0 - fx) + c111 * fx;

        let c0 = c00 * (1.0 - fy) + c10 * fy;
        let c1 = c01 * (1.0 - fy) + c11 * fy;

        c0 * (1.0 - fz) + c1 * fz
    }

    /// Central-difference gradient of the field at a world-space point.
    pub fn gradient(&self, p: Vec3) -> Vec3 {
        let hx = self.spacing.0 * 0.5;
        let hy = self.spacing.1 * 0.5;
        let hz = self.spacing.2 * 0.5;
        Vec3(
            (self.sample(p + Vec3(hx, 0.0, 0.0)) - self.sample(p - Vec3(hx, 0.0, 0.0))) / (2.0 * hx),
            (self.sample(p + Vec3(0.0, hy, 0.0)) - self.sample(p - Vec3(0.0, hy, 0.0))) / (2.0 * hy),
            (self.sample(p + Vec3(0.0, 0.0, hz)) - self.sample(p - Vec3(0.0, 0.0, hz))) / (2.0 * hz),
        )
    }
}
