use crate::vec3::Vec3;

/// Pinhole perspective camera.
///
/// Rays are generated in a bottom-up raster convention: pixel row 0 is the
/// bottom of the image, matching the framebuffer layout.
#[derive(Clone, Debug)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub direction: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    pub aspect: f32,
}

impl PerspectiveCamera {
    pub fn new(position: Vec3, direction: Vec3, up: Vec3, fovy: f32, aspect: f32) -> PerspectiveCamera {
        PerspectiveCamera {
            position,
            direction: Vec3::normalized(direction),
            up,
            fovy,
            aspect,
        }
    }

    /// Ray through pixel (x, y) of a width x height raster. `jitter` offsets
    /// the sample position within the pixel; (0.5, 0.5) is the pixel center.
    pub fn generate_ray(
        &self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        jitter: (f32, f32),
    ) -> (Vec3, Vec3) {
        let forward = self.direction;
        let right = Vec3::normalized(Vec3::cross(forward, self.up));
        let true_up = Vec3::cross(right, forward);

        let half_h = (self.fovy.to_radians() * 0.5).tan();
        let half_w = half_h * self.aspect;

        // NDC in [-1, 1], y up
        let u = ((x as f32 + jitter.0) / width as f32) * 2.0 - 1.0;
        let v = ((y as f32 + jitter.1) / height as f32) * 2.0 - 1.0;

        let dir = forward + right * (u * half_w) + true_up * (v * half_h);
        (self.position, Vec3::normalized(dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_is_view_direction() {
        let cam = PerspectiveCamera::new(
            Vec3(0.0, 0.0, 5.0),
            Vec3(0.0, 0.0, -1.0),
            Vec3(0.0, 1.0, 0.0),
            60.0,
            1.0,
        );
        let (origin, dir) = cam.generate_ray(32, 32, 64, 64, (0.0, 0.0));
        assert_eq!(origin, Vec3(0.0, 0.0, 5.0));
        assert!((dir.x()).abs() < 1e-5);
        assert!((dir.y()).abs() < 1e-5);
        assert!((dir.z() + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_upper_rays_point_up() {
        let cam = PerspectiveCamera::new(
            Vec3::zero(),
            Vec3(0.0, 0.0, -1.0),
            Vec3(0.0, 1.0, 0.0),
            60.0,
            1.0,
        );
        // bottom-up raster: larger y means higher in the image
        let (_, low) = cam.generate_ray(32, 0, 64, 64, (0.5, 0.5));
        let (_, high) = cam.generate_ray(32, 63, 64, 64, (0.5, 0.5));
        assert!(low.y() < 0.0);
        assert!(high.y() > 0.0);
    }
}
