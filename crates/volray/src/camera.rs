use scivis::{PerspectiveCamera, Vec3};

use crate::volume::Volume;

const DEFAULT_FOVY: f32 = 60.0;

/// Perspective camera aimed at the scene center.
///
/// The identity string covers the full camera state; the renderer skips its
/// camera update whenever the identity has not changed.
pub struct Camera {
    width: u32,
    height: u32,
    position: Vec3,
    up: Vec3,
    view: Vec3,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Camera {
        Camera {
            width,
            height,
            position: Vec3::zero(),
            up: Vec3(0.0, 1.0, 0.0),
            view: Vec3(0.0, 0.0, -1.0),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Normalized view direction; the renderer also uses it as the light
    /// direction at render time.
    pub fn view(&self) -> Vec3 {
        self.view
    }

    /// Moves the camera, keeping it aimed at the origin (where volumes are
    /// centered). A position at the origin keeps the previous direction.
    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec3(x, y, z);
        if !self.position.near_zero() {
            self.view = Vec3::normalized(-self.position);
        }
    }

    pub fn set_up_vector(&mut self, x: f32, y: f32, z: f32) {
        self.up = Vec3::normalized(Vec3(x, y, z));
    }

    /// Rescales the position vector so the camera sits at the given distance
    /// from the origin, along its current offset direction.
    pub fn set_orbit_radius(&mut self, radius: f32) {
        if self.position.near_zero() {
            // no offset direction to scale; back off along -view
            self.position = -self.view * radius;
        } else {
            self.position = Vec3::normalized(self.position) * radius;
        }
        self.view = Vec3::normalized(-self.position);
    }

    /// Aims the view direction at the volume's center.
    pub fn center_view(&mut self, volume: &Volume) {
        let target = volume.center();
        let dir = target - self.position;
        if !dir.near_zero() {
            self.view = Vec3::normalized(dir);
        }
    }

    pub fn id(&self) -> String {
        format!(
            "{}x{}|p({:.6},{:.6},{:.6})|u({:.6},{:.6},{:.6})|v({:.6},{:.6},{:.6})",
            self.width,
            self.height,
            self.position.x(),
            self.position.y(),
            self.position.z(),
            self.up.x(),
            self.up.y(),
            self.up.z(),
            self.view.x(),
            self.view.y(),
            self.view.z(),
        )
    }

    pub(crate) fn engine_camera(&self) -> PerspectiveCamera {
        PerspectiveCamera::new(
            self.position,
            self.view,
            self.up,
            DEFAULT_FOVY,
            self.width as f32 / self.height as f32,
        )
    }
}
