//! Retained-mode scivis rendering engine.
//!
//! Scene objects are built, wired into a `World` and handed to `render_frame`
//! together with a camera and a framebuffer. Object teardown is ordinary Rust
//! ownership; dropping a `World` drops the whole graph under it.

mod camera;
mod framebuffer;
mod integrator;
mod scene;
mod transfer;
mod vec3;
mod volume;

pub use camera::PerspectiveCamera;
pub use framebuffer::{ChannelFlags, FrameBuffer};
pub use integrator::render_frame;
pub use scene::{
    DistantLight, Geometry, GeometricModel, Group, Instance, ObjMaterial, SciVis, VolumetricModel,
    World,
};
pub use transfer::TransferFunction;
pub use vec3::Vec3;
pub use volume::{Bounds, StructuredVolume};
