use std::sync::Arc;

use crate::transfer::TransferFunction;
use crate::vec3::Vec3;
use crate::volume::StructuredVolume;

/// A volume paired with its transfer function, ready for ray marching.
pub struct VolumetricModel {
    pub volume: Arc<StructuredVolume>,
    pub transfer_function: Arc<TransferFunction>,
}

pub enum Geometry {
    /// Surfaces extracted from a volume at the given scalar thresholds.
    Isosurface {
        volume: Arc<StructuredVolume>,
        isovalues: Vec<f32>,
    },
}

/// OBJ-style surface material.
#[derive(Clone, Copy, Debug)]
pub struct ObjMaterial {
    pub kd: Vec3,
    pub ks: Vec3,
    pub ns: f32,
}

impl Default for ObjMaterial {
    fn default() -> Self {
        ObjMaterial {
            kd: Vec3(0.8, 0.8, 0.8),
            ks: Vec3::zero(),
            ns: 10.0,
        }
    }
}

pub struct GeometricModel {
    pub geometry: Geometry,
    pub material: ObjMaterial,
}

/// One renderable unit: either a volumetric or a geometric model.
#[derive(Default)]
pub struct Group {
    pub volume: Option<VolumetricModel>,
    pub geometry: Option<GeometricModel>,
}

pub struct Instance {
    pub group: Group,
}

impl Instance {
    pub fn new(group: Group) -> Instance {
        Instance { group }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct DistantLight {
    pub direction: Vec3,
    /// Apparent size of the light in degrees; 0.53 approximates the Sun.
    pub angular_diameter: f32,
    pub intensity: f32,
}

impl DistantLight {
    pub fn new(direction: Vec3) -> DistantLight {
        DistantLight {
            direction: Vec3::normalized(direction),
            angular_diameter: 0.53,
            intensity: 1.0,
        }
    }
}

/// Top of the scene graph: instances plus lights.
#[derive(Default)]
pub struct World {
    pub instances: Vec<Instance>,
    pub lights: Vec<DistantLight>,
}

/// The renderer object: frame-level state that is not part of the scene.
pub struct SciVis {
    /// Linear RGBA background, each component in [0, 1].
    pub background: [f32; 4],
    pub samples_per_pixel: u32,
    pub ao_samples: u32,
}

impl Default for SciVis {
    fn default() -> Self {
        SciVis {
            background: [0.0; 4],
            samples_per_pixel: 1,
            ao_samples: 1,
        }
    }
}
