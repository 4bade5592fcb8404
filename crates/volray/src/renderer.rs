use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use scivis::{
    ChannelFlags, DistantLight, FrameBuffer, GeometricModel, Geometry, Group, Instance,
    ObjMaterial, SciVis, Vec3, VolumetricModel, World,
};
use tracing::debug;

use crate::camera::Camera;
use crate::error::{Error, Result};
use crate::volume::Volume;

const DEFAULT_SPECULAR: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Pixmap,
    Png,
    Jpeg,
}

impl ImageType {
    pub fn from_path(path: &Path) -> Option<ImageType> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("ppm") => Some(ImageType::Pixmap),
            Some("png") => Some(ImageType::Png),
            Some("jpg") | Some("jpeg") => Some(ImageType::Jpeg),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderKind {
    Volume,
    Isosurface,
}

/// Orchestrates the engine scene graph and encodes frames to disk.
///
/// The scene graph (model, group, instance, world) is rebuilt only when its
/// inputs change: a different volume, a switch between volume and isosurface
/// rendering, or a different isovalue list. Cameras are swapped without
/// touching the world.
pub struct Renderer {
    engine: SciVis,
    background: [u8; 4],

    world: Option<World>,
    camera: Option<scivis::PerspectiveCamera>,
    camera_width: u32,
    camera_height: u32,
    light_direction: Vec3,

    lights: Vec<DistantLight>,
    material: Option<ObjMaterial>,

    last_volume_id: Option<String>,
    last_camera_id: Option<String>,
    last_render_kind: Option<RenderKind>,
    last_isovalues: Vec<f32>,

    world_generation: u64,
}

impl Renderer {
    pub fn new() -> Renderer {
        Renderer {
            engine: SciVis::default(),
            background: [0; 4],
            world: None,
            camera: None,
            camera_width: 0,
            camera_height: 0,
            light_direction: Vec3(0.0, 0.0, -1.0),
            lights: Vec::new(),
            material: None,
            last_volume_id: None,
            last_camera_id: None,
            last_render_kind: None,
            last_isovalues: Vec::new(),
            world_generation: 0,
        }
    }

    pub fn set_background_color(&mut self, r: u8, g: u8, b: u8, a: u8) {
        self.background = [r, g, b, a];
    }

    /// Background from a config-style byte list: fewer than 3 entries means
    /// transparent black, 3 entries imply an opaque alpha.
    pub fn set_background(&mut self, color: &[u8]) {
        match color {
            [] | [_] | [_, _] => self.set_background_color(0, 0, 0, 0),
            [r, g, b] => self.set_background_color(*r, *g, *b, 255),
            [r, g, b, a, ..] => self.set_background_color(*r, *g, *b, *a),
        }
    }

    pub fn set_samples(&mut self, spp: u32) {
        self.engine.samples_per_pixel = spp.max(1);
        self.engine.ao_samples = (spp / 8).max(1);
    }

    /// Number of times the scene graph has been (re)built. Stable across
    /// redundant `set_volume`/`set_isosurface` calls.
    pub fn world_generation(&self) -> u64 {
        self.world_generation
    }

    pub fn set_camera(&mut self, camera: &Camera) {
        if self.last_camera_id.as_deref() == Some(camera.id().as_str()) {
            debug!("camera unchanged, keeping current one");
            return;
        }

        self.last_camera_id = Some(camera.id());
        self.camera_width = camera.width();
        self.camera_height = camera.height();
        // grab the light direction while we have the full camera state
        self.light_direction = camera.view();
        self.camera = Some(camera.engine_camera());
    }

    pub fn set_volume(&mut self, volume: &Volume) {
        if self.last_volume_id.as_deref() == Some(volume.id())
            && self.last_render_kind == Some(RenderKind::Volume)
        {
            // same volume as the current model and we previously did a
            // volume render
            debug!("volume {} unchanged, skipping scene graph rebuild", volume.id());
            return;
        }

        // dropping the old world tears down its instance/group/model chain
        self.world = None;

        self.last_volume_id = Some(volume.id().to_string());
        self.last_render_kind = Some(RenderKind::Volume);

        let model = VolumetricModel {
            volume: volume.engine_volume(),
            transfer_function: volume.engine_transfer(),
        };
        let group = Group {
            volume: Some(model),
            geometry: None,
        };
        let world = World {
            instances: vec![Instance::new(group)],
            lights: self.lights.clone(),
        };

        self.world = Some(world);
        self.world_generation += 1;
        debug!("rebuilt scene graph for volume {}", volume.id());
    }

    pub fn set_isosurface(&mut self, volume: &Volume, isovalues: &[f32]) {
        self.set_isosurface_with_specular(volume, isovalues, DEFAULT_SPECULAR);
    }

    pub fn set_isosurface_with_specular(
        &mut self,
        volume: &Volume,
        isovalues: &[f32],
        specular: f32,
    ) {
        if self.last_volume_id.as_deref() == Some(volume.id())
            && self.last_render_kind == Some(RenderKind::Isosurface)
            && self.last_isovalues == isovalues
        {
            debug!("isosurface inputs unchanged, skipping scene graph rebuild");
            return;
        }

        self.world = None;

        // surfaces need a light and a material; volumes don't
        self.add_light();
        if self.material.is_none() {
            self.material = Some(ObjMaterial {
                kd: Vec3::splat(1.0 - specular),
                ks: Vec3::splat(specular),
                ns: 10.0,
            });
        }

        self.last_volume_id = Some(volume.id().to_string());
        self.last_render_kind = Some(RenderKind::Isosurface);
        self.last_isovalues = isovalues.to_vec();

        let model = GeometricModel {
            geometry: Geometry::Isosurface {
                volume: volume.engine_volume(),
                isovalues: isovalues.to_vec(),
            },
            material: self.material.unwrap_or_default(),
        };
        let group = Group {
            volume: None,
            geometry: Some(model),
        };
        let world = World {
            instances: vec![Instance::new(group)],
            lights: self.lights.clone(),
        };

        self.world = Some(world);
        self.world_generation += 1;
        debug!(
            "rebuilt scene graph for isosurface of {} at {:?}",
            volume.id(),
            isovalues
        );
    }

    // the renderer holds a single directional light
    fn add_light(&mut self) {
        if self.lights.is_empty() {
            self.lights.push(DistantLight::new(self.light_direction));
        }
    }

    fn render(&mut self) -> Result<FrameBuffer> {
        let world = self.world.as_mut().ok_or(Error::NoVolume)?;
        let camera = self.camera.as_ref().ok_or(Error::NoCamera)?;

        // aim the light along the current view before rendering
        if let Some(light) = self.lights.first_mut() {
            light.direction = self.light_direction;
        }
        world.lights = self.lights.clone();

        // this framebuffer lives for a single frame
        let mut fb = FrameBuffer::new(
            self.camera_width,
            self.camera_height,
            ChannelFlags::COLOR | ChannelFlags::ACCUM,
        );
        scivis::render_frame(&mut fb, &self.engine, camera, world);
        Ok(fb)
    }

    /// Renders and returns top-down RGBA bytes composited over the
    /// background color, plus the image dimensions.
    pub fn render_to_buffer(&mut self) -> Result<(Vec<u8>, u32, u32)> {
        let fb = self.render()?;
        let width = fb.width();
        let height = fb.height();
        let color = fb.map_color();

        let [rbg, gbg, bbg, abg_byte] = self.background;
        let abg = abg_byte as f32 / 255.0;

        let mut out = vec![0u8; (width * height * 4) as usize];
        for j in 0..height {
            // the engine framebuffer is bottom-up, image files are top-down
            let row_in = &color[(((height - 1 - j) * width) * 4) as usize..][..(width * 4) as usize];
            for i in 0..width as usize {
                let a = row_in[4 * i + 3] as f32 / 255.0;
                let idx = ((j * width) as usize + i) * 4;
                out[idx] = (row_in[4 * i] as f32 + rbg as f32 * abg * (1.0 - a)) as u8;
                out[idx + 1] = (row_in[4 * i + 1] as f32 + gbg as f32 * abg * (1.0 - a)) as u8;
                out[idx + 2] = (row_in[4 * i + 2] as f32 + bbg as f32 * abg * (1.0 - a)) as u8;
                out[idx + 3] = (255.0 * (a + abg * (1.0 - a))) as u8;
            }
        }

        Ok((out, width, height))
    }

    /// Renders and writes the image; the format follows the file extension
    /// (ppm, png, jpg/jpeg).
    pub fn render_image(&mut self, path: &Path) -> Result<()> {
        let image_type = ImageType::from_path(path)
            .ok_or_else(|| Error::UnsupportedImageFormat(path.to_path_buf()))?;

        match image_type {
            ImageType::Pixmap => self.save_as_ppm(path),
            ImageType::Png => self.save_as_png(path),
            ImageType::Jpeg => self.save_as_jpeg(path),
        }
    }

    /// Renders and PNG-encodes into `png` (RGBA).
    pub fn render_to_png(&mut self, png: &mut Vec<u8>) -> Result<()> {
        let (buffer, width, height) = self.render_to_buffer()?;
        PngEncoder::new(&mut *png).write_image(&buffer, width, height, ColorType::Rgba8)?;
        Ok(())
    }

    /// Renders and JPEG-encodes into `jpg` at the given quality (1-100).
    /// JPEG has no alpha, so the buffer is flattened to RGB; the background
    /// is already composited in.
    pub fn render_to_jpeg(&mut self, jpg: &mut Vec<u8>, quality: u8) -> Result<()> {
        let (buffer, width, height) = self.render_to_buffer()?;
        let rgb = drop_alpha(&buffer);
        JpegEncoder::new_with_quality(&mut *jpg, quality).write_image(
            &rgb,
            width,
            height,
            ColorType::Rgb8,
        )?;
        Ok(())
    }

    // binary P6 so the file isn't quite so large
    fn save_as_ppm(&mut self, path: &Path) -> Result<()> {
        let (buffer, width, height) = self.render_to_buffer()?;
        let file = fs::File::create(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut out = BufWriter::new(file);

        let write_err = |source| Error::Io {
            path: path.to_path_buf(),
            source,
        };

        write!(out, "P6\n{} {}\n255\n", width, height).map_err(write_err)?;
        out.write_all(&drop_alpha(&buffer)).map_err(write_err)?;
        out.flush().map_err(write_err)?;
        Ok(())
    }

    fn save_as_png(&mut self, path: &Path) -> Result<()> {
        let mut png = Vec::new();
        self.render_to_png(&mut png)?;
        fs::write(path, png).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn save_as_jpeg(&mut self, path: &Path) -> Result<()> {
        let mut jpg = Vec::new();
        self.render_to_jpeg(&mut jpg, 90)?;
        fs::write(path, jpg).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer::new()
    }
}

fn drop_alpha(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4).flat_map(|px| [px[0], px[1], px[2]]).collect()
}
