use rand::Rng;

use crate::camera::PerspectiveCamera;
use crate::framebuffer::FrameBuffer;
use crate::scene::{GeometricModel, Geometry, SciVis, VolumetricModel, World};
use crate::vec3::Vec3;

struct SurfaceHit {
    t: f32,
    color: Vec3,
}

/// Renders one frame of `world` into `fb`.
///
/// Volumes are ray marched front-to-back; isosurfaces are found by sign
/// change along the ray and shaded against the world's first distant light.
pub fn render_frame(
    fb: &mut FrameBuffer,
    renderer: &SciVis,
    camera: &PerspectiveCamera,
    world: &World,
) {
    let width = fb.width();
    let height = fb.height();
    let spp = renderer.samples_per_pixel.max(1);

    let mut rng = rand::thread_rng();

    for y in 0..height {
        for x in 0..width {
            let mut color = Vec3::zero();
            let mut alpha = 0.0;

            for sample in 0..spp {
                // first sample at the pixel center so spp=1 is deterministic
                let jitter = if sample == 0 {
                    (0.5, 0.5)
                } else {
                    (rng.gen::<f32>(), rng.gen::<f32>())
                };
                let (origin, dir) = camera.generate_ray(x, y, width, height, jitter);
                let (c, a) = trace(origin, dir, renderer, world);
                color += c;
                alpha += a;
            }

            color /= spp as f32;
            alpha /= spp as f32;

            // composite the renderer background under the frame
            let bg = renderer.background;
            let out = color + Vec3(bg[0], bg[1], bg[2]) * (bg[3] * (1.0 - alpha));
            let out_a = alpha + bg[3] * (1.0 - alpha);

            fb.write_pixel(
                x,
                y,
                [
                    to_srgb_byte(out.x()),
                    to_srgb_byte(out.y()),
                    to_srgb_byte(out.z()),
                    (out_a.clamp(0.0, 1.0) * 255.0) as u8,
                ],
            );
        }
    }
}

/// Premultiplied color and alpha for one ray.
fn trace(origin: Vec3, dir: Vec3, renderer: &SciVis, world: &World) -> (Vec3, f32) {
    // nearest opaque surface first; volume marching stops there
    let mut surface: Option<SurfaceHit> = None;
    for instance in &world.instances {
        if let Some(gm) = &instance.group.geometry {
            if let Some(hit) = intersect_isosurface(origin, dir, gm, renderer, world) {
                match &surface {
                    Some(best) if best.t <= hit.t => {}
                    _ => surface = Some(hit),
                }
            }
        }
    }
    let t_limit = surface.as_ref().map_or(f32::INFINITY, |h| h.t);

    let mut color = Vec3::zero();
    let mut alpha = 0.0;

    for instance in &world.instances {
        if let Some(vm) = &instance.group.volume {
            march_volume(origin, dir, vm, t_limit, &mut color, &mut alpha);
        }
    }

    if let Some(hit) = surface {
        color += hit.color * (1.0 - alpha);
        alpha = 1.0;
    }

    (color, alpha)
}

fn march_volume(
    origin: Vec3,
    dir: Vec3,
    model: &VolumetricModel,
    t_limit: f32,
    color: &mut Vec3,
    alpha: &mut f32,
) {
    let bounds = model.volume.bounds();
    let Some((t0, t1)) = bounds.intersect_ray(origin, dir) else {
        return;
    };
    let t0 = t0.max(0.0);
    let t1 = t1.min(t_limit);
    if t1 <= t0 {
        return;
    }

    let base = model.volume.min_spacing();
    let dt = base * 0.5;

    let mut t = t0 + dt * 0.5;
    while t < t1 {
        let p = origin + dir * t;
        let value = model.volume.sample(p);
        let a = model.transfer_function.opacity(value);
        if a > 0.0 {
            // correct sample opacity for the step size
            let a = 1.0 - (1.0 - a.min(1.0)).powf(dt / base);
            let c = model.transfer_function.color(value);
            *color += c * (a * (1.0 - *alpha));
            *alpha += a * (1.0 - *alpha);
            // early ray termination
            if *alpha > 0.99 {
                *alpha = 1.0;
                return;
            }
        }
        t += dt;
    }
}

fn intersect_isosurface(
    origin: Vec3,
    dir: Vec3,
    model: &GeometricModel,
    renderer: &SciVis,
    world: &World,
) -> Option<SurfaceHit> {
    let Geometry::Isosurface { volume, isovalues } = &model.geometry;

    let bounds = volume.bounds();
    let (t0, t1) = bounds.intersect_ray(origin, dir)?;
    let t0 = t0.max(0.0);
    if t1 <= t0 {
        return None;
    }

    let dt = volume.min_spacing() * 0.5;
    let mut t_prev = t0;
    let mut v_prev = volume.sample(origin + dir * t_prev);

    let mut t = t0 + dt;
    while t <= t1 + dt {
        let t_curr = t.min(t1);
        let v_curr = volume.sample(origin + dir * t_curr);

        let mut best: Option<f32> = None;
        for &iso in isovalues {
            let f_prev = v_prev - iso;
            let f_curr = v_curr - iso;
            if f_prev == 0.0 {
                best = Some(best.map_or(t_prev, |b: f32| b.min(t_prev)));
            } else if f_prev * f_curr < 0.0 {
                // linear refinement of the crossing
                let frac = f_prev / (f_prev - f_curr);
                let t_hit = t_prev + frac * (t_curr - t_prev);
                best = Some(best.map_or(t_hit, |b: f32| b.min(t_hit)));
            }
        }

        if let Some(t_hit) = best {
            let p = origin + dir * t_hit;
            let color = shade_surface(p, dir, volume, model, renderer, world);
            return Some(SurfaceHit { t: t_hit, color });
        }

        t_prev = t_curr;
        v_prev = v_curr;
        t += dt;
    }

    None
}

fn shade_surface(
    p: Vec3,
    dir: Vec3,
    volume: &crate::volume::StructuredVolume,
    model: &GeometricModel,
    renderer: &SciVis,
    world: &World,
) -> Vec3 {
    let g = volume.gradient(p);
    let mut normal = if g.near_zero() { -dir } else { Vec3::normalized(g) };
    if Vec3::dot(normal, dir) > 0.0 {
        normal = -normal;
    }

    let material = &model.material;
    let ambient = if renderer.ao_samples > 0 {
        material.kd * 0.1
    } else {
        Vec3::zero()
    };

    let Some(light) = world.lights.first() else {
        return ambient;
    };

    let l = -light.direction;
    let n_dot_l = Vec3::dot(normal, l).max(0.0);
    let diffuse = material.kd * (n_dot_l * light.intensity);

    let half = Vec3::normalized(l - dir);
    let n_dot_h = Vec3::dot(normal, half).max(0.0);
    let specular = material.ks * (n_dot_h.powf(material.ns) * light.intensity);

    ambient + diffuse + specular
}

fn to_srgb_byte(linear: f32) -> u8 {
    let l = linear.clamp(0.0, 1.0);
    let s = if l <= 0.003_130_8 {
        12.92 * l
    } else {
        1.055 * l.powf(1.0 / 2.4) - 0.055
    };
    (s * 255.0 + 0.5) as u8
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::framebuffer::ChannelFlags;
    use crate::scene::{DistantLight, Group, Instance, ObjMaterial};
    use crate::transfer::TransferFunction;
    use crate::volume::StructuredVolume;

    fn sphere_volume(n: usize) -> Arc<StructuredVolume> {
        // distance from grid center, so isovalues are spheres
        let mut data = Vec::with_capacity(n * n * n);
        let c = (n as f32 - 1.0) / 2.0;
        for z in 0..n {
            for y in 0..n {
                for x in 0..n {
                    let dx = x as f32 - c;
                    let dy = y as f32 - c;
                    let dz = z as f32 - c;
                    data.push((dx * dx + dy * dy + dz * dz).sqrt());
                }
            }
        }
        Arc::new(StructuredVolume::new([n, n, n], Vec3(1.0, 1.0, 1.0), data))
    }

    fn test_camera() -> PerspectiveCamera {
        PerspectiveCamera::new(
            Vec3(0.0, 0.0, 40.0),
            Vec3(0.0, 0.0, -1.0),
            Vec3(0.0, 1.0, 0.0),
            60.0,
            1.0,
        )
    }

    fn opaque_tf(volume: &StructuredVolume) -> Arc<TransferFunction> {
        Arc::new(TransferFunction::new(
            vec![Vec3(1.0, 0.0, 0.0)],
            vec![1.0],
            volume.value_range(),
        ))
    }

    #[test]
    fn test_volume_render_center_opaque_corner_empty() {
        let volume = sphere_volume(16);
        let world = World {
            instances: vec![Instance::new(Group {
                volume: Some(VolumetricModel {
                    volume: volume.clone(),
                    transfer_function: opaque_tf(&volume),
                }),
                geometry: None,
            })],
            lights: vec![],
        };

        let renderer = SciVis::default();
        let camera = test_camera();
        let mut fb = FrameBuffer::new(32, 32, ChannelFlags::COLOR);
        render_frame(&mut fb, &renderer, &camera, &world);

        let center = &fb.map_color()[((16 * 32 + 16) * 4) as usize..][..4];
        assert_eq!(center[3], 255, "center pixel should be fully opaque");
        assert!(center[0] > 200, "center pixel should be red");

        let corner = &fb.map_color()[..4];
        assert_eq!(corner[3], 0, "corner ray misses the volume");
    }

    #[test]
    fn test_zero_opacity_renders_nothing() {
        let volume = sphere_volume(8);
        let tf = Arc::new(TransferFunction::new(
            vec![Vec3(1.0, 1.0, 1.0)],
            vec![0.0],
            volume.value_range(),
        ));
        let world = World {
            instances: vec![Instance::new(Group {
                volume: Some(VolumetricModel {
                    volume,
                    transfer_function: tf,
                }),
                geometry: None,
            })],
            lights: vec![],
        };

        let mut fb = FrameBuffer::new(8, 8, ChannelFlags::COLOR);
        render_frame(&mut fb, &SciVis::default(), &test_camera(), &world);
        assert!(fb.map_color().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_background_fills_misses() {
        let renderer = SciVis {
            background: [0.0, 1.0, 0.0, 1.0],
            ..SciVis::default()
        };
        let world = World::default();
        let mut fb = FrameBuffer::new(4, 4, ChannelFlags::COLOR);
        render_frame(&mut fb, &renderer, &test_camera(), &world);

        let px = &fb.map_color()[..4];
        assert_eq!(px[1], 255);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_isosurface_hits_sphere() {
        let volume = sphere_volume(16);
        let world = World {
            instances: vec![Instance::new(Group {
                volume: None,
                geometry: Some(GeometricModel {
                    geometry: Geometry::Isosurface {
                        volume: volume.clone(),
                        isovalues: vec![5.0],
                    },
                    material: ObjMaterial::default(),
                }),
            })],
            lights: vec![DistantLight::new(Vec3(0.0, 0.0, -1.0))],
        };

        let mut fb = FrameBuffer::new(16, 16, ChannelFlags::COLOR);
        render_frame(&mut fb, &SciVis::default(), &test_camera(), &world);

        // center ray pierces the iso sphere head on; lit by the headlight
        let center = &fb.map_color()[((8 * 16 + 8) * 4) as usize..][..4];
        assert_eq!(center[3], 255);
        assert!(center[0] > 100, "lit surface should be bright, got {:?}", center);

        let corner = &fb.map_color()[..4];
        assert_eq!(corner[3], 0);
    }
}
