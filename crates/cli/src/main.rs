use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use volray::{Camera, Config, Renderer, TransferFunction, Volume};

#[derive(Debug, clap::Parser)]
#[command(name = "volray", about = "Render scalar volumes from a JSON configuration")]
struct CommandLineArguments {
    #[arg(help = "Path to the JSON render configuration")]
    config: PathBuf,

    #[arg(short, long, help = "Output filename (overrides the configuration)")]
    output: Option<PathBuf>,

    #[arg(short, long, help = "Samples per pixel (overrides the configuration)")]
    spp: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli_args = CommandLineArguments::parse();

    let config = Config::from_file(&cli_args.config)
        .with_context(|| format!("loading configuration {}", cli_args.config.display()))?;

    let inputs = config.input_files();
    if inputs.is_empty() {
        anyhow::bail!("configuration names no volume files to render");
    }

    let mut transfer_function = TransferFunction::new(config.color_map);
    transfer_function.set_opacity_map(&config.opacity_map);
    transfer_function.attenuate(config.opacity_attenuation);

    let mut camera = Camera::new(config.image_width, config.image_height);
    let [x, y, z] = config.camera_position;
    camera.set_position(x, y, z);
    let [ux, uy, uz] = config.camera_up;
    camera.set_up_vector(ux, uy, uz);

    let mut renderer = Renderer::new();
    renderer.set_background(&config.background_color);
    renderer.set_samples(cli_args.spp.unwrap_or(config.samples));

    let output = cli_args.output.unwrap_or_else(|| config.image_filename.clone());
    let time_series = inputs.len() > 1;
    if time_series {
        info!("rendering {} frames from globbed inputs", inputs.len());
    }

    for (frame, input) in inputs.iter().enumerate() {
        let mut volume = Volume::load(input, config.dimensions, config.data_variable.as_deref())
            .with_context(|| format!("loading volume {}", input.display()))?;
        volume.set_transfer_function(&transfer_function);

        camera.center_view(&volume);
        renderer.set_camera(&camera);

        if config.isosurface_values.is_empty() {
            renderer.set_volume(&volume);
        } else {
            renderer.set_isosurface_with_specular(
                &volume,
                &config.isosurface_values,
                config.specular,
            );
        }

        let frame_path = if time_series {
            numbered_output(&output, frame)
        } else {
            output.clone()
        };

        renderer
            .render_image(&frame_path)
            .with_context(|| format!("rendering {}", frame_path.display()))?;
        info!("wrote {}", frame_path.display());
    }

    Ok(())
}

// frame.png -> frame.0003.png
fn numbered_output(path: &Path, frame: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_else(|| {
            warn!("weird output filename, numbering may look odd");
            "frame"
        });
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("png");
    let name = format!("{stem}.{frame:04}.{ext}");
    match path.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_output() {
        assert_eq!(
            numbered_output(Path::new("out/frame.png"), 3),
            PathBuf::from("out/frame.0003.png")
        );
        assert_eq!(
            numbered_output(Path::new("frame.ppm"), 0),
            PathBuf::from("frame.0000.ppm")
        );
    }
}
