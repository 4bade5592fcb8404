use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::colormap::ColorMap;
use crate::error::{Error, Result};

/// Raw JSON shape. Everything is optional here; required fields are enforced
/// in validation so a missing field reports its name instead of a serde path.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    filename: Option<String>,
    dimensions: Option<[usize; 3]>,
    image_size: Option<[u32; 2]>,
    output_image_filename: Option<String>,
    data_variable: Option<String>,
    color_map: Option<String>,
    opacity_map: Option<Vec<f32>>,
    opacity_attenuation: Option<f32>,
    samples_per_pixel: Option<u32>,
    camera_position: Option<[f32; 3]>,
    camera_up_vector: Option<[f32; 3]>,
    background_color: Option<Vec<u8>>,
    isosurface_values: Option<Vec<f32>>,
    specular: Option<f32>,
}

/// Validated render configuration.
///
/// `filename` may be a glob pattern; a single match (or a literal path with
/// no glob metacharacters) lands in `data_filename`, several matches land in
/// `globbed_filenames` for time-series batch rendering.
#[derive(Debug)]
pub struct Config {
    pub config_filename: PathBuf,

    pub data_filename: Option<PathBuf>,
    pub globbed_filenames: Vec<PathBuf>,
    pub data_variable: Option<String>,
    pub dimensions: [usize; 3],

    pub image_width: u32,
    pub image_height: u32,
    pub image_filename: PathBuf,

    pub color_map: ColorMap,
    pub opacity_map: Vec<f32>,
    pub opacity_attenuation: f32,

    pub samples: u32,

    pub camera_position: [f32; 3],
    pub camera_up: [f32; 3],

    pub background_color: Vec<u8>,
    pub isosurface_values: Vec<f32>,
    pub specular: f32,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Config> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Parses a configuration from an in-memory JSON document.
    pub fn from_json_str(json: &str) -> Result<Config> {
        Self::parse(Path::new("<inline>"), json)
    }

    fn parse(path: &Path, text: &str) -> Result<Config> {
        let raw: RawConfig = serde_json::from_str(text).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;

        let pattern = raw.filename.ok_or(Error::MissingField("filename"))?;
        let (data_filename, globbed_filenames) = expand_filename(&pattern)?;

        let dimensions = raw.dimensions.ok_or(Error::MissingField("dimensions"))?;
        let [image_width, image_height] =
            raw.image_size.ok_or(Error::MissingField("imageSize"))?;
        let image_filename = raw
            .output_image_filename
            .ok_or(Error::MissingField("outputImageFilename"))?;

        let color_map = match raw.color_map {
            None => ColorMap::Grayscale,
            Some(name) => ColorMap::from_name(&name).unwrap_or_else(|| {
                warn!("unrecognized color map {name:?}, using grayscale");
                ColorMap::Grayscale
            }),
        };

        // attenuation >= 1.0 doesn't do anything
        let opacity_attenuation = raw.opacity_attenuation.unwrap_or(1.0);

        Ok(Config {
            config_filename: path.to_path_buf(),
            data_filename,
            globbed_filenames,
            data_variable: raw.data_variable,
            dimensions,
            image_width,
            image_height,
            image_filename: PathBuf::from(image_filename),
            color_map,
            opacity_map: raw.opacity_map.unwrap_or_default(),
            opacity_attenuation,
            samples: raw.samples_per_pixel.unwrap_or(4),
            camera_position: raw.camera_position.unwrap_or([0.0, 0.0, 0.0]),
            camera_up: raw.camera_up_vector.unwrap_or([0.0, 1.0, 0.0]),
            background_color: raw.background_color.unwrap_or_default(),
            isosurface_values: raw.isosurface_values.unwrap_or_default(),
            specular: raw.specular.unwrap_or(0.1),
        })
    }

    /// All volume files this configuration asks to render, in order.
    pub fn input_files(&self) -> Vec<PathBuf> {
        if !self.globbed_filenames.is_empty() {
            self.globbed_filenames.clone()
        } else {
            self.data_filename.iter().cloned().collect()
        }
    }
}

fn expand_filename(pattern: &str) -> Result<(Option<PathBuf>, Vec<PathBuf>)> {
    // a pattern without metacharacters is taken literally, even if the path
    // does not exist yet; loading reports the real error later
    if !pattern.contains(['*', '?', '[']) {
        return Ok((Some(PathBuf::from(pattern)), Vec::new()));
    }

    let paths = glob::glob(pattern).map_err(|source| Error::BadGlobPattern {
        pattern: pattern.to_string(),
        source,
    })?;
    let mut matches: Vec<PathBuf> = paths.filter_map(|p| p.ok()).collect();
    matches.sort();

    match matches.len() {
        0 => Err(Error::NoGlobMatches(pattern.to_string())),
        1 => Ok((Some(matches.remove(0)), Vec::new())),
        _ => Ok((None, matches)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "filename": "data/volume.raw",
        "dimensions": [64, 64, 64],
        "imageSize": [800, 600],
        "outputImageFilename": "out.png"
    }"#;

    #[test]
    fn test_minimal_config_defaults() {
        let config = Config::from_json_str(MINIMAL).unwrap();
        assert_eq!(config.data_filename, Some(PathBuf::from("data/volume.raw")));
        assert!(config.globbed_filenames.is_empty());
        assert_eq!(config.dimensions, [64, 64, 64]);
        assert_eq!((config.image_width, config.image_height), (800, 600));
        assert_eq!(config.samples, 4);
        assert_eq!(config.opacity_attenuation, 1.0);
        assert_eq!(config.camera_position, [0.0, 0.0, 0.0]);
        assert_eq!(config.camera_up, [0.0, 1.0, 0.0]);
        assert_eq!(config.color_map, ColorMap::Grayscale);
        assert!(config.isosurface_values.is_empty());
        assert_eq!(config.specular, 0.1);
    }

    #[test]
    fn test_missing_required_fields() {
        let err = Config::from_json_str(r#"{"dimensions": [1,1,1]}"#).unwrap_err();
        assert!(matches!(err, Error::MissingField("filename")));

        let err = Config::from_json_str(r#"{"filename": "a.raw"}"#).unwrap_err();
        assert!(matches!(err, Error::MissingField("dimensions")));

        let err = Config::from_json_str(
            r#"{"filename": "a.raw", "dimensions": [1,1,1], "imageSize": [2,2]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingField("outputImageFilename")));
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_json_str(
            r#"{
                "filename": "v.raw",
                "dataVariable": "temperature",
                "dimensions": [10, 20, 30],
                "imageSize": [100, 100],
                "outputImageFilename": "frame.ppm",
                "colorMap": "cool to warm",
                "opacityMap": [0.0, 0.5, 0.0],
                "opacityAttenuation": 0.5,
                "samplesPerPixel": 8,
                "cameraPosition": [0.0, 0.0, 120.0],
                "cameraUpVector": [0.0, 0.0, 1.0],
                "backgroundColor": [255, 255, 255],
                "isosurfaceValues": [0.5, 1.5],
                "specular": 0.3
            }"#,
        )
        .unwrap();
        assert_eq!(config.color_map, ColorMap::CoolToWarm);
        assert_eq!(config.opacity_map, vec![0.0, 0.5, 0.0]);
        assert_eq!(config.opacity_attenuation, 0.5);
        assert_eq!(config.samples, 8);
        assert_eq!(config.data_variable.as_deref(), Some("temperature"));
        assert_eq!(config.background_color, vec![255, 255, 255]);
        assert_eq!(config.isosurface_values, vec![0.5, 1.5]);
        assert_eq!(config.specular, 0.3);
    }

    #[test]
    fn test_unknown_color_map_falls_back() {
        let config = Config::from_json_str(
            r#"{
                "filename": "v.raw",
                "dimensions": [1, 1, 1],
                "imageSize": [2, 2],
                "outputImageFilename": "o.png",
                "colorMap": "no such map"
            }"#,
        )
        .unwrap();
        assert_eq!(config.color_map, ColorMap::Grayscale);
    }

    #[test]
    fn test_invalid_json() {
        let err = Config::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
    }

    #[test]
    fn test_glob_expansion() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["t0.raw", "t1.raw", "t2.raw"] {
            fs::write(dir.path().join(name), [0u8]).unwrap();
        }

        let json = format!(
            r#"{{
                "filename": "{}/t*.raw",
                "dimensions": [1, 1, 1],
                "imageSize": [2, 2],
                "outputImageFilename": "o.png"
            }}"#,
            dir.path().display()
        );
        let config = Config::from_json_str(&json).unwrap();
        assert!(config.data_filename.is_none());
        assert_eq!(config.globbed_filenames.len(), 3);
        assert_eq!(config.input_files().len(), 3);

        let json = json.replace("t*.raw", "missing*.raw");
        let err = Config::from_json_str(&json).unwrap_err();
        assert!(matches!(err, Error::NoGlobMatches(_)));
    }
}
