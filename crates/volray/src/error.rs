use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{0} is required in the configuration")]
    MissingField(&'static str),

    #[error("bad glob pattern {pattern}: {source}")]
    BadGlobPattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("no files match pattern {0}")]
    NoGlobMatches(String),

    #[error(
        "volume file {path} holds {actual} bytes; dimensions {dims:?} need \
         {expected_f32} (f32 voxels) or {expected_u8} (u8 voxels)"
    )]
    DimensionMismatch {
        path: PathBuf,
        actual: u64,
        dims: [usize; 3],
        expected_f32: u64,
        expected_u8: u64,
    },

    #[error("unsupported image filetype requested for {0}")]
    UnsupportedImageFormat(PathBuf),

    #[error("no volume set to render")]
    NoVolume,

    #[error("no camera set to render with")]
    NoCamera,

    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
