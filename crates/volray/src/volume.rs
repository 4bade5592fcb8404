use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use scivis::{StructuredVolume, Vec3};
use tracing::debug;

use crate::error::{Error, Result};
use crate::transfer_function::TransferFunction;

/// A scalar volume loaded from a raw binary file.
///
/// The file must hold exactly `x*y*z` little-endian f32 voxels or `x*y*z`
/// u8 voxels; anything else is a dimension mismatch. The grid is centered on
/// the origin with unit spacing.
pub struct Volume {
    path: PathBuf,
    dims: [usize; 3],
    id: String,
    engine: Arc<StructuredVolume>,
    transfer: Arc<scivis::TransferFunction>,
}

impl Volume {
    pub fn load(path: &Path, dims: [usize; 3], variable: Option<&str>) -> Result<Volume> {
        let bytes = fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let voxel_count = dims[0] * dims[1] * dims[2];
        let data: Vec<f32> = if bytes.len() == voxel_count * 4 {
            bytes
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect()
        } else if bytes.len() == voxel_count {
            bytes.iter().map(|&b| b as f32).collect()
        } else {
            return Err(Error::DimensionMismatch {
                path: path.to_path_buf(),
                actual: bytes.len() as u64,
                dims,
                expected_f32: (voxel_count * 4) as u64,
                expected_u8: voxel_count as u64,
            });
        };

        let engine = Arc::new(StructuredVolume::new(dims, Vec3(1.0, 1.0, 1.0), data));
        debug!(
            "loaded volume {} ({}x{}x{}), value range {:?}",
            path.display(),
            dims[0],
            dims[1],
            dims[2],
            engine.value_range()
        );

        // identity feeds the renderer's rebuild cache, so it must cover
        // everything that distinguishes one loaded volume from another
        let id = format!(
            "{}|{}x{}x{}|{}",
            path.display(),
            dims[0],
            dims[1],
            dims[2],
            variable.unwrap_or("-")
        );

        let transfer = TransferFunction::default().to_engine(engine.value_range());

        Ok(Volume {
            path: path.to_path_buf(),
            dims,
            id,
            engine,
            transfer,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn value_range(&self) -> (f32, f32) {
        self.engine.value_range()
    }

    /// World-space center of the grid (the origin, by construction).
    pub fn center(&self) -> Vec3 {
        self.engine.bounds().center()
    }

    pub fn set_transfer_function(&mut self, tf: &TransferFunction) {
        self.transfer = tf.to_engine(self.engine.value_range());
    }

    pub(crate) fn engine_volume(&self) -> Arc<StructuredVolume> {
        self.engine.clone()
    }

    pub(crate) fn engine_transfer(&self) -> Arc<scivis::TransferFunction> {
        self.transfer.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_f32_volume(dir: &Path, name: &str, values: &[f32]) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        for v in values {
            file.write_all(&v.to_le_bytes()).unwrap();
        }
        path
    }

    #[test]
    fn test_load_f32_volume() {
        let dir = tempfile::tempdir().unwrap();
        let values: Vec<f32> = (0..8).map(|i| i as f32).collect();
        let path = write_f32_volume(dir.path(), "v.raw", &values);

        let volume = Volume::load(&path, [2, 2, 2], None).unwrap();
        assert_eq!(volume.value_range(), (0.0, 7.0));
        assert_eq!(volume.center(), Vec3::zero());
    }

    #[test]
    fn test_load_u8_volume() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.raw");
        fs::write(&path, [0u8, 128, 255, 1, 2, 3, 4, 5]).unwrap();

        let volume = Volume::load(&path, [2, 2, 2], None).unwrap();
        assert_eq!(volume.value_range(), (0.0, 255.0));
    }

    #[test]
    fn test_dimension_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.raw");
        fs::write(&path, [0u8; 13]).unwrap();

        let err = match Volume::load(&path, [2, 2, 2], None) {
            Ok(_) => panic!("load should fail on mismatched dimensions"),
            Err(err) => err,
        };
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[test]
    fn test_id_distinguishes_variable() {
        let dir = tempfile::tempdir().unwrap();
        let values: Vec<f32> = vec![0.0; 8];
        let path = write_f32_volume(dir.path(), "v.raw", &values);

        let a = Volume::load(&path, [2, 2, 2], Some("temperature")).unwrap();
        let b = Volume::load(&path, [2, 2, 2], Some("pressure")).unwrap();
        assert_ne!(a.id(), b.id());
    }
}
