//! The image volume of a field of view.
//!
//! Decoding volume formats is left to the caller through [`VolumeReader`];
//! `.npy` files are handled here since they need no chunk codecs.

use std::path::Path;

use ndarray::ArrayD;

use crate::error::{LociError, Result};

/// Pixel data of one field of view, typically `(t, c, z, y, x)`.
pub type Volume = ArrayD<u16>;

/// Capability to decode the volume entry of a field of view.
pub trait VolumeReader {
    fn read_volume(&self, path: &Path) -> Result<Volume>;
}

impl<F> VolumeReader for F
where
    F: Fn(&Path) -> Result<Volume>,
{
    fn read_volume(&self, path: &Path) -> Result<Volume> {
        self(path)
    }
}

/// Reads a volume stored as a single `.npy` array of `u16`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NpyVolumeReader;

impl VolumeReader for NpyVolumeReader {
    fn read_volume(&self, path: &Path) -> Result<Volume> {
        log::debug!("Reading volume: {}", path.display());
        ndarray_npy::read_npy(path).map_err(|e| LociError::Volume {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
