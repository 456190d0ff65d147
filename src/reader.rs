use std::path::Path;

use crate::config::ReaderConfig;
use crate::data::loader::{load_qcfail, load_qcpass};
use crate::data::model::QcStatus;
use crate::data::parser::SupportedSchemas;
use crate::error::{LociError, Result};
use crate::fileset::{classify_folder, Classification, FieldOfView};
use crate::layer::{ImageLayer, Layer, LayerBuilder, PointsLayer};
use crate::volume::VolumeReader;

// ---------------------------------------------------------------------------
// LociReader – folder → layers
// ---------------------------------------------------------------------------

/// Reads locus-specific spots of one field of view for display.
///
/// Holds no state between calls; each read goes back to the filesystem.
#[derive(Debug, Clone)]
pub struct LociReader {
    volume_suffix: String,
    schemas: SupportedSchemas,
    builder: LayerBuilder,
}

impl Default for LociReader {
    fn default() -> Self {
        LociReader {
            volume_suffix: ReaderConfig::default().volume_suffix,
            schemas: SupportedSchemas::all(),
            builder: LayerBuilder::default(),
        }
    }
}

impl LociReader {
    pub fn new(config: &ReaderConfig) -> Result<Self> {
        config.validate()?;
        Ok(LociReader {
            volume_suffix: config.volume_suffix.clone(),
            schemas: config.supported_schemas(),
            builder: LayerBuilder::from_config(config)?,
        })
    }

    /// Classify `path`; `Ok(None)` means the folder is not ours to read.
    pub fn get_reader(&self, path: &Path) -> Result<Option<FieldOfView>> {
        Ok(self.classify(path)?.accepted())
    }

    pub fn classify(&self, path: &Path) -> Result<Classification> {
        classify_folder(path, &self.volume_suffix)
    }

    /// The three layers of a field of view: `[image, QC-fail, QC-pass]`.
    pub fn read_layers(&self, fov: &FieldOfView, volumes: &dyn VolumeReader) -> Result<Vec<Layer>> {
        let image = ImageLayer::new(volumes.read_volume(&fov.volume_path)?);
        let (failures, successes) = self.read_points_layers(fov)?;
        Ok(vec![
            Layer::Image(image),
            Layer::Points(failures),
            Layer::Points(successes),
        ])
    }

    /// The QC-fail and QC-pass points layers, in that order.
    pub fn read_points_layers(&self, fov: &FieldOfView) -> Result<(PointsLayer, PointsLayer)> {
        let failures = self.single_file_points_layer(&fov.fail_path)?;
        let successes = self.single_file_points_layer(&fov.pass_path)?;
        Ok((failures, successes))
    }

    /// Build a points layer from one table, styled by the QC status in its name.
    pub fn single_file_points_layer(&self, path: &Path) -> Result<PointsLayer> {
        match QcStatus::from_path(path) {
            Some(QcStatus::Pass) => {
                log::debug!("Will parse as QC-pass: {}", path.display());
                let records = load_qcpass(path, &self.schemas)?;
                self.builder.qcpass_layer(&records)
            }
            Some(QcStatus::Fail) => {
                log::debug!("Will parse as QC-fail: {}", path.display());
                let records = load_qcfail(path, &self.schemas)?;
                self.builder.qcfail_layer(&records)
            }
            None => {
                log::error!("Could not infer QC status: {}", path.display());
                Err(LociError::UnknownQcStatus(path.to_path_buf()))
            }
        }
    }
}
