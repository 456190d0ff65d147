//! Configuration for reading a field of view.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::{ColorConfig, MarkerColors};
use crate::data::parser::SupportedSchemas;
use crate::error::{LociError, Result};

/// Marker sizes and edge styling of the points layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// Size of the point on the slice holding the fit.
    #[serde(default = "default_center_size")]
    pub center_size: f64,

    /// Size of the points continuing the pillar on other slices.
    #[serde(default = "default_pillar_size")]
    pub pillar_size: f64,

    /// Edge width, relative to marker size.
    #[serde(default = "default_edge_width")]
    pub edge_width: f64,
}

fn default_center_size() -> f64 {
    1.5
}

fn default_pillar_size() -> f64 {
    1.0
}

fn default_edge_width() -> f64 {
    0.1
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            center_size: default_center_size(),
            pillar_size: default_pillar_size(),
            edge_width: default_edge_width(),
        }
    }
}

/// Main reader configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// File name suffix of the volume entry, e.g. `.zarr`.
    #[serde(default = "default_volume_suffix")]
    pub volume_suffix: String,

    /// Accept the legacy headerless table schema alongside the headed one.
    #[serde(default = "default_allow_headless")]
    pub allow_headless: bool,

    #[serde(default)]
    pub colors: ColorConfig,

    #[serde(default)]
    pub markers: MarkerConfig,
}

fn default_volume_suffix() -> String {
    ".zarr".to_string()
}

fn default_allow_headless() -> bool {
    true
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            volume_suffix: default_volume_suffix(),
            allow_headless: default_allow_headless(),
            colors: ColorConfig::default(),
            markers: MarkerConfig::default(),
        }
    }
}

impl ReaderConfig {
    /// Load and validate configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| LociError::io(path, e))?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: ReaderConfig =
            serde_json::from_str(content).map_err(|e| LociError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let suffix = &self.volume_suffix;
        if !suffix.starts_with('.') || suffix.len() < 2 {
            return Err(LociError::Config(format!(
                "volume suffix must look like '.ext', got '{suffix}'"
            )));
        }
        if suffix.ends_with(".csv") {
            return Err(LociError::Config(format!(
                "volume suffix '{suffix}' would collide with the points tables"
            )));
        }
        let m = &self.markers;
        for (name, value) in [
            ("center_size", m.center_size),
            ("pillar_size", m.pillar_size),
            ("edge_width", m.edge_width),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(LociError::Config(format!(
                    "marker {name} must be a non-negative number, got {value}"
                )));
            }
        }
        MarkerColors::from_config(&self.colors)?;
        Ok(())
    }

    pub fn supported_schemas(&self) -> SupportedSchemas {
        if self.allow_headless {
            SupportedSchemas::all()
        } else {
            SupportedSchemas::headed_only()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReaderConfig::default();
        assert_eq!(config.volume_suffix, ".zarr");
        assert!(config.allow_headless);
        assert_eq!(config.markers.center_size, 1.5);
        assert_eq!(config.supported_schemas(), SupportedSchemas::all());
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config =
            ReaderConfig::from_json_str(r##"{"allow_headless": false, "colors": {"pass": "#FF0000"}}"##)
                .unwrap();
        assert_eq!(config.supported_schemas(), SupportedSchemas::headed_only());
        assert_eq!(config.colors.pass, "#FF0000");
        assert_eq!(config.colors.fail, crate::color::DEEP_SKY_BLUE);
        assert_eq!(config.volume_suffix, ".zarr");
    }

    #[test]
    fn test_rejects_csv_volume_suffix() {
        let err = ReaderConfig::from_json_str(r#"{"volume_suffix": ".qcpass.csv"}"#).unwrap_err();
        assert!(matches!(err, LociError::Config(_)));
    }

    #[test]
    fn test_rejects_bad_color() {
        let err = ReaderConfig::from_json_str(r#"{"colors": {"fail": "blue"}}"#).unwrap_err();
        assert!(matches!(err, LociError::InvalidColor { .. }));
    }

    #[test]
    fn test_rejects_negative_marker() {
        let err =
            ReaderConfig::from_json_str(r#"{"markers": {"pillar_size": -1.0}}"#).unwrap_err();
        assert!(matches!(err, LociError::Config(_)));
    }
}
