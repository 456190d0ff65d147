use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::color::{HexColor, MarkerColors};
use crate::config::{MarkerConfig, ReaderConfig};
use crate::data::expand::{expand_all, expand_along_z, max_z_slice};
use crate::data::model::{ExpandedRecord, FailReasons, PointRecord};
use crate::error::Result;
use crate::volume::Volume;

/// Property holding each fail-layer point's QC codes.
pub const FAIL_CODES_PROPERTY: &str = "failCodes";

// ---------------------------------------------------------------------------
// Layer types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Image,
    Points,
}

/// Marker shape: a star on the slice holding the fit, a disc elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Symbol {
    #[serde(rename = "*")]
    Star,
    #[serde(rename = "o")]
    Disc,
}

impl Symbol {
    pub fn for_point(is_center: bool) -> Self {
        if is_center {
            Symbol::Star
        } else {
            Symbol::Disc
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MarkerSize {
    Uniform(f64),
    PerPoint(Vec<f64>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextParams {
    /// Template filled from per-point properties.
    pub string: String,
    pub color: HexColor,
}

/// Styling of a points layer, serialized with the viewer's parameter names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointsParams {
    pub edge_color: HexColor,
    pub face_color: HexColor,
    pub edge_width: f64,
    pub edge_width_is_relative: bool,
    pub n_dimensional: bool,
    pub size: MarkerSize,
    pub symbol: Vec<Symbol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Vec<FailReasons>>>,
}

/// Flattened point rows plus their styling.
#[derive(Debug, Clone, PartialEq)]
pub struct PointsLayer {
    pub data: Vec<Vec<f64>>,
    pub params: PointsParams,
}

impl PointsLayer {
    pub fn kind(&self) -> LayerKind {
        LayerKind::Points
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn params_map(&self) -> Map<String, JsonValue> {
        match serde_json::to_value(&self.params) {
            Ok(JsonValue::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageLayer {
    pub data: Volume,
    pub params: Map<String, JsonValue>,
}

impl ImageLayer {
    pub fn new(data: Volume) -> Self {
        ImageLayer {
            data,
            params: Map::new(),
        }
    }

    pub fn kind(&self) -> LayerKind {
        LayerKind::Image
    }
}

/// One renderable unit handed to the viewer.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Image(ImageLayer),
    Points(PointsLayer),
}

impl Layer {
    pub fn kind(&self) -> LayerKind {
        match self {
            Layer::Image(l) => l.kind(),
            Layer::Points(l) => l.kind(),
        }
    }

    pub fn params_map(&self) -> Map<String, JsonValue> {
        match self {
            Layer::Image(l) => l.params.clone(),
            Layer::Points(l) => l.params_map(),
        }
    }

    pub fn as_points(&self) -> Option<&PointsLayer> {
        match self {
            Layer::Points(l) => Some(l),
            Layer::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageLayer> {
        match self {
            Layer::Image(l) => Some(l),
            Layer::Points(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// LayerBuilder
// ---------------------------------------------------------------------------

/// Turns parsed table records into styled points layers.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerBuilder {
    colors: MarkerColors,
    markers: MarkerConfig,
}

impl Default for LayerBuilder {
    fn default() -> Self {
        LayerBuilder::new(MarkerColors::default(), MarkerConfig::default())
    }
}

impl LayerBuilder {
    pub fn new(colors: MarkerColors, markers: MarkerConfig) -> Self {
        LayerBuilder { colors, markers }
    }

    pub fn from_config(config: &ReaderConfig) -> Result<Self> {
        Ok(LayerBuilder::new(
            MarkerColors::from_config(&config.colors)?,
            config.markers.clone(),
        ))
    }

    /// Visible pillars: larger stars at the fit, smaller discs elsewhere.
    pub fn qcpass_layer(&self, records: &[PointRecord]) -> Result<PointsLayer> {
        warn_if_empty(records.len());
        let points = expand_all(records)?;
        let sizes = points
            .iter()
            .map(|p| {
                if p.is_center {
                    self.markers.center_size
                } else {
                    self.markers.pillar_size
                }
            })
            .collect();
        Ok(self.points_layer(
            &points,
            self.colors.pass,
            MarkerSize::PerPoint(sizes),
            None,
            None,
        ))
    }

    /// Invisible pillars labelled with each spot's QC fail codes.
    pub fn qcfail_layer(&self, records: &[(PointRecord, FailReasons)]) -> Result<PointsLayer> {
        warn_if_empty(records.len());
        let mut points: Vec<ExpandedRecord> = Vec::new();
        let mut codes: Vec<FailReasons> = Vec::new();
        if let Some(z_max) = max_z_slice(records.iter().map(|(r, _)| r)) {
            for (rec, qc) in records {
                let expanded = expand_along_z(rec, z_max)?;
                codes.extend(std::iter::repeat(qc.clone()).take(expanded.len()));
                points.extend(expanded);
            }
        }
        let text = TextParams {
            string: format!("{{{FAIL_CODES_PROPERTY}}}"),
            color: self.colors.fail,
        };
        let properties = BTreeMap::from([(FAIL_CODES_PROPERTY.to_string(), codes)]);
        Ok(self.points_layer(
            &points,
            self.colors.fail,
            MarkerSize::Uniform(0.0),
            Some(text),
            Some(properties),
        ))
    }

    fn points_layer(
        &self,
        points: &[ExpandedRecord],
        color: HexColor,
        size: MarkerSize,
        text: Option<TextParams>,
        properties: Option<BTreeMap<String, Vec<FailReasons>>>,
    ) -> PointsLayer {
        PointsLayer {
            data: points.iter().map(|p| p.record.flatten()).collect(),
            params: PointsParams {
                edge_color: color,
                face_color: color,
                edge_width: self.markers.edge_width,
                edge_width_is_relative: true,
                n_dimensional: false,
                size,
                symbol: points.iter().map(|p| Symbol::for_point(p.is_center)).collect(),
                text,
                properties,
            },
        }
    }
}

fn warn_if_empty(count: usize) {
    if count == 0 {
        log::warn!("No data rows parsed!");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parser::TableSchema;
    use crate::error::LociError;
    use approx::assert_relative_eq;

    fn spot(trace: i64, z: f64) -> PointRecord {
        PointRecord::try_from_raw(trace, None, 2, (3.0, 4.0, z)).unwrap()
    }

    #[test]
    fn test_pass_layer_styling() {
        let layer = LayerBuilder::default()
            .qcpass_layer(&[spot(0, 1.4), spot(1, 2.9)])
            .unwrap();
        assert_eq!(layer.len(), 6);
        assert_eq!(layer.kind(), LayerKind::Points);

        let MarkerSize::PerPoint(sizes) = &layer.params.size else {
            panic!("pass layer sizes should be per point");
        };
        let expected_symbols = [false, true, false, false, false, true]
            .map(Symbol::for_point)
            .to_vec();
        assert_eq!(layer.params.symbol, expected_symbols);
        assert_eq!(sizes, &vec![1.0, 1.5, 1.0, 1.0, 1.0, 1.5]);
        assert_eq!(layer.params.face_color.to_hex(), crate::color::GOLDENROD);
        assert!(layer.params.text.is_none());
        assert_relative_eq!(layer.params.edge_width, 0.1);
    }

    #[test]
    fn test_pass_layer_rows() {
        let layer = LayerBuilder::default().qcpass_layer(&[spot(7, 1.4)]).unwrap();
        assert_eq!(
            layer.data,
            vec![vec![7.0, 2.0, 0.0, 4.0, 3.0], vec![7.0, 2.0, 1.0, 4.0, 3.0]]
        );
    }

    #[test]
    fn test_fail_layer_styling() {
        let records = vec![(spot(0, 0.2), "S".to_string()), (spot(1, 1.7), "R;xy".to_string())];
        let layer = LayerBuilder::default().qcfail_layer(&records).unwrap();
        assert_eq!(layer.len(), 4);
        assert_eq!(layer.params.size, MarkerSize::Uniform(0.0));
        assert_eq!(layer.params.face_color.to_hex(), crate::color::DEEP_SKY_BLUE);

        let text = layer.params.text.as_ref().unwrap();
        assert_eq!(text.string, "{failCodes}");
        let codes = &layer.params.properties.as_ref().unwrap()[FAIL_CODES_PROPERTY];
        assert_eq!(codes, &vec!["S", "S", "R;xy", "R;xy"]);
        assert_eq!(
            layer.params.symbol,
            vec![Symbol::Star, Symbol::Disc, Symbol::Disc, Symbol::Star]
        );
    }

    #[test]
    fn test_params_map_keys() {
        let records = vec![(spot(0, 0.2), "S".to_string())];
        let map = LayerBuilder::default().qcfail_layer(&records).unwrap().params_map();
        for key in [
            "edge_color",
            "face_color",
            "edge_width",
            "edge_width_is_relative",
            "n_dimensional",
            "size",
            "symbol",
            "text",
            "properties",
        ] {
            assert!(map.contains_key(key), "missing {key}");
        }
        assert_eq!(map["size"], serde_json::json!(0.0));
        assert_eq!(map["symbol"], serde_json::json!(["*"]));
        assert_eq!(map["edge_color"], serde_json::json!("#0C7BDC"));
        assert_eq!(map["text"]["string"], serde_json::json!("{failCodes}"));
    }

    #[test]
    fn test_out_of_range_z_is_an_error() {
        let recs = TableSchema::Headless
            .parse_all_qcpass("0,1,1e19,2.0,3.0\n")
            .unwrap();
        let builder = LayerBuilder::default();
        assert!(matches!(
            builder.qcpass_layer(&recs),
            Err(LociError::ZOutOfRange { .. })
        ));

        let failed = vec![(recs[0], "z".to_string())];
        assert!(matches!(
            builder.qcfail_layer(&failed),
            Err(LociError::ZOutOfRange { .. })
        ));
    }

    // Also logs "No data rows parsed!" at warn level; only the layers are checked.
    #[test]
    fn test_empty_tables_give_empty_layers() {
        let builder = LayerBuilder::default();
        let pass = builder.qcpass_layer(&[]).unwrap();
        assert!(pass.is_empty());
        assert_eq!(pass.params.size, MarkerSize::PerPoint(Vec::new()));

        let fail = builder.qcfail_layer(&[]).unwrap();
        assert!(fail.is_empty());
        assert_eq!(fail.params.size, MarkerSize::Uniform(0.0));
    }
}
