use std::str::FromStr;

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::error::{LociError, Result};

// See: https://davidmathlogic.com/colorblind/
pub const GOLDENROD: &str = "#FFC20A";
pub const DEEP_SKY_BLUE: &str = "#0C7BDC";

// ---------------------------------------------------------------------------
// Hex color
// ---------------------------------------------------------------------------

/// An opaque sRGB color written as `#RRGGBB` in layer parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor(Srgb<u8>);

impl HexColor {
    pub fn parse(value: &str) -> Result<Self> {
        Srgb::<u8>::from_str(value)
            .map(HexColor)
            .map_err(|e| LociError::InvalidColor {
                value: value.to_string(),
                message: e.to_string(),
            })
    }

    pub fn to_hex(self) -> String {
        let Srgb { red, green, blue, .. } = self.0;
        format!("#{red:02X}{green:02X}{blue:02X}")
    }
}

impl Serialize for HexColor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Marker colors for the two points layers
// ---------------------------------------------------------------------------

/// Layer colors as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorConfig {
    #[serde(default = "default_pass_color")]
    pub pass: String,

    #[serde(default = "default_fail_color")]
    pub fail: String,
}

fn default_pass_color() -> String {
    GOLDENROD.to_string()
}

fn default_fail_color() -> String {
    DEEP_SKY_BLUE.to_string()
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            pass: default_pass_color(),
            fail: default_fail_color(),
        }
    }
}

/// Parsed marker colors: a warm hue for QC-pass, a cool one for QC-fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerColors {
    pub pass: HexColor,
    pub fail: HexColor,
}

impl MarkerColors {
    pub fn from_config(config: &ColorConfig) -> Result<Self> {
        Ok(MarkerColors {
            pass: HexColor::parse(&config.pass)?,
            fail: HexColor::parse(&config.fail)?,
        })
    }
}

impl Default for MarkerColors {
    fn default() -> Self {
        // The defaults are valid hex literals.
        MarkerColors {
            pass: HexColor(Srgb::new(0xFF, 0xC2, 0x0A)),
            fail: HexColor(Srgb::new(0x0C, 0x7B, 0xDC)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_colors_match_config_defaults() {
        let parsed = MarkerColors::from_config(&ColorConfig::default()).unwrap();
        assert_eq!(parsed, MarkerColors::default());
        assert_eq!(parsed.pass.to_hex(), GOLDENROD);
        assert_eq!(parsed.fail.to_hex(), DEEP_SKY_BLUE);
    }

    #[test]
    fn test_parse_lowercase_hex() {
        assert_eq!(HexColor::parse("#0c7bdc").unwrap().to_hex(), "#0C7BDC");
    }

    #[test]
    fn test_bad_color() {
        let err = HexColor::parse("goldenrod").unwrap_err();
        assert!(matches!(err, LociError::InvalidColor { .. }));
    }
}
