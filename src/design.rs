//! Design state: colors, style ids, logo, frame and error-correction choices.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EngineError, Result};
use crate::logo::LogoSource;
use crate::matrix::EcLevel;
use crate::style::{finder, modules};

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color (alpha = 255).
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);

    /// `#rrggbb`, or `#rrggbbaa` when not opaque.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn is_opaque(self) -> bool {
        self.a == 255
    }
}

impl FromStr for Color {
    type Err = EngineError;

    /// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa` (leading `#` optional) and `transparent`.
    fn from_str(s: &str) -> Result<Self> {
        let raw = s.trim();
        if raw.eq_ignore_ascii_case("transparent") {
            return Ok(Color::TRANSPARENT);
        }
        let hex = raw.trim_start_matches('#');
        let invalid = || EngineError::Config(format!("invalid color `{raw}`"));
        if !hex.is_ascii() {
            return Err(invalid());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).map(|n| n * 17).map_err(|_| invalid());
        match hex.len() {
            3 => Ok(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            6 => Ok(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Color::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The full set of user-chosen visual parameters for one symbol.
///
/// Field names match the authoring UI's camelCase JSON. Style ids are free strings; they are
/// resolved through the registry at render time and never validated here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesignSpec {
    /// Module-shape id.
    pub dots_type: String,
    /// Finder-square-shape id.
    pub corners_square_type: String,
    /// Finder-dot-shape id.
    pub corners_dot_type: String,
    pub dots_color: Color,
    pub corners_square_color: Color,
    pub corners_dot_color: Color,
    pub background_color: Color,
    pub transparent_background: bool,
    /// Two-color diagonal gradient on data modules.
    pub gradient: bool,
    pub gradient_color: Option<Color>,
    pub logo: Option<LogoSource>,
    /// Frame template id; negative means no frame.
    pub frame_id: i32,
    pub frame_text: String,
    pub frame_color: Color,
    pub frame_text_color: Color,
    pub frame_font_size: f64,
    pub error_correction: EcLevel,
    /// Seed for the jittered module shape.
    pub shake_seed: u64,
}

impl Default for DesignSpec {
    fn default() -> Self {
        Self {
            dots_type: modules::DEFAULT_MODULE_SHAPE.to_string(),
            corners_square_type: finder::DEFAULT_FINDER_SQUARE.to_string(),
            corners_dot_type: finder::DEFAULT_FINDER_DOT.to_string(),
            dots_color: Color::BLACK,
            corners_square_color: Color::BLACK,
            corners_dot_color: Color::BLACK,
            background_color: Color::WHITE,
            transparent_background: false,
            gradient: false,
            gradient_color: None,
            logo: None,
            frame_id: -1,
            frame_text: "SCAN ME".to_string(),
            frame_color: Color::BLACK,
            frame_text_color: Color::WHITE,
            frame_font_size: 20.0,
            error_correction: EcLevel::M,
            shake_seed: 0,
        }
    }
}

impl DesignSpec {
    /// Parses the authoring UI's JSON design state.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| EngineError::Config(format!("invalid design: {err}")))
    }

    /// Error-correction level after the logo escalation rule.
    pub fn effective_level(&self) -> EcLevel {
        self.error_correction.effective(self.logo.is_some())
    }

    /// Background paint, or `None` when transparent.
    pub fn background(&self) -> Option<Color> {
        if self.transparent_background || self.background_color.a == 0 {
            None
        } else {
            Some(self.background_color)
        }
    }

    /// Second gradient stop, when a gradient is requested and configured.
    pub fn gradient_stop(&self) -> Option<Color> {
        if self.gradient {
            self.gradient_color
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parsing() {
        assert_eq!("#ff8000".parse::<Color>().unwrap(), Color::rgb(255, 128, 0));
        assert_eq!("0f0".parse::<Color>().unwrap(), Color::rgb(0, 255, 0));
        assert_eq!("#00000080".parse::<Color>().unwrap(), Color::new(0, 0, 0, 128));
        assert_eq!("transparent".parse::<Color>().unwrap(), Color::TRANSPARENT);
        assert!("#12345".parse::<Color>().is_err());
        assert!("#gg0000".parse::<Color>().is_err());
        assert!("#ééé".parse::<Color>().is_err());
    }

    #[test]
    fn test_color_hex_round_trip() {
        assert_eq!(Color::rgb(1, 2, 255).to_hex(), "#0102ff");
        assert_eq!(Color::new(1, 2, 3, 4).to_hex(), "#01020304");
    }

    #[test]
    fn test_design_from_partial_json() {
        let design = DesignSpec::from_json(
            r##"{"dotsType":"dots","dotsColor":"#336699","frameId":3,"errorCorrection":"Q","transparentBackground":true}"##,
        )
        .unwrap();
        assert_eq!(design.dots_type, "dots");
        assert_eq!(design.dots_color, Color::rgb(0x33, 0x66, 0x99));
        assert_eq!(design.frame_id, 3);
        assert_eq!(design.error_correction, EcLevel::Q);
        assert_eq!(design.corners_dot_type, finder::DEFAULT_FINDER_DOT);
        assert_eq!(design.background(), None);
    }

    #[test]
    fn test_lowercase_level_in_json() {
        let design = DesignSpec::from_json(r#"{"errorCorrection":"h"}"#).unwrap();
        assert_eq!(design.error_correction, EcLevel::H);
        assert!(DesignSpec::from_json(r#"{"errorCorrection":"best"}"#).is_err());
    }

    #[test]
    fn test_logo_escalates_level() {
        let mut design = DesignSpec { error_correction: EcLevel::L, ..DesignSpec::default() };
        assert_eq!(design.effective_level(), EcLevel::L);
        design.logo = Some(LogoSource::Url("https://cdn.test/logo.png".into()));
        assert_eq!(design.effective_level(), EcLevel::H);
    }

    #[test]
    fn test_gradient_requires_flag_and_color() {
        let mut design = DesignSpec { gradient_color: Some(Color::rgb(255, 0, 0)), ..DesignSpec::default() };
        assert_eq!(design.gradient_stop(), None);
        design.gradient = true;
        assert_eq!(design.gradient_stop(), Some(Color::rgb(255, 0, 0)));
    }
}
