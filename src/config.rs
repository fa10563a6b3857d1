//! Engine configuration.
//!
//! Everything here has a working default; a TOML file only needs the keys it overrides:
//!
//! ```toml
//! tracking_origin = "https://go.example.org"
//! canvas_size = 400.0
//!
//! [raster]
//! load_system_fonts = false
//! font_dirs = ["/usr/share/fonts/truetype/dejavu"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Top-level engine settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Scheme and host of the scan-tracking redirect, e.g. `https://qr.example.com`.
    pub tracking_origin: String,
    /// Edge of the rendered symbol document, in document units.
    pub canvas_size: f64,
    /// Quiet margin around the modules, in document units.
    pub margin: f64,
    /// Edge of raster exports, in pixels.
    pub raster_size: u32,
    /// Quality for lossy raster formats, 1..=100.
    pub jpeg_quality: u8,
    pub raster: RasterConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tracking_origin: "https://qr.example.com".to_string(),
            canvas_size: 300.0,
            margin: 12.0,
            raster_size: 1024,
            jpeg_quality: 90,
            raster: RasterConfig::default(),
        }
    }
}

/// Settings for the one-time rasterization backend setup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Load fonts installed on the host for frame text.
    pub load_system_fonts: bool,
    /// Extra directories scanned for fonts.
    pub font_dirs: Vec<PathBuf>,
    /// Family used for frame text.
    pub font_family: String,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            load_system_fonts: true,
            font_dirs: Vec::new(),
            font_family: "sans-serif".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parses a TOML document and validates the result.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(text).map_err(|err| EngineError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|err| EngineError::Config(format!("cannot read {}: {err}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Rejects settings that cannot produce a symbol.
    pub fn validate(&self) -> Result<()> {
        if !(self.canvas_size.is_finite() && self.canvas_size > 0.0) {
            return Err(EngineError::Config(format!("canvas_size must be positive, got {}", self.canvas_size)));
        }
        if !(self.margin >= 0.0 && self.margin * 2.0 < self.canvas_size) {
            return Err(EngineError::Config(format!("margin {} leaves no room for modules", self.margin)));
        }
        if self.raster_size == 0 {
            return Err(EngineError::Config("raster_size must be at least 1".into()));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(EngineError::Config(format!("jpeg_quality must be 1..=100, got {}", self.jpeg_quality)));
        }
        Ok(())
    }
}
