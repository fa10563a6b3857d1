//! Module matrix generation.
//!
//! This module turns a payload string into the square grid of dark and light modules that the
//! renderer decorates. Bit-level encoding (mode selection, version selection, Reed-Solomon
//! error correction and masking) is delegated to the [`qrcode`] crate; this wrapper only picks
//! the error-correction level, maps failures onto [`EngineError`] and exposes the finder-pattern
//! geometry the style layer needs.

use std::fmt;
use std::str::FromStr;

use qrcode::types::QrError;
use qrcode::{Color, QrCode, Version};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, Result};

/// Edge length, in modules, of a finder pattern block.
pub const FINDER_SIZE: usize = 7;

/// Error correction level for a QR code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EcLevel {
    /// Tolerates ~7% erroneous codewords.
    L,
    /// Tolerates ~15% erroneous codewords.
    #[default]
    M,
    /// Tolerates ~25% erroneous codewords.
    Q,
    /// Tolerates ~30% erroneous codewords.
    H,
}

impl EcLevel {
    /// Returns the level actually used for encoding.
    ///
    /// A logo overlay physically destroys the modules under its safe zone, so any design
    /// carrying a logo is escalated to [`EcLevel::H`] before capacity is checked.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qirust_studio::matrix::EcLevel;
    ///
    /// assert_eq!(EcLevel::L.effective(true), EcLevel::H);
    /// assert_eq!(EcLevel::Q.effective(false), EcLevel::Q);
    /// ```
    pub fn effective(self, has_logo: bool) -> EcLevel {
        if has_logo {
            EcLevel::H
        } else {
            self
        }
    }

    fn to_qrcode(self) -> qrcode::EcLevel {
        match self {
            EcLevel::L => qrcode::EcLevel::L,
            EcLevel::M => qrcode::EcLevel::M,
            EcLevel::Q => qrcode::EcLevel::Q,
            EcLevel::H => qrcode::EcLevel::H,
        }
    }
}

impl fmt::Display for EcLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            EcLevel::L => "L",
            EcLevel::M => "M",
            EcLevel::Q => "Q",
            EcLevel::H => "H",
        };
        f.write_str(letter)
    }
}

impl FromStr for EcLevel {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" | "LOW" => Ok(EcLevel::L),
            "M" | "MEDIUM" => Ok(EcLevel::M),
            "Q" | "QUARTILE" => Ok(EcLevel::Q),
            "H" | "HIGH" => Ok(EcLevel::H),
            other => Err(EngineError::Config(format!("unknown error-correction level `{other}`"))),
        }
    }
}

impl TryFrom<String> for EcLevel {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<EcLevel> for String {
    fn from(level: EcLevel) -> Self {
        level.to_string()
    }
}

/// A square grid of dark and light modules, produced once per (payload, level) pair.
///
/// Coordinates are `(x, y)` with the origin at the top-left module. Instances are immutable
/// after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleMatrix {
    size: usize,
    version: u8,
    level: EcLevel,
    modules: Vec<bool>,
}

impl ModuleMatrix {
    /// Builds a matrix from raw module data, row-major, `true` meaning dark.
    ///
    /// Returns `None` when `modules` is not `size * size` long or the grid is too small to hold
    /// three finder patterns.
    pub fn from_modules(size: usize, version: u8, level: EcLevel, modules: Vec<bool>) -> Option<Self> {
        if size < 2 * FINDER_SIZE + 1 || modules.len() != size * size {
            return None;
        }
        Some(Self { size, version, level, modules })
    }

    /// Returns the width and height of this matrix, measured in modules.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the symbol version, in the range [1, 40].
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Returns the error-correction level the symbol was encoded with.
    pub fn level(&self) -> EcLevel {
        self.level
    }

    /// Returns `true` for a dark module. Coordinates outside the grid are light.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size && self.modules[y * self.size + x]
    }

    /// Top-left module coordinates of the three finder blocks: top-left, top-right,
    /// bottom-left.
    pub fn finder_origins(&self) -> [(usize, usize); 3] {
        let far = self.size - FINDER_SIZE;
        [(0, 0), (far, 0), (0, far)]
    }

    /// Returns `true` when `(x, y)` lies inside one of the three 7×7 finder blocks.
    pub fn is_finder(&self, x: usize, y: usize) -> bool {
        self.finder_origins()
            .iter()
            .any(|&(fx, fy)| x >= fx && x < fx + FINDER_SIZE && y >= fy && y < fy + FINDER_SIZE)
    }

    /// Iterates over the dark modules that are not part of a finder block.
    pub fn data_modules(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.size)
            .flat_map(move |y| (0..self.size).map(move |x| (x, y)))
            .filter(move |&(x, y)| self.is_dark(x, y) && !self.is_finder(x, y))
    }
}

/// Encodes a payload into a module matrix.
///
/// The symbol version is chosen by the encoder as the smallest that fits the payload at
/// `level`; this function never truncates data.
///
/// # Arguments
///
/// * `payload` - The text to encode.
/// * `level` - Error correction level, already escalated by the caller if a logo is present.
///
/// # Returns
///
/// A `Result` containing the matrix or [`EngineError::EncodingTooLarge`] if the payload
/// exceeds the capacity of version 40 at that level.
///
/// # Example
///
/// ```rust
/// use qirust_studio::matrix::{generate_matrix, EcLevel};
///
/// let matrix = generate_matrix("https://example.com", EcLevel::M).unwrap();
/// assert_eq!(matrix.size(), matrix.version() as usize * 4 + 17);
/// ```
pub fn generate_matrix(payload: &str, level: EcLevel) -> Result<ModuleMatrix> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), level.to_qrcode()).map_err(
        |err| match err {
            QrError::DataTooLong => EngineError::EncodingTooLarge {
                payload_len: payload.len(),
                level,
            },
            other => EngineError::ImageEncoding(format!("QR encoder rejected payload: {other}")),
        },
    )?;

    let version = match code.version() {
        Version::Normal(v) => u8::try_from(v).unwrap_or(40),
        Version::Micro(v) => u8::try_from(v).unwrap_or(4),
    };
    let size = code.width();
    let modules: Vec<bool> = code.to_colors().into_iter().map(|c| c == Color::Dark).collect();
    debug!(size, version, %level, "module matrix generated");

    ModuleMatrix::from_modules(size, version, level, modules).ok_or_else(|| {
        EngineError::ImageEncoding(format!("encoder produced an unusable {size}x{size} grid"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_size_follows_version() {
        let matrix = generate_matrix("Hello, world!", EcLevel::L).unwrap();
        assert_eq!(matrix.version(), 1);
        assert_eq!(matrix.size(), 21);
        assert_eq!(matrix.level(), EcLevel::L);
    }

    #[test]
    fn test_finder_blocks_are_standard() {
        let matrix = generate_matrix("HELLO WORLD", EcLevel::Q).unwrap();
        for (fx, fy) in matrix.finder_origins() {
            // Outer ring dark, separator ring light, 3x3 core dark.
            for i in 0..FINDER_SIZE {
                assert!(matrix.is_dark(fx + i, fy));
                assert!(matrix.is_dark(fx, fy + i));
                assert!(matrix.is_dark(fx + i, fy + 6));
                assert!(matrix.is_dark(fx + 6, fy + i));
            }
            assert!(!matrix.is_dark(fx + 1, fy + 1));
            assert!(matrix.is_dark(fx + 3, fy + 3));
        }
    }

    #[test]
    fn test_data_modules_skip_finders() {
        let matrix = generate_matrix("https://example.com/r/abc123", EcLevel::M).unwrap();
        assert!(matrix.data_modules().all(|(x, y)| !matrix.is_finder(x, y)));
        assert!(matrix.data_modules().count() > 0);
        assert!(matrix.is_finder(matrix.size() - 1, 0));
        assert!(!matrix.is_finder(matrix.size() - 1, matrix.size() - 1));
    }

    #[test]
    fn test_too_long_payload_is_rejected() {
        let payload = "a".repeat(1500);
        match generate_matrix(&payload, EcLevel::H) {
            Err(EngineError::EncodingTooLarge { payload_len, level }) => {
                assert_eq!(payload_len, 1500);
                assert_eq!(level, EcLevel::H);
            }
            other => panic!("expected EncodingTooLarge, got {other:?}"),
        }
        assert!(generate_matrix(&payload, EcLevel::Q).is_ok());
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("q".parse::<EcLevel>().unwrap(), EcLevel::Q);
        assert_eq!("High".parse::<EcLevel>().unwrap(), EcLevel::H);
        assert!("X".parse::<EcLevel>().is_err());
        assert_eq!(EcLevel::M.effective(true), EcLevel::H);
    }

    #[test]
    fn test_level_serde_matches_parsing() {
        let cases = [(r#""h""#, EcLevel::H), (r#""High""#, EcLevel::H), (r#""q""#, EcLevel::Q), (r#""L""#, EcLevel::L)];
        for (json, level) in cases {
            assert_eq!(serde_json::from_str::<EcLevel>(json).unwrap(), level);
        }
        assert!(serde_json::from_str::<EcLevel>(r#""X""#).is_err());
        assert_eq!(serde_json::to_string(&EcLevel::Q).unwrap(), r#""Q""#);
    }
}
