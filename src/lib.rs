//! # qirust-studio
//!
//! A styled QR code engine: content payloads, decorated vector rendering, frames and raster
//! export.
//!
//! `qirust-studio` turns a semantic description of what a symbol should carry (a website, a
//! vCard, WiFi credentials, a calendar event, ...) into the exact payload string, encodes it into
//! a module matrix, and renders that matrix with configurable module shapes, finder-pattern
//! shapes, colors, gradients, logos and frames. The finished vector document can be returned as
//! SVG or rasterized to PNG, JPEG or WebP.
//!
//! ## Features
//!
//! - Payload encoding for vCard 3.0, WiFi, email, SMS, phone, WhatsApp, calendar, bitcoin,
//!   plain text and URL content, with optional scan-tracking redirects.
//! - Four error correction levels, escalated to High automatically when a logo is present.
//! - Twenty module shapes and seventeen finder-square and finder-dot shapes each.
//! - Thirty frame templates plus a media-player frame.
//! - Fixed-size raster export at 1024×1024.
//! - Optional remote logo download behind the `remote-logo` feature.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! qirust-studio = "0.2" # Replace with the latest version
//! ```
//!
//! ## Example
//!
//! Generate a framed, rounded WiFi symbol as PNG:
//!
//! ```rust,no_run
//! use qirust_studio::{ContentFields, ContentType, DesignSpec, Engine, GenerateRequest, OutputFormat};
//!
//! fn main() -> Result<(), qirust_studio::EngineError> {
//!     let fields = ContentFields::new().with("ssid", "CafeNet").with("password", "brew1234");
//!     let design = DesignSpec {
//!         dots_type: "rounded".into(),
//!         corners_square_type: "extra-rounded".into(),
//!         frame_id: 3,
//!         ..DesignSpec::default()
//!     };
//!     let request = GenerateRequest::new(ContentType::Wifi, fields).with_design(design);
//!     let artifact = Engine::default().generate(&request, OutputFormat::Png)?;
//!     std::fs::write("wifi.png", &artifact.bytes).expect("Failed to save image");
//!     Ok(())
//! }
//! ```
//!
//! Preview a matrix in the terminal:
//!
//! ```rust
//! use qirust_studio::helper::print_matrix;
//! use qirust_studio::matrix::{generate_matrix, EcLevel};
//!
//! let matrix = generate_matrix("Hello, World!", EcLevel::M).unwrap();
//! print_matrix(&matrix);
//! ```
//!
//! ## Modules
//!
//! - [`payload`]: Content type and fields to payload string.
//! - [`matrix`]: Payload to module matrix.
//! - [`style`]: Shape and frame registries.
//! - [`render`]: Module matrix to vector document.
//! - [`frame`]: Frame composition.
//! - [`raster`]: Vector document to PNG, JPEG or WebP.
//! - [`pipeline`]: The [`Engine`] tying the stages together.
//! - [`helper`]: Undecorated console and image output.

pub mod config;
pub mod design;
pub mod error;
pub mod frame;
pub mod helper;
pub mod logo;
pub mod matrix;
pub mod payload;
pub mod pipeline;
pub mod raster;
pub mod render;
pub mod style;
pub mod svg;

pub use config::{EngineConfig, RasterConfig};
pub use design::{Color, DesignSpec};
pub use error::{EngineError, Result};
pub use logo::{Logo, LogoSource};
pub use matrix::{generate_matrix, EcLevel, ModuleMatrix};
pub use payload::{encode_payload, ContentFields, ContentType};
pub use pipeline::{Artifact, Engine, GenerateRequest};
pub use raster::{Initialized, OutputFormat};
pub use render::Canvas;
pub use svg::SvgDocument;
