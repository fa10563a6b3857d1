//! Raster exporter.
//!
//! Rasterizes a finished vector document to a fixed square pixel size and re-encodes it as
//! PNG, JPEG or WebP. The `svg` format bypasses rasterization and returns the serialized
//! document untouched.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, Rgba, RgbaImage};
use once_cell::sync::OnceCell;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{self, fontdb};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::RasterConfig;
use crate::design::Color;
use crate::error::{EngineError, Result};
use crate::svg::SvgDocument;

/// Edge of every raster export, in pixels.
pub const RASTER_SIZE: u32 = 1024;
/// Quality used for lossy formats.
pub const JPEG_QUALITY: u8 = 90;

/// Requested output encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
    Svg,
}

impl OutputFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Webp => "image/webp",
            OutputFormat::Svg => "image/svg+xml",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Webp => "webp",
            OutputFormat::Svg => "svg",
        }
    }

    pub fn is_raster(self) -> bool {
        self != OutputFormat::Svg
    }
}

impl FromStr for OutputFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "webp" => Ok(OutputFormat::Webp),
            "svg" => Ok(OutputFormat::Svg),
            other => Err(EngineError::Config(format!("unsupported output format `{other}`"))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Outcome of [`initialize`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Initialized {
    /// This call set the backend up.
    Fresh,
    /// A previous call already did; its configuration stays in effect.
    AlreadyInitialized,
}

struct Backend {
    fonts: Arc<fontdb::Database>,
}

static BACKEND: OnceCell<Backend> = OnceCell::new();

/// Sets up the rasterization backend once per process.
///
/// Later calls are cheap and report [`Initialized::AlreadyInitialized`]. A failure leaves the
/// backend uninitialized so a later call may retry.
pub fn initialize(config: &RasterConfig) -> Result<Initialized> {
    let mut fresh = false;
    BACKEND.get_or_try_init(|| {
        fresh = true;
        Backend::new(config)
    })?;
    Ok(if fresh { Initialized::Fresh } else { Initialized::AlreadyInitialized })
}

fn backend(config: &RasterConfig) -> Result<&'static Backend> {
    BACKEND.get_or_try_init(|| Backend::new(config))
}

impl Backend {
    fn new(config: &RasterConfig) -> Result<Self> {
        // Probe the pixmap allocator before accepting work.
        Pixmap::new(RASTER_SIZE, RASTER_SIZE)
            .ok_or_else(|| EngineError::RenderBackendUnavailable("cannot allocate raster surface".into()))?;

        let mut db = fontdb::Database::new();
        if config.load_system_fonts {
            db.load_system_fonts();
        }
        for dir in &config.font_dirs {
            db.load_fonts_dir(dir);
        }
        if !config.font_family.eq_ignore_ascii_case("sans-serif") {
            db.set_sans_serif_family(config.font_family.clone());
        }
        if db.len() == 0 {
            warn!("no fonts loaded; frame text will not be rasterized");
        }
        info!(fonts = db.len(), family = %config.font_family, "raster backend initialized");
        Ok(Self { fonts: Arc::new(db) })
    }

    fn rasterize(&self, doc: &SvgDocument, size: u32) -> Result<RgbaImage> {
        let mut options = usvg::Options::default();
        options.fontdb = Arc::clone(&self.fonts);
        let tree = usvg::Tree::from_str(&doc.to_svg_string(), &options)
            .map_err(|err| EngineError::ImageEncoding(format!("document rejected by rasterizer: {err}")))?;

        let mut pixmap = Pixmap::new(size, size)
            .ok_or_else(|| EngineError::RenderBackendUnavailable("cannot allocate raster surface".into()))?;
        let (w, h) = (tree.size().width(), tree.size().height());
        let scale = size as f32 / w.max(h);
        let dx = (size as f32 - w * scale) / 2.0;
        let dy = (size as f32 - h * scale) / 2.0;
        resvg::render(&tree, Transform::from_row(scale, 0.0, 0.0, scale, dx, dy), &mut pixmap.as_mut());

        let mut img = RgbaImage::new(size, size);
        for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Ok(img)
    }
}

/// Options for [`export`].
#[derive(Clone, Debug, PartialEq)]
pub struct ExportOptions {
    /// Edge of the output image, in pixels.
    pub size: u32,
    pub jpeg_quality: u8,
    /// Color lossy formats are flattened onto; `None` means white.
    pub background: Option<Color>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { size: RASTER_SIZE, jpeg_quality: JPEG_QUALITY, background: None }
    }
}

/// Encodes a finished document into `format`.
///
/// # Arguments
///
/// * `doc` - The final document, after frame composition.
/// * `format` - Target encoding.
/// * `options` - Raster size, lossy quality and flattening color.
/// * `config` - Backend settings, used only if the backend is not yet initialized.
///
/// # Returns
///
/// The encoded bytes. For [`OutputFormat::Svg`] this is the serialized document itself.
pub fn export(
    doc: &SvgDocument,
    format: OutputFormat,
    options: &ExportOptions,
    config: &RasterConfig,
) -> Result<Vec<u8>> {
    if format == OutputFormat::Svg {
        return Ok(doc.to_svg_string().into_bytes());
    }
    let img = backend(config)?.rasterize(doc, options.size)?;
    let bytes = encode(img, format, options)?;
    debug!(%format, size = options.size, len = bytes.len(), "raster exported");
    Ok(bytes)
}

fn encode(img: RgbaImage, format: OutputFormat, options: &ExportOptions) -> Result<Vec<u8>> {
    let (w, h) = img.dimensions();
    let mut out = Cursor::new(Vec::new());
    match format {
        OutputFormat::Png => DynamicImage::ImageRgba8(img).write_to(&mut out, ImageFormat::Png)?,
        OutputFormat::Jpeg => {
            let rgb = flatten(&img, options.background.unwrap_or(Color::WHITE));
            JpegEncoder::new_with_quality(&mut out, options.jpeg_quality).write_image(
                rgb.as_raw(),
                w,
                h,
                ExtendedColorType::Rgb8,
            )?;
        }
        OutputFormat::Webp => {
            WebPEncoder::new_lossless(&mut out).write_image(img.as_raw(), w, h, ExtendedColorType::Rgba8)?
        }
        OutputFormat::Svg => {
            return Err(EngineError::ImageEncoding("svg is not a raster format".into()));
        }
    }
    Ok(out.into_inner())
}

/// Composites straight-alpha pixels over an opaque color.
fn flatten(img: &RgbaImage, under: Color) -> image::RgbImage {
    let under = [under.r, under.g, under.b];
    image::RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let Rgba([r, g, b, a]) = *img.get_pixel(x, y);
        let blend = |fg: u8, bg: u8| ((fg as u32 * a as u32 + bg as u32 * (255 - a as u32) + 127) / 255) as u8;
        image::Rgb([blend(r, under[0]), blend(g, under[1]), blend(b, under[2])])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::svg::Element;

    fn config() -> RasterConfig {
        RasterConfig { load_system_fonts: false, ..RasterConfig::default() }
    }

    fn square_doc() -> SvgDocument {
        let mut doc = SvgDocument::new(300.0, 300.0);
        doc.push(Element::new("rect").num("width", 300.0).num("height", 300.0).attr("fill", "#ffffff"));
        doc.push(Element::new("rect").num("width", 150.0).num("height", 300.0).attr("fill", "#000000"));
        doc
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PNG".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!(" webp ".parse::<OutputFormat>().unwrap(), OutputFormat::Webp);
        assert!(matches!("gif".parse::<OutputFormat>(), Err(EngineError::Config(_))));
        assert_eq!(OutputFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(OutputFormat::Svg.extension(), "svg");
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let first = initialize(&config()).unwrap();
        let second = initialize(&config()).unwrap();
        assert_eq!(second, Initialized::AlreadyInitialized);
        // Other tests may have initialized the backend first.
        assert!(matches!(first, Initialized::Fresh | Initialized::AlreadyInitialized));
    }

    #[test]
    fn test_svg_export_is_verbatim() {
        let doc = square_doc();
        let bytes = export(&doc, OutputFormat::Svg, &ExportOptions::default(), &config()).unwrap();
        assert_eq!(bytes, doc.to_svg_string().into_bytes());
    }

    #[test]
    fn test_raster_formats_are_fixed_size() {
        let doc = square_doc();
        for (format, expected) in [
            (OutputFormat::Png, ImageFormat::Png),
            (OutputFormat::Jpeg, ImageFormat::Jpeg),
            (OutputFormat::Webp, ImageFormat::WebP),
        ] {
            let bytes = export(&doc, format, &ExportOptions::default(), &config()).unwrap();
            assert_eq!(image::guess_format(&bytes).unwrap(), expected);
            let img = image::load_from_memory(&bytes).unwrap();
            assert_eq!((img.width(), img.height()), (RASTER_SIZE, RASTER_SIZE), "{format}");
        }
    }

    #[test]
    fn test_pixels_follow_the_document() {
        let bytes = export(&square_doc(), OutputFormat::Png, &ExportOptions::default(), &config()).unwrap();
        let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(100, 512), &Rgba([0, 0, 0, 255]));
        assert_eq!(img.get_pixel(900, 512), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_tall_documents_are_centered() {
        let mut doc = SvgDocument::new(100.0, 200.0);
        doc.push(Element::new("rect").num("width", 100.0).num("height", 200.0).attr("fill", "#ff0000"));
        let bytes = export(&doc, OutputFormat::Png, &ExportOptions::default(), &config()).unwrap();
        let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(10, 512)[3], 0);
        assert_eq!(img.get_pixel(512, 512), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_jpeg_flattens_transparency() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let rgb = flatten(&img, Color::WHITE);
        assert_eq!(rgb.get_pixel(0, 0), &image::Rgb([255, 255, 255]));
        let rgb = flatten(&RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 255])), Color::WHITE);
        assert_eq!(rgb.get_pixel(0, 0), &image::Rgb([10, 20, 30]));
    }
}
