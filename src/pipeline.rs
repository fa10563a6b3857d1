//! Generation pipeline.
//!
//! [`Engine`] runs the whole chain: payload, matrix, vector rendering, frame composition and
//! optionally raster export. The interactive preview (SVG) and the authoritative export
//! (raster) share every stage, so they cannot drift apart.

use std::time::Instant;

use serde::Deserialize;
use tracing::{info, instrument};

use crate::config::EngineConfig;
use crate::design::DesignSpec;
use crate::error::Result;
use crate::frame;
use crate::logo::{self, Logo};
use crate::matrix::{generate_matrix, ModuleMatrix};
use crate::payload::{encode_payload, ContentFields, ContentType};
use crate::raster::{self, ExportOptions, OutputFormat};
use crate::render::{self, Canvas};
use crate::svg::SvgDocument;

/// Everything needed to generate one symbol.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub content_type: ContentType,
    #[serde(default)]
    pub fields: ContentFields,
    /// Set by the persistence layer to route redirectable types through scan tracking.
    #[serde(default)]
    pub tracking_slug: Option<String>,
    #[serde(default)]
    pub design: DesignSpec,
}

impl GenerateRequest {
    pub fn new(content_type: ContentType, fields: ContentFields) -> Self {
        Self { content_type, fields, tracking_slug: None, design: DesignSpec::default() }
    }

    pub fn with_tracking_slug(mut self, slug: impl Into<String>) -> Self {
        self.tracking_slug = Some(slug.into());
        self
    }

    pub fn with_design(mut self, design: DesignSpec) -> Self {
        self.design = design;
        self
    }
}

/// An encoded symbol ready to hand back to a caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Artifact {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// The styled-symbol engine.
#[derive(Clone, Debug, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Creates an engine after validating `config`.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The string that will be encoded for `request`.
    pub fn payload(&self, request: &GenerateRequest) -> String {
        encode_payload(
            &request.content_type,
            &request.fields,
            request.tracking_slug.as_deref(),
            &self.config.tracking_origin,
        )
    }

    /// Encodes the request's payload at the design's effective error-correction level.
    pub fn matrix(&self, request: &GenerateRequest) -> Result<ModuleMatrix> {
        generate_matrix(&self.payload(request), request.design.effective_level())
    }

    /// Renders the framed vector document.
    ///
    /// Inline logos are resolved here; a remote logo reference fails with
    /// [`EngineError::AssetFetchFailed`](crate::EngineError::AssetFetchFailed), after which the
    /// caller may retry without the logo.
    #[instrument(skip_all, fields(content_type = %request.content_type))]
    pub fn render_svg(&self, request: &GenerateRequest) -> Result<SvgDocument> {
        let logo = request.design.logo.as_ref().map(logo::resolve).transpose()?;
        self.compose(request, logo.as_ref())
    }

    /// Runs the full pipeline and encodes the result as `format`.
    ///
    /// # Arguments
    ///
    /// * `request` - Content, fields, tracking slug and design.
    /// * `format` - Target encoding; [`OutputFormat::Svg`] skips rasterization.
    ///
    /// # Returns
    ///
    /// The encoded artifact, or the first error raised by any stage.
    #[instrument(skip_all, fields(content_type = %request.content_type, %format))]
    pub fn generate(&self, request: &GenerateRequest, format: OutputFormat) -> Result<Artifact> {
        let logo = request.design.logo.as_ref().map(logo::resolve).transpose()?;
        self.finish(request, logo.as_ref(), format)
    }

    /// Like [`Engine::generate`], downloading a remote logo first.
    #[cfg(feature = "remote-logo")]
    #[instrument(skip_all, fields(content_type = %request.content_type, %format))]
    pub async fn generate_with_remote_logo(&self, request: &GenerateRequest, format: OutputFormat) -> Result<Artifact> {
        let logo = match &request.design.logo {
            Some(source) => Some(logo::fetch(source).await?),
            None => None,
        };
        self.finish(request, logo.as_ref(), format)
    }

    fn compose(&self, request: &GenerateRequest, logo: Option<&Logo>) -> Result<SvgDocument> {
        let design = &request.design;
        let matrix = generate_matrix(&self.payload(request), design.effective_level())?;
        let canvas = Canvas::new(self.config.canvas_size, self.config.margin);
        let doc = render::render_svg(&matrix, design, logo, canvas);
        Ok(frame::compose(doc, design))
    }

    fn finish(&self, request: &GenerateRequest, logo: Option<&Logo>, format: OutputFormat) -> Result<Artifact> {
        let started = Instant::now();
        let doc = self.compose(request, logo)?;
        let artifact = if format.is_raster() {
            let options = ExportOptions {
                size: self.config.raster_size,
                jpeg_quality: self.config.jpeg_quality,
                background: request.design.background(),
            };
            let bytes = raster::export(&doc, format, &options, &self.config.raster)?;
            Artifact { format, bytes, width: options.size, height: options.size }
        } else {
            Artifact {
                format,
                bytes: doc.to_svg_string().into_bytes(),
                width: doc.width().round() as u32,
                height: doc.height().round() as u32,
            }
        };
        info!(
            len = artifact.bytes.len(),
            width = artifact.width,
            height = artifact.height,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "symbol generated"
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::logo::LogoSource;

    fn website() -> GenerateRequest {
        GenerateRequest::new(ContentType::Website, ContentFields::new().with("url", "https://rust-lang.org"))
    }

    #[test]
    fn test_tracking_slug_switches_payload() {
        let config = EngineConfig { tracking_origin: "https://example.com/".into(), ..EngineConfig::default() };
        let engine = Engine::new(config).unwrap();
        assert_eq!(engine.payload(&website()), "https://rust-lang.org");
        assert_eq!(engine.payload(&website().with_tracking_slug("abc123")), "https://example.com/r/abc123");
    }

    #[test]
    fn test_svg_artifact_reports_document_size() {
        let engine = Engine::default();
        let artifact = engine.generate(&website(), OutputFormat::Svg).unwrap();
        assert_eq!(artifact.mime_type(), "image/svg+xml");
        assert_eq!((artifact.width, artifact.height), (300, 300));
        let text = String::from_utf8(artifact.bytes).unwrap();
        assert_eq!(text, engine.render_svg(&website()).unwrap().to_svg_string());
    }

    #[test]
    fn test_frame_grows_svg_artifact() {
        let design = DesignSpec { frame_id: 6, ..DesignSpec::default() };
        let artifact = Engine::default().generate(&website().with_design(design), OutputFormat::Svg).unwrap();
        assert!(artifact.height > artifact.width);
    }

    #[test]
    fn test_remote_logo_needs_fetching() {
        let design = DesignSpec {
            logo: Some(LogoSource::from_reference("https://cdn.test/logo.png")),
            ..DesignSpec::default()
        };
        let request = website().with_design(design);
        assert!(matches!(Engine::default().render_svg(&request), Err(EngineError::AssetFetchFailed(_))));
        assert_eq!(Engine::default().matrix(&request).unwrap().level(), crate::matrix::EcLevel::H);
    }

    #[test]
    fn test_request_from_json() {
        let request: GenerateRequest = serde_json::from_str(
            r##"{"contentType":"wifi","fields":{"ssid":"Home","password":"pw","hidden":true},"design":{"dotsType":"dots"}}"##,
        )
        .unwrap();
        assert_eq!(request.content_type, ContentType::Wifi);
        assert_eq!(Engine::default().payload(&request), "WIFI:T:WPA;S:Home;P:pw;H:true;;");
        assert_eq!(request.design.dots_type, "dots");
    }
}
