//! Logo sources and loading.
//!
//! A logo arrives either inline (a `data:` URI or raw bytes from upload storage) or as a
//! remote URL. Inline logos resolve synchronously; remote ones are fetched behind the
//! `remote-logo` feature. Any failure is [`EngineError::AssetFetchFailed`], which the caller
//! may recover from by rendering again without the logo.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::ImageFormat;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::error::{EngineError, Result};

/// Largest logo accepted, in bytes.
pub const MAX_LOGO_BYTES: usize = 5 * 1024 * 1024;

/// Where a logo comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogoSource {
    /// `http(s)://` reference, fetched before rendering.
    Url(String),
    /// Inline `data:` URI.
    DataUri(String),
    /// Raw encoded image bytes.
    Bytes(Vec<u8>),
}

impl LogoSource {
    /// Classifies a reference string from the authoring UI.
    pub fn from_reference(reference: &str) -> Self {
        let trimmed = reference.trim();
        if trimmed.starts_with("data:") {
            LogoSource::DataUri(trimmed.to_string())
        } else {
            LogoSource::Url(trimmed.to_string())
        }
    }
}

impl Serialize for LogoSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            LogoSource::Url(s) | LogoSource::DataUri(s) => serializer.serialize_str(s),
            LogoSource::Bytes(bytes) => serializer.serialize_str(&format!("data:;base64,{}", STANDARD.encode(bytes))),
        }
    }
}

impl<'de> Deserialize<'de> for LogoSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(LogoSource::from_reference(&raw))
    }
}

/// A loaded logo with a sniffed media type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Logo {
    mime: &'static str,
    bytes: Vec<u8>,
}

impl Logo {
    /// Wraps encoded image bytes, rejecting anything that is not PNG, JPEG, GIF, WebP or SVG.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(EngineError::AssetFetchFailed("logo is empty".into()));
        }
        if bytes.len() > MAX_LOGO_BYTES {
            return Err(EngineError::AssetFetchFailed(format!(
                "logo is {} bytes, limit is {MAX_LOGO_BYTES}",
                bytes.len()
            )));
        }
        let mime = sniff_mime(&bytes)
            .ok_or_else(|| EngineError::AssetFetchFailed("unsupported logo image format".into()))?;
        debug!(mime, len = bytes.len(), "logo loaded");
        Ok(Self { mime, bytes })
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Self-contained `data:` URI for embedding in a vector document.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => return Some("image/png"),
        Ok(ImageFormat::Jpeg) => return Some("image/jpeg"),
        Ok(ImageFormat::Gif) => return Some("image/gif"),
        Ok(ImageFormat::WebP) => return Some("image/webp"),
        _ => {}
    }
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]);
    let head = head.trim_start();
    if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
        Some("image/svg+xml")
    } else {
        None
    }
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let body = uri
        .strip_prefix("data:")
        .ok_or_else(|| EngineError::AssetFetchFailed("not a data URI".into()))?;
    let (meta, payload) = body
        .split_once(',')
        .ok_or_else(|| EngineError::AssetFetchFailed("data URI has no payload".into()))?;
    if meta.ends_with(";base64") {
        STANDARD
            .decode(payload.trim())
            .map_err(|err| EngineError::AssetFetchFailed(format!("bad base64 in logo: {err}")))
    } else {
        Ok(percent_decode_str(payload).collect())
    }
}

/// Resolves an inline logo. Remote URLs must go through [`fetch`].
pub fn resolve(source: &LogoSource) -> Result<Logo> {
    match source {
        LogoSource::Bytes(bytes) => Logo::from_bytes(bytes.clone()),
        LogoSource::DataUri(uri) => Logo::from_bytes(decode_data_uri(uri)?),
        LogoSource::Url(url) => Err(EngineError::AssetFetchFailed(format!(
            "remote logo `{url}` must be fetched before rendering"
        ))),
    }
}

/// Resolves any logo source, downloading remote ones.
#[cfg(feature = "remote-logo")]
pub async fn fetch(source: &LogoSource) -> Result<Logo> {
    use std::time::Duration;

    let url = match source {
        LogoSource::Url(url) => url,
        inline => return resolve(inline),
    };
    let failed = |err: reqwest::Error| EngineError::AssetFetchFailed(format!("{url}: {err}"));
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .map_err(failed)?;
    let response = client.get(url).send().await.map_err(failed)?.error_for_status().map_err(failed)?;
    let bytes = response.bytes().await.map_err(failed)?;
    debug!(len = bytes.len(), "remote logo downloaded");
    Logo::from_bytes(bytes.to_vec())
}
