//! Image loading: resolve a pixel source to bytes and decode them.
//!
//! URL sources go through an [`ImageSource`]; inline sources are decoded
//! directly and never touch the network. Decoding uses the `image` crate and
//! always yields RGBA8 at the image's natural size.
//!
//! Loads are asynchronous. The controller applies a completed load only if it
//! still matches the selected image (see `CanvasController::image_loaded`).

#[cfg(test)]
#[path = "image_load_test.rs"]
mod image_load_test;

use std::sync::Arc;

use crate::config::StoreConfig;
use crate::doc::PixelSource;
use crate::error::ErrorCode;

/// Errors produced while fetching or decoding an image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageLoadError {
    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request for the image bytes failed.
    #[error("image fetch failed: {0}")]
    Fetch(String),

    /// The image server answered with a non-success status.
    #[error("image fetch failed: status {status}")]
    Status { status: u16 },

    /// The bytes are not a decodable image.
    #[error("image decode failed: {0}")]
    Decode(String),
}

impl ErrorCode for ImageLoadError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::Fetch(_) => "E_IMAGE_FETCH",
            Self::Status { .. } => "E_IMAGE_STATUS",
            Self::Decode(_) => "E_IMAGE_DECODE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Status { status: 429 | 500..=599 })
    }
}

/// A decoded image: RGBA8 pixels at natural size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8, `width * height * 4` bytes.
    pub rgba: Arc<[u8]>,
}

/// Load progress for the selected image.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageLoad {
    /// Nothing requested, or a load is in flight.
    #[default]
    Pending,
    Ready(DecodedImage),
    Failed(ImageLoadError),
}

impl ImageLoad {
    /// The decoded image, once ready.
    #[must_use]
    pub fn ready(&self) -> Option<&DecodedImage> {
        match self {
            Self::Ready(img) => Some(img),
            _ => None,
        }
    }
}

/// Fetches encoded image bytes by URL. Enables mocking in tests.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait ImageSource: Send + Sync {
    /// Fetch the raw encoded bytes behind `url`.
    ///
    /// # Errors
    ///
    /// Returns an [`ImageLoadError`] if the request fails or the server
    /// answers with a non-success status.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageLoadError>;
}

/// [`ImageSource`] over HTTP.
pub struct HttpImageSource {
    http: reqwest::Client,
}

impl HttpImageSource {
    /// Build a client with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ImageLoadError::HttpClientBuild`] if the client fails to build.
    pub fn new(config: &StoreConfig) -> Result<Self, ImageLoadError> {
        let http = config
            .timeouts
            .client()
            .map_err(|e| ImageLoadError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http })
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageLoadError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ImageLoadError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageLoadError::Status { status: status.as_u16() });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageLoadError::Fetch(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Decode encoded image bytes (PNG, JPEG, ...) into RGBA8.
///
/// # Errors
///
/// Returns [`ImageLoadError::Decode`] when the format is unknown or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<DecodedImage, ImageLoadError> {
    let img = image::load_from_memory(bytes).map_err(|e| ImageLoadError::Decode(e.to_string()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage { width, height, rgba: Arc::from(rgba.into_raw()) })
}

/// Resolve and decode a pixel source.
///
/// # Errors
///
/// Returns an [`ImageLoadError`] if fetching or decoding fails.
pub async fn load(source: &dyn ImageSource, pixels: &PixelSource) -> Result<DecodedImage, ImageLoadError> {
    match pixels {
        PixelSource::Inline(bytes) => decode(bytes),
        PixelSource::Url(url) => {
            let bytes = source.fetch(url).await?;
            decode(&bytes)
        }
    }
}
