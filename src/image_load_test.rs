use std::io::Cursor;
use std::sync::Mutex;

use super::*;

// =========================================================================
// Helpers
// =========================================================================

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

struct MockSource {
    body: Result<Vec<u8>, ImageLoadError>,
    requested: Mutex<Vec<String>>,
}

impl MockSource {
    fn new(body: Result<Vec<u8>, ImageLoadError>) -> Self {
        Self { body, requested: Mutex::new(Vec::new()) }
    }
}

#[async_trait::async_trait]
impl ImageSource for MockSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageLoadError> {
        self.requested.lock().unwrap().push(url.to_owned());
        self.body.clone()
    }
}

// =========================================================================
// decode
// =========================================================================

#[test]
fn decode_png_keeps_natural_size() {
    let img = decode(&png_bytes(7, 3)).unwrap();
    assert_eq!((img.width, img.height), (7, 3));
    assert_eq!(img.rgba.len(), 7 * 3 * 4);
    assert_eq!(&img.rgba[..4], &[10, 20, 30, 255]);
}

#[test]
fn decode_garbage_is_decode_error() {
    let err = decode(b"definitely not an image").unwrap_err();
    assert!(matches!(err, ImageLoadError::Decode(_)));
    assert_eq!(err.error_code(), "E_IMAGE_DECODE");
}

// =========================================================================
// load
// =========================================================================

#[tokio::test]
async fn inline_source_skips_fetch() {
    let source = MockSource::new(Err(ImageLoadError::Fetch("should not be called".into())));
    let pixels = PixelSource::Inline(Arc::from(png_bytes(4, 4)));
    let img = load(&source, &pixels).await.unwrap();
    assert_eq!(img.width, 4);
    assert!(source.requested.lock().unwrap().is_empty());
}

#[tokio::test]
async fn url_source_fetches_then_decodes() {
    let source = MockSource::new(Ok(png_bytes(5, 6)));
    let pixels = PixelSource::Url("http://store/api/images/1".into());
    let img = load(&source, &pixels).await.unwrap();
    assert_eq!((img.width, img.height), (5, 6));
    assert_eq!(*source.requested.lock().unwrap(), vec!["http://store/api/images/1".to_owned()]);
}

#[tokio::test]
async fn fetch_failure_propagates() {
    let source = MockSource::new(Err(ImageLoadError::Status { status: 404 }));
    let err = load(&source, &PixelSource::Url("http://x".into())).await.unwrap_err();
    assert_eq!(err, ImageLoadError::Status { status: 404 });
}

// =========================================================================
// ErrorCode / ImageLoad
// =========================================================================

#[test]
fn retryable_classification() {
    assert!(ImageLoadError::Fetch("timeout".into()).retryable());
    assert!(ImageLoadError::Status { status: 503 }.retryable());
    assert!(!ImageLoadError::Status { status: 404 }.retryable());
    assert!(!ImageLoadError::Decode("bad".into()).retryable());
}

#[test]
fn image_load_ready_accessor() {
    assert!(ImageLoad::Pending.ready().is_none());
    assert!(ImageLoad::Failed(ImageLoadError::Decode("x".into())).ready().is_none());
    let img = decode(&png_bytes(1, 1)).unwrap();
    assert_eq!(ImageLoad::Ready(img.clone()).ready(), Some(&img));
}
