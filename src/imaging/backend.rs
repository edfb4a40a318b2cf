//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the five operations every backend must
//! support: load, render, resize, crop and PNG encode.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording `MockBackend` below.

use super::calculations::CropError;
use super::geometry::PixelRect;
use super::params::RenderParams;
use image::DynamicImage;
use image::metadata::Orientation;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid crop: {0}")]
    Crop(#[from] CropError),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// A decoded image together with its orientation metadata.
///
/// Orientation is carried, never applied: every operation hands it through
/// to its output unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    pub image: DynamicImage,
    pub orientation: Orientation,
}

impl Bitmap {
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image,
            orientation: Orientation::NoTransforms,
        }
    }

    pub fn with_orientation(image: DynamicImage, orientation: Orientation) -> Self {
        Self { image, orientation }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Decode an image file, keeping its orientation metadata.
    fn load(&self, path: &Path) -> Result<Bitmap, BackendError>;

    /// Composite `source` onto an opaque canvas as described by `params`.
    fn render(&self, source: &Bitmap, params: &RenderParams) -> Result<Bitmap, BackendError>;

    /// Resize to exact dimensions.
    fn resize(&self, bitmap: &Bitmap, width: u32, height: u32) -> Result<Bitmap, BackendError>;

    /// Extract a pixel rectangle. Rectangles outside the bitmap are an error.
    fn crop(&self, bitmap: &Bitmap, rect: PixelRect) -> Result<Bitmap, BackendError>;

    /// Encode as PNG bytes, ready for upload.
    fn encode_png(&self, bitmap: &Bitmap) -> Result<Vec<u8>, BackendError>;
}
