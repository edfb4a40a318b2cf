//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` + `ImageDecoder::orientation` |
//! | Render | `crop_imm` + `resize_exact` (`Lanczos3`) + `imageops::overlay` on an opaque canvas |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Crop | `DynamicImage::crop_imm` |
//! | Encode → PNG | `DynamicImage::write_to` |

use super::backend::{BackendError, Bitmap, ImageBackend};
use super::calculations::CropError;
use super::geometry::PixelRect;
use super::params::RenderParams;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;

/// Opaque black: the render context has no transparency.
const CANVAS_FILL: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Backend using the `image` crate.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    fn load(&self, path: &Path) -> Result<Bitmap, BackendError> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let mut decoder = reader.into_decoder().map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })?;
        // Missing or unreadable orientation metadata means "as stored".
        let orientation = decoder
            .orientation()
            .unwrap_or(Orientation::NoTransforms);
        let image = DynamicImage::from_decoder(decoder).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })?;
        Ok(Bitmap::with_orientation(image, orientation))
    }

    fn render(&self, source: &Bitmap, params: &RenderParams) -> Result<Bitmap, BackendError> {
        let mut canvas = RgbaImage::from_pixel(params.canvas_width, params.canvas_height, CANVAS_FILL);

        if let Some(placement) = params.placement {
            let src = placement.source;
            if !src.fits_in(source.width(), source.height()) {
                return Err(CropError::OutOfBounds {
                    crop_width: src.width,
                    crop_height: src.height,
                    width: source.width(),
                    height: source.height(),
                }
                .into());
            }
            let dst = placement.destination;
            let piece = source
                .image
                .crop_imm(src.x, src.y, src.width, src.height)
                .resize_exact(dst.width, dst.height, FilterType::Lanczos3)
                .to_rgba8();
            image::imageops::overlay(&mut canvas, &piece, i64::from(dst.x), i64::from(dst.y));
        }

        Ok(Bitmap::with_orientation(
            DynamicImage::ImageRgba8(canvas),
            source.orientation,
        ))
    }

    fn resize(&self, bitmap: &Bitmap, width: u32, height: u32) -> Result<Bitmap, BackendError> {
        if bitmap.dimensions() == (width, height) {
            return Ok(bitmap.clone());
        }
        let resized = bitmap
            .image
            .resize_exact(width, height, FilterType::Lanczos3);
        Ok(Bitmap::with_orientation(resized, bitmap.orientation))
    }

    fn crop(&self, bitmap: &Bitmap, rect: PixelRect) -> Result<Bitmap, BackendError> {
        let (width, height) = bitmap.dimensions();
        if rect.width == 0 || rect.height == 0 {
            return Err(CropError::EmptyCrop.into());
        }
        if !rect.fits_in(width, height) {
            return Err(CropError::OutOfBounds {
                crop_width: rect.width,
                crop_height: rect.height,
                width,
                height,
            }
            .into());
        }
        let cropped = bitmap
            .image
            .crop_imm(rect.x, rect.y, rect.width, rect.height);
        Ok(Bitmap::with_orientation(cropped, bitmap.orientation))
    }

    fn encode_png(&self, bitmap: &Bitmap) -> Result<Vec<u8>, BackendError> {
        let mut bytes = Vec::new();
        bitmap
            .image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| BackendError::ProcessingFailed(format!("PNG encode failed: {}", e)))?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::Placement;

    /// Create a small PNG file with a gradient so crops are distinguishable.
    fn create_test_png(path: &Path, width: u32, height: u32) {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        });
        img.save(path).unwrap();
    }

    fn gradient(width: u32, height: u32) -> Bitmap {
        Bitmap::new(DynamicImage::ImageRgba8(RgbaImage::from_fn(
            width,
            height,
            |x, y| Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255]),
        )))
    }

    #[test]
    fn load_synthetic_png() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.png");
        create_test_png(&path, 200, 150);

        let bitmap = RustBackend::new().load(&path).unwrap();
        assert_eq!(bitmap.dimensions(), (200, 150));
        assert_eq!(bitmap.orientation, Orientation::NoTransforms);
    }

    #[test]
    fn load_nonexistent_file_errors() {
        let result = RustBackend::new().load(Path::new("/nonexistent/image.png"));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn load_garbage_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("garbage.png");
        std::fs::write(&path, b"not an image at all").unwrap();

        assert!(RustBackend::new().load(&path).is_err());
    }

    #[test]
    fn render_without_placement_is_black_canvas() {
        let params = RenderParams {
            canvas_width: 10,
            canvas_height: 8,
            placement: None,
        };
        let out = RustBackend::new().render(&gradient(4, 4), &params).unwrap();
        assert_eq!(out.dimensions(), (10, 8));
        assert_eq!(out.image.to_rgba8().get_pixel(5, 5), &CANVAS_FILL);
    }

    #[test]
    fn render_places_source_at_destination() {
        let source = Bitmap::with_orientation(
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]))),
            Orientation::Rotate180,
        );
        let params = RenderParams {
            canvas_width: 20,
            canvas_height: 20,
            placement: Some(Placement {
                source: PixelRect::from_dimensions(4, 4),
                destination: PixelRect {
                    x: 5,
                    y: 5,
                    width: 10,
                    height: 10,
                },
            }),
        };

        let out = RustBackend::new().render(&source, &params).unwrap();
        let rgba = out.image.to_rgba8();
        assert_eq!(rgba.get_pixel(10, 10), &Rgba([255, 0, 0, 255]));
        assert_eq!(rgba.get_pixel(1, 1), &CANVAS_FILL);
        assert_eq!(out.orientation, Orientation::Rotate180);
    }

    #[test]
    fn render_rejects_source_outside_bitmap() {
        let params = RenderParams {
            canvas_width: 10,
            canvas_height: 10,
            placement: Some(Placement {
                source: PixelRect {
                    x: 2,
                    y: 0,
                    width: 4,
                    height: 4,
                },
                destination: PixelRect::from_dimensions(10, 10),
            }),
        };
        let result = RustBackend::new().render(&gradient(4, 4), &params);
        assert!(matches!(result, Err(BackendError::Crop(_))));
    }

    #[test]
    fn resize_to_same_size_is_identity() {
        let source = gradient(30, 20);
        let out = RustBackend::new().resize(&source, 30, 20).unwrap();
        assert_eq!(out, source);
    }

    #[test]
    fn resize_changes_dimensions() {
        let out = RustBackend::new().resize(&gradient(30, 20), 60, 40).unwrap();
        assert_eq!(out.dimensions(), (60, 40));
    }

    #[test]
    fn crop_extracts_pixels() {
        let rect = PixelRect {
            x: 10,
            y: 20,
            width: 5,
            height: 5,
        };
        let out = RustBackend::new().crop(&gradient(50, 50), rect).unwrap();
        assert_eq!(out.dimensions(), (5, 5));
        assert_eq!(out.image.to_rgba8().get_pixel(0, 0), &Rgba([10, 20, 128, 255]));
    }

    #[test]
    fn crop_out_of_bounds_errors() {
        let rect = PixelRect {
            x: 40,
            y: 0,
            width: 20,
            height: 20,
        };
        let result = RustBackend::new().crop(&gradient(50, 50), rect);
        assert!(matches!(
            result,
            Err(BackendError::Crop(CropError::OutOfBounds { .. }))
        ));
    }

    #[test]
    fn encode_png_produces_decodable_bytes() {
        let bytes = RustBackend::new().encode_png(&gradient(12, 7)).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (12, 7));
    }
}
