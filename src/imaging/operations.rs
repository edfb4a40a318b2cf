//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take the session layout, compute parameters, and call the backend.

use super::backend::{BackendError, Bitmap, ImageBackend};
use super::calculations::{center_crop_rect, fit_to_width, square_crop_rect, visible_region};
use super::geometry::PixelRect;
use super::params::{CropSpec, Placement, RenderLayout, RenderParams};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Plan the render of the crop overlay without executing it.
///
/// When the content is larger than the viewport in either axis, only the
/// visible window is rendered (viewport-sized canvas, scroll offset applied).
/// Otherwise the whole content surface is rendered at its own size.
pub fn plan_render(source_dims: (u32, u32), layout: &RenderLayout) -> RenderParams {
    let scale = layout.scale;

    if layout.content.size.exceeds(layout.viewport) {
        let (canvas_width, canvas_height) = layout.viewport.to_pixels(scale);
        let placement = visible_region(source_dims, layout.content, layout.offset, layout.viewport)
            .map(|region| Placement {
                source: region.source,
                destination: region.destination.to_pixels(scale),
            });
        RenderParams {
            canvas_width,
            canvas_height,
            placement,
        }
    } else {
        let (canvas_width, canvas_height) = layout.content.size.to_pixels(scale);
        RenderParams {
            canvas_width,
            canvas_height,
            placement: Some(Placement {
                source: PixelRect::from_dimensions(source_dims.0, source_dims.1),
                destination: PixelRect::from_dimensions(canvas_width, canvas_height),
            }),
        }
    }
}

/// Render what the user sees.
///
/// A zoomed render (content larger than the viewport) is resized, aspect
/// preserved, to the viewport width at device scale. The content surface
/// render is already in crop-frame pixels and passes through unchanged.
pub fn render_for_crop(
    backend: &impl ImageBackend,
    source: &Bitmap,
    layout: &RenderLayout,
) -> Result<Bitmap> {
    let params = plan_render(source.dimensions(), layout);
    let rendered = backend.render(source, &params)?;
    if !layout.content.size.exceeds(layout.viewport) {
        return Ok(rendered);
    }

    let (target_width, _) = layout.viewport.to_pixels(layout.scale);
    let (width, height) = fit_to_width(rendered.dimensions(), target_width);
    if (width, height) == rendered.dimensions() {
        return Ok(rendered);
    }
    backend.resize(&rendered, width, height)
}

/// Center-crop a rendered bitmap.
///
/// A bitmap that already has the crop size comes back unchanged. A crop
/// larger than the bitmap in either axis fails with
/// [`CropError::OutOfBounds`](super::CropError::OutOfBounds).
pub fn finalize_crop(
    backend: &impl ImageBackend,
    rendered: &Bitmap,
    crop: CropSpec,
) -> Result<Bitmap> {
    let dims = rendered.dimensions();
    let rect = match crop {
        CropSpec::Exact { width, height } => center_crop_rect(dims, (width, height))?,
        CropSpec::SquareShortSide => square_crop_rect(dims),
    };

    if rect.covers(dims.0, dims.1) {
        return Ok(rendered.clone());
    }
    backend.crop(rendered, rect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp, blank};
    use crate::imaging::geometry::{Point, Rect, Size};
    use crate::imaging::{CropError, RustBackend};
    use image::metadata::Orientation;

    fn layout(content: Rect, offset: Point) -> RenderLayout {
        RenderLayout {
            viewport: Size::new(400.0, 400.0),
            content,
            offset,
            scale: 2.0,
        }
    }

    #[test]
    fn plan_render_zoomed_renders_visible_window() {
        let params = plan_render(
            (1000, 1000),
            &layout(Rect::new(0.0, 0.0, 800.0, 800.0), Point::new(200.0, 0.0)),
        );

        assert_eq!((params.canvas_width, params.canvas_height), (800, 800));
        let placement = params.placement.unwrap();
        assert_eq!(
            placement.source,
            PixelRect {
                x: 250,
                y: 0,
                width: 500,
                height: 500
            }
        );
        assert_eq!(placement.destination, PixelRect::from_dimensions(800, 800));
    }

    #[test]
    fn plan_render_unzoomed_renders_content_surface() {
        let params = plan_render(
            (640, 480),
            &layout(Rect::new(50.0, 50.0, 300.0, 300.0), Point::ZERO),
        );

        assert_eq!((params.canvas_width, params.canvas_height), (600, 600));
        let placement = params.placement.unwrap();
        assert_eq!(placement.source, PixelRect::from_dimensions(640, 480));
        assert_eq!(placement.destination, PixelRect::from_dimensions(600, 600));
    }

    #[test]
    fn render_for_crop_passes_content_surface_through() {
        let backend = MockBackend::new();
        let source = blank(640, 480);

        let out = render_for_crop(
            &backend,
            &source,
            &layout(Rect::new(50.0, 50.0, 300.0, 300.0), Point::ZERO),
        )
        .unwrap();

        // 300pt content at scale 2, no upscale to the 800px viewport
        assert_eq!(out.dimensions(), (600, 600));
        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(ops[0], RecordedOp::Render(_)));
    }

    #[test]
    fn content_surface_keeps_crop_frame_contents() {
        let backend = RustBackend::new();
        let source = Bitmap::new(image::DynamicImage::ImageRgb8(image::RgbImage::from_fn(
            300,
            300,
            |x, y| {
                if x < 20 || y < 20 || x >= 280 || y >= 280 {
                    image::Rgb([0, 0, 255])
                } else {
                    image::Rgb([255, 0, 0])
                }
            },
        )));
        let layout = RenderLayout {
            viewport: Size::new(400.0, 400.0),
            content: Rect::new(50.0, 50.0, 300.0, 300.0),
            offset: Point::ZERO,
            scale: 1.0,
        };

        let rendered = render_for_crop(&backend, &source, &layout).unwrap();
        let out = finalize_crop(
            &backend,
            &rendered,
            CropSpec::Exact {
                width: 300,
                height: 300,
            },
        )
        .unwrap()
        .image
        .to_rgb8();

        assert_eq!(out.dimensions(), (300, 300));
        assert!(out.get_pixel(5, 5)[2] > 200, "border lost: {:?}", out.get_pixel(5, 5));
        assert!(out.get_pixel(150, 150)[0] > 200);
    }

    #[test]
    fn render_for_crop_skips_resize_at_viewport_width() {
        let backend = MockBackend::new();

        render_for_crop(
            &backend,
            &blank(1000, 1000),
            &layout(Rect::new(0.0, 0.0, 800.0, 800.0), Point::ZERO),
        )
        .unwrap();

        assert_eq!(backend.get_operations().len(), 1);
    }

    #[test]
    fn finalize_crop_same_size_returns_input_unchanged() {
        let backend = RustBackend::new();
        let rendered = Bitmap::with_orientation(
            image::DynamicImage::ImageRgba8(image::RgbaImage::from_fn(60, 40, |x, y| {
                image::Rgba([x as u8, y as u8, 7, 255])
            })),
            Orientation::FlipHorizontal,
        );

        let out = finalize_crop(
            &backend,
            &rendered,
            CropSpec::Exact {
                width: 60,
                height: 40,
            },
        )
        .unwrap();

        assert_eq!(out, rendered);
    }

    #[test]
    fn finalize_crop_takes_center() {
        let backend = MockBackend::new();

        let out = finalize_crop(
            &backend,
            &blank(800, 1000),
            CropSpec::Exact {
                width: 600,
                height: 600,
            },
        )
        .unwrap();

        assert_eq!(out.dimensions(), (600, 600));
        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Crop(PixelRect {
                x: 100,
                y: 200,
                width: 600,
                height: 600
            })]
        );
    }

    #[test]
    fn finalize_crop_rejects_oversized_crop() {
        let backend = MockBackend::new();

        let result = finalize_crop(
            &backend,
            &blank(500, 500),
            CropSpec::Exact {
                width: 600,
                height: 400,
            },
        );

        assert!(matches!(
            result,
            Err(BackendError::Crop(CropError::OutOfBounds { .. }))
        ));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn finalize_crop_square_variant() {
        let backend = MockBackend::new();

        let out = finalize_crop(&backend, &blank(800, 600), CropSpec::SquareShortSide).unwrap();

        assert_eq!(out.dimensions(), (600, 600));
    }

    #[test]
    fn finalize_crop_preserves_orientation() {
        let backend = RustBackend::new();
        let rendered = Bitmap::with_orientation(
            image::DynamicImage::new_rgba8(100, 100),
            Orientation::Rotate270,
        );

        let out = finalize_crop(
            &backend,
            &rendered,
            CropSpec::Exact {
                width: 50,
                height: 50,
            },
        )
        .unwrap();

        assert_eq!(out.orientation, Orientation::Rotate270);
    }
}
