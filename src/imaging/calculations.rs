//! Pure calculation functions for crop and zoom geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use super::geometry::{PixelRect, Point, Rect, Size};
use thiserror::Error;

/// A crop that cannot be taken from the rendered bitmap.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CropError {
    #[error("crop {crop_width}x{crop_height} exceeds rendered bitmap {width}x{height}")]
    OutOfBounds {
        crop_width: u32,
        crop_height: u32,
        width: u32,
        height: u32,
    },
    #[error("crop dimensions must be non-zero")]
    EmptyCrop,
}

/// Recenter the content frame inside the viewport after a zoom change.
///
/// Each axis is handled independently: content narrower than the viewport is
/// centered, content at least as wide is pinned to origin 0. Size is unchanged.
///
/// # Examples
/// ```
/// # use cropsend::imaging::{recenter, Rect, Size};
/// let viewport = Size::new(375.0, 375.0);
/// let content = Rect::new(0.0, 0.0, 187.5, 750.0);
/// let centered = recenter(viewport, content);
/// assert_eq!(centered.origin.x, 93.75);
/// assert_eq!(centered.origin.y, 0.0);
/// ```
pub fn recenter(viewport: Size, content: Rect) -> Rect {
    let x = if content.size.width < viewport.width {
        (viewport.width - content.size.width) / 2.0
    } else {
        0.0
    };
    let y = if content.size.height < viewport.height {
        (viewport.height - content.size.height) / 2.0
    } else {
        0.0
    };

    Rect {
        origin: Point::new(x, y),
        size: content.size,
    }
}

/// Additive double-tap policy: `current + 2` while `current` lies inside
/// `[min, max]`, otherwise back to the baseline factor `1`.
///
/// The result usually lands outside the zoom range (1 → 3 for `[0.5, 2.0]`),
/// so whoever applies it must clamp. The next tap then sees an out-of-range
/// value and resets to `1`.
pub fn on_double_tap(current: f64, min: f64, max: f64) -> f64 {
    if current >= min && current <= max {
        current + 2.0
    } else {
        1.0
    }
}

/// The crop frame: `crop` centered in the overlay.
pub fn centered_crop_frame(overlay: Size, crop: Size) -> Rect {
    Rect::new(
        overlay.width / 2.0 - crop.width / 2.0,
        overlay.height / 2.0 - crop.height / 2.0,
        crop.width,
        crop.height,
    )
}

/// Part of the source bitmap visible through the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleRegion {
    /// Source pixels that are on screen.
    pub source: PixelRect,
    /// Where those pixels land, in viewport points.
    pub destination: Rect,
}

/// Compute the visible region after pan/zoom.
///
/// The source is drawn scaled-to-fill into `content` (scroll-content
/// coordinates); the viewport shows the window `[offset, offset + viewport]`.
/// Returns `None` when the window and the content do not overlap.
///
/// # Arguments
/// * `source` - Source bitmap dimensions (width, height)
/// * `content` - Content frame in scroll-content coordinates
/// * `offset` - Scroll offset of the viewport
/// * `viewport` - Viewport size
pub fn visible_region(
    source: (u32, u32),
    content: Rect,
    offset: Point,
    viewport: Size,
) -> Option<VisibleRegion> {
    if content.size.is_empty() || source.0 == 0 || source.1 == 0 {
        return None;
    }
    let window = Rect {
        origin: offset,
        size: viewport,
    };
    let visible = window.intersection(&content)?;

    let sx = source.0 as f64 / content.size.width;
    let sy = source.1 as f64 / content.size.height;

    let left = ((visible.min_x() - content.min_x()) * sx).floor().max(0.0);
    let top = ((visible.min_y() - content.min_y()) * sy).floor().max(0.0);
    let right = ((visible.max_x() - content.min_x()) * sx)
        .ceil()
        .min(source.0 as f64);
    let bottom = ((visible.max_y() - content.min_y()) * sy)
        .ceil()
        .min(source.1 as f64);

    if right <= left || bottom <= top {
        return None;
    }

    Some(VisibleRegion {
        source: PixelRect {
            x: left as u32,
            y: top as u32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        },
        destination: visible.translated(-offset.x, -offset.y),
    })
}

/// Centered crop rectangle of `crop` inside a `rendered` bitmap.
///
/// `x = (renderedW - cropW) / 2`, `y = (renderedH - cropH) / 2`, floored.
/// A crop larger than the bitmap in either axis is rejected.
pub fn center_crop_rect(rendered: (u32, u32), crop: (u32, u32)) -> Result<PixelRect, CropError> {
    let (width, height) = rendered;
    let (crop_width, crop_height) = crop;

    if crop_width == 0 || crop_height == 0 {
        return Err(CropError::EmptyCrop);
    }
    if crop_width > width || crop_height > height {
        return Err(CropError::OutOfBounds {
            crop_width,
            crop_height,
            width,
            height,
        });
    }

    Ok(PixelRect {
        x: (width - crop_width) / 2,
        y: (height - crop_height) / 2,
        width: crop_width,
        height: crop_height,
    })
}

/// Largest centered square: the shorter side wins, centered on the other axis.
pub fn square_crop_rect(rendered: (u32, u32)) -> PixelRect {
    let (width, height) = rendered;
    let side = width.min(height);
    PixelRect {
        x: (width - side) / 2,
        y: (height - side) / 2,
        width: side,
        height: side,
    }
}

/// Aspect-preserving dimensions with the width set to `target_width`.
pub fn fit_to_width(dims: (u32, u32), target_width: u32) -> (u32, u32) {
    let (w, h) = dims;
    if w == 0 {
        return (target_width, h);
    }
    let height = (target_width as f64 * h as f64 / w as f64).round().max(1.0) as u32;
    (target_width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // recenter tests
    // =========================================================================

    #[test]
    fn recenter_centers_narrow_content_horizontally() {
        let viewport = Size::new(400.0, 400.0);
        let content = Rect::new(12.0, 0.0, 200.0, 800.0);
        let result = recenter(viewport, content);
        assert_eq!(result.origin, Point::new(100.0, 0.0));
        assert_eq!(result.size, content.size);
    }

    #[test]
    fn recenter_centers_short_content_vertically() {
        let viewport = Size::new(400.0, 400.0);
        let content = Rect::new(0.0, 0.0, 800.0, 100.0);
        let result = recenter(viewport, content);
        assert_eq!(result.origin, Point::new(0.0, 150.0));
    }

    #[test]
    fn recenter_pins_large_content_to_origin() {
        let viewport = Size::new(400.0, 400.0);
        let content = Rect::new(-30.0, 55.0, 800.0, 800.0);
        assert_eq!(recenter(viewport, content).origin, Point::ZERO);
    }

    #[test]
    fn recenter_axes_are_independent() {
        let viewport = Size::new(300.0, 500.0);
        for (w, h) in [(100.0, 600.0), (400.0, 200.0), (300.0, 500.0), (50.0, 50.0)] {
            let result = recenter(viewport, Rect::new(7.0, 7.0, w, h));
            let expected_x = if w < 300.0 { (300.0 - w) / 2.0 } else { 0.0 };
            let expected_y = if h < 500.0 { (500.0 - h) / 2.0 } else { 0.0 };
            assert_eq!(result.origin, Point::new(expected_x, expected_y), "{w}x{h}");
        }
    }

    // =========================================================================
    // on_double_tap tests
    // =========================================================================

    #[test]
    fn double_tap_in_range_adds_two() {
        assert_eq!(on_double_tap(1.0, 0.5, 2.0), 3.0);
        assert_eq!(on_double_tap(0.5, 0.5, 2.0), 2.5);
        assert_eq!(on_double_tap(2.0, 0.5, 2.0), 4.0);
    }

    #[test]
    fn double_tap_out_of_range_resets_to_one() {
        assert_eq!(on_double_tap(3.0, 0.5, 2.0), 1.0);
        assert_eq!(on_double_tap(0.25, 0.5, 2.0), 1.0);
    }

    #[test]
    fn double_tap_alternates_when_fed_back() {
        let first = on_double_tap(1.0, 0.5, 2.0);
        let second = on_double_tap(first, 0.5, 2.0);
        assert_eq!((first, second), (3.0, 1.0));
    }

    // =========================================================================
    // centered_crop_frame tests
    // =========================================================================

    #[test]
    fn crop_frame_is_centered_in_overlay() {
        let frame = centered_crop_frame(Size::new(375.0, 667.0), Size::new(300.0, 300.0));
        assert_eq!(frame, Rect::new(37.5, 183.5, 300.0, 300.0));
    }

    // =========================================================================
    // visible_region tests
    // =========================================================================

    #[test]
    fn visible_region_unzoomed_shows_whole_source() {
        let region = visible_region(
            (1000, 1000),
            Rect::new(0.0, 0.0, 400.0, 400.0),
            Point::ZERO,
            Size::new(400.0, 400.0),
        )
        .unwrap();
        assert_eq!(region.source, PixelRect::from_dimensions(1000, 1000));
        assert_eq!(region.destination, Rect::new(0.0, 0.0, 400.0, 400.0));
    }

    #[test]
    fn visible_region_zoomed_and_panned() {
        // 2x zoom: content 800x800, viewport shows the bottom-right quadrant
        let region = visible_region(
            (1000, 1000),
            Rect::new(0.0, 0.0, 800.0, 800.0),
            Point::new(400.0, 400.0),
            Size::new(400.0, 400.0),
        )
        .unwrap();
        assert_eq!(
            region.source,
            PixelRect {
                x: 500,
                y: 500,
                width: 500,
                height: 500
            }
        );
        assert_eq!(region.destination, Rect::new(0.0, 0.0, 400.0, 400.0));
    }

    #[test]
    fn visible_region_zoomed_out_content_is_letterboxed() {
        // Content 200x200 centered in a 400x400 viewport
        let region = visible_region(
            (100, 100),
            Rect::new(100.0, 100.0, 200.0, 200.0),
            Point::ZERO,
            Size::new(400.0, 400.0),
        )
        .unwrap();
        assert_eq!(region.source, PixelRect::from_dimensions(100, 100));
        assert_eq!(region.destination, Rect::new(100.0, 100.0, 200.0, 200.0));
    }

    #[test]
    fn visible_region_none_when_scrolled_past_content() {
        let region = visible_region(
            (100, 100),
            Rect::new(0.0, 0.0, 400.0, 400.0),
            Point::new(400.0, 0.0),
            Size::new(400.0, 400.0),
        );
        assert!(region.is_none());
    }

    // =========================================================================
    // center_crop_rect / square_crop_rect tests
    // =========================================================================

    #[test]
    fn center_crop_is_centered() {
        let rect = center_crop_rect((750, 1000), (600, 600)).unwrap();
        assert_eq!(
            rect,
            PixelRect {
                x: 75,
                y: 200,
                width: 600,
                height: 600
            }
        );
    }

    #[test]
    fn center_crop_of_equal_size_is_whole_bitmap() {
        let rect = center_crop_rect((600, 400), (600, 400)).unwrap();
        assert!(rect.covers(600, 400));
    }

    #[test]
    fn center_crop_floors_odd_margins() {
        let rect = center_crop_rect((101, 51), (10, 10)).unwrap();
        assert_eq!((rect.x, rect.y), (45, 20));
    }

    #[test]
    fn center_crop_rejects_wider_crop() {
        let err = center_crop_rect((100, 100), (101, 50)).unwrap_err();
        assert_eq!(
            err,
            CropError::OutOfBounds {
                crop_width: 101,
                crop_height: 50,
                width: 100,
                height: 100
            }
        );
    }

    #[test]
    fn center_crop_rejects_taller_crop() {
        assert!(matches!(
            center_crop_rect((100, 100), (50, 101)),
            Err(CropError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn center_crop_rejects_empty_crop() {
        assert_eq!(center_crop_rect((100, 100), (0, 10)), Err(CropError::EmptyCrop));
    }

    #[test]
    fn square_crop_uses_shorter_side() {
        assert_eq!(
            square_crop_rect((800, 600)),
            PixelRect {
                x: 100,
                y: 0,
                width: 600,
                height: 600
            }
        );
        assert_eq!(
            square_crop_rect((600, 900)),
            PixelRect {
                x: 0,
                y: 150,
                width: 600,
                height: 600
            }
        );
    }

    // =========================================================================
    // fit_to_width tests
    // =========================================================================

    #[test]
    fn fit_to_width_preserves_aspect() {
        assert_eq!(fit_to_width((400, 300), 800), (800, 600));
        assert_eq!(fit_to_width((750, 750), 750), (750, 750));
        assert_eq!(fit_to_width((3, 2), 100), (100, 67));
    }
}
