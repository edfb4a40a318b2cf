//! Zoom/pan state of one crop overlay.
//!
//! ## Layout
//!
//! ```text
//! overlay (host view)          viewport (square, side = host width)
//! ┌───────────────┐            content frame: base size × zoom factor,
//! │               │              recentered after every zoom change
//! │ ┌───────────┐ │            crop frame: crop size centered in the overlay
//! │ │  ┌─────┐  │ │
//! │ │  │crop │  │ │
//! │ │  └─────┘  │ │
//! │ └───────────┘ │
//! └───────────────┘
//! ```
//!
//! After every zoom change the session recenters the content, then snaps
//! content that shrank to at most the crop frame back up to the crop frame
//! size, and finally clamps the scroll offset into the scrollable range.

use super::PickerError;
use crate::imaging::{
    CropMode, CropSpec, Point, Rect, RenderLayout, Size, centered_crop_frame, on_double_tap,
    recenter,
};
use serde::{Deserialize, Serialize};

/// Zoom factor of an unzoomed image.
pub const BASELINE_ZOOM: f64 = 1.0;

/// What a double tap does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoubleTapPolicy {
    /// Alternate between the baseline factor and the maximum zoom.
    #[default]
    Toggle,
    /// Arithmetic from [`on_double_tap`], clamped to the zoom range.
    Additive,
}

/// Inclusive range of permitted zoom factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

impl ZoomRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// True when both bounds are finite and `0 < min <= max`.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min > 0.0 && self.min <= self.max
    }

    pub fn contains(&self, factor: f64) -> bool {
        factor >= self.min && factor <= self.max
    }

    pub fn clamp(&self, factor: f64) -> f64 {
        factor.clamp(self.min, self.max)
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self { min: 0.5, max: 2.0 }
    }
}

/// Zoom factor plus content offset. The factor always lies in `range`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    factor: f64,
    offset: Point,
    range: ZoomRange,
}

impl ZoomState {
    pub fn new(range: ZoomRange) -> Self {
        Self {
            factor: range.clamp(BASELINE_ZOOM),
            offset: Point::ZERO,
            range,
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn range(&self) -> ZoomRange {
        self.range
    }

    /// Set the factor, clamped to the range. Returns the applied factor.
    fn set_factor(&mut self, factor: f64) -> f64 {
        self.factor = self.range.clamp(factor);
        self.factor
    }
}

/// Parameters a session is created from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    /// Crop size in points.
    pub crop: Size,
    pub crop_mode: CropMode,
    pub zoom: ZoomRange,
    pub double_tap: DoubleTapPolicy,
    /// Device pixel scale.
    pub scale: f64,
}

/// Geometry of one crop overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct CropSession {
    overlay: Size,
    viewport: Size,
    content: Rect,
    crop_frame: Rect,
    zoom: ZoomState,
    options: SessionOptions,
    /// Running value for [`DoubleTapPolicy::Additive`]; deliberately not clamped.
    tap_value: f64,
}

impl CropSession {
    /// Lay out a new overlay on a host view of size `host`.
    pub fn new(host: Size, options: SessionOptions) -> Result<Self, PickerError> {
        if host.is_empty() || !host.is_finite() {
            return Err(PickerError::InvalidHostSize {
                width: host.width,
                height: host.height,
            });
        }
        let viewport = Size::new(host.width, host.width);
        if options.crop.is_empty() || options.crop.exceeds(viewport) || options.crop.exceeds(host)
        {
            return Err(PickerError::InvalidCropSize {
                crop_width: options.crop.width,
                crop_height: options.crop.height,
                viewport_width: viewport.width,
                viewport_height: viewport.height.min(host.height),
            });
        }

        if !options.zoom.is_valid() {
            return Err(PickerError::InvalidZoomRange {
                min: options.zoom.min,
                max: options.zoom.max,
            });
        }
        if !(options.scale.is_finite() && options.scale > 0.0) {
            return Err(PickerError::InvalidScale(options.scale));
        }

        let mut session = Self {
            overlay: host,
            viewport,
            content: Rect::from_size(viewport),
            crop_frame: centered_crop_frame(host, options.crop),
            zoom: ZoomState::new(options.zoom),
            options,
            tap_value: BASELINE_ZOOM,
        };
        session.apply_zoom(session.zoom.factor());
        Ok(session)
    }

    pub fn overlay(&self) -> Size {
        self.overlay
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn content_frame(&self) -> Rect {
        self.content
    }

    pub fn crop_frame(&self) -> Rect {
        self.crop_frame
    }

    pub fn zoom(&self) -> &ZoomState {
        &self.zoom
    }

    /// Set the zoom factor (clamped), keeping the viewport center fixed.
    /// Returns the applied factor.
    pub fn set_zoom(&mut self, factor: f64) -> f64 {
        let previous = self.zoom.factor();
        let applied = self.zoom.set_factor(factor);

        let center = Point::new(
            self.zoom.offset.x + self.viewport.width / 2.0,
            self.zoom.offset.y + self.viewport.height / 2.0,
        );
        let ratio = applied / previous;
        self.apply_zoom(applied);
        self.zoom.offset = Point::new(
            center.x * ratio - self.viewport.width / 2.0,
            center.y * ratio - self.viewport.height / 2.0,
        );
        self.clamp_offset();

        tracing::debug!(factor = applied, "zoom changed");
        applied
    }

    /// Pinch by a relative scale (`2.0` doubles the current zoom).
    pub fn pinch(&mut self, scale: f64) -> f64 {
        self.set_zoom(self.zoom.factor() * scale)
    }

    /// Scroll the viewport by `(dx, dy)` points, clamped to the content.
    pub fn pan(&mut self, dx: f64, dy: f64) -> Point {
        self.zoom.offset = Point::new(self.zoom.offset.x + dx, self.zoom.offset.y + dy);
        self.clamp_offset();
        self.zoom.offset
    }

    /// Handle a double tap according to the configured policy.
    pub fn double_tap(&mut self) -> f64 {
        let target = match self.options.double_tap {
            DoubleTapPolicy::Toggle => {
                if self.zoom.factor() > BASELINE_ZOOM {
                    BASELINE_ZOOM
                } else {
                    self.zoom.range().max
                }
            }
            DoubleTapPolicy::Additive => {
                let range = self.zoom.range();
                self.tap_value = on_double_tap(self.tap_value, range.min, range.max);
                self.tap_value
            }
        };
        self.set_zoom(target)
    }

    /// Geometry to render at confirm time.
    pub fn render_layout(&self) -> RenderLayout {
        RenderLayout {
            viewport: self.viewport,
            content: self.content,
            offset: self.zoom.offset,
            scale: self.options.scale,
        }
    }

    /// Crop to apply to the rendered bitmap.
    pub fn crop_spec(&self) -> CropSpec {
        CropSpec::from_mode(
            self.options.crop_mode,
            self.crop_frame.size,
            self.options.scale,
        )
    }

    fn apply_zoom(&mut self, factor: f64) {
        self.content.size = self.viewport.scaled(factor);
        self.content = recenter(self.viewport, self.content);

        // The content may never get smaller than the crop frame.
        if self.content.size.fits_within(self.crop_frame.size) {
            self.content.size = self.crop_frame.size;
            self.content = recenter(self.viewport, self.content);
        }
    }

    fn clamp_offset(&mut self) {
        let max_x = (self.content.size.width - self.viewport.width).max(0.0);
        let max_y = (self.content.size.height - self.viewport.height).max(0.0);
        self.zoom.offset = Point::new(
            self.zoom.offset.x.clamp(0.0, max_x),
            self.zoom.offset.y.clamp(0.0, max_y),
        );
    }
}
