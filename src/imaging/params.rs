//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which plans renders and crops from the session layout) and the
//! [`backend`](super::backend) (which does the actual pixel work).
//!
//! ## Types
//!
//! - [`CropMode`]: configured crop shape, either the exact crop size or the largest centered square.
//! - [`CropSpec`]: crop in pixels, derived from [`CropMode`] and the device scale.
//! - [`RenderLayout`]: viewport, content frame, scroll offset and device scale at confirm time.
//! - [`RenderParams`]: pixel-level composite, a canvas size plus an optional placement.

use super::geometry::{PixelRect, Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// How the final bitmap is cropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropMode {
    /// Center-crop to the configured crop size.
    #[default]
    Exact,
    /// Center-crop to a square whose side is the bitmap's shorter edge.
    Square,
}

/// Crop to apply to a rendered bitmap, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropSpec {
    Exact { width: u32, height: u32 },
    SquareShortSide,
}

impl CropSpec {
    /// Resolve a crop mode against a crop size in points and a device scale.
    pub fn from_mode(mode: CropMode, crop: Size, scale: f64) -> Self {
        match mode {
            CropMode::Exact => {
                let (width, height) = crop.to_pixels(scale);
                CropSpec::Exact { width, height }
            }
            CropMode::Square => CropSpec::SquareShortSide,
        }
    }
}

/// Geometry of the crop overlay at the moment the user confirms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderLayout {
    pub viewport: Size,
    /// Content frame in scroll-content coordinates.
    pub content: Rect,
    pub offset: Point,
    /// Device pixel scale.
    pub scale: f64,
}

/// Where source pixels go on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub source: PixelRect,
    pub destination: PixelRect,
}

/// Parameters for a render: an opaque black canvas with at most one placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderParams {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub placement: Option<Placement>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_mode_defaults_to_exact() {
        assert_eq!(CropMode::default(), CropMode::Exact);
    }

    #[test]
    fn crop_spec_scales_exact_crop() {
        let spec = CropSpec::from_mode(CropMode::Exact, Size::new(300.0, 200.0), 2.0);
        assert_eq!(
            spec,
            CropSpec::Exact {
                width: 600,
                height: 400
            }
        );
    }

    #[test]
    fn crop_spec_square_ignores_size() {
        let spec = CropSpec::from_mode(CropMode::Square, Size::new(300.0, 200.0), 3.0);
        assert_eq!(spec, CropSpec::SquareShortSide);
    }

    #[test]
    fn crop_mode_parses_lowercase() {
        let mode: CropMode = serde_json::from_str("\"square\"").unwrap();
        assert_eq!(mode, CropMode::Square);
    }
}
