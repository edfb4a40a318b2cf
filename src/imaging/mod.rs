//! Crop geometry and pixel work.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Load** | `image::ImageReader`, orientation kept as metadata |
//! | **Render visible region** | `crop_imm` + Lanczos3 + `overlay` |
//! | **Center crop** | [`center_crop_rect`] + `crop_imm` |
//! | **Encode** | PNG via `DynamicImage::write_to` |
//!
//! The module is split into:
//! - **Geometry**: points, sizes and rectangles in points and pixels
//! - **Calculations**: Pure functions for recentering, zoom and crop math (unit testable)
//! - **Parameters**: Data structures describing renders and crops
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
mod geometry;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Bitmap, ImageBackend};
pub use calculations::{
    CropError, VisibleRegion, center_crop_rect, centered_crop_frame, fit_to_width,
    on_double_tap, recenter, square_crop_rect, visible_region,
};
pub use geometry::{PixelRect, Point, Rect, Size};
pub use operations::{finalize_crop, plan_render, render_for_crop};
pub use params::{CropMode, CropSpec, Placement, RenderLayout, RenderParams};
pub use rust_backend::RustBackend;
