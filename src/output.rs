//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Crop
//!
//! ```text
//! Source: photo.jpg (4032x3024)
//!     Zoom: 1.50x, offset (120.0, 40.0)
//!     Crop: 300x300 pt at (37.5, 183.5)
//! Cropped → out.png (600x600)
//! ```
//!
//! ## Request / Upload
//!
//! ```text
//! POST photos → ok
//!     {
//!       "id": 7
//!     }
//! ```
//!
//! ```text
//! POST photos → failed (status 422)
//!     Reason: bad input
//!     Error: Response status code was unacceptable: 422.
//! ```

use crate::imaging::{Point, Rect};
use crate::network::{Method, NetworkErrorReason, RequestFailure};
use serde_json::Value;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Crop
// ============================================================================

/// What a headless crop session did.
#[derive(Debug, Clone)]
pub struct CropSummary<'a> {
    pub input: &'a Path,
    pub source_dimensions: (u32, u32),
    pub zoom: f64,
    pub offset: Point,
    pub crop_frame: Rect,
    pub output: &'a Path,
    pub output_dimensions: (u32, u32),
}

pub fn format_crop_summary(summary: &CropSummary<'_>) -> Vec<String> {
    let (sw, sh) = summary.source_dimensions;
    let (ow, oh) = summary.output_dimensions;
    let frame = &summary.crop_frame;
    vec![
        format!("Source: {} ({}x{})", file_name(summary.input), sw, sh),
        format!(
            "{}Zoom: {:.2}x, offset ({:.1}, {:.1})",
            indent(1),
            summary.zoom,
            summary.offset.x,
            summary.offset.y
        ),
        format!(
            "{}Crop: {}x{} pt at ({:.1}, {:.1})",
            indent(1),
            frame.size.width,
            frame.size.height,
            frame.origin.x,
            frame.origin.y
        ),
        format!("Cropped → {} ({}x{})", summary.output.display(), ow, oh),
    ]
}

pub fn print_crop_summary(summary: &CropSummary<'_>) {
    for line in format_crop_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Request / Upload
// ============================================================================

pub fn format_request_outcome(
    method: Method,
    path: &str,
    outcome: &Result<Value, RequestFailure>,
) -> Vec<String> {
    match outcome {
        Ok(value) => {
            let mut lines = vec![format!("{} {} → ok", method, path)];
            if !value.is_null() {
                let pretty =
                    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
                lines.extend(pretty.lines().map(|l| format!("{}{}", indent(1), l)));
            }
            lines
        }
        Err(failure) => {
            let header = match &failure.reason {
                NetworkErrorReason::FailureErrorCode { code, .. } => {
                    format!("{} {} → failed (status {})", method, path, code)
                }
                NetworkErrorReason::InternetNotReachable => {
                    format!("{} {} → failed (internet not reachable)", method, path)
                }
                NetworkErrorReason::UnauthorizedAccess => {
                    format!("{} {} → failed (unauthorized)", method, path)
                }
                NetworkErrorReason::Other => format!("{} {} → failed", method, path),
            };
            let mut lines = vec![header];
            if let NetworkErrorReason::FailureErrorCode { message, .. } = &failure.reason
                && !message.is_empty()
            {
                lines.push(format!("{}Reason: {}", indent(1), message));
            }
            lines.push(format!("{}Error: {}", indent(1), failure.error.description));
            lines
        }
    }
}

pub fn print_request_outcome(
    method: Method,
    path: &str,
    outcome: &Result<Value, RequestFailure>,
) {
    for line in format_request_outcome(method, path, outcome) {
        println!("{}", line);
    }
}
