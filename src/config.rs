//! Application configuration.
//!
//! Handles loading, validating, and merging a `cropsend.toml` file. Stock
//! defaults are serialized to a TOML table, the user file is merged on top of
//! it key by key, and the result is deserialized and validated.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [overlay]
//! host_width = 375.0        # Host view size in points
//! host_height = 667.0
//! scale = 2.0               # Device pixel scale
//!
//! [crop]
//! width = 300.0             # Crop size in points, centered in the overlay
//! height = 300.0
//! mode = "exact"            # "exact" or "square"
//!
//! [zoom]
//! min = 0.5
//! max = 2.0
//! double_tap = "toggle"     # "toggle" or "additive"
//!
//! [network]
//! base_url = "http://localhost:8080"
//! body_encoding = "form"    # "form" or "json"
//!
//! [network.headers]
//! # Accept = "application/json"
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::imaging::CropMode;
use crate::network::BodyEncoding;
use crate::picker::DoubleTapPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Largest accepted device pixel scale.
pub const MAX_SCALE: f64 = 8.0;

fn positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Configuration loaded from `cropsend.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Host view and device scale.
    pub overlay: OverlayConfig,
    /// Crop frame size and shape.
    pub crop: CropConfig,
    /// Zoom range and double-tap behavior.
    pub zoom: ZoomConfig,
    /// Request wrapper settings.
    pub network: NetworkConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let overlay = &self.overlay;
        if !positive_finite(overlay.host_width) || !positive_finite(overlay.host_height) {
            return Err(ConfigError::Validation(
                "overlay.host_width and overlay.host_height must be positive and finite".into(),
            ));
        }
        if !positive_finite(overlay.scale) || overlay.scale > MAX_SCALE {
            return Err(ConfigError::Validation(format!(
                "overlay.scale must be positive and at most {MAX_SCALE}"
            )));
        }
        if !positive_finite(self.crop.width) || !positive_finite(self.crop.height) {
            return Err(ConfigError::Validation(
                "crop.width and crop.height must be positive and finite".into(),
            ));
        }
        // The viewport is a square as wide as the host view.
        if self.crop.width > overlay.host_width
            || self.crop.height > overlay.host_width
            || self.crop.height > overlay.host_height
        {
            return Err(ConfigError::Validation(
                "crop must fit inside the viewport (host_width x host_width) and the host view"
                    .into(),
            ));
        }
        if !(positive_finite(self.zoom.min)
            && self.zoom.max.is_finite()
            && self.zoom.min <= 1.0
            && self.zoom.max >= 1.0)
        {
            return Err(ConfigError::Validation(
                "zoom range must satisfy 0 < min <= 1 <= max".into(),
            ));
        }
        url::Url::parse(&self.network.base_url).map_err(|e| {
            ConfigError::Validation(format!(
                "network.base_url '{}' is not a valid URL: {e}",
                self.network.base_url
            ))
        })?;
        Ok(())
    }
}

/// Host view the overlay covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayConfig {
    /// Host view width in points. Also the side of the square viewport.
    pub host_width: f64,
    /// Host view height in points.
    pub host_height: f64,
    /// Device pixel scale used when rendering.
    pub scale: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            host_width: 375.0,
            host_height: 667.0,
            scale: 2.0,
        }
    }
}

/// Crop frame settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropConfig {
    /// Crop width in points.
    pub width: f64,
    /// Crop height in points.
    pub height: f64,
    /// `exact` crops to width x height; `square` to the shorter rendered edge.
    pub mode: CropMode,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 300.0,
            mode: CropMode::Exact,
        }
    }
}

/// Zoom settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ZoomConfig {
    pub min: f64,
    pub max: f64,
    pub double_tap: DoubleTapPolicy,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: 0.5,
            max: 2.0,
            double_tap: DoubleTapPolicy::Toggle,
        }
    }
}

/// Request wrapper settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    /// Relative request paths are resolved against this URL.
    pub base_url: String,
    /// Body encoding for methods that carry parameters in the body.
    pub body_encoding: BodyEncoding,
    /// Headers sent with every request unless the resource sets them.
    pub headers: BTreeMap<String, String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            body_encoding: BodyEncoding::Form,
            headers: BTreeMap::new(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AppConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, or stock defaults when no path is given or the
/// file does not exist.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = match path {
        Some(path) => load_raw_config(path)?,
        None => None,
    };
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `cropsend.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# cropsend configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Overlay
# ---------------------------------------------------------------------------
[overlay]
# Host view size in points. The zoomable viewport is a square as wide as
# the host view, centered in it.
host_width = 375.0
host_height = 667.0

# Device pixel scale: rendered bitmaps are this many pixels per point (at most 8).
scale = 2.0

# ---------------------------------------------------------------------------
# Crop frame
# ---------------------------------------------------------------------------
[crop]
# Crop size in points, centered in the host view. Must fit the viewport.
width = 300.0
height = 300.0

# "exact" crops to width x height.
# "square" crops to the largest centered square of the rendered view.
mode = "exact"

# ---------------------------------------------------------------------------
# Zoom
# ---------------------------------------------------------------------------
[zoom]
min = 0.5
max = 2.0

# "toggle" alternates between 1x and max.
# "additive" adds 2 while in range and resets to 1 otherwise (clamped).
double_tap = "toggle"

# ---------------------------------------------------------------------------
# Network
# ---------------------------------------------------------------------------
[network]
# Relative request paths are resolved against this URL.
base_url = "http://localhost:8080"

# How parameters are sent for POST/PUT/PATCH: "form" or "json".
# GET, HEAD and DELETE always use the query string.
body_encoding = "form"

# Headers sent with every request unless the request sets them itself.
[network.headers]
# Accept = "application/json"
"##
}
