//! The image picker: choose an image, crop it, hand it back.
//!
//! ```text
//! Idle ──start_picking──▶ Cropping ──confirm──▶ Dismissed (on_finished)
//!   │                        │
//!   │ (picker dismissed)     └──cancel───▶ Dismissed (on_cancelled, if set)
//!   └──▶ Idle
//! ```
//!
//! An [`ImagePicker`] is owned by its caller and runs exactly one session:
//! each handler in [`PickerHandlers`] fires at most once, after the overlay
//! has been dismissed. Gestures go to the [`CropSession`] returned by
//! [`ImagePicker::session_mut`].

mod session;
mod source;

pub use session::{
    BASELINE_ZOOM, CropSession, DoubleTapPolicy, SessionOptions, ZoomRange, ZoomState,
};
pub use source::{FileSource, ImageSource, PickerMode, resolve_mode};

use crate::config::AppConfig;
use crate::imaging::{
    BackendError, Bitmap, CropMode, ImageBackend, Size, finalize_crop, render_for_crop,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PickerError {
    #[error("{0:?} source is not available")]
    SourceUnavailable(PickerMode),
    #[error("host view {width}x{height} has no area")]
    InvalidHostSize { width: f64, height: f64 },
    #[error(
        "crop {crop_width}x{crop_height} does not fit the {viewport_width}x{viewport_height} viewport"
    )]
    InvalidCropSize {
        crop_width: f64,
        crop_height: f64,
        viewport_width: f64,
        viewport_height: f64,
    },
    #[error("zoom range {min}..={max} is not a positive, finite, ordered range")]
    InvalidZoomRange { min: f64, max: f64 },
    #[error("device scale {0} must be positive and finite")]
    InvalidScale(f64),
    #[error("no crop session is active")]
    NotCropping,
    #[error("a crop session is already active")]
    AlreadyCropping,
    #[error("picker session already finished")]
    Dismissed,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Completion handlers supplied by the host.
pub struct PickerHandlers {
    pub on_finished: Box<dyn FnOnce(Bitmap)>,
    pub on_cancelled: Option<Box<dyn FnOnce()>>,
}

impl PickerHandlers {
    pub fn new(on_finished: impl FnOnce(Bitmap) + 'static) -> Self {
        Self {
            on_finished: Box::new(on_finished),
            on_cancelled: None,
        }
    }

    pub fn on_cancelled(mut self, on_cancelled: impl FnOnce() + 'static) -> Self {
        self.on_cancelled = Some(Box::new(on_cancelled));
        self
    }
}

/// Crop and zoom settings shared by every session of a picker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickerConfig {
    pub crop: Size,
    pub crop_mode: CropMode,
    pub zoom: ZoomRange,
    pub double_tap: DoubleTapPolicy,
    pub scale: f64,
}

impl PickerConfig {
    fn session_options(&self) -> SessionOptions {
        SessionOptions {
            crop: self.crop,
            crop_mode: self.crop_mode,
            zoom: self.zoom,
            double_tap: self.double_tap,
            scale: self.scale,
        }
    }
}

impl From<&AppConfig> for PickerConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            crop: Size::new(config.crop.width, config.crop.height),
            crop_mode: config.crop.mode,
            zoom: ZoomRange::new(config.zoom.min, config.zoom.max),
            double_tap: config.zoom.double_tap,
            scale: config.overlay.scale,
        }
    }
}

enum PickerState {
    Idle,
    Cropping {
        source: Bitmap,
        session: CropSession,
    },
    Dismissed,
}

/// One picker session, from presenting the source to the cropped result.
pub struct ImagePicker<B: ImageBackend> {
    backend: B,
    config: PickerConfig,
    handlers: Option<PickerHandlers>,
    state: PickerState,
}

impl<B: ImageBackend> ImagePicker<B> {
    pub fn new(backend: B, config: PickerConfig, handlers: PickerHandlers) -> Self {
        Self {
            backend,
            config,
            handlers: Some(handlers),
            state: PickerState::Idle,
        }
    }

    /// Present `source` over a host view of size `host`.
    ///
    /// Returns `Ok(true)` once an image was chosen and the crop overlay is up,
    /// `Ok(false)` if the user dismissed the source without choosing.
    pub fn start_picking(
        &mut self,
        source: &mut impl ImageSource,
        host: Size,
        mode: PickerMode,
    ) -> Result<bool, PickerError> {
        match self.state {
            PickerState::Idle => {}
            PickerState::Cropping { .. } => return Err(PickerError::AlreadyCropping),
            PickerState::Dismissed => return Err(PickerError::Dismissed),
        }

        let mode = resolve_mode(mode, source.camera_available());
        let Some(image) = source.pick(mode)? else {
            tracing::debug!(?mode, "picker dismissed without a selection");
            return Ok(false);
        };

        let session = CropSession::new(host, self.config.session_options())?;
        tracing::info!(
            width = image.width(),
            height = image.height(),
            ?mode,
            "image picked, entering crop mode"
        );
        self.state = PickerState::Cropping {
            source: image,
            session,
        };
        Ok(true)
    }

    pub fn is_cropping(&self) -> bool {
        matches!(self.state, PickerState::Cropping { .. })
    }

    pub fn session(&self) -> Option<&CropSession> {
        match &self.state {
            PickerState::Cropping { session, .. } => Some(session),
            _ => None,
        }
    }

    /// The image being cropped.
    pub fn picked(&self) -> Option<&Bitmap> {
        match &self.state {
            PickerState::Cropping { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut CropSession> {
        match &mut self.state {
            PickerState::Cropping { session, .. } => Some(session),
            _ => None,
        }
    }

    /// Render and crop the current view, dismiss, and call `on_finished`.
    ///
    /// On error the session stays active so the user can adjust and retry.
    pub fn confirm(&mut self) -> Result<(), PickerError> {
        let PickerState::Cropping { source, session } = &self.state else {
            return Err(PickerError::NotCropping);
        };

        let rendered = render_for_crop(&self.backend, source, &session.render_layout())?;
        let cropped = finalize_crop(&self.backend, &rendered, session.crop_spec())?;
        tracing::info!(
            width = cropped.width(),
            height = cropped.height(),
            "crop confirmed"
        );

        self.state = PickerState::Dismissed;
        if let Some(handlers) = self.handlers.take() {
            (handlers.on_finished)(cropped);
        }
        Ok(())
    }

    /// Dismiss the overlay without a result. Returns `false` if no crop
    /// session was active.
    pub fn cancel(&mut self) -> bool {
        if !self.is_cropping() {
            return false;
        }
        self.state = PickerState::Dismissed;
        tracing::info!("crop cancelled");
        if let Some(on_cancelled) = self.handlers.take().and_then(|h| h.on_cancelled) {
            on_cancelled();
        }
        true
    }
}
