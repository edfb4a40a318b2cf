//! Where picked images come from.

use super::PickerError;
use crate::imaging::{Bitmap, ImageBackend};
use std::path::PathBuf;

/// Which system picker the host asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerMode {
    Camera,
    Gallery,
}

/// Camera requests fall back to the gallery when no camera is available.
pub fn resolve_mode(requested: PickerMode, camera_available: bool) -> PickerMode {
    match requested {
        PickerMode::Camera if camera_available => PickerMode::Camera,
        _ => PickerMode::Gallery,
    }
}

/// A camera or photo-library provider.
pub trait ImageSource {
    fn camera_available(&self) -> bool;

    /// Present the picker for `mode`. `Ok(None)` means the user dismissed it
    /// without choosing anything.
    fn pick(&mut self, mode: PickerMode) -> Result<Option<Bitmap>, PickerError>;
}

/// Gallery backed by image files on disk. There is no camera.
///
/// Each call to [`pick`](ImageSource::pick) hands out the next queued path;
/// an empty queue behaves like a dismissed picker.
pub struct FileSource<B: ImageBackend> {
    backend: B,
    queue: Vec<PathBuf>,
}

impl<B: ImageBackend> FileSource<B> {
    pub fn new(backend: B, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut queue: Vec<PathBuf> = paths.into_iter().collect();
        queue.reverse();
        Self { backend, queue }
    }
}

impl<B: ImageBackend> ImageSource for FileSource<B> {
    fn camera_available(&self) -> bool {
        false
    }

    fn pick(&mut self, mode: PickerMode) -> Result<Option<Bitmap>, PickerError> {
        if mode == PickerMode::Camera {
            return Err(PickerError::SourceUnavailable(mode));
        }
        let Some(path) = self.queue.pop() else {
            return Ok(None);
        };
        tracing::debug!(path = %path.display(), "loading picked image");
        let bitmap = self.backend.load(&path)?;
        Ok(Some(bitmap))
    }
}
