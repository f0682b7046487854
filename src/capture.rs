// Frame acquisition seam
use crate::locator::{LocatorError, LocatorResult};
use image::RgbImage;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// One captured frame with timing
#[derive(Debug, Clone)]
pub struct FrameCapture {
    pub frame: RgbImage,
    pub duration_ms: u128,
}

/// Produces a single image of the visible screen region on demand.
pub trait FrameSource {
    /// Raw capture (implemented per source)
    fn capture(&self) -> LocatorResult<RgbImage>;

    /// Capture with timing, used by the polling loop for diagnostics
    fn capture_timed(&self) -> LocatorResult<FrameCapture> {
        let start = Instant::now();
        let frame = self.capture()?;
        Ok(FrameCapture {
            frame,
            duration_ms: start.elapsed().as_millis(),
        })
    }
}

impl<T: FrameSource + ?Sized> FrameSource for &T {
    fn capture(&self) -> LocatorResult<RgbImage> {
        (**self).capture()
    }
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn capture(&self) -> LocatorResult<RgbImage> {
        (**self).capture()
    }
}

/// Replays a screenshot file on every capture.
///
/// The file is re-read each time, so a process that keeps overwriting it
/// (e.g. a remote-desktop recorder) acts as a live screen.
#[derive(Debug, Clone)]
pub struct ImageFileSource {
    path: PathBuf,
}

impl ImageFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for ImageFileSource {
    fn capture(&self) -> LocatorResult<RgbImage> {
        let image = image::open(&self.path).map_err(|e| LocatorError::CaptureFailed {
            description: format!("Failed to load frame {}: {e}", self.path.display()),
        })?;
        Ok(image.to_rgb8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_missing_frame_file_is_capture_failure() {
        let source = ImageFileSource::new("no/such/frame.png");
        let err = source.capture().unwrap_err();
        assert!(matches!(err, LocatorError::CaptureFailed { .. }));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_replays_frame_from_disk() {
        let dir = std::env::temp_dir().join(format!("bot-click-capture-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("frame.png");
        RgbImage::from_pixel(6, 4, Rgb([10, 20, 30])).save(&path).unwrap();

        let source = ImageFileSource::new(&path);
        let capture = (&source).capture_timed().unwrap();
        assert_eq!(capture.frame.dimensions(), (6, 4));
        assert_eq!(capture.frame.get_pixel(5, 3), &Rgb([10, 20, 30]));

        std::fs::remove_dir_all(&dir).ok();
    }
}
