// Template matching data types
use super::matcher::DETECTOR;
use crate::locator::{LocatorError, LocatorResult};
use image::GrayImage;
use std::fmt;
use std::path::{Path, PathBuf};

/// A needle image prepared for matching
#[derive(Clone, Debug)]
pub struct Needle {
    /// Needle label (file stem for needles loaded from disk)
    pub label: String,
    /// Source file, if the needle was loaded from disk
    pub path: Option<PathBuf>,
    /// Grayscale pixels used for correlation
    pub pixels: GrayImage,
}

/// A single template hit
#[derive(Clone, Debug, PartialEq)]
pub struct Match {
    /// Top-left X coordinate in the frame
    pub x: u32,
    /// Top-left Y coordinate in the frame
    pub y: u32,
    /// Correlation coefficient (-1.0 to 1.0)
    pub correlation: f32,
}

impl Needle {
    /// Load a needle image from disk.
    ///
    /// A missing file is a configuration problem and a corrupt one a
    /// detector failure; both are reported before any polling starts.
    pub fn open(path: impl AsRef<Path>) -> LocatorResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(LocatorError::NeedleNotFound {
                path: path.to_path_buf(),
            });
        }

        let image = image::open(path).map_err(|e| {
            LocatorError::detector(DETECTOR, format!("Failed to decode needle {}: {e}", path.display()))
        })?;

        let label = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unnamed")
            .to_string();

        Ok(Self {
            label,
            path: Some(path.to_path_buf()),
            pixels: image.to_luma8(),
        })
    }

    /// Create a needle from in-memory grayscale pixels
    pub fn from_gray(label: impl Into<String>, pixels: GrayImage) -> Self {
        Self {
            label: label.into(),
            path: None,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Get the needle name for display
    pub fn display_name(&self) -> String {
        format!("needle-{}-[{}x{}]", self.label, self.width(), self.height())
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let correlation_pct = (self.correlation * 100.0) as i32;
        write!(f, "({},{}) - {}%", self.x, self.y, correlation_pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_needle() {
        let err = Needle::open("definitely/not/here.png").unwrap_err();
        assert!(matches!(err, LocatorError::NeedleNotFound { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_open_corrupt_needle_is_detector_failure() {
        let dir = std::env::temp_dir().join(format!("bot-click-needle-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let err = Needle::open(&path).unwrap_err();
        assert!(
            matches!(err, LocatorError::DetectorFailure { detector: "template matcher", .. }),
            "got {err:?}"
        );
        assert!(!err.is_configuration());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_display_name() {
        let needle = Needle::from_gray("login", GrayImage::new(40, 12));
        assert_eq!(needle.display_name(), "needle-login-[40x12]");
        assert!(needle.path.is_none());
    }

    #[test]
    fn test_match_display() {
        let m = Match {
            x: 12,
            y: 7,
            correlation: 0.955,
        };
        assert_eq!(m.to_string(), "(12,7) - 95%");
    }
}
