// Shared locator data types
use crate::ocr::Preprocess;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Integer screen coordinate.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One template-matching target: a needle image and its own threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeedleImageCriteria {
    pub path: PathBuf,
    /// Correlation threshold (0.0-1.0)
    pub confidence: f32,
}

impl NeedleImageCriteria {
    pub fn new(path: impl Into<PathBuf>, confidence: f32) -> Self {
        Self {
            path: path.into(),
            confidence,
        }
    }
}

/// A single word-like token reported by the OCR engine for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordDetection {
    pub text: String,
    /// Engine assigned grouping of tokens on the same visual row
    pub block_num: u32,
    /// Confidence on the OCR scale (0-100, negative when the engine has none)
    pub confidence: i32,
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl WordDetection {
    pub fn top_left(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.left + self.width, self.top + self.height)
    }
}

/// What a locate call is looking for.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// Template match against a needle image file
    Image(PathBuf),
    /// Whitespace separated words recognised by OCR
    Word(String),
}

impl Target {
    /// Human readable form used in logs and `ElementNotFound` errors.
    pub fn describe(&self) -> String {
        match self {
            Target::Image(path) => path.display().to_string(),
            Target::Word(text) => text.clone(),
        }
    }
}

/// Parameters of a single locate call.
///
/// Every unset field falls back to the locator's [`LocatorConfig`](super::LocatorConfig).
#[derive(Debug, Clone)]
pub struct LocateRequest {
    pub target: Target,
    pub confidence: Option<f32>,
    pub timeout: Option<Duration>,
    pub check_interval: Option<Duration>,
    pub ocr_config: Option<String>,
    pub preprocess: Option<Preprocess>,
}

impl LocateRequest {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            confidence: None,
            timeout: None,
            check_interval: None,
            ocr_config: None,
            preprocess: None,
        }
    }

    pub fn image(path: impl AsRef<Path>) -> Self {
        Self::new(Target::Image(path.as_ref().to_path_buf()))
    }

    pub fn word(text: impl Into<String>) -> Self {
        Self::new(Target::Word(text.into()))
    }

    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = Some(interval);
        self
    }

    pub fn ocr_config(mut self, ocr_config: impl Into<String>) -> Self {
        self.ocr_config = Some(ocr_config.into());
        self
    }

    pub fn preprocess(mut self, preprocess: Preprocess) -> Self {
        self.preprocess = Some(preprocess);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_detection_corners() {
        let word = WordDetection {
            text: "Save".to_string(),
            block_num: 1,
            confidence: 90,
            left: 100,
            top: 40,
            width: 30,
            height: 12,
        };
        assert_eq!(word.top_left(), Point::new(100, 40));
        assert_eq!(word.bottom_right(), Point::new(130, 52));
    }

    #[test]
    fn test_request_builder_keeps_unset_fields_empty() {
        let request = LocateRequest::word("Save password?")
            .confidence(0.8)
            .timeout(Duration::from_secs(10));

        assert_eq!(request.target, Target::Word("Save password?".to_string()));
        assert_eq!(request.confidence, Some(0.8));
        assert_eq!(request.timeout, Some(Duration::from_secs(10)));
        assert!(request.check_interval.is_none());
        assert!(request.ocr_config.is_none());
        assert!(request.preprocess.is_none());
    }

    #[test]
    fn test_target_describe() {
        assert_eq!(Target::Image(PathBuf::from("img/login.png")).describe(), "img/login.png");
        assert_eq!(Target::Word("Connect".to_string()).describe(), "Connect");
    }
}
