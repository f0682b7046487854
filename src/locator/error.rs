use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for locate operations.
pub type LocatorResult<T> = Result<T, LocatorError>;

/// The error type for all locator operations.
#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("No match for '{target}' with confidence {confidence:.2} before the deadline")]
    ElementNotFound { target: String, confidence: f32 },

    #[error("Invalid locator configuration: {description}")]
    Configuration { description: String },

    #[error("Needle image not found at {path:?}")]
    NeedleNotFound { path: PathBuf },

    #[error("{detector} failed: {description}")]
    DetectorFailure {
        detector: &'static str,
        description: String,
    },

    #[error("Frame capture failed: {description}")]
    CaptureFailed { description: String },

    #[error("Input dispatch failed: {description}")]
    InputFailed { description: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Image error: {source}")]
    Image {
        #[from]
        source: image::ImageError,
    },
}

impl LocatorError {
    pub(crate) fn not_found(target: impl Into<String>, confidence: f32) -> Self {
        LocatorError::ElementNotFound {
            target: target.into(),
            confidence,
        }
    }

    pub(crate) fn config(description: impl Into<String>) -> Self {
        LocatorError::Configuration {
            description: description.into(),
        }
    }

    pub(crate) fn detector(detector: &'static str, description: impl Into<String>) -> Self {
        LocatorError::DetectorFailure {
            detector,
            description: description.into(),
        }
    }

    /// Check if this error means "the element was not seen in time".
    ///
    /// This is the only failure callers are expected to handle routinely,
    /// e.g. to treat a prompt that never appeared as success.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LocatorError::ElementNotFound { .. })
    }

    /// Check if this error was raised before polling started because the
    /// inputs themselves were invalid.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LocatorError::Configuration { .. } | LocatorError::NeedleNotFound { .. }
        )
    }
}

/// Validate a caller supplied confidence threshold.
pub(crate) fn validate_confidence(confidence: f32) -> LocatorResult<f32> {
    if confidence.is_finite() && (0.0..=1.0).contains(&confidence) {
        Ok(confidence)
    } else {
        Err(LocatorError::config(format!(
            "confidence must be within [0, 1], got {confidence}"
        )))
    }
}
