//! Frame transforms applied right before OCR.
//!
//! Background color and contrast have a large effect on recognition quality,
//! so callers pick a transform per target application.

use image::{DynamicImage, RgbImage};
use imageproc::contrast::{ThresholdType, adaptive_threshold, threshold};
use std::fmt;
use std::sync::Arc;

type Transform = dyn Fn(&RgbImage) -> DynamicImage + Send + Sync;

/// A named, pure frame transform.
#[derive(Clone)]
pub struct Preprocess {
    name: String,
    transform: Arc<Transform>,
}

impl Preprocess {
    pub fn new(
        name: impl Into<String>,
        transform: impl Fn(&RgbImage) -> DynamicImage + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            transform: Arc::new(transform),
        }
    }

    /// Keep the frame as RGB, the layout the OCR engine expects.
    pub fn identity() -> Self {
        Self::new("identity", |frame| DynamicImage::ImageRgb8(frame.clone()))
    }

    pub fn grayscale() -> Self {
        Self::new("grayscale", |frame| {
            DynamicImage::ImageLuma8(image::imageops::grayscale(frame))
        })
    }

    /// Grayscale, then a fixed binary threshold.
    ///
    /// A high level (around 200) recovers faint placeholder text on light
    /// input fields.
    pub fn binary_threshold(level: u8) -> Self {
        Self::new(format!("threshold:{level}"), move |frame| {
            let gray = image::imageops::grayscale(frame);
            DynamicImage::ImageLuma8(threshold(&gray, level, ThresholdType::Binary))
        })
    }

    /// Grayscale, then a local threshold over `(2r+1)^2` neighbourhoods.
    pub fn adaptive_threshold(block_radius: u32) -> Self {
        Self::new(format!("adaptive:{block_radius}"), move |frame| {
            let gray = image::imageops::grayscale(frame);
            DynamicImage::ImageLuma8(adaptive_threshold(&gray, block_radius, 2))
        })
    }

    /// Parse the command-line form: `identity`, `gray`, `threshold:N`, `adaptive:R`.
    pub fn parse(spec: &str) -> Option<Self> {
        match spec.split_once(':') {
            None => match spec {
                "identity" | "none" => Some(Self::identity()),
                "gray" | "grayscale" => Some(Self::grayscale()),
                _ => None,
            },
            Some(("threshold", level)) => level.parse().ok().map(Self::binary_threshold),
            Some(("adaptive", radius)) => radius.parse().ok().map(Self::adaptive_threshold),
            Some(_) => None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, frame: &RgbImage) -> DynamicImage {
        (self.transform)(frame)
    }
}

impl Default for Preprocess {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for Preprocess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Preprocess").field(&self.name).finish()
    }
}

/// Guidance for improving OCR accuracy on a hard-to-read target.
pub fn enhance_ocr_tips() -> &'static str {
    "Tips to improve OCR accuracy:\n\
     1. preprocess: if the background is colorful or the text is faint, convert to \
     grayscale and threshold it. Faint placeholder text on a white input often needs \
     a fixed threshold around 200 (--preprocess=threshold:200); uneven backgrounds do \
     better with a local threshold (--preprocess=adaptive:5).\n\
     2. page segmentation: the engine default is --psm 3. Mostly-text screens often \
     read better with --ocr-config='--psm 4', '--psm 6' or '--psm 11'."
}
