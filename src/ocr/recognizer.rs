// OCR engine seam
use crate::locator::{LocatorResult, WordDetection};
use image::DynamicImage;

/// Capabilities the locator needs from an OCR engine.
///
/// Implementations receive an already preprocessed frame.
pub trait TextRecognizer {
    /// Structured recognition: one detection per word-like token, in engine order.
    fn recognize(&self, frame: &DynamicImage, ocr_config: &str) -> LocatorResult<Vec<WordDetection>>;

    /// Plain text recognition of the whole frame.
    fn read_text(&self, frame: &DynamicImage, ocr_config: &str) -> LocatorResult<String>;

    /// Cheap existence check used before paying for structured recognition.
    fn contains(&self, frame: &DynamicImage, text: &str, ocr_config: &str) -> LocatorResult<bool> {
        let recognized = self.read_text(frame, ocr_config)?;
        log::debug!("recognized text while looking for '{}': {:?}", text, recognized);
        Ok(recognized.contains(text))
    }
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for &T {
    fn recognize(&self, frame: &DynamicImage, ocr_config: &str) -> LocatorResult<Vec<WordDetection>> {
        (**self).recognize(frame, ocr_config)
    }

    fn read_text(&self, frame: &DynamicImage, ocr_config: &str) -> LocatorResult<String> {
        (**self).read_text(frame, ocr_config)
    }

    fn contains(&self, frame: &DynamicImage, text: &str, ocr_config: &str) -> LocatorResult<bool> {
        (**self).contains(frame, text, ocr_config)
    }
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for Box<T> {
    fn recognize(&self, frame: &DynamicImage, ocr_config: &str) -> LocatorResult<Vec<WordDetection>> {
        (**self).recognize(frame, ocr_config)
    }

    fn read_text(&self, frame: &DynamicImage, ocr_config: &str) -> LocatorResult<String> {
        (**self).read_text(frame, ocr_config)
    }

    fn contains(&self, frame: &DynamicImage, text: &str, ocr_config: &str) -> LocatorResult<bool> {
        (**self).contains(frame, text, ocr_config)
    }
}
