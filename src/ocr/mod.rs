//! OCR word location
//!
//! Frames are preprocessed, recognised by an OCR engine and the raw word
//! detections are narrowed down to the single row holding a query phrase.

pub mod disambiguate;
pub mod preprocess;
pub mod recognizer;
pub mod tesseract;


pub use disambiguate::{Disambiguator, ocr_confidence, resolve};
pub use preprocess::{Preprocess, enhance_ocr_tips};
pub use recognizer::TextRecognizer;
pub use tesseract::{TesseractCli, parse_tsv};
