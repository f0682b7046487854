// Locator module - find image needles or OCR phrases on screen frames
// and turn every hit into a single click point.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod polling;
pub mod types;


// Re-export the main types and functions for easy access
pub use aggregate::{centroid, word_corners};
pub use config::{DEFAULT_TIMEOUT_ENV, LocatorConfig, duration_from_secs};
pub use error::{LocatorError, LocatorResult};
pub use polling::{Clock, PollingLocator, SystemClock};
pub use types::{LocateRequest, NeedleImageCriteria, Point, Target, WordDetection};

pub(crate) use error::validate_confidence;
