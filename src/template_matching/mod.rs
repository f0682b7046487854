/// Template matching module for needle detection in captured frames
///
/// This module provides:
/// - Coefficient-normalized correlation of a grayscale needle against a frame
/// - Collection of every placement strictly above a confidence threshold
/// - Aggregation of all hit corners into a single click point
pub mod matcher;
pub mod types;

pub use matcher::TemplateMatcher;
pub use types::{Match, Needle};
