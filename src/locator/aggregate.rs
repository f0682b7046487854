//! Collapse detector output into one actionable coordinate.

use super::types::{Point, WordDetection};

/// Integer-truncated mean of a set of points.
///
/// Returns `None` for an empty slice; callers only aggregate non-empty
/// detector results.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }

    let count = points.len() as i64;
    let sum_x: i64 = points.iter().map(|p| p.x as i64).sum();
    let sum_y: i64 = points.iter().map(|p| p.y as i64).sum();
    let result = Point::new((sum_x / count) as i32, (sum_y / count) as i32);
    log::debug!("centroid is {} for {} points", result, points.len());
    Some(result)
}

/// Top-left and bottom-right corners of every word box.
pub fn word_corners(words: &[WordDetection]) -> Vec<Point> {
    let top_lefts = words.iter().map(WordDetection::top_left);
    let bottom_rights = words.iter().map(WordDetection::bottom_right);
    top_lefts.chain(bottom_rights).collect()
}
