//! Template matching implementation
//!
//! Coefficient-normalized cross-correlation built from imageproc's raw
//! cross-correlation plus integral images for the per-window statistics.

use super::types::{Match, Needle};
use crate::locator::{LocatorError, LocatorResult, Point, centroid};
use image::{GrayImage, ImageBuffer, Luma, RgbImage};
use imageproc::integral_image::{integral_image, integral_squared_image};
use imageproc::template_matching::{MatchTemplateMethod, match_template};

pub(super) const DETECTOR: &str = "template matcher";

/// Finds every placement of a needle whose correlation beats a threshold
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateMatcher;

impl TemplateMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Find all matches of `needle` in `frame`
    ///
    /// # Arguments
    /// * `frame` - The captured frame (RGB format)
    /// * `needle` - The needle to search for
    /// * `threshold` - A position is a hit iff its correlation is strictly above this
    ///
    /// # Returns
    /// Every hit in row-major scan order
    pub fn find_matches(
        &self,
        frame: &RgbImage,
        needle: &Needle,
        threshold: f32,
    ) -> LocatorResult<Vec<Match>> {
        let frame_gray = image::imageops::grayscale(frame);
        let scores = self.correlation_map(&frame_gray, &needle.pixels)?;

        let matches: Vec<Match> = scores
            .enumerate_pixels()
            .filter(|(_, _, score)| score[0] > threshold)
            .map(|(x, y, score)| Match {
                x,
                y,
                correlation: score[0],
            })
            .collect();

        for hit in &matches {
            log::debug!("    hit {}", hit);
        }
        log::debug!(
            "  {} hits above {:.2} for {} in {}x{} frame",
            matches.len(),
            threshold,
            needle.display_name(),
            frame.width(),
            frame.height()
        );

        Ok(matches)
    }

    /// Locate a needle and aggregate all hits into one click point
    ///
    /// The point is the centroid of the top-left and bottom-right corners of
    /// every hit, so a small cluster of adjacent maxima collapses into one
    /// stable coordinate. Returns `Ok(None)` when the frame has no hit.
    pub fn locate(
        &self,
        frame: &RgbImage,
        needle: &Needle,
        threshold: f32,
    ) -> LocatorResult<Option<Point>> {
        let matches = self.find_matches(frame, needle, threshold)?;
        let (w, h) = (needle.width() as i32, needle.height() as i32);

        let corners: Vec<Point> = matches
            .iter()
            .flat_map(|m| {
                let (x, y) = (m.x as i32, m.y as i32);
                [Point::new(x, y), Point::new(x + w, y + h)]
            })
            .collect();

        Ok(centroid(&corners))
    }

    /// Correlation coefficient for every placement of `needle` inside `frame`
    ///
    /// Output has size `(fw - nw + 1) x (fh - nh + 1)`, values in [-1, 1].
    /// Placements where the needle or the window is flat score 0.
    pub fn correlation_map(
        &self,
        frame: &GrayImage,
        needle: &GrayImage,
    ) -> LocatorResult<ImageBuffer<Luma<f32>, Vec<f32>>> {
        let (nw, nh) = needle.dimensions();
        let (fw, fh) = frame.dimensions();

        if nw == 0 || nh == 0 {
            return Err(LocatorError::detector(DETECTOR, "needle image is empty"));
        }
        if nw > fw || nh > fh {
            return Err(LocatorError::detector(
                DETECTOR,
                format!("needle {nw}x{nh} is larger than frame {fw}x{fh}"),
            ));
        }

        let n = (nw as f64) * (nh as f64);
        let needle_sum: f64 = needle.pixels().map(|p| p[0] as f64).sum();
        let needle_sq_sum: f64 = needle.pixels().map(|p| (p[0] as f64).powi(2)).sum();
        let needle_var = needle_sq_sum - needle_sum * needle_sum / n;

        let cross = match_template(frame, needle, MatchTemplateMethod::CrossCorrelation);
        let sums = integral_image::<_, u64>(frame);
        let squares = integral_squared_image::<_, u64>(frame);

        let mut scores = ImageBuffer::new(cross.width(), cross.height());
        for (x, y, product) in cross.enumerate_pixels() {
            let window_sum = window_total(&sums, x, y, nw, nh) as f64;
            let window_sq_sum = window_total(&squares, x, y, nw, nh) as f64;
            let window_var = window_sq_sum - window_sum * window_sum / n;

            let denom = (needle_var * window_var).sqrt();
            let score = if needle_var <= f64::EPSILON || window_var <= f64::EPSILON {
                0.0
            } else {
                ((product[0] as f64 - window_sum * needle_sum / n) / denom).clamp(-1.0, 1.0)
            };
            scores.put_pixel(x, y, Luma([score as f32]));
        }

        Ok(scores)
    }
}

/// Sum over the `w x h` window at (x, y) of a padded integral image
fn window_total(integral: &ImageBuffer<Luma<u64>, Vec<u64>>, x: u32, y: u32, w: u32, h: u32) -> u64 {
    let a = integral.get_pixel(x, y)[0];
    let b = integral.get_pixel(x + w, y)[0];
    let c = integral.get_pixel(x, y + h)[0];
    let d = integral.get_pixel(x + w, y + h)[0];
    (a + d) - (b + c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// 10x10 needle: five black columns followed by five white columns
    fn edge_needle() -> Needle {
        let pixels = GrayImage::from_fn(10, 10, |x, _| if x < 5 { Luma([0]) } else { Luma([255]) });
        Needle::from_gray("edge", pixels)
    }

    /// Black frame with a white block covering x in [x0, x1) and y in [y0, y1)
    fn frame_with_block(w: u32, h: u32, x0: u32, x1: u32, y0: u32, y1: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        })
    }

    /// Non-repeating noise so an exact copy only occurs where it was cut from
    fn textured(w: u32, h: u32, seed: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| {
            let mut v = x.wrapping_mul(73_856_093)
                ^ y.wrapping_mul(19_349_663)
                ^ seed.wrapping_mul(83_492_791);
            v ^= v >> 13;
            v = v.wrapping_mul(0x5bd1_e995);
            v ^= v >> 15;
            Luma([(v & 0xff) as u8])
        })
    }

    #[test]
    fn test_exact_copy_scores_one() {
        let matcher = TemplateMatcher::new();
        let frame = textured(60, 40, 1);
        let needle = image::imageops::crop_imm(&frame, 20, 10, 12, 8).to_image();

        let scores = matcher.correlation_map(&frame, &needle).unwrap();
        assert_eq!(scores.dimensions(), (49, 33));
        assert!(
            scores.get_pixel(20, 10)[0] > 0.999,
            "Exact copy should correlate to ~1.0, got {}",
            scores.get_pixel(20, 10)[0]
        );
    }

    #[test]
    fn test_single_hit_center() {
        let matcher = TemplateMatcher::new();
        let gray = textured(80, 50, 3);
        let needle = Needle::from_gray("tex", image::imageops::crop_imm(&gray, 30, 20, 10, 6).to_image());
        let frame = image::DynamicImage::ImageLuma8(gray).to_rgb8();

        let matches = matcher.find_matches(&frame, &needle, 0.99).unwrap();
        assert_eq!(matches.len(), 1, "Expected one exact hit, got {:?}", matches);
        assert_eq!((matches[0].x, matches[0].y), (30, 20));

        let point = matcher.locate(&frame, &needle, 0.99).unwrap();
        // corners (30,20) and (40,26)
        assert_eq!(point, Some(Point::new(35, 23)));
    }

    #[test]
    fn test_adjacent_overlapping_hits_aggregate_to_one_point() {
        let matcher = TemplateMatcher::new();
        // Block rows 20..31 leave room for the needle at y=20 and y=21
        let frame = frame_with_block(100, 60, 50, 80, 20, 31);
        let needle = edge_needle();

        let matches = matcher.find_matches(&frame, &needle, 0.95).unwrap();
        let positions: Vec<(u32, u32)> = matches.iter().map(|m| (m.x, m.y)).collect();
        assert_eq!(positions, vec![(45, 20), (45, 21)]);

        let point = matcher.locate(&frame, &needle, 0.95).unwrap();
        // corners (45,20) (55,30) (45,21) (55,31) -> (50, 25.5) truncated
        assert_eq!(point, Some(Point::new(50, 25)));
    }

    #[test]
    fn test_no_hit_returns_none() {
        let matcher = TemplateMatcher::new();
        let frame = frame_with_block(60, 40, 0, 0, 0, 0);
        let point = matcher.locate(&frame, &edge_needle(), 0.7).unwrap();
        assert_eq!(point, None, "A flat frame must not match");
    }

    #[test]
    fn test_threshold_is_strict() {
        let matcher = TemplateMatcher::new();
        let frame = frame_with_block(100, 60, 50, 80, 20, 31);
        // Perfect placements clamp to exactly 1.0, which is not above 1.0
        let matches = matcher.find_matches(&frame, &edge_needle(), 1.0).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_needle_larger_than_frame() {
        let matcher = TemplateMatcher::new();
        let frame = RgbImage::new(8, 8);
        let err = matcher.find_matches(&frame, &edge_needle(), 0.7).unwrap_err();
        assert!(matches!(err, LocatorError::DetectorFailure { .. }));
    }
}
