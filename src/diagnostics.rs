//! Debug screenshots taken around clicks and key presses.
//!
//! Everything here is a side channel: callers log failures and carry on.

use crate::capture::FrameSource;
use crate::locator::{LocatorResult, Point};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

const CROSSHAIR_COLOR: Rgb<u8> = Rgb([255, 0, 255]);
const CROSSHAIR_SIZE: i32 = 40;
const CROSSHAIR_THICKNESS: i32 = 2;

/// Human readable timestamped file name, e.g. `2024-3-5_9-7-3-42.png`.
pub fn gen_filename(now: OffsetDateTime, ext: &str) -> String {
    format!(
        "{}-{}-{}_{}-{}-{}-{}.{}",
        now.year(),
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute(),
        now.second(),
        now.millisecond(),
        ext
    )
}

/// Local wall-clock time, UTC when the local offset cannot be determined
fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Draw a `+` marker centred on `point`. Parts outside the frame are clipped.
pub fn draw_crosshair(frame: &mut RgbImage, point: Point) {
    let half = (CROSSHAIR_SIZE / 2) as f32;
    let (x, y) = (point.x as f32, point.y as f32);
    for offset in 0..CROSSHAIR_THICKNESS {
        let o = offset as f32;
        draw_line_segment_mut(frame, (x - half, y + o), (x + half, y + o), CROSSHAIR_COLOR);
        draw_line_segment_mut(frame, (x + o, y - half), (x + o, y + half), CROSSHAIR_COLOR);
    }
}

/// Writes annotated screenshots into one folder.
#[derive(Debug, Clone)]
pub struct CrosshairMarker {
    folder: PathBuf,
}

impl CrosshairMarker {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self { folder: folder.into() }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Capture a frame, mark every point and save it under a timestamped name.
    pub fn mark<F: FrameSource + ?Sized>(&self, frames: &F, points: &[Point]) -> LocatorResult<PathBuf> {
        let mut frame = frames.capture()?;
        for &point in points {
            draw_crosshair(&mut frame, point);
        }
        let path = self.next_path()?;
        frame.save(&path)?;
        log::info!("saved crosshair for {:?} to {}", points, path.display());
        Ok(path)
    }

    /// Capture a plain frame into the folder.
    pub fn snapshot<F: FrameSource + ?Sized>(&self, frames: &F) -> LocatorResult<PathBuf> {
        let path = self.next_path()?;
        screenshot(frames, &path)?;
        log::info!("screenshot saved to {}", path.display());
        Ok(path)
    }

    fn next_path(&self) -> LocatorResult<PathBuf> {
        std::fs::create_dir_all(&self.folder)?;
        let folder = std::path::absolute(&self.folder)?;
        Ok(folder.join(gen_filename(local_now(), "png")))
    }
}

/// Capture a frame and write it to `path`; the format follows the extension.
pub fn screenshot<F: FrameSource + ?Sized>(frames: &F, path: impl AsRef<Path>) -> LocatorResult<()> {
    let frame = frames.capture()?;
    frame.save(path.as_ref())?;
    Ok(())
}
