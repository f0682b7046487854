// Polling locate loop: capture, match, sleep, retry until the deadline
use super::aggregate::{centroid, word_corners};
use super::config::LocatorConfig;
use super::error::{LocatorError, LocatorResult, validate_confidence};
use super::types::{LocateRequest, NeedleImageCriteria, Point, Target};
use crate::capture::FrameSource;
use crate::ocr::{Disambiguator, Preprocess, TextRecognizer};
use crate::template_matching::{Needle, TemplateMatcher};
use image::RgbImage;
use std::time::{Duration, Instant};

/// Time source for the polling loop.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall clock with a blocking thread sleep.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Settings of one locate call after request overrides were applied.
#[derive(Debug, Clone)]
struct Resolved {
    confidence: f32,
    timeout: Duration,
    check_interval: Duration,
    ocr_config: String,
    preprocess: Preprocess,
}

/// Locates image needles or OCR words on frames from a [`FrameSource`],
/// polling until found or the deadline passes.
///
/// Every attempt works on a fresh frame; nothing is carried between attempts.
pub struct PollingLocator<F, R, C = SystemClock> {
    frames: F,
    recognizer: R,
    clock: C,
    matcher: TemplateMatcher,
    config: LocatorConfig,
}

impl<F: FrameSource, R: TextRecognizer> PollingLocator<F, R> {
    pub fn new(frames: F, recognizer: R, config: LocatorConfig) -> Self {
        Self {
            frames,
            recognizer,
            clock: SystemClock,
            matcher: TemplateMatcher::new(),
            config,
        }
    }
}

impl<F: FrameSource, R: TextRecognizer, C: Clock> PollingLocator<F, R, C> {
    /// Replace the time source (virtual clocks in tests).
    pub fn with_clock<C2: Clock>(self, clock: C2) -> PollingLocator<F, R, C2> {
        PollingLocator {
            frames: self.frames,
            recognizer: self.recognizer,
            clock,
            matcher: self.matcher,
            config: self.config,
        }
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    pub fn frames(&self) -> &F {
        &self.frames
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// Locate the request's target and return one click point.
    ///
    /// Invalid inputs fail before the first capture. Detector and capture
    /// failures end the loop immediately; only "not on this frame" is retried.
    pub fn locate(&self, request: &LocateRequest) -> LocatorResult<Point> {
        let settings = self.resolve(request)?;
        let description = request.target.describe();

        let point = match &request.target {
            Target::Image(path) => {
                let needle = Needle::open(path)?;
                self.poll(&description, &settings, |frame| {
                    self.matcher.locate(frame, &needle, settings.confidence)
                })?
            }
            Target::Word(text) => {
                let disambiguator = Disambiguator::new(text, settings.confidence)?;
                self.poll(&description, &settings, |frame| {
                    self.match_words(frame, text, &disambiguator, &settings)
                })?
            }
        };

        log::info!("locate {} with {:.2} at {}", description, settings.confidence, point);
        Ok(point)
    }

    /// Locate an image needle with the given threshold.
    pub fn locate_img(
        &self,
        path: impl AsRef<std::path::Path>,
        confidence: f32,
        timeout: Duration,
        check_interval: Duration,
    ) -> LocatorResult<Point> {
        let request = LocateRequest::image(path)
            .confidence(confidence)
            .timeout(timeout)
            .check_interval(check_interval);
        self.locate(&request)
    }

    /// Locate every needle in turn and return the centroid of their points.
    pub fn locate_imgs(
        &self,
        needles: &[NeedleImageCriteria],
        timeout: Duration,
        check_interval: Duration,
    ) -> LocatorResult<Point> {
        if needles.is_empty() {
            return Err(LocatorError::config("at least one needle is required"));
        }

        let points = needles
            .iter()
            .map(|needle| self.locate_img(&needle.path, needle.confidence, timeout, check_interval))
            .collect::<LocatorResult<Vec<Point>>>()?;

        centroid(&points).ok_or_else(|| LocatorError::config("at least one needle is required"))
    }

    fn resolve(&self, request: &LocateRequest) -> LocatorResult<Resolved> {
        Ok(Resolved {
            confidence: validate_confidence(request.confidence.unwrap_or(self.config.confidence))?,
            timeout: request.timeout.unwrap_or(self.config.timeout),
            check_interval: request.check_interval.unwrap_or(self.config.check_interval),
            ocr_config: request
                .ocr_config
                .clone()
                .unwrap_or_else(|| self.config.ocr_config.clone()),
            preprocess: request.preprocess.clone().unwrap_or_default(),
        })
    }

    /// One word attempt on one frame: presence check, structured OCR, then
    /// row disambiguation. A phrase that cannot be resolved on this frame is
    /// a miss, not a failure.
    fn match_words(
        &self,
        frame: &RgbImage,
        text: &str,
        disambiguator: &Disambiguator,
        settings: &Resolved,
    ) -> LocatorResult<Option<Point>> {
        let processed = settings.preprocess.apply(frame);
        if !self.recognizer.contains(&processed, text, &settings.ocr_config)? {
            return Ok(None);
        }

        let detections = self.recognizer.recognize(&processed, &settings.ocr_config)?;
        match disambiguator.resolve(&detections) {
            Ok(selected) => Ok(centroid(&word_corners(&selected))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Capture and match until `detect` yields a point or the deadline passes.
    ///
    /// The first attempt always runs, even with a zero timeout.
    fn poll<D>(&self, description: &str, settings: &Resolved, mut detect: D) -> LocatorResult<Point>
    where
        D: FnMut(&RgbImage) -> LocatorResult<Option<Point>>,
    {
        let deadline = self.clock.now() + settings.timeout;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let capture = self.frames.capture_timed()?;
            log::debug!(
                "attempt {} for {}: captured {}x{} frame in {}ms",
                attempt,
                description,
                capture.frame.width(),
                capture.frame.height(),
                capture.duration_ms
            );

            if let Some(point) = detect(&capture.frame)? {
                log::info!("wait for ({description}, {:.2}) on screen: found", settings.confidence);
                return Ok(point);
            }
            log::info!(
                "wait for ({description}, {:.2}) on screen: not found (attempt {attempt})",
                settings.confidence
            );

            if self.clock.now() >= deadline {
                break;
            }
            self.clock.sleep(settings.check_interval);
            if self.clock.now() >= deadline {
                break;
            }
        }

        log::warn!(
            "wait for ({description}, {:.2}) timed out after {attempt} attempts",
            settings.confidence
        );
        Err(LocatorError::not_found(description, settings.confidence))
    }
}
