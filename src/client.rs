// High level bot: locate, click and type, with optional debug screenshots
use crate::capture::FrameSource;
use crate::diagnostics::{CrosshairMarker, screenshot};
use crate::input::{InputDispatch, Keys};
use crate::locator::{
    Clock, LocateRequest, LocatorResult, NeedleImageCriteria, Point, PollingLocator, SystemClock,
};
use crate::ocr::TextRecognizer;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Pointer travel time used when a caller has no preference
pub const DEFAULT_CLICK_DURATION: Duration = Duration::from_millis(400);

/// Composes locating, input dispatch and diagnostics.
///
/// When a screenshot folder is set, every click is preceded by a crosshair
/// screenshot and every key sequence is followed by a plain one. Diagnostic
/// failures are logged and never fail the action.
pub struct BotClient<F, R, I, C = SystemClock> {
    locator: PollingLocator<F, R, C>,
    input: I,
    marker: Option<CrosshairMarker>,
}

impl<F, R, I, C> BotClient<F, R, I, C>
where
    F: FrameSource,
    R: TextRecognizer,
    I: InputDispatch,
    C: Clock,
{
    pub fn new(locator: PollingLocator<F, R, C>, input: I) -> Self {
        Self {
            locator,
            input,
            marker: None,
        }
    }

    /// Save diagnostic screenshots into `folder` (created on first use).
    pub fn with_screenshot_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.marker = Some(CrosshairMarker::new(folder));
        self
    }

    pub fn locator(&self) -> &PollingLocator<F, R, C> {
        &self.locator
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn screenshot_folder(&self) -> Option<&Path> {
        self.marker.as_ref().map(CrosshairMarker::folder)
    }

    // ============================================================
    // LOCATE
    // ============================================================

    pub fn locate(&self, request: &LocateRequest) -> LocatorResult<Point> {
        self.locator.locate(request)
    }

    pub fn locate_img(&self, path: impl AsRef<Path>, confidence: f32) -> LocatorResult<Point> {
        self.locate(&LocateRequest::image(path).confidence(confidence))
    }

    /// Centroid of several needles, each with its own threshold.
    pub fn locate_imgs(&self, needles: &[NeedleImageCriteria]) -> LocatorResult<Point> {
        let config = self.locator.config();
        self.locator.locate_imgs(needles, config.timeout, config.check_interval)
    }

    pub fn locate_word(&self, text: &str, confidence: f32) -> LocatorResult<Point> {
        self.locate(&LocateRequest::word(text).confidence(confidence))
    }

    // ============================================================
    // CLICK
    // ============================================================

    /// Locate the request's target and click it.
    pub fn click_by(&self, request: &LocateRequest, duration: Duration) -> LocatorResult<Point> {
        let point = self.locate(request)?;
        self.click(point, duration)?;
        Ok(point)
    }

    pub fn click_by_img(&self, path: impl AsRef<Path>, confidence: f32) -> LocatorResult<Point> {
        self.click_by(&LocateRequest::image(path).confidence(confidence), DEFAULT_CLICK_DURATION)
    }

    pub fn click_by_word(&self, text: &str, confidence: f32) -> LocatorResult<Point> {
        self.click_by(&LocateRequest::word(text).confidence(confidence), DEFAULT_CLICK_DURATION)
    }

    pub fn click(&self, point: Point, duration: Duration) -> LocatorResult<()> {
        self.mark(point);
        self.input.click(point, duration)
    }

    pub fn double_click(&self, point: Point, duration: Duration) -> LocatorResult<()> {
        self.mark(point);
        self.input.double_click(point, duration)
    }

    pub fn position(&self) -> LocatorResult<Point> {
        self.input.position()
    }

    // ============================================================
    // KEYBOARD
    // ============================================================

    /// Type text or a list of named keys at the current focus.
    pub fn send_keys(&self, keys: impl Into<Keys>, append_enter: bool) -> LocatorResult<()> {
        let events = keys.into().to_events(append_enter);
        log::info!("to enter {:?}", events);
        self.input.write(&events)?;
        self.snapshot();
        Ok(())
    }

    pub fn hotkey(&self, keys: &[&str]) -> LocatorResult<()> {
        self.input.hotkey(keys)
    }

    /// Click `point`, then type. With `clear_before` the field is emptied
    /// first (click, select all, backspace).
    pub fn click_and_send_keys(
        &self,
        keys: impl Into<Keys>,
        point: Point,
        append_enter: bool,
        clear_before: bool,
    ) -> LocatorResult<()> {
        if clear_before {
            self.click(point, DEFAULT_CLICK_DURATION)?;
            self.hotkey(&["ctrl", "a"])?;
            self.send_keys(Keys::Named(vec!["backspace".to_string()]), false)?;
        }
        self.click(point, DEFAULT_CLICK_DURATION)?;
        self.send_keys(keys, append_enter)
    }

    /// Write the current frame to `path`.
    pub fn screenshot(&self, path: impl AsRef<Path>) -> LocatorResult<()> {
        screenshot(self.locator.frames(), path)
    }

    fn mark(&self, point: Point) {
        if let Some(marker) = &self.marker {
            if let Err(e) = marker.mark(self.locator.frames(), &[point]) {
                log::warn!("crosshair screenshot for {} failed: {}", point, e);
            }
        }
    }

    fn snapshot(&self) {
        if let Some(marker) = &self.marker {
            if let Err(e) = marker.snapshot(self.locator.frames()) {
                log::warn!("screenshot after typing failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{DryRunInput, InputAction};
    use crate::locator::{LocatorConfig, LocatorError, WordDetection};
    use image::{DynamicImage, RgbImage};

    struct StillFrame;

    impl FrameSource for StillFrame {
        fn capture(&self) -> LocatorResult<RgbImage> {
            Ok(RgbImage::new(320, 200))
        }
    }

    /// Reads a single "Connect" button in block 1
    struct ConnectButton;

    impl TextRecognizer for ConnectButton {
        fn recognize(&self, _frame: &DynamicImage, _ocr_config: &str) -> LocatorResult<Vec<WordDetection>> {
            Ok(vec![WordDetection {
                text: "Connect".to_string(),
                block_num: 1,
                confidence: 93,
                left: 200,
                top: 150,
                width: 60,
                height: 20,
            }])
        }

        fn read_text(&self, _frame: &DynamicImage, _ocr_config: &str) -> LocatorResult<String> {
            Ok("Connect\n".to_string())
        }
    }

    fn client() -> BotClient<StillFrame, ConnectButton, DryRunInput> {
        let config = LocatorConfig::default().with_timeout(Duration::ZERO);
        BotClient::new(PollingLocator::new(StillFrame, ConnectButton, config), DryRunInput::new())
    }

    fn write(keys: &[&str]) -> InputAction {
        InputAction::Write {
            keys: keys.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn click_at(x: i32, y: i32) -> InputAction {
        InputAction::Click {
            point: Point::new(x, y),
            duration_ms: 400,
        }
    }

    #[test]
    fn test_click_by_word_clicks_located_point() {
        let bot = client();
        let point = bot.click_by_word("Connect", 0.9).unwrap();

        // corners (200,150) and (260,170)
        assert_eq!(point, Point::new(230, 160));
        assert_eq!(bot.input().actions(), vec![click_at(230, 160)]);
        assert_eq!(bot.position().unwrap(), point);
    }

    #[test]
    fn test_not_found_dispatches_nothing() {
        let bot = client();
        let err = bot.click_by_word("Connect", 0.95).unwrap_err();

        assert!(matches!(err, LocatorError::ElementNotFound { .. }));
        assert!(bot.input().actions().is_empty());
    }

    #[test]
    fn test_rejected_click_propagates_input_failure() {
        let bot = client();
        let err = bot.click(Point::new(-1, 20), DEFAULT_CLICK_DURATION).unwrap_err();

        assert!(matches!(err, LocatorError::InputFailed { .. }), "got {err:?}");
        assert!(bot.input().actions().is_empty());
    }

    #[test]
    fn test_click_and_send_keys_clears_first() {
        let bot = client();
        bot.click_and_send_keys("hi", Point::new(5, 6), true, true).unwrap();

        assert_eq!(
            bot.input().actions(),
            vec![
                click_at(5, 6),
                InputAction::Hotkey {
                    keys: vec!["ctrl".to_string(), "a".to_string()]
                },
                write(&["backspace"]),
                click_at(5, 6),
                write(&["h", "i", "enter"]),
            ]
        );
    }

    #[test]
    fn test_click_and_send_keys_without_clear() {
        let bot = client();
        bot.click_and_send_keys(&["tab", "tab"][..], Point::new(1, 1), false, false)
            .unwrap();

        assert_eq!(bot.input().actions(), vec![click_at(1, 1), write(&["tab", "tab"])]);
    }

    #[test]
    fn test_screenshot_folder_gets_crosshair_and_typing_shots() {
        let folder = std::env::temp_dir().join(format!("bot-click-client-{}", std::process::id()));
        let bot = client().with_screenshot_folder(&folder);

        bot.double_click(Point::new(10, 10), DEFAULT_CLICK_DURATION).unwrap();
        bot.send_keys("ok", false).unwrap();

        let written = std::fs::read_dir(&folder).unwrap().count();
        assert!(written >= 1, "Expected diagnostic screenshots in {}", folder.display());
        assert_eq!(bot.input().actions().len(), 2);

        std::fs::remove_dir_all(&folder).ok();
    }

    #[test]
    fn test_diagnostic_failure_does_not_block_click() {
        // A regular file where the folder should be makes every write fail
        let blocker = std::env::temp_dir().join(format!("bot-click-blocker-{}", std::process::id()));
        std::fs::write(&blocker, b"not a folder").unwrap();
        let bot = client().with_screenshot_folder(blocker.join("shots"));

        bot.click(Point::new(3, 4), DEFAULT_CLICK_DURATION).unwrap();
        assert_eq!(bot.input().actions(), vec![click_at(3, 4)]);

        std::fs::remove_file(&blocker).ok();
    }
}
