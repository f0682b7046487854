//! Configuration for locate operations

use super::error::{LocatorError, LocatorResult, validate_confidence};
use std::time::Duration;

/// Environment variable holding the default timeout in whole seconds.
pub const DEFAULT_TIMEOUT_ENV: &str = "DEFAULT_TIMEOUT";

#[derive(Debug, Clone, PartialEq)]
pub struct LocatorConfig {
    /// Confidence threshold for template and word matching (0.0 to 1.0)
    pub confidence: f32,
    /// How long a locate call keeps polling before giving up
    pub timeout: Duration,
    /// Fixed sleep between two attempts
    pub check_interval: Duration,
    /// Extra OCR engine arguments, e.g. `--psm 6`
    pub ocr_config: String,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            confidence: 0.7,
            timeout: Duration::from_secs(60),
            // OCR spawns an external engine per attempt, don't poll too often
            check_interval: Duration::from_secs(5),
            ocr_config: String::new(),
        }
    }
}

impl LocatorConfig {
    /// Defaults with the timeout taken from `DEFAULT_TIMEOUT` when it is set.
    ///
    /// Read once at process start and pass the result into the locator.
    pub fn from_env() -> LocatorResult<Self> {
        let value = std::env::var(DEFAULT_TIMEOUT_ENV).ok();
        Self::from_timeout_setting(value.as_deref())
    }

    /// Build defaults from an optional raw timeout setting (seconds).
    pub fn from_timeout_setting(value: Option<&str>) -> LocatorResult<Self> {
        let mut config = Self::default();
        if let Some(raw) = value {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                LocatorError::config(format!(
                    "{DEFAULT_TIMEOUT_ENV} must be a whole number of seconds, got '{raw}'"
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn with_confidence(mut self, confidence: f32) -> LocatorResult<Self> {
        self.confidence = validate_confidence(confidence)?;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    pub fn with_ocr_config(mut self, ocr_config: impl Into<String>) -> Self {
        self.ocr_config = ocr_config.into();
        self
    }
}

/// Convert a seconds value coming from user input into a `Duration`.
pub fn duration_from_secs(name: &str, secs: f64) -> LocatorResult<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| LocatorError::config(format!("{name} must be a non-negative number of seconds, got {secs}")))
}
