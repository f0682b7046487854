pub mod capture;
pub mod client;
pub mod diagnostics;
pub mod input;
pub mod locator;
pub mod ocr;
pub mod template_matching;

pub use client::BotClient;
pub use locator::{LocateRequest, LocatorConfig, LocatorError, LocatorResult, Point, PollingLocator};
