// Mouse and keyboard dispatch seam
use crate::locator::{LocatorError, LocatorResult, Point};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::time::Duration;

/// Key name appended by `send_keys` when an enter press is requested
pub const ENTER: &str = "enter";

/// Delivers clicks and key presses to the desktop.
pub trait InputDispatch {
    /// Move the pointer to `point` over `duration`, then click.
    fn click(&self, point: Point, duration: Duration) -> LocatorResult<()>;
    fn double_click(&self, point: Point, duration: Duration) -> LocatorResult<()>;
    /// Press each key in order.
    fn write(&self, keys: &[String]) -> LocatorResult<()>;
    /// Press all keys together, e.g. `["ctrl", "a"]`.
    fn hotkey(&self, keys: &[&str]) -> LocatorResult<()>;
    fn position(&self) -> LocatorResult<Point>;
}

impl<T: InputDispatch + ?Sized> InputDispatch for &T {
    fn click(&self, point: Point, duration: Duration) -> LocatorResult<()> {
        (**self).click(point, duration)
    }

    fn double_click(&self, point: Point, duration: Duration) -> LocatorResult<()> {
        (**self).double_click(point, duration)
    }

    fn write(&self, keys: &[String]) -> LocatorResult<()> {
        (**self).write(keys)
    }

    fn hotkey(&self, keys: &[&str]) -> LocatorResult<()> {
        (**self).hotkey(keys)
    }

    fn position(&self) -> LocatorResult<Point> {
        (**self).position()
    }
}

impl<T: InputDispatch + ?Sized> InputDispatch for Box<T> {
    fn click(&self, point: Point, duration: Duration) -> LocatorResult<()> {
        (**self).click(point, duration)
    }

    fn double_click(&self, point: Point, duration: Duration) -> LocatorResult<()> {
        (**self).double_click(point, duration)
    }

    fn write(&self, keys: &[String]) -> LocatorResult<()> {
        (**self).write(keys)
    }

    fn hotkey(&self, keys: &[&str]) -> LocatorResult<()> {
        (**self).hotkey(keys)
    }

    fn position(&self) -> LocatorResult<Point> {
        (**self).position()
    }
}

/// What to type: free text or a list of named keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keys {
    /// Typed one character at a time
    Text(String),
    /// Named keys such as `backspace` or `tab`, pressed in order
    Named(Vec<String>),
}

impl Keys {
    /// Expand into the key events to press.
    ///
    /// `"abc"` with `append_enter` becomes `a b c enter`; a named list is
    /// kept as given and only gains the trailing `enter`.
    pub fn to_events(&self, append_enter: bool) -> Vec<String> {
        let mut events: Vec<String> = match self {
            Keys::Text(text) => text.chars().map(String::from).collect(),
            Keys::Named(keys) => keys.clone(),
        };
        if append_enter {
            events.push(ENTER.to_string());
        }
        events
    }
}

impl From<&str> for Keys {
    fn from(text: &str) -> Self {
        Keys::Text(text.to_string())
    }
}

impl From<String> for Keys {
    fn from(text: String) -> Self {
        Keys::Text(text)
    }
}

impl From<Vec<String>> for Keys {
    fn from(keys: Vec<String>) -> Self {
        Keys::Named(keys)
    }
}

impl From<&[&str]> for Keys {
    fn from(keys: &[&str]) -> Self {
        Keys::Named(keys.iter().map(|k| k.to_string()).collect())
    }
}

/// One dispatched input action
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InputAction {
    Click { point: Point, duration_ms: u64 },
    DoubleClick { point: Point, duration_ms: u64 },
    Write { keys: Vec<String> },
    Hotkey { keys: Vec<String> },
}

/// Records and logs actions instead of touching the real desktop.
#[derive(Debug, Default)]
pub struct DryRunInput {
    pointer: Cell<Point>,
    actions: RefCell<Vec<InputAction>>,
}

impl DryRunInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything dispatched so far, oldest first.
    pub fn actions(&self) -> Vec<InputAction> {
        self.actions.borrow().clone()
    }

    fn record(&self, action: InputAction) {
        log::info!("dry-run input: {:?}", action);
        self.actions.borrow_mut().push(action);
    }
}

/// Reject points above or left of the screen origin.
fn on_screen(point: Point) -> LocatorResult<Point> {
    if point.x < 0 || point.y < 0 {
        return Err(LocatorError::InputFailed {
            description: format!("point {} is outside the screen", point),
        });
    }
    Ok(point)
}

impl InputDispatch for DryRunInput {
    fn click(&self, point: Point, duration: Duration) -> LocatorResult<()> {
        let point = on_screen(point)?;
        self.pointer.set(point);
        self.record(InputAction::Click {
            point,
            duration_ms: duration.as_millis() as u64,
        });
        Ok(())
    }

    fn double_click(&self, point: Point, duration: Duration) -> LocatorResult<()> {
        let point = on_screen(point)?;
        self.pointer.set(point);
        self.record(InputAction::DoubleClick {
            point,
            duration_ms: duration.as_millis() as u64,
        });
        Ok(())
    }

    fn write(&self, keys: &[String]) -> LocatorResult<()> {
        self.record(InputAction::Write { keys: keys.to_vec() });
        Ok(())
    }

    fn hotkey(&self, keys: &[&str]) -> LocatorResult<()> {
        if keys.is_empty() {
            return Err(LocatorError::InputFailed {
                description: "hotkey needs at least one key".to_string(),
            });
        }
        self.record(InputAction::Hotkey {
            keys: keys.iter().map(|k| k.to_string()).collect(),
        });
        Ok(())
    }

    fn position(&self) -> LocatorResult<Point> {
        Ok(self.pointer.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_becomes_character_events() {
        assert_eq!(Keys::from("abc").to_events(true), vec!["a", "b", "c", "enter"]);
        assert_eq!(Keys::from("abc").to_events(false), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_named_keys_pass_through() {
        let keys = Keys::from(&["a", "b", "c", "enter"][..]);
        assert_eq!(keys.to_events(false), vec!["a", "b", "c", "enter"]);

        let keys = Keys::from(vec!["backspace".to_string()]);
        assert_eq!(keys.to_events(true), vec!["backspace", "enter"]);
    }

    #[test]
    fn test_empty_text_with_enter() {
        assert_eq!(Keys::from("").to_events(true), vec!["enter"]);
    }

    #[test]
    fn test_dry_run_tracks_pointer_and_actions() {
        let input = DryRunInput::new();
        assert_eq!(input.position().unwrap(), Point::new(0, 0));

        input.click(Point::new(12, 34), Duration::from_millis(400)).unwrap();
        input.hotkey(&["ctrl", "a"]).unwrap();

        assert_eq!(input.position().unwrap(), Point::new(12, 34));
        assert_eq!(
            input.actions(),
            vec![
                InputAction::Click {
                    point: Point::new(12, 34),
                    duration_ms: 400
                },
                InputAction::Hotkey {
                    keys: vec!["ctrl".to_string(), "a".to_string()]
                },
            ]
        );
    }

    #[test]
    fn test_rejected_actions_are_input_failures() {
        let input = DryRunInput::new();

        let err = input.click(Point::new(-5, 10), Duration::ZERO).unwrap_err();
        assert!(matches!(err, LocatorError::InputFailed { .. }), "got {err:?}");
        let err = input.double_click(Point::new(5, -1), Duration::ZERO).unwrap_err();
        assert!(matches!(err, LocatorError::InputFailed { .. }));
        let err = input.hotkey(&[]).unwrap_err();
        assert!(matches!(err, LocatorError::InputFailed { .. }));

        assert!(input.actions().is_empty(), "Rejected actions must not be recorded");
        assert_eq!(input.position().unwrap(), Point::new(0, 0));
    }

    #[test]
    fn test_action_serializes_with_tag() {
        let action = InputAction::Click {
            point: Point::new(1, 2),
            duration_ms: 400,
        };
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(json, r#"{"action":"click","point":{"x":1,"y":2},"duration_ms":400}"#);
    }
}
