//! Low-level drag backends.
//!
//! Hosts forward raw mouse or touch input; the session's backend turns it
//! into backend-neutral [`Gesture`]s. Both backends produce the same
//! gestures, so everything downstream is input-agnostic.
//!
//! The backend is chosen once per session from the device's touch
//! capability. A touch backend ignores mouse input (browsers synthesize
//! mouse events after touches) and a pointer backend ignores touch input.

use serde::{Deserialize, Serialize};

use crate::cards::Point;
use crate::core::id::CardKey;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragBackend {
    Pointer,
    Touch,
}

/// What the host detected about the device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputCapabilities {
    /// `ontouchstart` (or equivalent) is available.
    pub touch_events: bool,
    /// Reported maximum simultaneous touch points.
    pub max_touch_points: u32,
}

/// Identifies one mouse or one finger.
///
/// Touch identifiers are kept as the platform reports them, so no two
/// fingers ever share an id with each other or with the mouse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerId {
    Mouse,
    Touch(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    Primary,
    Secondary,
    Other,
}

impl Button {
    /// DOM `MouseEvent.button` numbering.
    #[must_use]
    pub const fn from_dom(button: i16) -> Self {
        match button {
            0 => Button::Primary,
            2 => Button::Secondary,
            _ => Button::Other,
        }
    }
}

/// Raw input as delivered by the host. `card` is the card under the
/// pointer at press time (host hit-testing), if any.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RawInput {
    MouseDown { button: Button, at: Point, card: Option<CardKey> },
    MouseMove { at: Point },
    /// `at` is `None` when the host could not resolve the pointer position.
    MouseUp { button: Button, at: Option<Point> },
    ContextMenu { at: Point, card: Option<CardKey> },
    TouchStart { touch: u32, at: Point, card: Option<CardKey> },
    TouchMove { touch: u32, at: Point },
    TouchEnd { touch: u32, at: Option<Point> },
    TouchCancel { touch: u32 },
}

/// Backend-neutral gesture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Gesture {
    Press { pointer: PointerId, at: Point, card: Option<CardKey> },
    Move { pointer: PointerId, at: Point },
    Release { pointer: PointerId, at: Option<Point> },
    /// Secondary/alternate activation (right-click).
    Alternate { pointer: PointerId, card: Option<CardKey> },
    Cancel { pointer: PointerId },
}

impl DragBackend {
    /// Pick the backend for this device.
    #[must_use]
    pub fn detect(caps: InputCapabilities) -> Self {
        if caps.touch_events || caps.max_touch_points > 0 {
            DragBackend::Touch
        } else {
            DragBackend::Pointer
        }
    }

    /// Translate raw input. Returns `None` for input this backend does not
    /// handle.
    #[must_use]
    pub fn translate(self, raw: RawInput) -> Option<Gesture> {
        match (self, raw) {
            (DragBackend::Pointer, RawInput::MouseDown { button, at, card }) => match button {
                Button::Primary => Some(Gesture::Press { pointer: PointerId::Mouse, at, card }),
                // The contextmenu event that follows reports the alternate action.
                Button::Secondary | Button::Other => None,
            },
            (DragBackend::Pointer, RawInput::MouseMove { at }) => {
                Some(Gesture::Move { pointer: PointerId::Mouse, at })
            }
            (DragBackend::Pointer, RawInput::MouseUp { button: Button::Primary, at }) => {
                Some(Gesture::Release { pointer: PointerId::Mouse, at })
            }
            (DragBackend::Pointer, RawInput::ContextMenu { card, .. }) => {
                Some(Gesture::Alternate { pointer: PointerId::Mouse, card })
            }
            (DragBackend::Touch, RawInput::TouchStart { touch, at, card }) => {
                Some(Gesture::Press { pointer: PointerId::Touch(touch), at, card })
            }
            (DragBackend::Touch, RawInput::TouchMove { touch, at }) => {
                Some(Gesture::Move { pointer: PointerId::Touch(touch), at })
            }
            (DragBackend::Touch, RawInput::TouchEnd { touch, at }) => {
                Some(Gesture::Release { pointer: PointerId::Touch(touch), at })
            }
            (DragBackend::Touch, RawInput::TouchCancel { touch }) => {
                Some(Gesture::Cancel { pointer: PointerId::Touch(touch) })
            }
            // Long-press menus still arrive as contextmenu on touch devices.
            (DragBackend::Touch, RawInput::ContextMenu { card, .. }) => {
                Some(Gesture::Alternate { pointer: PointerId::Touch(0), card })
            }
            _ => None,
        }
    }
}
