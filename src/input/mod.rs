//! Input handling: drag backends, drag sessions, click disambiguation.
//!
//! ## Key Types
//!
//! - `DragBackend`: pointer or touch, chosen once per session
//! - `Gesture`: backend-neutral input
//! - `DragContext`: in-flight gestures and registered drop targets
//! - `ClickGuard`: keeps drag releases from counting as clicks

pub mod backend;
pub mod click;
pub mod drag;

pub use backend::{Button, DragBackend, Gesture, InputCapabilities, PointerId, RawInput};
pub use click::ClickGuard;
pub use drag::{DragContext, DragOutcome, DragPayload, DragSession, DropTarget, DropZone};
