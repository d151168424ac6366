//! # solo-table
//!
//! Card table engine for solo play of a custom deck: load a deck, shuffle
//! and draw into a hand, and place cards freely on a field with
//! drag-and-drop and click-to-rotate.
//!
//! ## Design Principles
//!
//! 1. **One zone per card**: a card's `Location` is its zone; field
//!    coordinates and rotation exist only inside the field variant.
//!
//! 2. **Never fail mid-play**: only construction and parsing return errors.
//!    Draws from an empty deck, drops without a target, and moves of unknown
//!    cards are logged no-ops.
//!
//! 3. **Explicit drag sessions**: in-flight gestures live in a `DragContext`
//!    owned by the table, keyed by pointer, instead of shared global state.
//!
//! 4. **Display is derived**: image resolution only ever touches
//!    `image_url`, never zone, position or sequence order.
//!
//! ## Modules
//!
//! - `core`: ids, configuration, errors, RNG
//! - `cards`: card entity model, deck records, deck-building form
//! - `deck`: shuffle/draw engine (remaining deck and hand)
//! - `zones`: field placement and hand layout
//! - `input`: drag backends, drag sessions, drop targets, click guard
//! - `images`: artwork resolution with fallbacks
//! - `table`: the table session and its events

pub mod core;
pub mod cards;
pub mod deck;
pub mod zones;
pub mod input;
pub mod images;
pub mod table;

// Re-export commonly used types
pub use crate::core::{
    CardKey, IdSource, PersistedCardId,
    TableConfig, TableError, ImageError, TableRng,
};

pub use crate::cards::{
    Card, CardSpec, Location, Point, Rotation, Zone, select_by_zone,
    DeckRecord, DeckCardRecord, DeckForm, DeckEntry, FormAction,
};

pub use crate::deck::DrawPile;

pub use crate::zones::{Field, HandLayout};

pub use crate::input::{
    Button, DragBackend, DragContext, DragOutcome, DropTarget, DropZone,
    InputCapabilities, PointerId, RawInput,
};

pub use crate::images::{ImagePlan, ImageResolver, ImageTicket};

pub use crate::table::{Table, TableEvent, TableSnapshot};
