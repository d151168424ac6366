//! Card entity model, deck records and the deck-building form.
//!
//! ## Key Types
//!
//! - `Card`: one physical card in a session
//! - `Zone` / `Location`: which zone a card is in (and where, on the field)
//! - `CardSpec`: validated card construction
//! - `DeckRecord`: deck as returned by the deck API
//! - `DeckForm`: immutable deck-building form state

pub mod card;
pub mod deck;
pub mod form;

pub use card::{select_by_zone, Card, CardSpec, Location, Point, Rotation, Zone};
pub use deck::{DeckCardRecord, DeckRecord, RawCardId};
pub use form::{DeckEntry, DeckForm, FormAction};
