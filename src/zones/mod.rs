//! Zone placement: the freeform field and the index-based hand layout.
//!
//! ## Key Types
//!
//! - `Field`: field cards with coordinates, rotation and facing
//! - `HandLayout`: default on-screen slot for each hand index
//!
//! Deck and hand sequences live in [`crate::deck::DrawPile`]; the
//! [`crate::table::Table`] moves cards between the two.

pub mod field;
pub mod layout;

pub use field::Field;
pub use layout::HandLayout;
