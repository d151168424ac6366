//! Shuffle/draw engine: the remaining deck and the hand.

pub mod pile;

pub use pile::DrawPile;
