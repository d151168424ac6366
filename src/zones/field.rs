//! Freeform field placement.
//!
//! The `Field` holds every field-zone card in stacking order (later cards
//! render on top). All updates replace the whole card value; callers never
//! see a half-updated card.
//!
//! Unknown ids are no-ops everywhere: the method reports it (`false` /
//! `None`) and the field is left untouched.

use im::Vector;
use tracing::debug;

use crate::cards::{Card, Point, Rotation, Zone};
use crate::core::id::CardKey;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Field {
    cards: Vector<Card>,
}

impl Field {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Field cards in stacking order.
    #[must_use]
    pub fn cards(&self) -> &Vector<Card> {
        &self.cards
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &CardKey) -> Option<&Card> {
        self.cards.iter().find(|card| &card.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &CardKey) -> bool {
        self.get(id).is_some()
    }

    fn index_of(&self, id: &CardKey) -> Option<usize> {
        self.cards.iter().position(|card| &card.id == id)
    }

    /// Put a card from another zone onto the field at `at`, upright.
    pub fn place(&mut self, card: Card, at: Point) {
        debug_assert!(!self.contains(&card.id), "card {} already on field", card.id);
        debug!(card = %card.id, x = at.x, y = at.y, "card entered field");
        self.cards.push_back(card.onto_field(at, Rotation::Upright));
    }

    /// Reposition and/or rotate a field card.
    pub fn move_card(&mut self, id: &CardKey, at: Point, rotation: Rotation) -> bool {
        let Some(index) = self.index_of(id) else {
            debug!(card = %id, "move ignored: not on field");
            return false;
        };
        let moved = self.cards[index].clone().onto_field(at, rotation);
        self.cards.set(index, moved);
        true
    }

    /// Advance a field card's rotation by 90°, keeping its coordinates.
    ///
    /// Returns the new rotation.
    pub fn rotate(&mut self, id: &CardKey) -> Option<Rotation> {
        let card = self.get(id)?;
        let at = card.position()?;
        let rotation = card.rotation()?.advance();
        self.move_card(id, at, rotation);
        Some(rotation)
    }

    /// Turn a field card over. Returns the new `is_flipped`.
    pub fn flip(&mut self, id: &CardKey) -> Option<bool> {
        let index = self.index_of(id)?;
        let mut card = self.cards[index].clone();
        card.is_flipped = !card.is_flipped;
        let flipped = card.is_flipped;
        self.cards.set(index, card);
        Some(flipped)
    }

    /// Remove a card from the field.
    pub fn take(&mut self, id: &CardKey) -> Option<Card> {
        let index = self.index_of(id)?;
        Some(self.cards.remove(index))
    }

    /// Replace a field card's value in place (same id, same stacking slot).
    /// Returns `false` if the id is unknown or the replacement leaves the field.
    pub fn replace(&mut self, card: Card) -> bool {
        if !card.is_in(Zone::Field) {
            return false;
        }
        match self.index_of(&card.id) {
            Some(index) => {
                self.cards.set(index, card);
                true
            }
            None => false,
        }
    }
}
