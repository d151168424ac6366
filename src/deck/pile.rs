//! Remaining-deck and hand sequences.
//!
//! The remaining deck is ordered bottom to top: index 0 is the bottom card,
//! the last index is the top. `draw` takes the top card and appends it to
//! the hand, so the hand is in draw order (oldest first), which is also its
//! default left-to-right layout.
//!
//! ```
//! use solo_table::cards::{CardSpec};
//! use solo_table::core::{IdSource, TableRng};
//! use solo_table::deck::DrawPile;
//!
//! let mut ids = IdSource::new(TableRng::new(1));
//! let cards: Vec<_> = ["A", "B", "C"]
//!     .iter()
//!     .map(|n| CardSpec::new(*n, "deck").build(&mut ids).unwrap())
//!     .collect();
//!
//! let mut rng = TableRng::new(42);
//! let mut pile = DrawPile::new();
//! pile.initialize(cards, &mut rng);
//! pile.draw();
//!
//! assert_eq!(pile.remaining().len(), 2);
//! assert_eq!(pile.hand().len(), 1);
//! ```

use im::Vector;
use tracing::debug;

use crate::cards::{Card, Zone};
use crate::core::id::CardKey;
use crate::core::rng::TableRng;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DrawPile {
    remaining: Vector<Card>,
    hand: Vector<Card>,
    loaded: bool,
}

impl DrawPile {
    /// An unloaded pile. Shuffle and draw are no-ops until `initialize`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a deck: every card goes face-down into the remaining sequence,
    /// which is then shuffled. The hand is reset to empty.
    pub fn initialize(&mut self, cards: impl IntoIterator<Item = Card>, rng: &mut TableRng) {
        let mut remaining: Vector<Card> = cards.into_iter().map(Card::into_deck).collect();
        rng.shuffle_vector(&mut remaining);
        debug!(cards = remaining.len(), "deck initialized");

        self.remaining = remaining;
        self.hand = Vector::new();
        self.loaded = true;
    }

    /// Re-permute the remaining sequence. The hand is untouched.
    pub fn shuffle(&mut self, rng: &mut TableRng) {
        if !self.loaded {
            debug!("shuffle ignored: no deck loaded");
            return;
        }
        rng.shuffle_vector(&mut self.remaining);
    }

    /// Move the top card into the hand, face-up.
    ///
    /// Returns the drawn card's id, or `None` (no state change) when the
    /// remaining sequence is empty or no deck is loaded.
    pub fn draw(&mut self) -> Option<CardKey> {
        if !self.loaded {
            debug!("draw ignored: no deck loaded");
            return None;
        }
        let Some(card) = self.remaining.pop_back() else {
            debug!("draw ignored: deck is empty");
            return None;
        };
        let card = card.into_hand();
        let id = card.id.clone();
        self.hand.push_back(card);
        Some(id)
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Remaining deck, bottom to top.
    #[must_use]
    pub fn remaining(&self) -> &Vector<Card> {
        &self.remaining
    }

    /// Hand in draw order.
    #[must_use]
    pub fn hand(&self) -> &Vector<Card> {
        &self.hand
    }

    /// Next card `draw` would take.
    #[must_use]
    pub fn top(&self) -> Option<&Card> {
        self.remaining.last()
    }

    /// Cards held by the pile (remaining + hand).
    #[must_use]
    pub fn len(&self) -> usize {
        self.remaining.len() + self.hand.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a card in either sequence.
    #[must_use]
    pub fn get(&self, id: &CardKey) -> Option<&Card> {
        self.hand
            .iter()
            .chain(self.remaining.iter())
            .find(|card| &card.id == id)
    }

    /// Remove a card from the hand or the remaining deck.
    pub fn take(&mut self, id: &CardKey) -> Option<Card> {
        if let Some(index) = self.hand.iter().position(|card| &card.id == id) {
            return Some(self.hand.remove(index));
        }
        let index = self.remaining.iter().position(|card| &card.id == id)?;
        Some(self.remaining.remove(index))
    }

    /// Append a card to the end of the hand, face-up.
    pub fn push_hand(&mut self, card: Card) {
        debug_assert!(self.get(&card.id).is_none(), "card {} already held", card.id);
        self.hand.push_back(card.into_hand());
    }

    /// Replace a held card's value in place (same id, same sequence slot).
    /// Returns `false` if the id is not held or the replacement changes zone.
    pub fn replace(&mut self, card: Card) -> bool {
        let seq = match card.zone() {
            Zone::Hand => &mut self.hand,
            Zone::Deck => &mut self.remaining,
            Zone::Field => return false,
        };
        match seq.iter().position(|held| held.id == card.id) {
            Some(index) => {
                seq.set(index, card);
                true
            }
            None => false,
        }
    }
}
