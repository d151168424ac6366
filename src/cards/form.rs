//! Deck-building form state.
//!
//! The form is an immutable value; every edit is an explicit transition
//! returning the next form. Submitting validates it into a [`DeckRecord`]
//! ready for the deck API.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::deck::{DeckCardRecord, DeckRecord, RawCardId};
use crate::core::config::TableConfig;
use crate::core::error::TableError;
use crate::core::id::PersistedCardId;

/// One card slot in the form, usually backed by an uploaded image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub name: String,
    pub cost: Option<i32>,
    pub card_id: Option<PersistedCardId>,
    pub image_url: Option<String>,
}

impl DeckEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cost: None,
            card_id: None,
            image_url: None,
        }
    }

    #[must_use]
    pub fn with_image(mut self, card_id: PersistedCardId, image_url: impl Into<String>) -> Self {
        self.card_id = Some(card_id);
        self.image_url = Some(image_url.into());
        self
    }
}

/// Form edits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormAction {
    Rename(String),
    AddCard(DeckEntry),
    /// Remove the entry at this index. Out of range is ignored.
    RemoveCard(usize),
    Clear,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeckForm {
    name: String,
    entries: Vector<DeckEntry>,
}

impl DeckForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn entries(&self) -> &Vector<DeckEntry> {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply one edit, returning the next form state.
    #[must_use]
    pub fn apply(&self, action: FormAction) -> Self {
        let mut next = self.clone();
        match action {
            FormAction::Rename(name) => next.name = name,
            FormAction::AddCard(entry) => next.entries.push_back(entry),
            FormAction::RemoveCard(index) => {
                if index < next.entries.len() {
                    next.entries.remove(index);
                }
            }
            FormAction::Clear => next = Self::default(),
        }
        next
    }

    /// Cards still needed to reach the configured deck size.
    #[must_use]
    pub fn remaining(&self, config: &TableConfig) -> usize {
        config.deck_size.saturating_sub(self.entries.len())
    }

    /// Validate for submission.
    pub fn submit(&self, config: &TableConfig) -> Result<DeckRecord, TableError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(TableError::InvalidDeck("deck name is empty".into()));
        }
        if self.entries.len() != config.deck_size {
            return Err(TableError::InvalidDeck(format!(
                "deck has {} cards, {} required",
                self.entries.len(),
                config.deck_size
            )));
        }
        if let Some(index) = self.entries.iter().position(|e| e.name.trim().is_empty()) {
            return Err(TableError::MalformedCard(format!("card {index} has no name")));
        }

        Ok(DeckRecord {
            name: name.to_string(),
            cards: self
                .entries
                .iter()
                .map(|entry| DeckCardRecord {
                    name: entry.name.trim().to_string(),
                    id: entry.card_id.as_ref().map(RawCardId::from),
                    image_url: entry.image_url.clone(),
                    cost: entry.cost,
                })
                .collect(),
        })
    }
}
