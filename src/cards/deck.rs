//! Deck records exchanged with the external deck API.
//!
//! The API returns `{name, cards: [...]}`; every card entry has at least a
//! `name`, while `id`, `imageUrl` and `cost` are optional. Ids may come back
//! as numbers or strings.

use serde::{Deserialize, Serialize};

use super::card::{Card, CardSpec, Zone};
use crate::core::error::TableError;
use crate::core::id::{IdSource, PersistedCardId};

/// Raw id as sent by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCardId {
    Number(u64),
    Text(String),
}

impl RawCardId {
    /// The persisted id, if this is one the image lookup accepts.
    #[must_use]
    pub fn persisted(&self) -> Option<PersistedCardId> {
        match self {
            RawCardId::Number(n) => Some(PersistedCardId::Numeric(*n)),
            RawCardId::Text(s) => PersistedCardId::parse(s),
        }
    }
}

impl From<&PersistedCardId> for RawCardId {
    fn from(id: &PersistedCardId) -> Self {
        match id {
            PersistedCardId::Numeric(n) => RawCardId::Number(*n),
            PersistedCardId::Uuid(u) => RawCardId::Text(u.to_string()),
        }
    }
}

/// One stored card entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckCardRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RawCardId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<i32>,
}

impl DeckCardRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            image_url: None,
            cost: None,
        }
    }
}

/// A deck as read from (or written to) the deck API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckRecord {
    pub name: String,
    pub cards: Vec<DeckCardRecord>,
}

impl DeckRecord {
    /// Parse a deck API response body.
    pub fn from_json(body: &str) -> Result<Self, TableError> {
        Ok(serde_json::from_str(body)?)
    }

    /// One face-down deck-zone card per stored entry, in stored order.
    pub fn to_cards(&self, ids: &mut IdSource) -> Result<Vec<Card>, TableError> {
        self.cards
            .iter()
            .map(|entry| {
                let mut spec = CardSpec::new(entry.name.clone(), Zone::Deck.as_str());
                spec.cost = entry.cost;
                spec.card_id = entry.id.as_ref().and_then(RawCardId::persisted);
                spec.image_url = entry.image_url.clone();
                spec.build(ids)
            })
            .collect()
    }
}
