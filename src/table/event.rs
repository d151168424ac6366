//! Events the table reports to its hosting UI.

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Point, Rotation};
use crate::core::id::CardKey;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum TableEvent {
    /// A field card was repositioned or rotated.
    CardMoved { id: CardKey, x: i32, y: i32, rotation: Rotation },
    /// A hand (or deck) card was dropped onto the field.
    DroppedToField { item: Card, x: i32, y: i32 },
    /// A field card was dropped back into the hand.
    DroppedToHand { item: Card },
    /// A card was clicked (selection).
    CardClicked { id: CardKey },
}

impl TableEvent {
    #[must_use]
    pub fn moved(id: CardKey, at: Point, rotation: Rotation) -> Self {
        TableEvent::CardMoved { id, x: at.x, y: at.y, rotation }
    }

    #[must_use]
    pub fn to_field(item: Card, at: Point) -> Self {
        TableEvent::DroppedToField { item, x: at.x, y: at.y }
    }

    /// Id of the card the event is about.
    #[must_use]
    pub fn card(&self) -> &CardKey {
        match self {
            TableEvent::CardMoved { id, .. } | TableEvent::CardClicked { id } => id,
            TableEvent::DroppedToField { item, .. } | TableEvent::DroppedToHand { item } => &item.id,
        }
    }
}
