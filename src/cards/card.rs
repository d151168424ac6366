//! Card entity model.
//!
//! A [`Card`] is one physical card in a running session. Its [`Location`]
//! carries the zone, and field coordinates/rotation exist only inside the
//! `Field` variant, so a card can never be in two zones or hold stale
//! coordinates outside the field.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::TableError;
use crate::core::id::{CardKey, IdSource, PersistedCardId};

/// One of the three mutually exclusive card locations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    /// Face-down draw pile. Reorder-only (shuffle), never dragged.
    Deck,
    /// The player's held cards, laid out by index.
    Hand,
    /// Freeform placement surface.
    Field,
}

impl Zone {
    pub const ALL: [Zone; 3] = [Zone::Deck, Zone::Hand, Zone::Field];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Zone::Deck => "deck",
            Zone::Hand => "hand",
            Zone::Field => "field",
        }
    }

    /// Whether a card in this zone may start a drag gesture.
    #[must_use]
    pub const fn is_drag_initiable(self) -> bool {
        !matches!(self, Zone::Deck)
    }

    /// Default facing for cards entering this zone (`true` = face-down).
    #[must_use]
    pub const fn default_flipped(self) -> bool {
        !matches!(self, Zone::Hand)
    }
}

impl FromStr for Zone {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deck" => Ok(Zone::Deck),
            "hand" => Ok(Zone::Hand),
            "field" => Ok(Zone::Field),
            other => Err(TableError::InvalidZone(other.to_string())),
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quarter-turn rotation of a field card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Rotation {
    #[default]
    Upright,
    Quarter,
    Half,
    ThreeQuarter,
}

impl Rotation {
    /// Parse degrees. Must be a multiple of 90; wrapped modulo 360.
    pub fn from_degrees(degrees: i32) -> Result<Self, TableError> {
        if degrees % 90 != 0 {
            return Err(TableError::InvalidRotation(degrees));
        }
        Ok(match degrees.rem_euclid(360) {
            0 => Rotation::Upright,
            90 => Rotation::Quarter,
            180 => Rotation::Half,
            _ => Rotation::ThreeQuarter,
        })
    }

    #[must_use]
    pub const fn degrees(self) -> i32 {
        match self {
            Rotation::Upright => 0,
            Rotation::Quarter => 90,
            Rotation::Half => 180,
            Rotation::ThreeQuarter => 270,
        }
    }

    /// Rotate by +90°.
    #[must_use]
    pub const fn advance(self) -> Self {
        match self {
            Rotation::Upright => Rotation::Quarter,
            Rotation::Quarter => Rotation::Half,
            Rotation::Half => Rotation::ThreeQuarter,
            Rotation::ThreeQuarter => Rotation::Upright,
        }
    }
}

impl TryFrom<i32> for Rotation {
    type Error = TableError;

    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        Self::from_degrees(degrees)
    }
}

impl From<Rotation> for i32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// Integer pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// This point relative to `origin`.
    #[must_use]
    pub const fn relative_to(self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }
}

/// Where a card is. Field cards always carry coordinates and rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "zone", rename_all = "lowercase")]
pub enum Location {
    Deck,
    Hand,
    Field { at: Point, rotation: Rotation },
}

impl Location {
    #[must_use]
    pub const fn zone(&self) -> Zone {
        match self {
            Location::Deck => Zone::Deck,
            Location::Hand => Zone::Hand,
            Location::Field { .. } => Zone::Field,
        }
    }
}

/// One physical card in a running session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    /// Session-scoped id.
    pub id: CardKey,

    /// Stored card row, if any. Only used to look up artwork.
    pub card_id: Option<PersistedCardId>,

    pub name: Option<String>,
    pub cost: Option<i32>,

    /// `true` = face-down.
    pub is_flipped: bool,

    pub location: Location,

    /// Resolved display URL. Derived, never authoritative.
    pub image_url: Option<String>,
}

impl Card {
    #[must_use]
    pub fn zone(&self) -> Zone {
        self.location.zone()
    }

    #[must_use]
    pub fn is_in(&self, zone: Zone) -> bool {
        self.zone() == zone
    }

    /// Field coordinates, `None` outside the field.
    #[must_use]
    pub fn position(&self) -> Option<Point> {
        match self.location {
            Location::Field { at, .. } => Some(at),
            _ => None,
        }
    }

    /// Field rotation, `None` outside the field.
    #[must_use]
    pub fn rotation(&self) -> Option<Rotation> {
        match self.location {
            Location::Field { rotation, .. } => Some(rotation),
            _ => None,
        }
    }

    /// Move into the hand, face-up. Field coordinates are dropped.
    #[must_use]
    pub fn into_hand(self) -> Self {
        Self {
            location: Location::Hand,
            is_flipped: Zone::Hand.default_flipped(),
            ..self
        }
    }

    /// Move back into the deck, face-down.
    #[must_use]
    pub fn into_deck(self) -> Self {
        Self {
            location: Location::Deck,
            is_flipped: Zone::Deck.default_flipped(),
            ..self
        }
    }

    /// Enter the field at `at`. Cards arriving from another zone land
    /// face-down and upright; field cards keep facing and take `rotation`.
    #[must_use]
    pub fn onto_field(self, at: Point, rotation: Rotation) -> Self {
        let is_flipped = if self.is_in(Zone::Field) {
            self.is_flipped
        } else {
            Zone::Field.default_flipped()
        };
        Self {
            location: Location::Field { at, rotation },
            is_flipped,
            ..self
        }
    }

    /// Replace the resolved image URL.
    #[must_use]
    pub fn with_image_url(self, url: impl Into<String>) -> Self {
        Self {
            image_url: Some(url.into()),
            ..self
        }
    }
}

/// Construction input for a card (`createCard`).
///
/// The zone arrives as untyped text from the host, so it is validated here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSpec {
    pub name: String,
    #[serde(default)]
    pub cost: Option<i32>,
    #[serde(default = "default_flipped")]
    pub is_flipped: bool,
    pub zone: String,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default)]
    pub rotation: i32,
    #[serde(default)]
    pub card_id: Option<PersistedCardId>,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn default_flipped() -> bool {
    true
}

impl CardSpec {
    /// Spec with defaults: face-down, origin, upright.
    pub fn new(name: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cost: None,
            is_flipped: true,
            zone: zone.into(),
            x: 0,
            y: 0,
            rotation: 0,
            card_id: None,
            image_url: None,
        }
    }

    #[must_use]
    pub fn with_cost(mut self, cost: i32) -> Self {
        self.cost = Some(cost);
        self
    }

    #[must_use]
    pub fn face_up(mut self) -> Self {
        self.is_flipped = false;
        self
    }

    #[must_use]
    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    #[must_use]
    pub fn rotated(mut self, degrees: i32) -> Self {
        self.rotation = degrees;
        self
    }

    #[must_use]
    pub fn with_card_id(mut self, card_id: PersistedCardId) -> Self {
        self.card_id = Some(card_id);
        self
    }

    #[must_use]
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Validate and build a card with a fresh session id.
    ///
    /// Coordinates and rotation are attached only for the field zone.
    pub fn build(self, ids: &mut IdSource) -> Result<Card, TableError> {
        let zone: Zone = self.zone.parse()?;
        let name = self.name.trim();
        if name.is_empty() {
            return Err(TableError::MalformedCard("card name is empty".into()));
        }

        let location = match zone {
            Zone::Deck => Location::Deck,
            Zone::Hand => Location::Hand,
            Zone::Field => Location::Field {
                at: Point::new(self.x, self.y),
                rotation: Rotation::from_degrees(self.rotation)?,
            },
        };

        Ok(Card {
            id: ids.synthesize(zone, name),
            card_id: self.card_id,
            name: Some(name.to_string()),
            cost: self.cost,
            is_flipped: self.is_flipped,
            location,
            image_url: self.image_url,
        })
    }
}

/// Ordered subsequence of `cards` in `zone`.
pub fn select_by_zone<'a, I>(cards: I, zone: Zone) -> Vec<&'a Card>
where
    I: IntoIterator<Item = &'a Card>,
{
    cards.into_iter().filter(|card| card.is_in(zone)).collect()
}
