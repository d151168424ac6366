//! The table session.
//!
//! A `Table` owns everything in play for one loaded deck: the remaining
//! deck and hand ([`DrawPile`]), the field ([`Field`]), the drag context
//! and outstanding image lookups. It is the "owning view" of the drag
//! protocol: drop and click outcomes are applied here and the resulting
//! [`TableEvent`]s are returned so the host can re-render.
//!
//! Every card lives in exactly one of remaining/hand/field. Cross-zone moves
//! take the card out of one sequence and put the replaced value in another
//! within a single call.
//!
//! ```
//! use solo_table::cards::DeckRecord;
//! use solo_table::core::TableConfig;
//! use solo_table::input::InputCapabilities;
//! use solo_table::table::Table;
//!
//! let deck = DeckRecord::from_json(
//!     r#"{"name": "Tiny", "cards": [{"name": "A"}, {"name": "B"}, {"name": "C"}]}"#,
//! ).unwrap();
//!
//! let mut table = Table::new(TableConfig::new().with_seed(1), InputCapabilities::default()).unwrap();
//! table.load_deck(&deck).unwrap();
//! table.draw();
//!
//! assert_eq!(table.hand().len(), 1);
//! assert_eq!(table.remaining().len(), 2);
//! ```

use std::time::Duration;

use im::Vector;
use serde::Serialize;
use tracing::{debug, info};

use super::event::TableEvent;
use crate::cards::{select_by_zone, Card, DeckRecord, Point, Zone};
use crate::core::config::TableConfig;
use crate::core::error::{ImageError, TableError};
use crate::core::id::{CardKey, IdSource};
use crate::core::rng::TableRng;
use crate::deck::DrawPile;
use crate::images::{ImageResolver, ImageTicket, PendingImages};
use crate::input::{Button, DragBackend, DragContext, DragOutcome, DropTarget, DropZone, InputCapabilities, RawInput};
use crate::zones::{Field, HandLayout};

/// Cheap copy of every card sequence, for rendering and comparisons.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TableSnapshot {
    pub remaining: Vector<Card>,
    pub hand: Vector<Card>,
    pub field: Vector<Card>,
}

impl TableSnapshot {
    #[must_use]
    pub fn len(&self) -> usize {
        self.remaining.len() + self.hand.len() + self.field.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug)]
pub struct Table {
    config: TableConfig,
    rng: TableRng,
    ids: IdSource,
    pile: DrawPile,
    field: Field,
    drag: DragContext,
    images: ImageResolver,
    pending: PendingImages,
    layout: HandLayout,
    deck_name: Option<String>,
    selected: Option<CardKey>,
}

impl Table {
    /// Open a session. The drag backend is fixed here from `caps`.
    pub fn new(config: TableConfig, caps: InputCapabilities) -> Result<Self, TableError> {
        config.validate()?;

        let mut root = config.seed.map_or_else(TableRng::from_entropy, TableRng::new);
        let rng = root.fork();
        let ids = IdSource::new(root.for_context("card-ids"));
        let backend = DragBackend::detect(caps);
        debug!(?backend, seed = root.seed(), "table opened");

        Ok(Self {
            rng,
            ids,
            pile: DrawPile::new(),
            field: Field::new(),
            drag: DragContext::new(backend, &config),
            images: ImageResolver::from_config(&config)?,
            pending: PendingImages::new(),
            layout: HandLayout::from_config(&config),
            deck_name: None,
            selected: None,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    #[must_use]
    pub fn backend(&self) -> DragBackend {
        self.drag.backend()
    }

    #[must_use]
    pub fn drag(&self) -> &DragContext {
        &self.drag
    }

    // === Deck ===

    /// Load (or reload) a deck: all cards go face-down into a freshly
    /// shuffled remaining deck; hand and field are cleared.
    ///
    /// Returns the image lookups the host should start. Cards show their
    /// own URL or the fallback until those complete.
    pub fn load_deck(&mut self, deck: &DeckRecord) -> Result<Vec<ImageTicket>, TableError> {
        let cards = deck.to_cards(&mut self.ids)?;
        info!(deck = %deck.name, cards = cards.len(), "deck loaded");
        self.deck_name = Some(deck.name.clone());
        Ok(self.load_cards(cards))
    }

    /// Load already-built cards. See [`Table::load_deck`].
    pub fn load_cards(&mut self, cards: Vec<Card>) -> Vec<ImageTicket> {
        self.pending.clear();
        self.field = Field::new();
        self.selected = None;

        let mut tickets = Vec::new();
        let cards: Vec<Card> = cards
            .into_iter()
            .map(|card| {
                let plan = self.images.plan(&card);
                tickets.extend(self.pending.request(&card, &plan));
                let url = self.images.initial_url(&plan);
                card.with_image_url(url)
            })
            .collect();

        self.pile.initialize(cards, &mut self.rng);
        tickets
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.pile.is_loaded()
    }

    #[must_use]
    pub fn deck_name(&self) -> Option<&str> {
        self.deck_name.as_deref()
    }

    /// Shuffle the remaining deck. No-op before a deck is loaded.
    pub fn shuffle(&mut self) {
        self.pile.shuffle(&mut self.rng);
    }

    /// Draw the top card into the hand. `None` when nothing was drawn.
    pub fn draw(&mut self) -> Option<CardKey> {
        self.pile.draw()
    }

    // === Queries ===

    /// Remaining deck, bottom to top.
    #[must_use]
    pub fn remaining(&self) -> &Vector<Card> {
        self.pile.remaining()
    }

    /// Hand in draw order.
    #[must_use]
    pub fn hand(&self) -> &Vector<Card> {
        self.pile.hand()
    }

    /// Field cards in stacking order.
    #[must_use]
    pub fn field(&self) -> &Vector<Card> {
        self.field.cards()
    }

    /// Every card on the table: remaining, then hand, then field.
    pub fn cards(&self) -> impl Iterator<Item = &Card> + '_ {
        self.pile
            .remaining()
            .iter()
            .chain(self.pile.hand().iter())
            .chain(self.field.cards().iter())
    }

    #[must_use]
    pub fn cards_in(&self, zone: Zone) -> Vec<&Card> {
        select_by_zone(self.cards(), zone)
    }

    #[must_use]
    pub fn card(&self, id: &CardKey) -> Option<&Card> {
        self.field.get(id).or_else(|| self.pile.get(id))
    }

    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.pile.len() + self.field.len()
    }

    #[must_use]
    pub fn selected(&self) -> Option<&CardKey> {
        self.selected.as_ref()
    }

    /// Default on-screen slot of a hand card.
    #[must_use]
    pub fn hand_slot(&self, id: &CardKey) -> Option<Point> {
        let index = self.pile.hand().iter().position(|card| &card.id == id)?;
        Some(self.layout.slot(index))
    }

    /// Width of the hand strip for the cards currently held.
    #[must_use]
    pub fn hand_width(&self) -> i32 {
        self.layout.width(self.pile.hand().len())
    }

    /// Page position of a card being dragged, if it is.
    #[must_use]
    pub fn drag_position(&self, id: &CardKey) -> Option<Point> {
        self.drag.position_of(id)
    }

    #[must_use]
    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            remaining: self.pile.remaining().clone(),
            hand: self.pile.hand().clone(),
            field: self.field.cards().clone(),
        }
    }

    // === Input ===

    pub fn register_target(&mut self, target: DropTarget) {
        self.drag.register_target(target);
    }

    pub fn unregister_target(&mut self, zone: DropZone) {
        self.drag.unregister_target(zone);
    }

    /// Feed raw host input. `now` is the session clock.
    ///
    /// Returns the events that changed the table, in order.
    pub fn handle_input(&mut self, raw: RawInput, now: Duration) -> Vec<TableEvent> {
        let Some(gesture) = self.drag.backend().translate(raw) else {
            return Vec::new();
        };
        let (pile, field) = (&self.pile, &self.field);
        let outcome = self
            .drag
            .handle(gesture, now, |id| field.get(id).or_else(|| pile.get(id)).cloned());

        match outcome {
            DragOutcome::Dropped(event) => {
                if self.apply(&event) {
                    vec![event]
                } else {
                    Vec::new()
                }
            }
            DragOutcome::Clicked(id) => self.activate(&id, Button::Primary),
            DragOutcome::Alternate(id) => self.activate(&id, Button::Secondary),
            DragOutcome::Started(_) | DragOutcome::Cancelled(_) | DragOutcome::Ignored => Vec::new(),
        }
    }

    /// Click delivered directly by the host (e.g. keyboard activation).
    /// Ignored while dragging or within the debounce window after a drag.
    pub fn click(&mut self, id: &CardKey, button: Button, now: Duration) -> Vec<TableEvent> {
        if !self.drag.accepts_click(now) {
            debug!(card = %id, "click ignored: too close to a drag");
            return Vec::new();
        }
        self.activate(id, button)
    }

    fn activate(&mut self, id: &CardKey, button: Button) -> Vec<TableEvent> {
        let mut events = Vec::new();
        if button == Button::Primary {
            let clicked = TableEvent::CardClicked { id: id.clone() };
            if self.apply(&clicked) {
                events.push(clicked);
            }
        }
        let rotates = match button {
            Button::Primary => self.config.rotate_on_primary_click,
            Button::Secondary => true,
            Button::Other => false,
        };
        if rotates {
            events.extend(self.rotate(id));
        }
        events
    }

    // === Move callbacks ===

    /// Apply one event. Returns `false` (and changes nothing) when the
    /// event refers to a card that is not where the event expects it.
    pub fn apply(&mut self, event: &TableEvent) -> bool {
        match event {
            TableEvent::CardMoved { id, x, y, rotation } => {
                self.field.move_card(id, Point::new(*x, *y), *rotation)
            }
            TableEvent::DroppedToField { item, x, y } => {
                if self.field.contains(&item.id) {
                    debug!(card = %item.id, "drop ignored: already on field");
                    return false;
                }
                match self.pile.take(&item.id) {
                    Some(card) => {
                        self.field.place(card, Point::new(*x, *y));
                        true
                    }
                    None => {
                        debug!(card = %item.id, "drop ignored: unknown card");
                        false
                    }
                }
            }
            TableEvent::DroppedToHand { item } => match self.field.take(&item.id) {
                Some(card) => {
                    debug!(card = %card.id, "card left field");
                    self.pile.push_hand(card);
                    true
                }
                None => {
                    debug!(card = %item.id, "drop ignored: not on field");
                    false
                }
            },
            TableEvent::CardClicked { id } => {
                if self.card(id).is_none() {
                    return false;
                }
                self.selected = Some(id.clone());
                true
            }
        }
    }

    /// Turn a field card over. `None` for cards not on the field.
    pub fn flip(&mut self, id: &CardKey) -> Option<bool> {
        self.field.flip(id)
    }

    /// Rotate a field card by 90°, as a secondary click would. Returns the
    /// `CardMoved` event describing the new placement.
    pub fn rotate(&mut self, id: &CardKey) -> Option<TableEvent> {
        let rotation = self.field.rotate(id)?;
        let at = self.field.get(id)?.position()?;
        Some(TableEvent::moved(id.clone(), at, rotation))
    }

    // === Images ===

    /// Lookups still outstanding.
    #[must_use]
    pub fn pending_images(&self) -> usize {
        self.pending.len()
    }

    /// Finish an image lookup started by `load_deck`. Only the card's
    /// `image_url` changes. Returns `false` for stale tickets or cards that
    /// are gone.
    pub fn complete_image(&mut self, ticket: &ImageTicket, outcome: Result<Option<String>, ImageError>) -> bool {
        let Some((id, url)) = self.pending.complete(ticket, outcome, &self.images) else {
            return false;
        };
        if let Some(card) = self.field.get(&id).cloned() {
            return self.field.replace(card.with_image_url(url));
        }
        if let Some(card) = self.pile.get(&id).cloned() {
            return self.pile.replace(card.with_image_url(url));
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{DeckCardRecord, RawCardId, Rotation};
    use crate::input::PointerId;

    fn deck(n: usize) -> DeckRecord {
        DeckRecord {
            name: "Test".into(),
            cards: (0..n).map(|i| DeckCardRecord::named(format!("Card {i}"))).collect(),
        }
    }

    fn table() -> Table {
        let mut table = Table::new(TableConfig::new().with_seed(5), InputCapabilities::default()).unwrap();
        table.register_target(DropTarget::new(DropZone::Field, Point::new(0, 0), 800, 500));
        table.register_target(DropTarget::new(DropZone::Hand, Point::new(0, 500), 800, 150));
        table
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn play_to_field(table: &mut Table, at: Point) -> CardKey {
        let id = table.draw().unwrap();
        let item = table.card(&id).unwrap().clone();
        assert!(table.apply(&TableEvent::to_field(item, at)));
        id
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let config = TableConfig::new().with_deck_size(0);
        assert!(Table::new(config, InputCapabilities::default()).is_err());
        let config = TableConfig::new().with_api_base("api.example/v1");
        assert!(matches!(
            Table::new(config, InputCapabilities::default()),
            Err(TableError::InvalidUrl { field: "api_base_url", .. })
        ));
    }

    #[test]
    fn test_backend_selection() {
        let touch = InputCapabilities { touch_events: true, max_touch_points: 10 };
        assert_eq!(Table::new(TableConfig::new(), touch).unwrap().backend(), DragBackend::Touch);
        assert_eq!(table().backend(), DragBackend::Pointer);
    }

    #[test]
    fn test_operations_before_load_are_noops() {
        let mut table = table();
        table.shuffle();
        assert_eq!(table.draw(), None);
        assert!(!table.is_loaded());
        assert!(table.snapshot().is_empty());
    }

    #[test]
    fn test_same_seed_same_order() {
        let mut a = table();
        let mut b = table();
        a.load_deck(&deck(10)).unwrap();
        b.load_deck(&deck(10)).unwrap();

        let names = |t: &Table| -> Vec<Option<String>> { t.remaining().iter().map(|c| c.name.clone()).collect() };
        assert_eq!(names(&a), names(&b));
    }

    #[test]
    fn test_reload_clears_play_state() {
        let mut table = table();
        table.load_deck(&deck(5)).unwrap();
        let id = play_to_field(&mut table, Point::new(10, 10));
        table.draw();
        table.apply(&TableEvent::CardClicked { id });

        table.load_deck(&deck(3)).unwrap();
        assert_eq!(table.remaining().len(), 3);
        assert!(table.hand().is_empty());
        assert!(table.field().is_empty());
        assert_eq!(table.selected(), None);
        assert_eq!(table.deck_name(), Some("Test"));
    }

    #[test]
    fn test_drop_to_field_and_back() {
        let mut table = table();
        table.load_deck(&deck(5)).unwrap();
        let id = play_to_field(&mut table, Point::new(40, 50));

        assert!(table.hand().is_empty());
        let card = table.card(&id).unwrap().clone();
        assert_eq!(card.zone(), Zone::Field);
        assert_eq!(card.position(), Some(Point::new(40, 50)));

        assert!(table.apply(&TableEvent::DroppedToHand { item: card }));
        let card = table.card(&id).unwrap();
        assert_eq!(card.zone(), Zone::Hand);
        assert_eq!(card.position(), None);
        assert_eq!(table.total_cards(), 5);
    }

    #[test]
    fn test_duplicate_drop_is_rejected() {
        let mut table = table();
        table.load_deck(&deck(5)).unwrap();
        let id = play_to_field(&mut table, Point::new(40, 50));
        let item = table.card(&id).unwrap().clone();

        let before = table.snapshot();
        assert!(!table.apply(&TableEvent::to_field(item, Point::new(1, 1))));
        assert_eq!(table.snapshot(), before);
    }

    #[test]
    fn test_handle_input_full_drag() {
        let mut table = table();
        table.load_deck(&deck(5)).unwrap();
        let id = table.draw().unwrap();

        let down = RawInput::MouseDown { button: Button::Primary, at: Point::new(10, 520), card: Some(id.clone()) };
        assert!(table.handle_input(down, ms(0)).is_empty());
        assert!(table.handle_input(RawInput::MouseMove { at: Point::new(200, 200) }, ms(10)).is_empty());
        assert!(table.drag().dragged_by(&id).is_some());
        assert_eq!(table.drag_position(&id), Some(Point::new(200, 200)));

        let events = table.handle_input(
            RawInput::MouseUp { button: Button::Primary, at: Some(Point::new(220, 240)) },
            ms(20),
        );
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], TableEvent::DroppedToField { x: 220, y: 240, .. }));
        assert_eq!(table.drag_position(&id), None);
        assert_eq!(table.card(&id).unwrap().position(), Some(Point::new(220, 240)));
    }

    #[test]
    fn test_click_rotates_field_card() {
        let mut table = table();
        table.load_deck(&deck(5)).unwrap();
        let id = play_to_field(&mut table, Point::new(40, 50));

        let events = table.click(&id, Button::Primary, ms(0));
        assert_eq!(
            events,
            vec![
                TableEvent::CardClicked { id: id.clone() },
                TableEvent::moved(id.clone(), Point::new(40, 50), Rotation::Quarter),
            ]
        );
        assert_eq!(table.selected(), Some(&id));

        let events = table.click(&id, Button::Secondary, ms(10));
        assert_eq!(events, vec![TableEvent::moved(id.clone(), Point::new(40, 50), Rotation::Half)]);
    }

    #[test]
    fn test_primary_click_rotation_can_be_disabled() {
        let config = TableConfig::new().with_seed(5).with_primary_click_rotation(false);
        let mut table = Table::new(config, InputCapabilities::default()).unwrap();
        table.load_deck(&deck(2)).unwrap();
        let id = play_to_field(&mut table, Point::new(1, 1));

        let events = table.click(&id, Button::Primary, ms(0));
        assert_eq!(events, vec![TableEvent::CardClicked { id: id.clone() }]);
        assert_eq!(table.card(&id).unwrap().rotation(), Some(Rotation::Upright));
    }

    #[test]
    fn test_clicking_hand_card_only_selects() {
        let mut table = table();
        table.load_deck(&deck(2)).unwrap();
        let id = table.draw().unwrap();
        assert_eq!(table.click(&id, Button::Primary, ms(0)), vec![TableEvent::CardClicked { id: id.clone() }]);
        assert!(table.click(&id, Button::Secondary, ms(0)).is_empty());
    }

    #[test]
    fn test_drag_release_is_not_a_rotation() {
        let mut table = table();
        table.load_deck(&deck(2)).unwrap();
        let id = play_to_field(&mut table, Point::new(100, 100));

        table.handle_input(
            RawInput::MouseDown { button: Button::Primary, at: Point::new(110, 110), card: Some(id.clone()) },
            ms(0),
        );
        table.handle_input(RawInput::MouseMove { at: Point::new(300, 300) }, ms(50));
        let events = table.handle_input(
            RawInput::MouseUp { button: Button::Primary, at: Some(Point::new(300, 300)) },
            ms(100),
        );
        assert_eq!(events, vec![TableEvent::moved(id.clone(), Point::new(300, 300), Rotation::Upright)]);

        // Platform click right after the release
        assert!(table.click(&id, Button::Primary, ms(120)).is_empty());
        let ctx = table.handle_input(RawInput::ContextMenu { at: Point::new(300, 300), card: Some(id.clone()) }, ms(150));
        assert!(ctx.is_empty());
        assert_eq!(table.card(&id).unwrap().rotation(), Some(Rotation::Upright));
    }

    #[test]
    fn test_touch_drag_back_to_hand() {
        let touch = InputCapabilities { touch_events: true, max_touch_points: 5 };
        let mut table = Table::new(TableConfig::new().with_seed(5), touch).unwrap();
        table.register_target(DropTarget::new(DropZone::Field, Point::new(0, 0), 800, 500));
        table.register_target(DropTarget::new(DropZone::Hand, Point::new(0, 500), 800, 150));
        table.load_deck(&deck(3)).unwrap();
        let id = play_to_field(&mut table, Point::new(100, 100));

        table.handle_input(RawInput::TouchStart { touch: 7, at: Point::new(105, 105), card: Some(id.clone()) }, ms(0));
        table.handle_input(RawInput::TouchMove { touch: 7, at: Point::new(100, 560) }, ms(10));
        assert_eq!(table.drag().dragged_by(&id), Some(PointerId::Touch(7)));
        let events = table.handle_input(RawInput::TouchEnd { touch: 7, at: Some(Point::new(100, 560)) }, ms(20));

        assert!(matches!(&events[..], [TableEvent::DroppedToHand { .. }]));
        assert_eq!(table.card(&id).unwrap().zone(), Zone::Hand);
        assert!(table.field().is_empty());
    }

    #[test]
    fn test_hand_slots_follow_draw_order() {
        let mut table = table();
        table.load_deck(&deck(3)).unwrap();
        let first = table.draw().unwrap();
        let second = table.draw().unwrap();
        assert_eq!(table.hand_slot(&first), Some(Point::new(0, 0)));
        assert_eq!(table.hand_slot(&second), Some(Point::new(108, 0)));
        assert_eq!(table.hand_slot(&CardKey::from("nope")), None);
        assert_eq!(table.hand_width(), 208);
    }

    #[test]
    fn test_flip_and_rotate_helpers() {
        let mut table = table();
        table.load_deck(&deck(2)).unwrap();
        let id = play_to_field(&mut table, Point::new(1, 1));
        assert_eq!(table.flip(&id), Some(false));
        assert_eq!(table.rotate(&id), Some(TableEvent::moved(id.clone(), Point::new(1, 1), Rotation::Quarter)));
        assert_eq!(table.card(&id).unwrap().rotation(), Some(Rotation::Quarter));

        let hand = table.draw().unwrap();
        assert_eq!(table.flip(&hand), None);
        assert_eq!(table.rotate(&hand), None);
    }

    #[test]
    fn test_images_resolve_without_touching_placement() {
        let mut table = table();
        let mut record = deck(2);
        record.cards[0].id = Some(RawCardId::Number(11));
        record.cards[0].image_url = Some("/uploads/a.png".into());
        record.cards[1].id = Some(RawCardId::Number(12));

        let tickets = table.load_deck(&record).unwrap();
        assert_eq!(tickets.len(), 2);
        assert_eq!(table.pending_images(), 2);

        // Shown while pending
        let a = table.cards().find(|c| c.id == tickets[0].card).unwrap();
        assert_eq!(a.image_url.as_deref(), Some("http://localhost:8000/uploads/a.png"));
        let b = table.cards().find(|c| c.id == tickets[1].card).unwrap();
        assert_eq!(b.image_url.as_deref(), Some("http://localhost:8000/static/card-fallback.png"));

        // Move one card while its lookup is in flight
        let drawn = table.draw().unwrap();
        let item = table.card(&drawn).unwrap().clone();
        assert!(table.apply(&TableEvent::to_field(item, Point::new(9, 9))));
        let before: Vec<_> = table.cards().map(|c| (c.id.clone(), c.location)).collect();

        assert!(table.complete_image(&tickets[0], Ok(Some("https://signed/a.png".into()))));
        assert!(table.complete_image(&tickets[1], Err(ImageError::LookupFailed("timeout".into()))));
        assert!(!table.complete_image(&tickets[1], Ok(Some("https://late/b.png".into()))));

        let after: Vec<_> = table.cards().map(|c| (c.id.clone(), c.location)).collect();
        assert_eq!(before, after);
        assert_eq!(table.card(&tickets[0].card).unwrap().image_url.as_deref(), Some("https://signed/a.png"));
        assert_eq!(
            table.card(&tickets[1].card).unwrap().image_url.as_deref(),
            Some("http://localhost:8000/static/card-fallback.png")
        );
    }

    #[test]
    fn test_tickets_from_previous_deck_are_stale() {
        let mut table = table();
        let mut record = deck(1);
        record.cards[0].id = Some(RawCardId::Number(1));
        let tickets = table.load_deck(&record).unwrap();
        table.load_deck(&deck(1)).unwrap();
        assert!(!table.complete_image(&tickets[0], Ok(Some("https://x/a.png".into()))));
    }
}
