//! Drag sessions and drop targets.
//!
//! A [`DragContext`] is owned by the table session and holds every
//! in-flight gesture, keyed by pointer. Drop targets query it for the
//! dragged item instead of reading shared global state.
//!
//! Per pointer:
//!
//! ```text
//! Idle --press--> Pressed --move past threshold--> Dragging
//!                    |                                 |
//!                 release                   release over target -> Dropped
//!                    v                      release elsewhere    -> Cancelled
//!                 Clicked                   cancel               -> Cancelled
//! ```
//!
//! `Dropped` and `Cancelled` both return the pointer to `Idle`.

use std::time::Duration;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

use super::backend::{DragBackend, Gesture, PointerId};
use super::click::ClickGuard;
use crate::cards::{Card, Point, Rotation, Zone};
use crate::core::config::TableConfig;
use crate::core::id::CardKey;
use crate::table::event::TableEvent;

/// Zones that accept drops. The deck never does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropZone {
    Hand,
    Field,
}

impl DropZone {
    #[must_use]
    pub const fn zone(self) -> Zone {
        match self {
            DropZone::Hand => Zone::Hand,
            DropZone::Field => Zone::Field,
        }
    }
}

/// A registered screen region accepting dropped cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTarget {
    pub zone: DropZone,
    /// Top-left of the container in page coordinates.
    pub origin: Point,
    pub width: i32,
    pub height: i32,
}

impl DropTarget {
    #[must_use]
    pub const fn new(zone: DropZone, origin: Point, width: i32, height: i32) -> Self {
        Self { zone, origin, width, height }
    }

    #[must_use]
    pub fn contains(&self, at: Point) -> bool {
        let local = at.relative_to(self.origin);
        (0..self.width).contains(&local.x) && (0..self.height).contains(&local.y)
    }
}

/// What a drag carries: the item as it was when the drag started.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragPayload {
    pub item: Card,
    pub zone: Zone,
    pub rotation: Option<Rotation>,
}

impl DragPayload {
    #[must_use]
    pub fn capture(item: Card) -> Self {
        Self {
            zone: item.zone(),
            rotation: item.rotation(),
            item,
        }
    }
}

/// An active drag under one pointer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragSession {
    pub pointer: PointerId,
    pub payload: DragPayload,
    /// Last known pointer position, in page coordinates.
    pub last: Point,
}

/// A press only remembers which card it landed on. The card's value is
/// read again when the press turns into a drag, since it may have been
/// rotated in between.
#[derive(Clone, Debug, PartialEq, Eq)]
enum PointerState {
    Pressed { card: CardKey, zone: Zone, at: Point },
    Dragging(DragSession),
}

impl PointerState {
    fn card(&self) -> &CardKey {
        match self {
            PointerState::Pressed { card, .. } => card,
            PointerState::Dragging(session) => &session.payload.item.id,
        }
    }
}

/// Result of feeding one gesture to the context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragOutcome {
    /// Nothing for the table to do.
    Ignored,
    Started(CardKey),
    Dropped(TableEvent),
    Cancelled(CardKey),
    /// Primary click/tap that was not a drag release.
    Clicked(CardKey),
    /// Secondary/alternate activation.
    Alternate(CardKey),
}

#[derive(Clone, Debug)]
pub struct DragContext {
    backend: DragBackend,
    threshold: i32,
    targets: SmallVec<[DropTarget; 4]>,
    pointers: FxHashMap<PointerId, PointerState>,
    guard: ClickGuard,
}

impl DragContext {
    #[must_use]
    pub fn new(backend: DragBackend, config: &TableConfig) -> Self {
        Self {
            backend,
            threshold: config.drag_threshold,
            targets: SmallVec::new(),
            pointers: FxHashMap::default(),
            guard: ClickGuard::new(config.click_debounce),
        }
    }

    #[must_use]
    pub fn backend(&self) -> DragBackend {
        self.backend
    }

    /// Register a drop target, replacing any earlier one for the same zone.
    pub fn register_target(&mut self, target: DropTarget) {
        self.targets.retain(|t| t.zone != target.zone);
        self.targets.push(target);
    }

    pub fn unregister_target(&mut self, zone: DropZone) {
        self.targets.retain(|t| t.zone != zone);
    }

    /// Topmost (latest registered) target under `at`.
    #[must_use]
    pub fn target_at(&self, at: Point) -> Option<&DropTarget> {
        self.targets.iter().rev().find(|t| t.contains(at))
    }

    #[must_use]
    pub fn session(&self, pointer: PointerId) -> Option<&DragSession> {
        match self.pointers.get(&pointer)? {
            PointerState::Dragging(session) => Some(session),
            PointerState::Pressed { .. } => None,
        }
    }

    /// Active drag sessions.
    pub fn sessions(&self) -> impl Iterator<Item = &DragSession> + '_ {
        self.pointers.values().filter_map(|state| match state {
            PointerState::Dragging(session) => Some(session),
            PointerState::Pressed { .. } => None,
        })
    }

    fn session_for(&self, card: &CardKey) -> Option<&DragSession> {
        self.sessions().find(|s| &s.payload.item.id == card)
    }

    /// Pointer currently dragging `card`, if any.
    #[must_use]
    pub fn dragged_by(&self, card: &CardKey) -> Option<PointerId> {
        self.session_for(card).map(|s| s.pointer)
    }

    /// Where the pointer dragging `card` was last seen, for drawing the
    /// card under the finger.
    #[must_use]
    pub fn position_of(&self, card: &CardKey) -> Option<Point> {
        self.session_for(card).map(|s| s.last)
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.guard.is_dragging()
    }

    /// Feed one gesture. `lookup` resolves a card's current value, on press
    /// and again when a press turns into a drag.
    pub fn handle<F>(&mut self, gesture: Gesture, now: Duration, lookup: F) -> DragOutcome
    where
        F: FnOnce(&CardKey) -> Option<Card>,
    {
        match gesture {
            Gesture::Press { pointer, at, card } => match card.as_ref().and_then(lookup) {
                Some(card) => self.press(pointer, card, at),
                None => DragOutcome::Ignored,
            },
            Gesture::Move { pointer, at } => self.motion(pointer, at, lookup),
            Gesture::Release { pointer, at } => self.release(pointer, at, now),
            Gesture::Alternate { card, .. } => match card {
                Some(card) => self.alternate(card, now),
                None => DragOutcome::Ignored,
            },
            Gesture::Cancel { pointer } => self.cancel(pointer, now),
        }
    }

    /// Pointer went down on `card`.
    pub fn press(&mut self, pointer: PointerId, card: Card, at: Point) -> DragOutcome {
        if !card.zone().is_drag_initiable() {
            debug!(card = %card.id, "press ignored: deck cards are not draggable");
            return DragOutcome::Ignored;
        }
        if self.pointers.contains_key(&pointer) {
            debug!(?pointer, "press ignored: pointer already busy");
            return DragOutcome::Ignored;
        }
        if self.pointers.values().any(|state| state.card() == &card.id) {
            debug!(card = %card.id, "press ignored: card held by another pointer");
            return DragOutcome::Ignored;
        }
        let state = PointerState::Pressed { zone: card.zone(), card: card.id, at };
        self.pointers.insert(pointer, state);
        DragOutcome::Ignored
    }

    /// Pointer moved. A press becomes a drag once it travels past the
    /// threshold; the payload is captured from `lookup` at that moment.
    /// If the card is gone or has changed zone since the press, the
    /// gesture is cancelled.
    pub fn motion<F>(&mut self, pointer: PointerId, at: Point, lookup: F) -> DragOutcome
    where
        F: FnOnce(&CardKey) -> Option<Card>,
    {
        let (card, zone, down) = match self.pointers.get_mut(&pointer) {
            None => return DragOutcome::Ignored,
            Some(PointerState::Dragging(session)) => {
                session.last = at;
                return DragOutcome::Ignored;
            }
            Some(PointerState::Pressed { card, zone, at: down }) => (card.clone(), *zone, *down),
        };

        let delta = at.relative_to(down);
        let travelled = i64::from(delta.x).pow(2) + i64::from(delta.y).pow(2);
        if travelled < i64::from(self.threshold).pow(2) {
            return DragOutcome::Ignored;
        }

        let item = match lookup(&card) {
            Some(item) if item.zone() == zone => item,
            _ => {
                debug!(%card, ?pointer, "press dropped: card moved before the drag started");
                self.pointers.remove(&pointer);
                return DragOutcome::Cancelled(card);
            }
        };
        let payload = DragPayload::capture(item);
        debug!(%card, zone = %payload.zone, ?pointer, "drag started");
        self.pointers
            .insert(pointer, PointerState::Dragging(DragSession { pointer, payload, last: at }));
        self.guard.drag_started();
        DragOutcome::Started(card)
    }

    /// Pointer released. `at` is `None` when the host could not resolve a
    /// position; a drag released that way is cancelled.
    pub fn release(&mut self, pointer: PointerId, at: Option<Point>, now: Duration) -> DragOutcome {
        match self.pointers.remove(&pointer) {
            None => DragOutcome::Ignored,
            Some(PointerState::Pressed { card, .. }) => {
                if self.guard.accepts(now) {
                    DragOutcome::Clicked(card)
                } else {
                    debug!(%card, "click ignored: too close to a drag");
                    DragOutcome::Ignored
                }
            }
            Some(PointerState::Dragging(session)) => {
                self.guard.drag_ended(now);
                self.resolve_drop(session, at)
            }
        }
    }

    /// Platform cancelled the gesture.
    pub fn cancel(&mut self, pointer: PointerId, now: Duration) -> DragOutcome {
        match self.pointers.remove(&pointer) {
            Some(PointerState::Dragging(session)) => {
                self.guard.drag_ended(now);
                DragOutcome::Cancelled(session.payload.item.id)
            }
            Some(PointerState::Pressed { .. }) | None => DragOutcome::Ignored,
        }
    }

    /// Secondary activation on `card`.
    pub fn alternate(&mut self, card: CardKey, now: Duration) -> DragOutcome {
        if self.guard.accepts(now) {
            DragOutcome::Alternate(card)
        } else {
            debug!(%card, "alternate click ignored: too close to a drag");
            DragOutcome::Ignored
        }
    }

    /// Whether a click arriving now should be honoured.
    #[must_use]
    pub fn accepts_click(&self, now: Duration) -> bool {
        self.guard.accepts(now)
    }

    fn resolve_drop(&self, session: DragSession, at: Option<Point>) -> DragOutcome {
        let payload = session.payload;
        let id = payload.item.id.clone();

        let Some(at) = at else {
            warn!(card = %id, "drop without a resolvable pointer position");
            return DragOutcome::Cancelled(id);
        };
        let Some(target) = self.target_at(at) else {
            debug!(card = %id, x = at.x, y = at.y, "drag cancelled: no drop target");
            return DragOutcome::Cancelled(id);
        };

        let local = at.relative_to(target.origin);
        let outcome = match (target.zone, payload.zone) {
            (DropZone::Field, Zone::Field) => {
                TableEvent::moved(id, local, payload.rotation.unwrap_or_default())
            }
            (DropZone::Field, _) => TableEvent::to_field(payload.item, local),
            (DropZone::Hand, Zone::Field) => TableEvent::DroppedToHand { item: payload.item },
            (DropZone::Hand, _) => {
                debug!(card = %id, "drop ignored: already in hand");
                return DragOutcome::Cancelled(id);
            }
        };
        debug!(card = %outcome.card(), target = ?target.zone, "card dropped");
        DragOutcome::Dropped(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardSpec;
    use crate::core::id::IdSource;
    use crate::core::rng::TableRng;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn context() -> DragContext {
        let mut ctx = DragContext::new(DragBackend::Pointer, &TableConfig::default());
        ctx.register_target(DropTarget::new(DropZone::Field, Point::new(0, 0), 800, 500));
        ctx.register_target(DropTarget::new(DropZone::Hand, Point::new(0, 500), 800, 150));
        ctx
    }

    fn card(zone: &str) -> Card {
        let mut ids = IdSource::new(TableRng::new(4));
        CardSpec::new("Elf", zone).at(100, 100).rotated(90).build(&mut ids).unwrap()
    }

    fn drag(ctx: &mut DragContext, card: Card, from: Point, to: Option<Point>) -> DragOutcome {
        ctx.press(PointerId::Mouse, card.clone(), from);
        let via = to.unwrap_or(Point::new(from.x + 50, from.y + 50));
        assert!(matches!(ctx.motion(PointerId::Mouse, via, |_| Some(card)), DragOutcome::Started(_)));
        ctx.release(PointerId::Mouse, to, ms(20))
    }

    #[test]
    fn test_target_contains() {
        let target = DropTarget::new(DropZone::Hand, Point::new(10, 10), 20, 20);
        assert!(target.contains(Point::new(10, 10)));
        assert!(target.contains(Point::new(29, 29)));
        assert!(!target.contains(Point::new(30, 10)));
        assert!(!target.contains(Point::new(9, 15)));
    }

    #[test]
    fn test_register_replaces_same_zone() {
        let mut ctx = context();
        ctx.register_target(DropTarget::new(DropZone::Hand, Point::new(0, 900), 10, 10));
        assert_eq!(ctx.target_at(Point::new(5, 550)), None);
        assert_eq!(ctx.target_at(Point::new(5, 905)).map(|t| t.zone), Some(DropZone::Hand));

        ctx.unregister_target(DropZone::Field);
        assert_eq!(ctx.target_at(Point::new(5, 5)), None);
    }

    #[test]
    fn test_hand_to_field_emits_relative_coordinates() {
        let mut ctx = context();
        ctx.register_target(DropTarget::new(DropZone::Field, Point::new(40, 60), 800, 400));
        let item = card("hand");

        let outcome = drag(&mut ctx, item.clone(), Point::new(100, 520), Some(Point::new(240, 160)));
        assert_eq!(outcome, DragOutcome::Dropped(TableEvent::to_field(item, Point::new(200, 100))));
        assert!(!ctx.is_dragging());
    }

    #[test]
    fn test_field_to_field_passes_rotation_through() {
        let mut ctx = context();
        let item = card("field");
        let id = item.id.clone();

        let outcome = drag(&mut ctx, item, Point::new(110, 110), Some(Point::new(300, 200)));
        assert_eq!(
            outcome,
            DragOutcome::Dropped(TableEvent::moved(id, Point::new(300, 200), Rotation::Quarter))
        );
    }

    #[test]
    fn test_field_to_hand_carries_item_only() {
        let mut ctx = context();
        let item = card("field");
        let outcome = drag(&mut ctx, item.clone(), Point::new(110, 110), Some(Point::new(50, 550)));
        assert_eq!(outcome, DragOutcome::Dropped(TableEvent::DroppedToHand { item }));
    }

    #[test]
    fn test_hand_to_hand_is_cancelled() {
        let mut ctx = context();
        let item = card("hand");
        let id = item.id.clone();
        let outcome = drag(&mut ctx, item, Point::new(10, 510), Some(Point::new(200, 560)));
        assert_eq!(outcome, DragOutcome::Cancelled(id));
    }

    #[test]
    fn test_release_outside_targets_cancels() {
        let mut ctx = context();
        let item = card("hand");
        let id = item.id.clone();
        let outcome = drag(&mut ctx, item, Point::new(10, 510), Some(Point::new(2000, 2000)));
        assert_eq!(outcome, DragOutcome::Cancelled(id));
    }

    #[test]
    fn test_release_without_position_cancels() {
        let mut ctx = context();
        let item = card("field");
        let id = item.id.clone();
        let outcome = drag(&mut ctx, item, Point::new(10, 10), None);
        assert_eq!(outcome, DragOutcome::Cancelled(id));
        assert!(!ctx.is_dragging());
    }

    #[test]
    fn test_deck_cards_are_not_draggable() {
        let mut ctx = context();
        ctx.press(PointerId::Mouse, card("deck"), Point::new(0, 0));
        assert_eq!(ctx.motion(PointerId::Mouse, Point::new(100, 100), |_| None), DragOutcome::Ignored);
        assert_eq!(ctx.release(PointerId::Mouse, Some(Point::new(100, 100)), ms(6)), DragOutcome::Ignored);
    }

    #[test]
    fn test_small_motion_is_a_click() {
        let mut ctx = context();
        let item = card("field");
        let id = item.id.clone();
        ctx.press(PointerId::Mouse, item, Point::new(10, 10));
        assert_eq!(ctx.motion(PointerId::Mouse, Point::new(12, 11), |_| None), DragOutcome::Ignored);
        assert_eq!(ctx.release(PointerId::Mouse, Some(Point::new(12, 11)), ms(6)), DragOutcome::Clicked(id));
    }

    #[test]
    fn test_click_right_after_drag_is_ignored() {
        let mut ctx = context();
        let item = card("field");
        drag(&mut ctx, item.clone(), Point::new(10, 10), Some(Point::new(300, 300)));

        ctx.press(PointerId::Mouse, item.clone(), Point::new(300, 300));
        assert_eq!(ctx.release(PointerId::Mouse, Some(Point::new(300, 300)), ms(100)), DragOutcome::Ignored);
        assert_eq!(ctx.alternate(item.id.clone(), ms(150)), DragOutcome::Ignored);

        ctx.press(PointerId::Mouse, item.clone(), Point::new(300, 300));
        assert_eq!(
            ctx.release(PointerId::Mouse, Some(Point::new(300, 300)), ms(400)),
            DragOutcome::Clicked(item.id)
        );
    }

    #[test]
    fn test_one_card_per_pointer_and_pointer_per_card() {
        let mut ctx = context();
        let elf = card("field");
        let mut ids = IdSource::new(TableRng::new(99));
        let orc = CardSpec::new("Orc", "hand").build(&mut ids).unwrap();

        ctx.press(PointerId::Touch(0), elf.clone(), Point::new(10, 10));
        ctx.press(PointerId::Touch(0), orc.clone(), Point::new(10, 10));
        ctx.press(PointerId::Touch(1), elf.clone(), Point::new(10, 10));
        ctx.press(PointerId::Touch(2), orc.clone(), Point::new(10, 510));

        assert!(matches!(ctx.motion(PointerId::Touch(0), Point::new(90, 90), |_| Some(elf.clone())), DragOutcome::Started(_)));
        assert_eq!(ctx.motion(PointerId::Touch(1), Point::new(90, 90), |_| Some(elf.clone())), DragOutcome::Ignored);
        assert!(matches!(ctx.motion(PointerId::Touch(2), Point::new(90, 590), |_| Some(orc.clone())), DragOutcome::Started(_)));

        assert_eq!(ctx.dragged_by(&elf.id), Some(PointerId::Touch(0)));
        assert_eq!(ctx.dragged_by(&orc.id), Some(PointerId::Touch(2)));
        assert_eq!(ctx.sessions().count(), 2);
        assert_eq!(ctx.session(PointerId::Touch(0)).unwrap().payload.item.id, elf.id);
    }

    #[test]
    fn test_cancel_gesture() {
        let mut ctx = context();
        let item = card("hand");
        let id = item.id.clone();
        ctx.press(PointerId::Touch(0), item.clone(), Point::new(10, 510));
        ctx.motion(PointerId::Touch(0), Point::new(100, 300), |_| Some(item));
        assert!(ctx.is_dragging());
        assert_eq!(ctx.cancel(PointerId::Touch(0), ms(2)), DragOutcome::Cancelled(id));
        assert!(!ctx.is_dragging());
        assert_eq!(ctx.cancel(PointerId::Touch(0), ms(3)), DragOutcome::Ignored);
    }

    #[test]
    fn test_payload_is_captured_when_drag_starts() {
        let mut ctx = context();
        let item = card("field");
        let id = item.id.clone();
        ctx.press(PointerId::Mouse, item.clone(), Point::new(110, 110));

        // Rotated while only pressed
        let rotated = item.onto_field(Point::new(100, 100), Rotation::Half);
        assert_eq!(ctx.alternate(id.clone(), ms(5)), DragOutcome::Alternate(id.clone()));
        assert!(matches!(ctx.motion(PointerId::Mouse, Point::new(300, 200), |_| Some(rotated)), DragOutcome::Started(_)));

        let outcome = ctx.release(PointerId::Mouse, Some(Point::new(300, 200)), ms(20));
        assert_eq!(outcome, DragOutcome::Dropped(TableEvent::moved(id, Point::new(300, 200), Rotation::Half)));
    }

    #[test]
    fn test_press_on_card_that_changed_zone_is_dropped() {
        let mut ctx = context();
        let item = card("field");
        let id = item.id.clone();
        ctx.press(PointerId::Mouse, item.clone(), Point::new(110, 110));

        let outcome = ctx.motion(PointerId::Mouse, Point::new(300, 300), |_| Some(item.into_hand()));
        assert_eq!(outcome, DragOutcome::Cancelled(id.clone()));
        assert!(!ctx.is_dragging());
        assert_eq!(ctx.release(PointerId::Mouse, Some(Point::new(300, 300)), ms(10)), DragOutcome::Ignored);

        let gone = card("hand");
        ctx.press(PointerId::Mouse, gone.clone(), Point::new(10, 510));
        assert_eq!(ctx.motion(PointerId::Mouse, Point::new(200, 200), |_| None), DragOutcome::Cancelled(gone.id));
    }

    #[test]
    fn test_position_follows_pointer() {
        let mut ctx = context();
        let item = card("hand");
        let id = item.id.clone();
        ctx.press(PointerId::Touch(4), item.clone(), Point::new(10, 510));
        assert_eq!(ctx.position_of(&id), None);

        ctx.motion(PointerId::Touch(4), Point::new(60, 400), |_| Some(item));
        assert_eq!(ctx.position_of(&id), Some(Point::new(60, 400)));
        ctx.motion(PointerId::Touch(4), Point::new(80, 300), |_| None);
        assert_eq!(ctx.position_of(&id), Some(Point::new(80, 300)));
        assert_eq!(ctx.session(PointerId::Touch(4)).map(|s| s.last), Some(Point::new(80, 300)));
    }

    #[test]
    fn test_handle_looks_up_pressed_card() {
        let mut ctx = context();
        let item = card("hand");
        let id = item.id.clone();

        let press = Gesture::Press { pointer: PointerId::Mouse, at: Point::new(10, 510), card: Some(id.clone()) };
        assert_eq!(ctx.handle(press, ms(0), |_| Some(item.clone())), DragOutcome::Ignored);
        let moved = Gesture::Move { pointer: PointerId::Mouse, at: Point::new(100, 100) };
        assert_eq!(ctx.handle(moved, ms(1), |_| Some(item.clone())), DragOutcome::Started(id));

        let unknown = Gesture::Press { pointer: PointerId::Touch(5), at: Point::new(0, 0), card: Some("x".into()) };
        assert_eq!(ctx.handle(unknown, ms(2), |_| None), DragOutcome::Ignored);
    }
}
