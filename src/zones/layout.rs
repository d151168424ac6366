//! Hand layout: cards sit left to right by draw order.

use crate::cards::Point;
use crate::core::config::TableConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandLayout {
    pub slot_width: i32,
    pub gap: i32,
}

impl HandLayout {
    #[must_use]
    pub fn from_config(config: &TableConfig) -> Self {
        Self {
            slot_width: config.hand_slot_width,
            gap: config.hand_gap,
        }
    }

    /// Top-left of the slot at `index`, relative to the hand container.
    #[must_use]
    pub fn slot(&self, index: usize) -> Point {
        let index = i32::try_from(index).unwrap_or(i32::MAX);
        Point::new(index.saturating_mul(self.pitch()), 0)
    }

    /// Width needed to show `count` cards.
    #[must_use]
    pub fn width(&self, count: usize) -> i32 {
        match count {
            0 => 0,
            n => self.slot(n - 1).x.saturating_add(self.slot_width),
        }
    }

    fn pitch(&self) -> i32 {
        self.slot_width + self.gap
    }
}
