//! Table configuration.
//!
//! The host provides a `TableConfig` when it opens a session. Everything has
//! a sensible default, so most hosts only set the API base URL and fallback
//! artwork.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::error::TableError;

/// Number of cards in a complete deck.
pub const DEFAULT_DECK_SIZE: usize = 40;

/// Window after a drag ends during which clicks are ignored.
pub const DEFAULT_CLICK_DEBOUNCE: Duration = Duration::from_millis(200);

/// Pointer travel before a press turns into a drag.
pub const DEFAULT_DRAG_THRESHOLD: i32 = 5;

/// Session configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Cards required for a deck to be submitted.
    pub deck_size: usize,

    /// Clicks within this window after a drag release are not rotations.
    pub click_debounce: Duration,

    /// Absolute URL of the artwork shown when image resolution fails.
    pub fallback_image_url: String,

    /// Base URL of the deck/card API, used to absolutize relative image paths.
    pub api_base_url: String,

    /// Pointer travel (pixels) before a press becomes a drag.
    pub drag_threshold: i32,

    /// Whether a primary click on a field card rotates it.
    /// Secondary clicks always rotate.
    pub rotate_on_primary_click: bool,

    /// RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,

    /// Horizontal pitch of one hand slot, in pixels.
    pub hand_slot_width: i32,

    /// Gap between hand slots, in pixels.
    pub hand_gap: i32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            deck_size: DEFAULT_DECK_SIZE,
            click_debounce: DEFAULT_CLICK_DEBOUNCE,
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            fallback_image_url: "http://localhost:8000/static/card-fallback.png".to_string(),
            api_base_url: "http://localhost:8000".to_string(),
            rotate_on_primary_click: true,
            seed: None,
            hand_slot_width: 100,
            hand_gap: 8,
        }
    }
}

impl TableConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the deck size.
    #[must_use]
    pub fn with_deck_size(mut self, deck_size: usize) -> Self {
        self.deck_size = deck_size;
        self
    }

    /// Set the click debounce window.
    #[must_use]
    pub fn with_click_debounce(mut self, debounce: Duration) -> Self {
        self.click_debounce = debounce;
        self
    }

    /// Set the press-to-drag travel threshold.
    #[must_use]
    pub fn with_drag_threshold(mut self, pixels: i32) -> Self {
        self.drag_threshold = pixels;
        self
    }

    /// Set the fallback artwork URL.
    #[must_use]
    pub fn with_fallback_image(mut self, url: impl Into<String>) -> Self {
        self.fallback_image_url = url.into();
        self
    }

    /// Set the API base URL.
    #[must_use]
    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Enable or disable rotation on primary click.
    #[must_use]
    pub fn with_primary_click_rotation(mut self, enabled: bool) -> Self {
        self.rotate_on_primary_click = enabled;
        self
    }

    /// Fix the RNG seed (deterministic shuffles).
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set hand slot geometry.
    #[must_use]
    pub fn with_hand_slots(mut self, slot_width: i32, gap: i32) -> Self {
        self.hand_slot_width = slot_width;
        self.hand_gap = gap;
        self
    }

    /// The API base URL, parsed.
    pub fn api_base(&self) -> Result<Url, TableError> {
        parse_url("api_base_url", &self.api_base_url)
    }

    /// Reject configurations the table cannot work with.
    pub fn validate(&self) -> Result<(), TableError> {
        if self.deck_size == 0 {
            return Err(TableError::InvalidConfig("deck_size must be positive".into()));
        }
        parse_url("fallback_image_url", &self.fallback_image_url)?;
        self.api_base()?;
        if self.drag_threshold < 0 {
            return Err(TableError::InvalidConfig("drag_threshold must not be negative".into()));
        }
        if self.hand_slot_width <= 0 || self.hand_gap < 0 {
            return Err(TableError::InvalidConfig(format!(
                "hand slot geometry {}+{} is not drawable",
                self.hand_slot_width, self.hand_gap
            )));
        }
        Ok(())
    }
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, TableError> {
    Url::parse(value.trim()).map_err(|source| TableError::InvalidUrl {
        field,
        value: value.to_string(),
        source,
    })
}
