//! Core building blocks: ids, configuration, errors, RNG.

pub mod config;
pub mod error;
pub mod id;
pub mod rng;

pub use config::{TableConfig, DEFAULT_CLICK_DEBOUNCE, DEFAULT_DECK_SIZE, DEFAULT_DRAG_THRESHOLD};
pub use error::{ImageError, TableError};
pub use id::{CardKey, IdSource, PersistedCardId};
pub use rng::TableRng;
