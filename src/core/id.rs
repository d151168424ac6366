//! Card identification.
//!
//! Two kinds of ids exist on the table:
//!
//! - [`CardKey`]: session-scoped id of one physical card on the table,
//!   synthesized client-side as `"<zone>-<name>-<suffix>"`. Stable for the
//!   session, meaningless to the backend.
//! - [`PersistedCardId`]: back-reference to a stored card row. Only numeric
//!   or UUID-shaped ids qualify; anything else (including session keys) is
//!   never sent to the authenticated image lookup.
//!
//! ```
//! use solo_table::core::PersistedCardId;
//!
//! assert!(PersistedCardId::parse("42").is_some());
//! assert!(PersistedCardId::parse("6f1c8a4e-2b1d-4c3e-9f0a-1b2c3d4e5f60").is_some());
//! assert!(PersistedCardId::parse("hand-Goblin-1a2b3c4d0").is_none());
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::rng::TableRng;
use crate::cards::Zone;

/// Session-scoped card identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardKey(pub String);

impl CardKey {
    /// Wrap an existing key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the raw key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CardKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl std::fmt::Display for CardKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Id of a persisted card record, usable for authenticated image lookup.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersistedCardId {
    Numeric(u64),
    Uuid(Uuid),
}

impl PersistedCardId {
    /// Classify a raw id. Returns `None` for anything that is neither all
    /// digits nor a UUID.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if raw.bytes().all(|b| b.is_ascii_digit()) {
            return raw.parse().ok().map(Self::Numeric);
        }
        Uuid::parse_str(raw).ok().map(Self::Uuid)
    }
}

impl std::fmt::Display for PersistedCardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Uuid(u) => write!(f, "{u}"),
        }
    }
}

/// Synthesizes unique session keys.
///
/// A counter guarantees uniqueness within the session; the random part keeps
/// keys from different sessions from colliding in host-side caches.
#[derive(Clone, Debug)]
pub struct IdSource {
    rng: TableRng,
    counter: u64,
}

impl IdSource {
    #[must_use]
    pub fn new(rng: TableRng) -> Self {
        Self { rng, counter: 0 }
    }

    /// Fresh key scoped to `zone` and `name`.
    pub fn synthesize(&mut self, zone: Zone, name: &str) -> CardKey {
        self.counter += 1;
        let name: String = name
            .chars()
            .map(|c| if c.is_whitespace() || c == '-' { '_' } else { c })
            .collect();
        let name = if name.is_empty() { "card".to_string() } else { name };
        CardKey(format!("{zone}-{name}-{:08x}{:x}", self.rng.next_u32(), self.counter))
    }
}
