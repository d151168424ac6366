//! Card artwork resolution.
//!
//! Cards backed by a persisted record get their artwork from the
//! authenticated image lookup, which is asynchronous and owned by the host.
//! The table hands out an [`ImageTicket`] per lookup; the host completes it
//! whenever the request finishes. Until then (and whenever the lookup fails)
//! the card shows its secondary URL or the static fallback.
//!
//! Completing a ticket only ever changes a card's `image_url`. A ticket
//! issued before the deck was reloaded is stale and ignored.

use rustc_hash::FxHashMap;
use tracing::{debug, warn};
use url::Url;

use crate::cards::Card;
use crate::core::config::TableConfig;
use crate::core::error::{ImageError, TableError};
use crate::core::id::{CardKey, PersistedCardId};

/// How a card's artwork will be obtained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImagePlan {
    /// Ask the authenticated lookup. `secondary` is shown meanwhile and
    /// used if the lookup fails.
    Lookup { card_id: PersistedCardId, secondary: Option<String> },
    /// Use this URL as is.
    Direct(String),
    /// Nothing to resolve; show the static fallback.
    Fallback,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageResolver {
    base: Url,
    fallback_url: String,
}

impl ImageResolver {
    pub fn new(base: Url, fallback_url: impl Into<String>) -> Self {
        Self {
            base,
            fallback_url: fallback_url.into(),
        }
    }

    pub fn from_config(config: &TableConfig) -> Result<Self, TableError> {
        Ok(Self::new(config.api_base()?, config.fallback_image_url.trim()))
    }

    #[must_use]
    pub fn fallback(&self) -> &str {
        &self.fallback_url
    }

    /// Resolve `url` against the API base. Absolute URLs keep their own
    /// origin; anything unresolvable shows the fallback artwork.
    #[must_use]
    pub fn absolutize(&self, url: &str) -> String {
        match self.base.join(url.trim()) {
            Ok(resolved) => resolved.into(),
            Err(error) => {
                warn!(%error, url, "unresolvable image url, using fallback artwork");
                self.fallback_url.clone()
            }
        }
    }

    #[must_use]
    pub fn plan(&self, card: &Card) -> ImagePlan {
        let secondary = card
            .image_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .map(|u| self.absolutize(u));
        match (&card.card_id, secondary) {
            (Some(card_id), secondary) => ImagePlan::Lookup { card_id: card_id.clone(), secondary },
            (None, Some(url)) => ImagePlan::Direct(url),
            (None, None) => ImagePlan::Fallback,
        }
    }

    /// URL to show right now, before any lookup completes.
    #[must_use]
    pub fn initial_url(&self, plan: &ImagePlan) -> String {
        match plan {
            ImagePlan::Lookup { secondary: Some(url), .. } | ImagePlan::Direct(url) => url.clone(),
            ImagePlan::Lookup { secondary: None, .. } | ImagePlan::Fallback => self.fallback_url.clone(),
        }
    }

    /// Final URL for a finished lookup: the returned URL, else the
    /// secondary, else the static fallback.
    #[must_use]
    pub fn settle(&self, outcome: Result<Option<String>, ImageError>, secondary: Option<&str>) -> String {
        let error = match outcome {
            Ok(Some(url)) if !url.trim().is_empty() => return self.absolutize(&url),
            Ok(_) => ImageError::NoUrl,
            Err(error) => error,
        };
        match secondary {
            Some(url) => {
                warn!(%error, fallback = url, "image lookup failed, using card url");
                url.to_string()
            }
            None => {
                warn!(%error, "image lookup failed, using fallback artwork");
                self.fallback_url.clone()
            }
        }
    }
}

/// One outstanding authenticated image lookup.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImageTicket {
    pub card: CardKey,
    pub card_id: PersistedCardId,
    generation: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Pending {
    generation: u64,
    secondary: Option<String>,
}

/// Outstanding lookups, at most one per card.
#[derive(Clone, Debug, Default)]
pub struct PendingImages {
    generation: u64,
    pending: FxHashMap<CardKey, Pending>,
}

impl PendingImages {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a lookup for `card` if its plan needs one. A newer request for
    /// the same card supersedes an older one.
    pub fn request(&mut self, card: &Card, plan: &ImagePlan) -> Option<ImageTicket> {
        let ImagePlan::Lookup { card_id, secondary } = plan else {
            return None;
        };
        self.generation += 1;
        self.pending.insert(
            card.id.clone(),
            Pending { generation: self.generation, secondary: secondary.clone() },
        );
        Some(ImageTicket {
            card: card.id.clone(),
            card_id: card_id.clone(),
            generation: self.generation,
        })
    }

    /// Finish a lookup. Returns the card and URL to show, or `None` for a
    /// stale or unknown ticket.
    pub fn complete(
        &mut self,
        ticket: &ImageTicket,
        outcome: Result<Option<String>, ImageError>,
        resolver: &ImageResolver,
    ) -> Option<(CardKey, String)> {
        match self.pending.get(&ticket.card) {
            Some(pending) if pending.generation == ticket.generation => {}
            _ => {
                debug!(card = %ticket.card, "stale image ticket ignored");
                return None;
            }
        }
        let pending = self.pending.remove(&ticket.card)?;
        let url = resolver.settle(outcome, pending.secondary.as_deref());
        Some((ticket.card.clone(), url))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Forget every outstanding lookup (deck reload, teardown).
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
