//! Error types.
//!
//! Only construction and parsing fail. Engine operations (draw, shuffle,
//! move, rotate, drop) degrade to no-ops and never return these.

use thiserror::Error;

/// Validation failures raised synchronously at construction time.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("invalid zone: {0:?} (expected deck, hand or field)")]
    InvalidZone(String),
    #[error("invalid rotation: {0} degrees is not a multiple of 90")]
    InvalidRotation(i32),
    #[error("malformed card: {0}")]
    MalformedCard(String),
    #[error("invalid deck: {0}")]
    InvalidDeck(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid config: {field} {value:?} is not a URL: {source}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("deck record parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for TableError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value.to_string())
    }
}

/// Why an image lookup produced no usable URL.
///
/// Always recovered locally through the fallback chain; only logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("image lookup failed: {0}")]
    LookupFailed(String),
    #[error("image lookup returned no url")]
    NoUrl,
}
