//! Card-database entities
//!
//! Deserialized views of the external card database's card, set, and
//! identifier objects. Read-only once fetched.

use serde::{Deserialize, Serialize};

/// Price snapshot carried on a card object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardPrices {
    pub usd: Option<String>,
    pub usd_foil: Option<String>,
    pub usd_etched: Option<String>,
    pub eur: Option<String>,
    pub tix: Option<String>,
}

/// One printing as the card database sees it
#[derive(Debug, Clone, Deserialize)]
pub struct ScryfallCard {
    /// Card-database UUID for this printing
    pub id: String,
    /// Card name (both faces joined with " // " for multi-face cards)
    pub name: String,
    /// Set code (lowercase)
    pub set: String,
    /// Set display name
    pub set_name: String,
    /// Collector number (may carry letters, e.g. "123a", "T5")
    pub collector_number: String,
    /// Finishes this printing is available in ("nonfoil"/"foil"/"etched")
    #[serde(default)]
    pub finishes: Vec<String>,
    /// Printing language code
    pub lang: String,
    /// Current price snapshot
    #[serde(default)]
    pub prices: CardPrices,
    /// Multiverse ids (may be empty)
    #[serde(default)]
    pub multiverse_ids: Vec<u64>,
    /// Promo subtypes ("prerelease", "judgegift", "promopack", ...)
    #[serde(default)]
    pub promo_types: Vec<String>,
}

impl ScryfallCard {
    /// Whether this printing exists in the given finish
    pub fn has_finish(&self, finish: &str) -> bool {
        self.finishes.iter().any(|f| f == finish)
    }
}

/// One set from the canonical set list
#[derive(Debug, Clone, Deserialize)]
pub struct ScryfallSet {
    /// Set code (lowercase)
    pub code: String,
    /// Set display name
    pub name: String,
    /// Set type ("expansion", "token", "promo", "memorabilia", ...)
    pub set_type: String,
    /// Parent set code for child sets (tokens, promos, art series)
    #[serde(default)]
    pub parent_set_code: Option<String>,
}

impl ScryfallSet {
    /// Structurally recognizable child set: tokens, promos, art series,
    /// and anything hanging off a parent set
    pub fn is_child_set(&self) -> bool {
        self.parent_set_code.is_some()
            || matches!(self.set_type.as_str(), "token" | "promo" | "memorabilia")
    }
}

/// Identifier object for the batch collection endpoint
///
/// Serializes to exactly one of the identifier shapes the endpoint accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum CardIdentifier {
    Id {
        id: String,
    },
    Multiverse {
        multiverse_id: u64,
    },
    SetCollector {
        set: String,
        collector_number: String,
    },
    NameSet {
        name: String,
        set: String,
    },
    Name {
        name: String,
    },
}

impl CardIdentifier {
    /// Human-readable description for error messages
    pub fn describe(&self) -> String {
        match self {
            CardIdentifier::Id { id } => format!("id {}", id),
            CardIdentifier::Multiverse { multiverse_id } => {
                format!("multiverse id {}", multiverse_id)
            }
            CardIdentifier::SetCollector {
                set,
                collector_number,
            } => format!("set {} and collector number {}", set, collector_number),
            CardIdentifier::NameSet { name, set } => format!("name {} in set {}", name, set),
            CardIdentifier::Name { name } => format!("name {}", name),
        }
    }
}
